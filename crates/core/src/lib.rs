//! Core types and traits for ledgerstore
//!
//! This crate defines the vocabulary shared by every layer:
//! - [`Error`]: engine-level error type
//! - [`KeyRange`], [`Mutation`], [`WriteBatch`]: key ranges and write sets
//! - [`KvCore`], [`Engine`], [`EngineTransaction`], [`Cursor`]: the minimal
//!   capability contract any backing ordered key-value engine must satisfy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::{Cursor, Engine, EngineTransaction, KvCore};
pub use types::{KeyRange, Mutation, Version, WriteBatch};
