//! Engine configuration
//!
//! A [`Config`] names a scheme and, for the `file` scheme, a directory.
//! It can be built in code, parsed from a URI, or read from TOML:
//!
//! ```
//! use ledgerstore_engine::{Config, DurabilityMode, Scheme};
//!
//! let memory: Config = "memory://".parse().unwrap();
//! assert_eq!(memory.scheme, Scheme::Memory);
//!
//! let file: Config = "file:///var/lib/ledger".parse().unwrap();
//! assert_eq!(file.path.to_str(), Some("/var/lib/ledger"));
//!
//! let strict = Config::from_toml(r#"
//!     scheme = "file"
//!     path = "/var/lib/ledger"
//!     durability = "strict"
//! "#).unwrap();
//! assert_eq!(strict.durability, DurabilityMode::Strict);
//! ```

use ledgerstore_core::{Error, Result};
use ledgerstore_durability::DurabilityMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where the engine keeps its data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Process memory only; nothing survives close
    #[default]
    Memory,
    /// A directory holding the write-ahead log
    File,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Memory => write!(f, "memory"),
            Scheme::File => write!(f, "file"),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Storage scheme
    #[serde(default)]
    pub scheme: Scheme,
    /// Data directory; ignored by the memory scheme
    #[serde(default)]
    pub path: PathBuf,
    /// WAL fsync policy; ignored by the memory scheme
    #[serde(default)]
    pub durability: DurabilityMode,
}

impl Config {
    /// In-memory engine.
    pub fn memory() -> Self {
        Config::default()
    }

    /// File-backed engine rooted at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Config {
            scheme: Scheme::File,
            path: path.into(),
            durability: DurabilityMode::default(),
        }
    }

    /// Set the durability mode.
    pub fn durability(mut self, mode: DurabilityMode) -> Self {
        self.durability = mode;
        self
    }

    /// fsync after every write.
    pub fn strict(self) -> Self {
        self.durability(DurabilityMode::Strict)
    }

    /// Never fsync explicitly.
    pub fn no_sync(self) -> Self {
        self.durability(DurabilityMode::NoSync)
    }

    /// Check the configuration can be opened.
    pub fn validate(&self) -> Result<()> {
        if self.scheme == Scheme::File && self.path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "file scheme requires a path".to_string(),
            ));
        }
        if let DurabilityMode::Batched { batch_size: 0, .. } = self.durability {
            return Err(Error::InvalidConfig(
                "batched durability requires batch_size > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(s).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl FromStr for Config {
    type Err = Error;

    /// Parse `memory://` or `file://<path>`.
    fn from_str(s: &str) -> Result<Self> {
        let (scheme, rest) = s
            .split_once("://")
            .ok_or_else(|| Error::InvalidConfig(format!("expected scheme://path, got '{}'", s)))?;

        let config = match scheme {
            "memory" => Config::memory(),
            "file" => Config::file(rest),
            other => {
                return Err(Error::InvalidConfig(format!(
                    "unknown scheme '{}'",
                    other
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme {
            Scheme::Memory => write!(f, "memory://"),
            Scheme::File => write!(f, "file://{}", self.path.display()),
        }
    }
}
