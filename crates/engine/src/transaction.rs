//! Transactional view over a LogEngine
//!
//! A [`LogTransaction`] wraps a [`TransactionContext`] behind a mutex so it
//! can satisfy the shared-reference [`KvCore`] interface. It ends exactly
//! once, through `commit` or `discard`; dropping it while still active
//! discards it.

use crate::engine::EngineInner;
use ledgerstore_concurrency::TransactionContext;
use ledgerstore_core::{Cursor, EngineTransaction, KeyRange, KvCore, Result, WriteBatch};
use ledgerstore_storage::SnapshotCursor;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// An open transaction on a [`LogEngine`](crate::LogEngine).
#[derive(Debug)]
pub struct LogTransaction {
    inner: Arc<EngineInner>,
    ctx: Mutex<TransactionContext>,
}

impl LogTransaction {
    pub(crate) fn begin(inner: Arc<EngineInner>) -> Result<Self> {
        let ctx = inner.manager.begin(&inner.store)?;
        Ok(LogTransaction {
            inner,
            ctx: Mutex::new(ctx),
        })
    }

    /// Engine-local transaction ID.
    pub fn txn_id(&self) -> u64 {
        self.ctx.lock().txn_id
    }

    fn with_ctx<T>(&self, f: impl FnOnce(&mut TransactionContext) -> Result<T>) -> Result<T> {
        self.inner.manager.ensure_open()?;
        let mut ctx = self.ctx.lock();
        f(&mut ctx)
    }
}

impl KvCore for LogTransaction {
    fn has(&self, key: &[u8]) -> Result<bool> {
        self.with_ctx(|ctx| ctx.has(key))
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.with_ctx(|ctx| ctx.get(key))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.with_ctx(|ctx| ctx.put(key, value))
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.with_ctx(|ctx| ctx.delete(key))
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.with_ctx(|ctx| ctx.apply_batch(batch))
    }

    fn cursor(&self, range: KeyRange) -> Result<Box<dyn Cursor>> {
        let view = self.with_ctx(|ctx| ctx.merged_view(&range))?;
        Ok(Box::new(SnapshotCursor::new(
            view,
            range,
            &self.inner.cursors,
        )))
    }
}

impl EngineTransaction for LogTransaction {
    fn as_kv(&self) -> &dyn KvCore {
        self
    }

    fn commit(&self) -> Result<()> {
        let mut ctx = self.ctx.lock();
        self.inner
            .manager
            .commit(&mut ctx, &self.inner.store)
            .map(|_| ())
    }

    fn discard(&self) -> Result<()> {
        self.inner.manager.ensure_open()?;
        let mut ctx = self.ctx.lock();
        self.inner.manager.abort(&mut ctx, "discarded")
    }

    fn is_active(&self) -> bool {
        !self.inner.manager.is_closed() && self.ctx.lock().is_active()
    }
}

impl Drop for LogTransaction {
    fn drop(&mut self) {
        let ctx = self.ctx.get_mut();
        if ctx.is_active() && ctx.mark_aborted("dropped").is_ok() {
            debug!(txn_id = ctx.txn_id, "Unfinished transaction discarded on drop");
        }
    }
}
