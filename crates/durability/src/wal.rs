//! WAL file operations
//!
//! The log lives in a single append-only file, `wal.log`, inside the store
//! directory. Opening the log replays every intact entry through a caller
//! supplied function before any new entry can be appended.
//!
//! A `LOCK` file next to the log carries an exclusive advisory lock for as
//! long as the [`Wal`] is alive. A second open of the same directory fails
//! with [`Error::Locked`].
//!
//! ## Recovery Rules
//!
//! - A frame whose verified header announces more bytes than the file holds
//!   is a torn write: the tail is truncated and a warning is logged.
//! - A frame with an intact header and a bad payload checksum that is the
//!   last frame in the file is treated the same way.
//! - A bad header checksum, or a bad payload checksum followed by more
//!   data, is real corruption: opening fails.
//!
//! After recovery the log is always a prefix of the appended history.

use crate::encoding::{decode_entry, decode_header, encode_entry, FRAME_HEADER_SIZE};
use crate::entry::WalEntry;
use crate::mode::DurabilityMode;
use fs2::FileExt;
use ledgerstore_core::{Error, Result, Version};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Name of the log file inside the store directory.
pub const WAL_FILENAME: &str = "wal.log";

/// Name of the lock file inside the store directory.
pub const LOCK_FILENAME: &str = "LOCK";

/// Outcome of replaying a log on open.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayStats {
    /// Entries replayed
    pub entries: u64,
    /// Direct-write entries among them
    pub batches: u64,
    /// Transaction commits among them
    pub commits: u64,
    /// Highest version seen
    pub final_version: Version,
    /// Highest transaction ID seen
    pub max_txn_id: u64,
    /// Bytes dropped from a torn tail
    pub truncated_bytes: u64,
}

impl ReplayStats {
    /// Human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "replayed {} entries ({} batches, {} commits), final version {}, {} bytes truncated",
            self.entries, self.batches, self.commits, self.final_version, self.truncated_bytes
        )
    }

    /// Check if recovery had to discard anything.
    pub fn has_issues(&self) -> bool {
        self.truncated_bytes > 0
    }
}

/// Append-only write-ahead log.
#[derive(Debug)]
pub struct Wal {
    path: PathBuf,
    file: File,
    // released when the file is closed
    _lock: File,
    mode: DurabilityMode,
    size: u64,
    unsynced: usize,
    last_sync: Instant,
}

impl Wal {
    /// Open (or create) the log in `dir`, replaying every intact entry.
    ///
    /// `apply` is called once per entry, in log order.
    pub fn open(
        dir: &Path,
        mode: DurabilityMode,
        mut apply: impl FnMut(&WalEntry),
    ) -> Result<(Wal, ReplayStats)> {
        fs::create_dir_all(dir)?;
        let lock = acquire_lock(dir)?;
        let path = dir.join(WAL_FILENAME);

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;

        let mut stats = ReplayStats::default();
        let mut pos = 0usize;

        while pos < buf.len() {
            match decode_entry(&buf[pos..], pos as u64) {
                Ok((entry, consumed)) => {
                    apply(&entry);
                    stats.entries += 1;
                    if entry.is_commit() {
                        stats.commits += 1;
                    } else {
                        stats.batches += 1;
                    }
                    stats.final_version = stats.final_version.max(entry.version());
                    if let Some(txn_id) = entry.txn_id() {
                        stats.max_txn_id = stats.max_txn_id.max(txn_id);
                    }
                    pos += consumed;
                }
                Err(Error::IncompleteEntry { .. }) => break,
                Err(Error::Corruption(msg)) => match decode_header(&buf[pos..], pos as u64) {
                    Ok(len) if pos + FRAME_HEADER_SIZE + len == buf.len() => break,
                    _ => return Err(Error::Corruption(msg)),
                },
                Err(e) => return Err(e),
            }
        }

        if pos < buf.len() {
            stats.truncated_bytes = (buf.len() - pos) as u64;
            warn!(
                path = %path.display(),
                offset = pos,
                truncated_bytes = stats.truncated_bytes,
                "Truncating torn WAL tail"
            );
            file.set_len(pos as u64)?;
            file.sync_all()?;
        }

        info!(path = %path.display(), "{}", stats.summary());

        let wal = Wal {
            path,
            file,
            _lock: lock,
            mode,
            size: pos as u64,
            unsynced: 0,
            last_sync: Instant::now(),
        };
        Ok((wal, stats))
    }

    /// Append one entry, fsyncing according to the durability mode.
    ///
    /// A failed write is rolled back to the previous end of the log so that
    /// later appends never follow a partial frame.
    pub fn append(&mut self, entry: &WalEntry) -> Result<()> {
        let frame = encode_entry(entry)?;

        if let Err(e) = self.file.write_all(&frame) {
            if let Err(rollback) = self.file.set_len(self.size) {
                warn!(error = %rollback, "Failed to roll back partial WAL frame");
            }
            return Err(e.into());
        }

        self.size += frame.len() as u64;
        self.unsynced += 1;

        if self.should_sync() {
            self.sync()?;
        }
        Ok(())
    }

    /// fsync any appended but unsynced entries.
    pub fn sync(&mut self) -> Result<()> {
        if self.unsynced > 0 {
            self.file.sync_data()?;
            debug!(entries = self.unsynced, "WAL synced");
        }
        self.unsynced = 0;
        self.last_sync = Instant::now();
        Ok(())
    }

    fn should_sync(&self) -> bool {
        match self.mode {
            DurabilityMode::NoSync => false,
            DurabilityMode::Strict => true,
            DurabilityMode::Batched {
                interval_ms,
                batch_size,
            } => {
                self.unsynced >= batch_size
                    || self.last_sync.elapsed() >= Duration::from_millis(interval_ms)
            }
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the log in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Durability mode in effect.
    pub fn mode(&self) -> DurabilityMode {
        self.mode
    }

    /// Entries appended since the last fsync.
    pub fn unsynced(&self) -> usize {
        self.unsynced
    }
}

fn acquire_lock(dir: &Path) -> Result<File> {
    let path = dir.join(LOCK_FILENAME);
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)?;

    if let Err(e) = file.try_lock_exclusive() {
        warn!(path = %path.display(), error = %e, "Store directory is locked");
        return Err(Error::Locked(format!("{}: {}", dir.display(), e)));
    }
    Ok(file)
}
