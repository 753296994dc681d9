//! Narrowing a selection down to the paths a lock operation should act on.
//!
//! Each selected path is expanded to the known status records of the path
//! and its metadata companion. A record is kept when it is versioned and has
//! something non-trivial about it (a change or a lock). Release-locks further
//! requires an actual lock.
//!
//! A selected path that contributes nothing is still kept for get-locks, as
//! the user picked it explicitly. When no selected path contributes anything,
//! get-locks falls back to the raw selection with companions. Release-locks
//! never guesses.

use tracing::debug;

use crate::models::{FileStatus, StatusData};
use crate::selection::Selection;
use crate::status_cache::StatusCache;

/// Result of partitioning a selection for a lock operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockBatch {
    /// Nothing was selected. Trivially done.
    Empty,
    /// Every selected path is a directory; sent through unfiltered.
    PassThrough(Vec<String>),
    /// The lock-relevant paths.
    Filtered(Vec<String>),
    /// Get-locks only: no selected path had a lock-relevant record, so the
    /// raw selection is sent with its companions.
    RawFallback(Vec<String>),
    /// No path qualified. Callers must stay silent.
    NothingToDo,
}

impl LockBatch {
    /// Paths to hand to the operation; empty unless the batch is dispatchable.
    pub fn paths(&self) -> &[String] {
        match self {
            Self::PassThrough(paths) | Self::Filtered(paths) | Self::RawFallback(paths) => paths,
            Self::Empty | Self::NothingToDo => &[],
        }
    }

    /// `true` unless there was nothing to do.
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::NothingToDo)
    }

    /// Whether the client should expand companions for these paths.
    pub fn include_meta(&self) -> bool {
        matches!(self, Self::RawFallback(_))
    }
}

/// `true` if `status` should take part in a lock batch.
pub fn is_lock_relevant(status: &StatusData, only_locked: bool) -> bool {
    if status.status == FileStatus::Unversioned {
        return false;
    }
    if status.status == FileStatus::Normal && !status.lock_status.is_locked() {
        return false;
    }
    !only_locked || status.lock_status.is_locked()
}

/// Partition `selection` for get-locks (`only_locked = false`) or
/// release-locks (`only_locked = true`).
pub fn partition(selection: &Selection, cache: &dyn StatusCache, only_locked: bool) -> LockBatch {
    if selection.is_empty() {
        return LockBatch::Empty;
    }

    if selection.iter().all(|p| cache.is_directory(p)) {
        return LockBatch::PassThrough(selection.paths().to_vec());
    }

    let mut batch: Vec<String> = Vec::new();
    let mut any_relevant = false;
    let mut push = |path: String| {
        if !batch.contains(&path) {
            batch.push(path);
        }
    };

    for path in selection.iter() {
        let relevant: Vec<String> = cache
            .get_all_known_status_data(path, false, true, true)
            .into_iter()
            .filter(|sd| is_lock_relevant(sd, only_locked))
            .map(|sd| sd.path)
            .collect();

        if relevant.is_empty() {
            if !only_locked {
                push(path.to_string());
            }
            continue;
        }

        any_relevant = true;
        for p in relevant {
            push(p);
        }
    }

    debug!(only_locked, any_relevant, count = batch.len(), "lock batch partitioned");

    if any_relevant {
        LockBatch::Filtered(batch)
    } else if only_locked {
        LockBatch::NothingToDo
    } else {
        LockBatch::RawFallback(selection.paths().to_vec())
    }
}

/// Partition `selection` and hand a dispatchable batch to `handler`,
/// along with its `include_meta` flag. Returns `false` when there was
/// nothing to do.
pub fn run_lock_batch<F>(
    selection: &Selection,
    cache: &dyn StatusCache,
    only_locked: bool,
    handler: F,
) -> bool
where
    F: FnOnce(&[String], bool),
{
    let batch = partition(selection, cache, only_locked);
    if !batch.paths().is_empty() {
        handler(batch.paths(), batch.include_meta());
    }
    batch.is_handled()
}
