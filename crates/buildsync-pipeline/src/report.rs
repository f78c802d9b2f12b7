use std::fmt;
use std::time::Duration;

use buildsync_fetch::ItemId;
use buildsync_verify::ContentHash;

use crate::error::ErrorKind;

/// How one item settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Written(ContentHash),
    UpToDate(ContentHash),
    Discarded(ContentHash),
    /// `kind` is `None` when the item's task panicked.
    Failed {
        attempts: u32,
        kind:     Option<ErrorKind>,
        message:  String,
    },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub id:       ItemId,
    pub attempts: u32,
    /// `None` when the item's task panicked.
    pub kind:     Option<ErrorKind>,
    pub message:  String,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub written:          u64,
    pub up_to_date:       u64,
    pub cancelled:        u64,
    /// Items that matched a sentinel, ascending.
    pub discarded:        Vec<ItemId>,
    /// Items abandoned after their last attempt, ascending.
    pub failed:           Vec<FailedItem>,
    /// Entries in the flushed manifest.
    pub manifest_entries: usize,
    pub elapsed:          Duration,
}

impl RunReport {
    pub(crate) fn record(&mut self, id: ItemId, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Written(_) => self.written += 1,
            ItemOutcome::UpToDate(_) => self.up_to_date += 1,
            ItemOutcome::Discarded(_) => self.discarded.push(id),
            ItemOutcome::Failed {
                attempts,
                kind,
                message,
            } => self.failed.push(FailedItem {
                id,
                attempts,
                kind,
                message,
            }),
            ItemOutcome::Cancelled => self.cancelled += 1,
        }
    }

    pub(crate) fn finish(&mut self, manifest_entries: usize, elapsed: Duration) {
        self.discarded.sort_unstable();
        self.failed.sort_unstable_by_key(|f| f.id);
        self.manifest_entries = manifest_entries;
        self.elapsed = elapsed;
    }

    /// Items that settled one way or another.
    pub fn total(&self) -> u64 {
        self.written
            + self.up_to_date
            + self.cancelled
            + self.discarded.len() as u64
            + self.failed.len() as u64
    }

    /// Whether a downstream publish step should run.
    pub fn publish_requested(&self) -> bool { !self.discarded.is_empty() }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items in {:.1?}: {} written, {} up to date, {} discarded, {} failed, {} cancelled",
            self.total(),
            self.elapsed,
            self.written,
            self.up_to_date,
            self.discarded.len(),
            self.failed.len(),
            self.cancelled
        )
    }
}
