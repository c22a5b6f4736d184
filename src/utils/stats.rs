//! stats.rs
//! Contention-free acquisition counters.
//!
//! The acquirer is the only writer; any thread may read a snapshot. Counters are
//! independent, so a snapshot carries no cross-counter ordering guarantee.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct AcquisitionStats {
    lines_read: AtomicU64,
    read_timeouts: AtomicU64,
    empty_lines: AtomicU64,
    published: AtomicU64,
    dropped: AtomicU64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub lines_read: u64,
    pub read_timeouts: u64,
    pub empty_lines: u64,
    pub published: u64,
    pub dropped: u64,
}

impl AcquisitionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A raw line (or a synthesized vector) arrived.
    pub fn record_line(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.read_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Line without any numeric token.
    pub fn record_empty(&self) {
        self.empty_lines.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    /// Sink refused the vector.
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            read_timeouts: self.read_timeouts.load(Ordering::Relaxed),
            empty_lines: self.empty_lines.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}
