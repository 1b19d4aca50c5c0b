//! Run-wide counters

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use paramdup_rewrite::FileMetrics;
use serde::{Deserialize, Serialize};

/// Totals for one batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    pub files_processed: usize,
    pub files_failed: usize,
    pub declarations_processed: usize,
    pub declarations_skipped: usize,
    pub parameters_duplicated: usize,
}

impl RunMetrics {
    pub fn files(&self) -> usize {
        self.files_processed + self.files_failed
    }

    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

impl fmt::Display for RunMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files processed:        {}", self.files_processed)?;
        writeln!(f, "Files failed:           {}", self.files_failed)?;
        writeln!(f, "Declarations processed: {}", self.declarations_processed)?;
        writeln!(f, "Declarations skipped:   {}", self.declarations_skipped)?;
        write!(f, "Parameters duplicated:  {}", self.parameters_duplicated)
    }
}

/// Shared between workers. Each file reports exactly once, either
/// [`file_succeeded`](Self::file_succeeded) or [`file_failed`](Self::file_failed).
#[derive(Debug, Default)]
pub struct MetricsCollector {
    files_processed: AtomicUsize,
    files_failed: AtomicUsize,
    declarations_processed: AtomicUsize,
    declarations_skipped: AtomicUsize,
    parameters_duplicated: AtomicUsize,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_succeeded(&self, file: &FileMetrics) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        self.declarations_processed
            .fetch_add(file.declarations_processed, Ordering::Relaxed);
        self.declarations_skipped
            .fetch_add(file.declarations_skipped, Ordering::Relaxed);
        self.parameters_duplicated
            .fetch_add(file.parameters_duplicated, Ordering::Relaxed);
    }

    pub fn file_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the counters. Only meaningful once every worker has finished.
    pub fn snapshot(&self) -> RunMetrics {
        RunMetrics {
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            declarations_processed: self.declarations_processed.load(Ordering::Relaxed),
            declarations_skipped: self.declarations_skipped.load(Ordering::Relaxed),
            parameters_duplicated: self.parameters_duplicated.load(Ordering::Relaxed),
        }
    }
}
