//! Per-file transformation counters

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// What one file's transformation did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileMetrics {
    /// Declarations that qualified and were rewritten
    pub declarations_processed: usize,
    /// Declarations left untouched
    pub declarations_skipped: usize,
    /// Parameters added across all rewritten declarations
    pub parameters_duplicated: usize,
}

impl FileMetrics {
    pub fn declarations(&self) -> usize {
        self.declarations_processed + self.declarations_skipped
    }
}

impl Add for FileMetrics {
    type Output = FileMetrics;

    fn add(self, other: FileMetrics) -> FileMetrics {
        FileMetrics {
            declarations_processed: self.declarations_processed + other.declarations_processed,
            declarations_skipped: self.declarations_skipped + other.declarations_skipped,
            parameters_duplicated: self.parameters_duplicated + other.parameters_duplicated,
        }
    }
}

impl AddAssign for FileMetrics {
    fn add_assign(&mut self, other: FileMetrics) {
        *self = *self + other;
    }
}
