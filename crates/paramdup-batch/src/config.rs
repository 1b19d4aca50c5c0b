//! Batch run configuration

use std::path::{Path, PathBuf};

use paramdup_rewrite::SelectionPolicy;
use serde::{Deserialize, Serialize};

/// Upper bound on the default worker count
pub const MAX_DEFAULT_WORKERS: usize = 8;

/// Extension of the files a run picks up, without the dot
pub const DEFAULT_EXTENSION: &str = "cs";

/// How files are scheduled. Per-file output does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// One file at a time, in sorted path order
    Sequential,
    /// A dedicated pool of `workers` threads
    Concurrent { workers: usize },
}

impl ExecutionMode {
    pub fn concurrent() -> Self {
        ExecutionMode::Concurrent {
            workers: default_workers(),
        }
    }
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::concurrent()
    }
}

/// Available parallelism, capped at [`MAX_DEFAULT_WORKERS`]
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_WORKERS)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub policy: SelectionPolicy,
    pub mode: ExecutionMode,
    pub extension: String,
}

impl BatchConfig {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            policy: SelectionPolicy::default(),
            mode: ExecutionMode::default(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for `with_mode(ExecutionMode::Concurrent { workers })`.
    /// A count of zero is raised to one.
    pub fn with_workers(self, workers: usize) -> Self {
        self.with_mode(ExecutionMode::Concurrent {
            workers: workers.max(1),
        })
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Whether `path` has the configured extension
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}
