//! Input file discovery

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::BatchConfig;

/// A matching input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path below the input root, mirrored under the output root
    pub relative: PathBuf,
}

impl SourceFile {
    pub fn target(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.relative)
    }
}

/// Every file under `input_root` with the configured extension, in sorted
/// order. Nothing below `output_root` is visited.
pub fn discover(config: &BatchConfig, input_root: &Path, output_root: &Path) -> Vec<SourceFile> {
    WalkDir::new(input_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !entry.path().starts_with(output_root))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && config.matches(entry.path()))
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(input_root).ok()?.to_path_buf();
            Some(SourceFile {
                path: entry.into_path(),
                relative,
            })
        })
        .collect()
}
