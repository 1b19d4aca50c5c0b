//! paramdup batch - directory-level driver for the duplication pass
//!
//! Walks an input tree, runs every matching file through
//! [`transform_source`] and mirrors the results under an output root. Files
//! are independent: a failure in one is logged and counted, and the run
//! carries on with the rest. Scheduling is either sequential or spread over
//! a dedicated rayon pool; the bytes written are the same either way.

mod config;
mod discover;
mod error;
mod metrics;

pub use config::*;
pub use discover::{discover, SourceFile};
pub use error::*;
pub use metrics::*;

use std::fs;
use std::path::{Path, PathBuf};

use paramdup_rewrite::{transform_source, FileMetrics, SelectionPolicy};
use rayon::prelude::*;
use tracing::{debug, error, info};

/// Run the pass over `config.input_root`.
///
/// Returns `Err` only for configuration problems, before any file is read.
/// Per-file failures are reflected in [`RunMetrics::files_failed`].
pub fn run(config: &BatchConfig) -> Result<RunMetrics, ConfigError> {
    let (input_root, output_root) = resolve_roots(config)?;

    let pool = match config.mode {
        ExecutionMode::Sequential => None,
        ExecutionMode::Concurrent { workers } => Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(workers.max(1))
                .thread_name(|i| format!("paramdup-worker-{}", i))
                .build()?,
        ),
    };

    let files = discover(config, &input_root, &output_root);
    info!(
        files = files.len(),
        policy = %config.policy,
        mode = ?config.mode,
        "processing {}",
        input_root.display()
    );

    let collector = MetricsCollector::new();
    let handle = |file: &SourceFile| match process_file(file, &output_root, config.policy) {
        Ok(file_metrics) => collector.file_succeeded(&file_metrics),
        Err(e) => {
            error!(path = %e.path().display(), "{}", e);
            collector.file_failed();
        }
    };

    match pool {
        None => files.iter().for_each(handle),
        Some(pool) => pool.install(|| files.par_iter().for_each(handle)),
    }

    let metrics = collector.snapshot();
    info!(
        processed = metrics.files_processed,
        failed = metrics.files_failed,
        duplicated = metrics.parameters_duplicated,
        "run finished"
    );
    Ok(metrics)
}

/// Read, transform and write one file. Nothing is written unless the
/// transformation succeeded.
pub fn process_file(
    file: &SourceFile,
    output_root: &Path,
    policy: SelectionPolicy,
) -> Result<FileMetrics, FileError> {
    let text = fs::read_to_string(&file.path).map_err(|source| FileError::Read {
        path: file.path.clone(),
        source,
    })?;

    let transformed = transform_source(Some(&file.path), &text, policy)
        .map_err(|e| FileError::from_transform(file.path.clone(), e))?;

    let target = file.target(output_root);
    let write_error = |source| FileError::Write {
        path: target.clone(),
        source,
    };
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(&target, transformed.text).map_err(write_error)?;

    debug!(
        processed = transformed.metrics.declarations_processed,
        skipped = transformed.metrics.declarations_skipped,
        "{}",
        file.relative.display()
    );
    info!("file: {}", target.display());
    Ok(transformed.metrics)
}

fn resolve_roots(config: &BatchConfig) -> Result<(PathBuf, PathBuf), ConfigError> {
    if !config.input_root.is_dir() {
        return Err(ConfigError::InputNotDirectory(config.input_root.clone()));
    }
    if !config.output_root.is_dir() {
        return Err(ConfigError::OutputNotDirectory(config.output_root.clone()));
    }

    let canonical = |path: &PathBuf| {
        path.canonicalize().map_err(|source| ConfigError::Resolve {
            path: path.clone(),
            source,
        })
    };
    let input_root = canonical(&config.input_root)?;
    let output_root = canonical(&config.output_root)?;
    if input_root == output_root {
        return Err(ConfigError::SameRoots(input_root));
    }
    Ok((input_root, output_root))
}
