//! Error types for batch runs

use std::io;
use std::path::{Path, PathBuf};

use paramdup_parser::ParseError;
use paramdup_rewrite::TransformError;
use thiserror::Error;

/// Problems with the run itself, raised before any file is touched
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("input root is not a directory: {0}")]
    InputNotDirectory(PathBuf),

    #[error("output root is not a directory: {0}")]
    OutputNotDirectory(PathBuf),

    #[error("input and output roots are the same directory: {0}")]
    SameRoots(PathBuf),

    #[error("cannot resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// A failure confined to one file. Recorded and logged, never fatal.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("failed to transform {path}: {source}")]
    Transform {
        path: PathBuf,
        #[source]
        source: TransformError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// The file the failure belongs to
    pub fn path(&self) -> &Path {
        match self {
            FileError::Read { path, .. }
            | FileError::Parse { path, .. }
            | FileError::Transform { path, .. }
            | FileError::Write { path, .. } => path,
        }
    }

    /// Split parse failures out of the transformer's error so they are
    /// reported as such.
    pub(crate) fn from_transform(path: PathBuf, err: TransformError) -> Self {
        match err {
            TransformError::Parse(source) => FileError::Parse { path, source },
            source => FileError::Transform { path, source },
        }
    }
}
