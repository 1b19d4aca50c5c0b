//! Transformation error types

use paramdup_ast::TrackError;
use paramdup_parser::ParseError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("node tracking failed: {0}")]
    Track(#[from] TrackError),
}
