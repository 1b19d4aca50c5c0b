//! paramdup rewrite - the parameter-duplication transformation
//!
//! This crate provides the duplication rule, the selection policies that
//! decide which declarations it applies to, and the per-file pipeline that
//! parses a file, rewrites its declarations through the node tracker and
//! renders the result.
//!
//! # Usage
//!
//! ```ignore
//! use paramdup_rewrite::{transform_source, SelectionPolicy};
//!
//! let out = transform_source(None, "void f(int x) {}", SelectionPolicy::ExactlyOne)?;
//! assert!(out.text.contains("int x_duplicate"));
//! ```

mod error;
mod metrics;
mod policy;
pub mod rule;
pub mod transformer;

pub use error::*;
pub use metrics::*;
pub use policy::*;
pub use rule::{apply, duplicate_name, Duplication, ParamDuplication, RewriteRule, DUPLICATE_SUFFIX, MARKER_COMMENT};
pub use transformer::{rewrite, rewrite_with, transform, transform_source, Transformed};
