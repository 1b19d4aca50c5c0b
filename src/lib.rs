//! paramdup - structural parameter duplication for C# source trees
//!
//! This is the root workspace crate that hosts the integration tests.
//! The implementation lives in the workspace member crates.

// Re-export main crates for convenience
pub use paramdup_ast as ast;
pub use paramdup_batch as batch;
pub use paramdup_lexer as lexer;
pub use paramdup_parser as parser;
pub use paramdup_rewrite as rewrite;

pub use paramdup_batch::{run, BatchConfig, ExecutionMode, RunMetrics};
pub use paramdup_rewrite::{transform_source, SelectionPolicy, Transformed};
