//! paramdup AST - syntax tree for C# source files
//!
//! This crate defines the tree produced by the parser, the persistent
//! [`SourceTree`] wrapper with whole-subtree replacement, node tracking
//! across tree versions, and the canonical printer.

mod span;
mod types;
mod stmt;
mod decl;
mod tree;
mod query;
mod tracker;
pub mod printer;

pub use span::*;
pub use types::*;
pub use stmt::*;
pub use decl::*;
pub use tree::*;
pub use tracker::*;
pub use printer::{render, ToSource};
