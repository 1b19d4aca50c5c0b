//! Parameter selection policies

use std::fmt;
use std::sync::Arc;

use paramdup_ast::{MethodDecl, Parameter};
use serde::{Deserialize, Serialize};

/// Which declarations qualify for duplication, and which of their
/// parameters are duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Declarations with exactly one parameter; that parameter is duplicated.
    #[default]
    ExactlyOne,
    /// Declarations with at least one parameter; every parameter is
    /// duplicated in declared order.
    All,
}

impl SelectionPolicy {
    pub fn qualifies(self, method: &MethodDecl) -> bool {
        match self {
            SelectionPolicy::ExactlyOne => method.param_count() == 1,
            SelectionPolicy::All => method.param_count() >= 1,
        }
    }

    /// Parameters to duplicate, in declared order. Empty when the
    /// declaration does not qualify.
    pub fn selected(self, method: &MethodDecl) -> &[Arc<Parameter>] {
        if self.qualifies(method) {
            &method.params
        } else {
            &[]
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::ExactlyOne => write!(f, "exactly-one"),
            SelectionPolicy::All => write!(f, "all"),
        }
    }
}
