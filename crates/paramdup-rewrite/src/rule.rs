//! The parameter-duplication rule
//!
//! Appends a renamed copy of each selected parameter to a method's
//! parameter list and marks the method with a leading comment. The rule
//! only builds the replacement item; putting it into the tree is the
//! transformer's job.

use std::collections::HashSet;
use std::sync::Arc;

use paramdup_ast::{Item, ItemKind, MethodDecl, Trivia};

use crate::SelectionPolicy;

/// Appended to a parameter's name to name its copy
pub const DUPLICATE_SUFFIX: &str = "_duplicate";

/// Leading comment added to every rewritten declaration
pub const MARKER_COMMENT: &str = "// duplicated parameter added";

/// A rewritten declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplication {
    /// Replacement for the original item, keeping its id
    pub item: Item,
    /// Number of parameters added
    pub duplicated: usize,
}

/// A rewrite applied to one method declaration at a time
pub trait RewriteRule {
    fn name(&self) -> &'static str;

    /// Whether the rule rewrites this declaration
    fn qualifies(&self, method: &MethodDecl) -> bool;

    /// The rewritten declaration, or `None` when `item` is not a method or
    /// does not qualify.
    fn apply(&self, item: &Item) -> Option<Duplication>;
}

/// Duplicates the parameters selected by a [`SelectionPolicy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamDuplication {
    pub policy: SelectionPolicy,
}

impl ParamDuplication {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }
}

impl RewriteRule for ParamDuplication {
    fn name(&self) -> &'static str {
        "param-duplication"
    }

    fn qualifies(&self, method: &MethodDecl) -> bool {
        self.policy.qualifies(method)
    }

    fn apply(&self, item: &Item) -> Option<Duplication> {
        let method = item.as_method()?;
        let selected = self.policy.selected(method);
        if selected.is_empty() {
            return None;
        }

        // Copies are named against the original list and earlier copies;
        // they are never selected themselves.
        let mut taken: HashSet<String> = method.param_names().map(str::to_string).collect();
        let copies: Vec<_> = selected
            .iter()
            .map(|param| {
                let name = duplicate_name(&param.name, &taken);
                taken.insert(name.clone());
                Arc::new(param.renamed(name))
            })
            .collect();
        let duplicated = copies.len();

        let mut rewritten = item.clone();
        rewritten
            .leading
            .insert(0, Trivia::LineComment(MARKER_COMMENT.to_string()));
        if let ItemKind::Method(method) = &mut rewritten.kind {
            method.params.extend(copies);
        }

        Some(Duplication {
            item: rewritten,
            duplicated,
        })
    }
}

/// Duplicate `item` under `policy`.
pub fn apply(item: &Item, policy: SelectionPolicy) -> Option<Duplication> {
    ParamDuplication::new(policy).apply(item)
}

/// `<original>_duplicate`, or `<original>_duplicateN` with the smallest
/// `N >= 2` not in `taken`.
pub fn duplicate_name(original: &str, taken: &HashSet<String>) -> String {
    let base = format!("{}{}", original, DUPLICATE_SUFFIX);
    if !taken.contains(&base) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{}{}", base, n);
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
