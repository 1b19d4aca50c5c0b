//! Per-file transformation pipeline
//!
//! Collects the method declarations of a tree, tracks the qualifying ones
//! against the original version, then rewrites them one at a time through
//! the tracker. Every replacement yields a new tree version; handles minted
//! up front keep resolving across all of them.

use std::path::Path;

use paramdup_ast::{track, NodeId, SourceTree};
use paramdup_parser::{parse, parse_file};
use tracing::{debug, trace};

use crate::{FileMetrics, ParamDuplication, RewriteRule, SelectionPolicy, TransformError};

/// Rendered output of one file and what it took to get there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub text: String,
    pub metrics: FileMetrics,
}

/// Apply parameter duplication under `policy`, returning the final tree.
pub fn rewrite(tree: &SourceTree, policy: SelectionPolicy) -> Result<(SourceTree, FileMetrics), TransformError> {
    rewrite_with(tree, &ParamDuplication::new(policy))
}

/// Apply `rule` to every method declaration of `tree`, in source order.
pub fn rewrite_with(
    tree: &SourceTree,
    rule: &dyn RewriteRule,
) -> Result<(SourceTree, FileMetrics), TransformError> {
    let mut metrics = FileMetrics::default();

    let mut qualifying: Vec<NodeId> = Vec::new();
    for node in tree.methods() {
        match node.as_method() {
            Some(method) if rule.qualifies(method) => qualifying.push(node.id()),
            _ => metrics.declarations_skipped += 1,
        }
    }

    let total = qualifying.len();
    let (mut tracked, handles) = track(tree.clone(), qualifying)?;

    for (index, handle) in handles.iter().enumerate() {
        let node = tracked.resolve(handle)?;
        if let Some(method) = node.as_method() {
            debug!(rule = rule.name(), "method {} of {}: {}", index + 1, total, method.name);
        }

        let rewritten = node.as_item().and_then(|item| rule.apply(item));
        match rewritten {
            Some(duplication) => {
                metrics.declarations_processed += 1;
                metrics.parameters_duplicated += duplication.duplicated;
                tracked = tracked.replace(handle, duplication.item)?;
            }
            None => metrics.declarations_skipped += 1,
        }
    }

    trace!(
        processed = metrics.declarations_processed,
        skipped = metrics.declarations_skipped,
        duplicated = metrics.parameters_duplicated,
        "tree rewritten"
    );
    Ok((tracked.into_tree(), metrics))
}

/// Rewrite `tree` and render the result.
pub fn transform(tree: &SourceTree, policy: SelectionPolicy) -> Result<Transformed, TransformError> {
    let (rewritten, metrics) = rewrite(tree, policy)?;
    Ok(Transformed {
        text: rewritten.render(),
        metrics,
    })
}

/// Parse, rewrite and render one file's text. Used unchanged by every
/// execution mode of the batch processor.
pub fn transform_source(
    path: Option<&Path>,
    text: &str,
    policy: SelectionPolicy,
) -> Result<Transformed, TransformError> {
    let tree = match path {
        Some(path) => parse_file(text, path)?,
        None => parse(text)?,
    };
    if let Some(path) = tree.path() {
        debug!(path = %path.display(), %policy, "transforming");
    }
    transform(&tree, policy)
}
