use paramdup::ast::SourceTree;

/// Parse `source`, failing the test with the parse error if it does not
pub fn assert_parses(source: &str) -> SourceTree {
    paramdup::parser::parse(source).unwrap_or_else(|e| panic!("Expected source to parse: {}\n{}", e, source))
}

/// Rendering the tree, reparsing and rendering again changes nothing
pub fn assert_idempotent(source: &str) {
    let first = assert_parses(source).render();
    let second = assert_parses(&first).render();
    pretty_assertions::assert_eq!(first, second, "render is not a fixed point");
}

/// Parameter counts of every method declaration, in document order
pub fn param_counts(tree: &SourceTree) -> Vec<usize> {
    tree.methods()
        .iter()
        .filter_map(|m| m.as_method())
        .map(|m| m.param_count())
        .collect()
}
