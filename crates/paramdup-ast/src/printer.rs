//! Canonical text printer for source trees
//!
//! Serializes a tree back to C# text with four-space indentation and braces
//! on their own lines. Original whitespace is not reproduced: spacing between
//! lexemes is derived from the lexemes themselves, so printing the result of
//! parsing printed text gives the same text again.

use crate::{
    AttributeList, Block, CompilationUnit, Item, ItemKind, Lexeme, LexemeKind, MethodBody,
    MethodDecl, NamespaceDecl, OtherDecl, Parameter, SourceTree, Stmt, Trivia, TypeDecl, TypeExpr,
};

/// Trait for converting tree nodes to canonical source text.
pub trait ToSource {
    /// Convert to canonical text at the given indentation level.
    fn to_source(&self, indent: usize) -> String;
}

/// Helper to generate indentation string (four spaces per level).
fn indent_str(level: usize) -> String {
    "    ".repeat(level)
}

/// Render a whole tree. The output always ends with a newline.
pub fn render(tree: &SourceTree) -> String {
    tree.unit().to_source(0)
}

impl SourceTree {
    pub fn render(&self) -> String {
        render(self)
    }
}

// ===== Compilation unit and items =====

impl ToSource for CompilationUnit {
    fn to_source(&self, indent: usize) -> String {
        let mut out = render_items(&self.items, indent);
        if !self.trailing.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&render_trivia(&self.trailing, indent));
        }
        out
    }
}

fn render_items(items: &[std::sync::Arc<Item>], indent: usize) -> String {
    let mut out = String::new();
    let mut previous: Option<&Item> = None;
    for item in items {
        if let Some(prev) = previous {
            if !(is_compact(prev) && is_compact(item)) {
                out.push('\n');
            }
        }
        out.push_str(&item.to_source(indent));
        previous = Some(item);
    }
    out
}

/// Single-line members (fields, `using` directives) are not separated by
/// blank lines from each other.
fn is_compact(item: &Item) -> bool {
    item.leading.is_empty()
        && item.attributes.is_empty()
        && match &item.kind {
            ItemKind::Other(other) => match other.statements.as_slice() {
                [Stmt::Line(lexemes)] => !lexemes.iter().any(Lexeme::ends_line),
                _ => false,
            },
            _ => false,
        }
}

impl ToSource for Item {
    fn to_source(&self, indent: usize) -> String {
        let mut out = render_trivia(&self.leading, indent);
        for attr in &self.attributes {
            out.push_str(&indent_str(indent));
            out.push_str(&attr.to_source(indent));
            out.push('\n');
        }
        let body = match &self.kind {
            ItemKind::Namespace(ns) => ns.to_source(indent),
            ItemKind::Type(ty) => ty.to_source(indent),
            ItemKind::Method(method) => method.to_source(indent),
            ItemKind::Other(other) => other.to_source(indent),
        };
        out.push_str(&body);
        out
    }
}

impl ToSource for AttributeList {
    fn to_source(&self, indent: usize) -> String {
        join_lexemes(&self.lexemes, indent)
    }
}

impl ToSource for NamespaceDecl {
    fn to_source(&self, indent: usize) -> String {
        let ind = indent_str(indent);
        if self.file_scoped {
            let mut out = format!("{}namespace {};\n", ind, self.name);
            if !self.items.is_empty() {
                out.push('\n');
                out.push_str(&render_items(&self.items, indent));
            }
            if !self.trailing.is_empty() {
                out.push('\n');
                out.push_str(&render_trivia(&self.trailing, indent));
            }
            return out;
        }

        let mut out = format!("{}namespace {}\n{}{{\n", ind, self.name, ind);
        out.push_str(&render_container_body(&self.items, &self.trailing, indent + 1));
        out.push_str(&format!("{}}}\n", ind));
        out
    }
}

impl ToSource for TypeDecl {
    fn to_source(&self, indent: usize) -> String {
        let ind = indent_str(indent);
        if !self.has_body {
            return format!("{}{};\n", ind, join_inline(&self.header, indent));
        }
        let header = join_lexemes(&self.header, indent);

        let mut out = format!("{}{}\n{}{{\n", ind, header, ind);
        out.push_str(&render_container_body(&self.members, &self.trailing, indent + 1));
        out.push_str(&ind);
        out.push('}');
        if self.semicolon {
            out.push(';');
        }
        out.push('\n');
        out
    }
}

fn render_container_body(items: &[std::sync::Arc<Item>], trailing: &[Trivia], indent: usize) -> String {
    let mut out = render_items(items, indent);
    if !trailing.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&render_trivia(trailing, indent));
    }
    out
}

impl ToSource for MethodDecl {
    fn to_source(&self, indent: usize) -> String {
        let ind = indent_str(indent);
        let mut signature = String::new();
        for modifier in &self.modifiers {
            signature.push_str(modifier);
            signature.push(' ');
        }
        signature.push_str(&self.return_type.to_source(indent));
        signature.push(' ');
        signature.push_str(&self.name);
        if !self.type_params.is_empty() {
            signature.push('<');
            signature.push_str(&join_inline(&self.type_params, indent));
            signature.push('>');
        }
        signature.push('(');
        let params: Vec<String> = self.params.iter().map(|p| p.to_source(indent)).collect();
        signature.push_str(&params.join(", "));
        signature.push(')');
        if !self.constraints.is_empty() {
            signature.push(' ');
            signature.push_str(&join_inline(&self.constraints, indent));
        }

        match &self.body {
            MethodBody::Block(block) => {
                format!("{}{}\n{}\n", ind, signature, block.to_source(indent))
            }
            MethodBody::Expression(expr) => {
                format!("{}{} => {};\n", ind, signature, join_inline(expr, indent))
            }
            MethodBody::None => format!("{}{};\n", ind, signature),
        }
    }
}

impl ToSource for Parameter {
    fn to_source(&self, indent: usize) -> String {
        let mut out = String::new();
        for attr in &self.attributes {
            out.push_str(&join_inline(&attr.lexemes, indent));
            out.push(' ');
        }
        for modifier in &self.modifiers {
            out.push_str(modifier.as_str());
            out.push(' ');
        }
        out.push_str(&self.ty.to_source(indent));
        out.push(' ');
        out.push_str(&self.name);
        if let Some(default) = &self.default {
            out.push_str(" = ");
            out.push_str(&join_inline(default, indent));
        }
        out
    }
}

impl ToSource for TypeExpr {
    fn to_source(&self, indent: usize) -> String {
        match self {
            TypeExpr::Named(name) => {
                let mut out = String::new();
                for (i, segment) in name.segments.iter().enumerate() {
                    if i > 0 {
                        out.push_str(if segment.alias_qualified { "::" } else { "." });
                    }
                    out.push_str(&segment.name);
                    if !segment.args.is_empty() {
                        let args: Vec<String> =
                            segment.args.iter().map(|a| a.to_source(indent)).collect();
                        out.push('<');
                        out.push_str(&args.join(", "));
                        out.push('>');
                    }
                }
                out
            }
            TypeExpr::Tuple(elements) => {
                let parts: Vec<String> = elements
                    .iter()
                    .map(|e| match &e.name {
                        Some(name) => format!("{} {}", e.ty.to_source(indent), name),
                        None => e.ty.to_source(indent),
                    })
                    .collect();
                format!("({})", parts.join(", "))
            }
            TypeExpr::Array { element, rank } => {
                format!("{}[{}]", element.to_source(indent), ",".repeat(rank.saturating_sub(1)))
            }
            TypeExpr::Nullable(inner) => format!("{}?", inner.to_source(indent)),
            TypeExpr::Pointer(inner) => format!("{}*", inner.to_source(indent)),
        }
    }
}

impl ToSource for OtherDecl {
    fn to_source(&self, indent: usize) -> String {
        render_statements(&self.statements, indent)
    }
}

// ===== Blocks and statements =====

impl ToSource for Block {
    /// Renders `{ ... }` without a trailing newline so callers can attach
    /// `;`, `)` or `,` to the closing brace.
    fn to_source(&self, indent: usize) -> String {
        let ind = indent_str(indent);
        let mut out = format!("{}{{\n", ind);
        out.push_str(&render_statements(&self.statements, indent + 1));
        out.push_str(&ind);
        out.push('}');
        out
    }
}

fn render_statements(statements: &[Stmt], indent: usize) -> String {
    let mut out = String::new();
    let mut after_block = false;
    for stmt in statements {
        match stmt {
            Stmt::Block(block) => {
                if after_block {
                    out.push('\n');
                }
                out.push_str(&block.to_source(indent));
                after_block = true;
            }
            Stmt::Line(lexemes) => {
                let attaches = after_block
                    && lexemes
                        .first()
                        .is_some_and(|l| l.kind == LexemeKind::Punct && matches!(l.text.as_str(), ";" | ")" | ","));
                if attaches {
                    out.push_str(&join_lexemes(lexemes, indent));
                } else {
                    if after_block {
                        out.push('\n');
                    }
                    out.push_str(&indent_str(indent));
                    out.push_str(&join_lexemes(lexemes, indent));
                }
                out.push('\n');
                after_block = false;
            }
        }
    }
    if after_block {
        out.push('\n');
    }
    out
}

fn render_trivia(trivia: &[Trivia], indent: usize) -> String {
    let ind = indent_str(indent);
    trivia
        .iter()
        .map(|t| format!("{}{}\n", ind, t.text()))
        .collect()
}

// ===== Lexeme spacing =====

/// Like [`join_lexemes`], but text appended afterwards never lands inside a
/// trailing line comment.
fn join_inline(lexemes: &[Lexeme], indent: usize) -> String {
    let mut out = join_lexemes(lexemes, indent);
    if lexemes.last().is_some_and(Lexeme::ends_line) {
        out.push('\n');
        out.push_str(&indent_str(indent + 1));
    }
    out
}

/// Join lexemes on one logical line. Line comments and directives force a
/// line break, continued one level deeper.
pub fn join_lexemes(lexemes: &[Lexeme], indent: usize) -> String {
    let angles = generic_angles(lexemes);
    let mut out = String::new();
    let mut line_start = true;

    for (i, lexeme) in lexemes.iter().enumerate() {
        if lexeme.kind == LexemeKind::Directive && !line_start {
            out.push('\n');
            line_start = true;
        }
        if line_start {
            if i > 0 {
                out.push_str(&indent_str(indent + 1));
            }
        } else if needs_space(lexemes, &angles, i) {
            out.push(' ');
        }
        out.push_str(&lexeme.text);
        line_start = false;

        if lexeme.ends_line() && i + 1 < lexemes.len() {
            out.push('\n');
            line_start = true;
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Angle {
    None,
    Open,
    Close,
}

/// Mark `<` and `>` lexemes that delimit type arguments: `List<int>`.
///
/// A `<` directly after an identifier opens type arguments when its matching
/// `>` is reached through type-like lexemes only.
fn generic_angles(lexemes: &[Lexeme]) -> Vec<Angle> {
    let mut angles = vec![Angle::None; lexemes.len()];
    let mut i = 0;
    while i < lexemes.len() {
        let opens = lexemes[i].is("<")
            && lexemes[i].glued
            && i > 0
            && lexemes[i - 1].kind == LexemeKind::Ident;
        if !opens {
            i += 1;
            continue;
        }

        let mut depth = 0usize;
        let mut stack = Vec::new();
        let mut closed_at = None;
        for (j, lexeme) in lexemes.iter().enumerate().skip(i) {
            match lexeme.text.as_str() {
                "<" => {
                    depth += 1;
                    stack.push(j);
                }
                ">" => {
                    depth -= 1;
                    stack.push(j);
                    if depth == 0 {
                        closed_at = Some(j);
                        break;
                    }
                }
                "," | "." | "::" | "?" | "[" | "]" | "(" | ")" | "*" => {}
                _ if matches!(lexeme.kind, LexemeKind::Ident | LexemeKind::Keyword) => {}
                _ => break,
            }
        }

        match closed_at {
            Some(end) => {
                for j in stack {
                    angles[j] = if lexemes[j].is("<") { Angle::Open } else { Angle::Close };
                }
                i = end + 1;
            }
            None => i += 1,
        }
    }
    angles
}

const SPACED_KEYWORDS_BEFORE_PAREN: &[&str] = &[
    "if", "while", "for", "foreach", "switch", "catch", "using", "lock", "fixed", "return",
    "throw", "in", "is", "as", "else", "case",
];

fn is_operand_end(lexeme: &Lexeme, angle: Angle) -> bool {
    match lexeme.kind {
        LexemeKind::Ident | LexemeKind::Literal => true,
        LexemeKind::Keyword => matches!(lexeme.text.as_str(), "this" | "base" | "null" | "true" | "false"),
        LexemeKind::Punct => {
            matches!(lexeme.text.as_str(), ")" | "]" | "++" | "--") || angle == Angle::Close
        }
        _ => false,
    }
}

/// A `*` written against a type name and followed by a declarator or the
/// end of a type: `int* p`, `byte** pp`, `(int*)x`, `int*[]`.
fn is_pointer_star(lexemes: &[Lexeme], angles: &[Angle], i: usize) -> bool {
    let star = &lexemes[i];
    if !(star.kind == LexemeKind::Punct && star.is("*") && star.glued) || i == 0 {
        return false;
    }
    let prev = &lexemes[i - 1];
    let after_type = prev.kind == LexemeKind::Ident
        || angles[i - 1] == Angle::Close
        || is_pointer_star(lexemes, angles, i - 1);
    after_type
        && lexemes.get(i + 1).map_or(true, |next| {
            !next.glued || matches!(next.text.as_str(), "*" | ")" | "," | ">" | "[" | "]")
        })
}

fn needs_space(lexemes: &[Lexeme], angles: &[Angle], i: usize) -> bool {
    let prev = &lexemes[i - 1];
    let next = &lexemes[i];
    let prev_angle = angles[i - 1];
    let next_angle = angles[i];
    let p = prev.text.as_str();
    let n = next.text.as_str();

    if prev.kind == LexemeKind::Punct || next.kind == LexemeKind::Punct {
        // Type argument delimiters hug their contents
        if next_angle != Angle::None || prev_angle == Angle::Open {
            return false;
        }
        if prev_angle == Angle::Close {
            return !matches!(n, "(" | ")" | "]" | "," | ";" | "." | "[" | "?" | "::" | "?." | ">");
        }

        if is_pointer_star(lexemes, angles, i) {
            return false;
        }
        if n == "[" && is_pointer_star(lexemes, angles, i - 1) {
            return false;
        }

        match n {
            "," | ";" | ")" | "]" | "." | "?." | "::" | "->" => return false,
            "(" => {
                return match prev.kind {
                    LexemeKind::Ident => false,
                    LexemeKind::Keyword => SPACED_KEYWORDS_BEFORE_PAREN.contains(&p),
                    _ => !matches!(p, ")" | "]" | "(" | "[" | "." | "?." | "!" | "~"),
                };
            }
            "[" => return !is_operand_end(prev, prev_angle),
            "?" if next.glued => return false,
            "!" if next.glued && is_operand_end(prev, prev_angle) => return false,
            ":" if next.glued => return false,
            "++" | "--" if next.glued => return false,
            ">" | "=" if p == ">" && next.glued => return false,
            _ => {}
        }

        match p {
            "(" | "[" | "." | "?." | "::" | "->" => return false,
            "++" | "--" if next.glued => return false,
            "!" | "~" if next.glued => return false,
            "-" | "+" | "*" | "&" | "^" if next.glued => {
                let unary = i < 2 || !is_operand_end(&lexemes[i - 2], angles[i - 2]);
                if unary {
                    return false;
                }
            }
            _ => {}
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lex(parts: &[(&str, LexemeKind, bool)]) -> Vec<Lexeme> {
        parts
            .iter()
            .map(|(text, kind, glued)| Lexeme {
                kind: *kind,
                text: text.to_string(),
                glued: *glued,
            })
            .collect()
    }

    use LexemeKind::{Ident, Keyword, Literal, Punct};

    #[test]
    fn test_call_and_member_access() {
        let line = lex(&[
            ("Console", Ident, false),
            (".", Punct, true),
            ("WriteLine", Ident, true),
            ("(", Punct, true),
            ("x", Ident, false),
            (",", Punct, false),
            ("1", Literal, false),
            (")", Punct, true),
            (";", Punct, true),
        ]);
        assert_eq!(join_lexemes(&line, 0), "Console.WriteLine(x, 1);");
    }

    #[test]
    fn test_control_keyword_gets_space() {
        let line = lex(&[
            ("if", Keyword, false),
            ("(", Punct, true),
            ("a", Ident, true),
            ("==", Punct, false),
            ("b", Ident, false),
            (")", Punct, false),
        ]);
        assert_eq!(join_lexemes(&line, 0), "if (a == b)");
    }

    #[test]
    fn test_generic_arguments() {
        let line = lex(&[
            ("var", Ident, false),
            ("x", Ident, false),
            ("=", Punct, false),
            ("new", Keyword, false),
            ("List", Ident, false),
            ("<", Punct, true),
            ("Dictionary", Ident, true),
            ("<", Punct, true),
            ("string", Ident, true),
            (",", Punct, true),
            ("int", Ident, false),
            (">", Punct, true),
            (">", Punct, true),
            ("(", Punct, true),
            (")", Punct, true),
            (";", Punct, true),
        ]);
        assert_eq!(
            join_lexemes(&line, 0),
            "var x = new List<Dictionary<string, int>>();"
        );
    }

    #[test]
    fn test_comparison_is_not_generic() {
        let line = lex(&[
            ("a", Ident, false),
            ("<", Punct, false),
            ("b", Ident, false),
            ("&&", Punct, false),
            ("c", Ident, false),
            (">", Punct, false),
            ("=", Punct, true),
            ("d", Ident, false),
        ]);
        assert_eq!(join_lexemes(&line, 0), "a < b && c >= d");
    }

    #[test]
    fn test_unary_minus_and_postfix_increment() {
        let line = lex(&[
            ("x", Ident, false),
            ("=", Punct, false),
            ("-", Punct, false),
            ("1", Literal, true),
            ("-", Punct, false),
            ("y", Ident, true),
            (";", Punct, true),
            ("i", Ident, false),
            ("++", Punct, true),
        ]);
        assert_eq!(join_lexemes(&line, 0), "x = -1 - y; i++");
    }

    #[test]
    fn test_line_comment_breaks_line() {
        let line = lex(&[
            ("a", Ident, false),
            ("=", Punct, false),
            ("// why", LexemeKind::LineComment, false),
            ("b", Ident, false),
            (";", Punct, true),
        ]);
        assert_eq!(join_lexemes(&line, 1), "a = // why\n        b;");
    }

    #[test]
    fn test_pointer_declarations_hug_the_type() {
        let line = lex(&[
            ("int", Ident, false),
            ("*", Punct, true),
            ("q", Ident, false),
            ("=", Punct, false),
            ("&", Punct, false),
            ("x", Ident, true),
            (";", Punct, true),
        ]);
        assert_eq!(join_lexemes(&line, 0), "int* q = &x;");

        let line = lex(&[
            ("byte", Ident, false),
            ("*", Punct, true),
            ("*", Punct, true),
            ("pp", Ident, false),
            ("=", Punct, false),
            ("sizeof", Ident, false),
            ("(", Punct, true),
            ("byte", Ident, true),
            ("*", Punct, true),
            (")", Punct, true),
            (";", Punct, true),
        ]);
        assert_eq!(join_lexemes(&line, 0), "byte** pp = sizeof(byte*);");

        let line = lex(&[
            ("int", Ident, false),
            ("*", Punct, true),
            ("[", Punct, true),
            ("]", Punct, true),
            ("table", Ident, false),
            (";", Punct, true),
        ]);
        assert_eq!(join_lexemes(&line, 0), "int*[] table;");
    }

    #[test]
    fn test_multiplication_keeps_spaces() {
        let line = lex(&[
            ("c", Ident, false),
            ("=", Punct, false),
            ("a", Ident, false),
            ("*", Punct, false),
            ("b", Ident, false),
            ("*", Punct, true),
            ("d", Ident, true),
            (";", Punct, true),
        ]);
        assert_eq!(join_lexemes(&line, 0), "c = a * b * d;");
    }

    #[test]
    fn test_block_comment_stays_inline() {
        let line = lex(&[
            ("x", Ident, false),
            ("=", Punct, false),
            ("/* one */", LexemeKind::BlockComment, false),
            ("1", Literal, false),
            (";", Punct, true),
        ]);
        assert_eq!(join_lexemes(&line, 0), "x = /* one */ 1;");
    }
}
