//! Statement-level nodes: token lines, blocks and trivia
//!
//! Bodies are kept structurally (lines and nested blocks) rather than as a
//! full expression tree. Lines carry their lexemes so the printer can lay
//! them out canonically.

use serde::{Deserialize, Serialize};

use crate::Span;

/// Classification of a lexeme, used for canonical spacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LexemeKind {
    Ident,
    Keyword,
    Literal,
    Punct,
    LineComment,
    BlockComment,
    Directive,
}

/// A token as stored in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexeme {
    pub kind: LexemeKind,
    pub text: String,
    /// No whitespace separated this lexeme from the previous one.
    pub glued: bool,
}

impl Lexeme {
    pub fn new(kind: LexemeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            glued: false,
        }
    }

    pub fn punct(text: impl Into<String>) -> Self {
        Self::new(LexemeKind::Punct, text)
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, LexemeKind::LineComment | LexemeKind::BlockComment)
    }

    /// Must be followed by a line break when printed
    pub fn ends_line(&self) -> bool {
        matches!(self.kind, LexemeKind::LineComment | LexemeKind::Directive)
    }
}

/// Comments and preprocessor directives attached before a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trivia {
    /// `// ...` (also `///` doc comments)
    LineComment(String),
    /// `/* ... */`
    BlockComment(String),
    /// `#region`, `#if`, ...
    Directive(String),
}

impl Trivia {
    pub fn text(&self) -> &str {
        match self {
            Trivia::LineComment(text) | Trivia::BlockComment(text) | Trivia::Directive(text) => {
                text
            }
        }
    }
}

/// A `{ ... }` block of statements
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// A statement inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    /// A run of lexemes ending at `;` or before a brace: `return x;`, `if (a)`
    Line(Vec<Lexeme>),

    /// A nested block
    Block(Block),
}

impl Block {
    pub fn empty() -> Self {
        Self::default()
    }
}

impl Stmt {
    pub fn first_lexeme(&self) -> Option<&Lexeme> {
        match self {
            Stmt::Line(lexemes) => lexemes.first(),
            Stmt::Block(_) => None,
        }
    }
}
