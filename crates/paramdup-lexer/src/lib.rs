//! paramdup lexer - C# tokenization using logos
//!
//! Comments and preprocessor directives are tokens rather than skipped
//! whitespace, since the rewriter reproduces them. `>` is never combined
//! with a following `>` or `=`; each token records whether it touched the
//! previous one so the printer can restore `>>` and `>=`.

mod token;

pub use token::*;

use logos::Logos;
use paramdup_ast::{Lexeme, Span};

/// Tokenize a source string into a vector of tokens, ending with `Eof`
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut previous_end = None;

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        let kind = match result {
            Ok(kind) => kind,
            Err(_) => TokenKind::Error,
        };
        let glued = previous_end == Some(span.start);
        previous_end = Some(span.end);
        tokens.push(Token { kind, span, glued });
    }

    // Add EOF token
    let end = source.len();
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
        glued: false,
    });

    tokens
}

/// A token with its span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Directly follows the previous token with no whitespace in between
    pub glued: bool,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }

    /// The token as stored in the tree. Comment and directive text loses
    /// trailing whitespace, including the `\r` of CRLF line endings.
    pub fn lexeme(&self, source: &str) -> Lexeme {
        let text = self.text(source);
        let text = if self.kind.is_trivia() { text.trim_end() } else { text };
        Lexeme {
            kind: self.kind.lexeme_kind(),
            text: text.to_string(),
            glued: self.glued,
        }
    }
}
