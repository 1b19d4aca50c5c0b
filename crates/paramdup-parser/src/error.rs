//! Parser error types

use paramdup_ast::Span;
use paramdup_lexer::TokenKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid token '{text}'")]
    InvalidToken { text: String, span: Span },

    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("unexpected end of file")]
    UnexpectedEof { span: Span },

    #[error("unbalanced delimiter '{delimiter}'")]
    UnbalancedDelimiter { delimiter: String, span: Span },

    #[error("expected declaration")]
    ExpectedDeclaration { span: Span },

    #[error("expected type")]
    ExpectedType { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::InvalidToken { span, .. } => *span,
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span } => *span,
            ParseError::UnbalancedDelimiter { span, .. } => *span,
            ParseError::ExpectedDeclaration { span } => *span,
            ParseError::ExpectedType { span } => *span,
        }
    }

    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        if found == TokenKind::Eof {
            return ParseError::UnexpectedEof { span };
        }
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.describe().to_string(),
            span,
        }
    }
}
