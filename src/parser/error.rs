use crate::lexer::{LexicalError, Span, TokenKind};
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("Expected {expected} but got token {actual}.")]
    UnexpectedToken {
        actual: TokenKind,
        expected: TokenKind,
    },
    #[error("Expected an expression but got token {0}.")]
    NonExpression(TokenKind),
    #[error("Expected a non-EOF token.")]
    UnexpectedEof,
    #[error("Expected a newline or ';' after statement but got token {0}.")]
    MissingSeparator(TokenKind),
    #[error("Duplicate parameter `{0}`.")]
    DuplicateParameter(CompactString),
    #[error("Encountered a lexer error: {0}")]
    LexicalError(#[from] LexicalError),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    pub span: Span,
}

impl ParserError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::UnexpectedToken { .. } => "PR001",
            ParserErrorKind::NonExpression(_) => "PR002",
            ParserErrorKind::UnexpectedEof => "PR003",
            ParserErrorKind::MissingSeparator(_) => "PR004",
            ParserErrorKind::DuplicateParameter(_) => "PR005",
            ParserErrorKind::LexicalError(ref e) => e.code(),
        }
    }
}

impl From<LexicalError> for ParserError {
    fn from(value: LexicalError) -> Self {
        Self {
            span: value.span,
            kind: ParserErrorKind::LexicalError(value),
        }
    }
}
