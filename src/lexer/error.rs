use super::token::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexicalErrorKind {
    #[error("Unrecognized character {0:?}")]
    Unrecognized(char),
    #[error("Integer literal does not fit in 64 bits")]
    IntegerOutOfRange,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct LexicalError {
    #[source]
    pub kind: LexicalErrorKind,
    pub span: Span,
}

impl LexicalError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            LexicalErrorKind::Unrecognized(_) => "LX001",
            LexicalErrorKind::IntegerOutOfRange => "LX002",
        }
    }
}
