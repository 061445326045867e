use super::{
    token::{Token, TokenKind},
    LineBreaks,
};
use crate::lexer::{Lexer, LexicalError, LexicalErrorKind};

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
    /// Formats a lexer error into a string.
    fn format_lexical_error(&self, error: &LexicalError) -> String;
}

pub trait ToFormatter<F>
where
    F: TokenFormatter,
{
    fn create_formatter(&self) -> F;
}

pub struct BasicFormatter<'src> {
    text: &'src str,
    line_breaks: LineBreaks,
}

impl<'src> BasicFormatter<'src> {
    pub fn new(text: &'src str) -> Self {
        Self {
            text,
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl<'src> ToFormatter<BasicFormatter<'src>> for Lexer<'src> {
    fn create_formatter(&self) -> BasicFormatter<'src> {
        BasicFormatter {
            text: self.get_source(),
            line_breaks: self.get_line_breaks(),
        }
    }
}

impl<'src> TokenFormatter for BasicFormatter<'src> {
    fn format(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Newline => "NEWLINE \\n null".into(),
            TokenKind::Eof => "EOF  null".into(),
            TokenKind::Integer(value) => {
                let lexeme = &self.text[token.span.range()];
                format!("INTEGER {lexeme} {value}")
            }
            kind => {
                let lexeme = &self.text[token.span.range()];
                format!("{kind} {lexeme} null")
            }
        }
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        let (line, column) = self
            .line_breaks
            .get_line_and_column(error.span.start as usize);
        match error.kind {
            LexicalErrorKind::Unrecognized(c) => {
                format!("[line {line}:{column}] Error: Unexpected character: {c}")
            }
            LexicalErrorKind::IntegerOutOfRange => {
                let lexeme = &self.text[error.span.range()];
                format!("[line {line}:{column}] Error: Integer literal out of range: {lexeme}")
            }
        }
    }
}

pub struct DebugFormatter;

impl<'src> ToFormatter<DebugFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> DebugFormatter {
        DebugFormatter {}
    }
}

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        format!("{error:?}")
    }
}
