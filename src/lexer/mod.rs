mod cursor;
mod error;
pub mod formatter;
mod token;

use cursor::SourceChar;
pub use error::{LexicalError, LexicalErrorKind};
use std::{iter::Peekable, rc::Rc, str::CharIndices};
pub use token::{Span, Token, TokenKind, KEYWORD_HASHMAP};

/// Maps byte offsets onto 1-based line and column numbers.
#[derive(Debug, Clone)]
pub struct LineBreaks {
    line_starts: Rc<[usize]>,
}

impl LineBreaks {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            line_starts: line_starts.into(),
        }
    }

    pub fn get_line(&self, offset: usize) -> u32 {
        match self.line_starts.binary_search(&offset) {
            Ok(index) => (index + 1) as u32,
            Err(index) => index as u32,
        }
    }

    pub fn get_line_and_column(&self, offset: usize) -> (u32, u32) {
        let line = self.get_line(offset);
        let line_start = self.line_starts[(line - 1) as usize];
        (line, (offset - line_start + 1) as u32)
    }

    pub fn get_line_from_span(&self, span: Span) -> u32 {
        self.get_line(span.start as usize)
    }
}

#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
    line_breaks: LineBreaks,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line_breaks: LineBreaks::new(source),
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.source
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        self.line_breaks.clone()
    }

    pub fn get_lexeme(&self, span: &Span) -> Option<&'src str> {
        self.source.get(span.range())
    }
}

impl<'src> Lexer<'src> {
    fn next_char(&mut self) -> Option<SourceChar> {
        self.chars
            .next()
            .map(|(offset, value)| SourceChar { value, offset })
    }

    fn next_char_if(&mut self, predicate: impl Fn(char) -> bool) -> Option<SourceChar> {
        let (offset, value) = self.chars.next_if(|&(_, c)| predicate(c))?;
        Some(SourceChar { value, offset })
    }

    fn just(current: SourceChar, kind: TokenKind) -> Token {
        Token {
            kind,
            span: Span::new(current.offset, current.next_offset()),
        }
    }

    /// Emits `double` if the next character is `second`, otherwise `single`.
    fn one_or_two(
        &mut self,
        current: SourceChar,
        second: char,
        single: TokenKind,
        double: TokenKind,
    ) -> Token {
        match self.next_char_if(|c| c == second) {
            Some(next) => Token {
                kind: double,
                span: Span::new(current.offset, next.next_offset()),
            },
            None => Self::just(current, single),
        }
    }

    fn skip_comment(&mut self) {
        while self.next_char_if(|c| c != '\n').is_some() {}
    }

    fn lex_integer(&mut self, first: SourceChar) -> Result<Token, LexicalError> {
        let mut end = first.next_offset();
        while let Some(c) = self.next_char_if(|c| c.is_ascii_digit()) {
            end = c.next_offset();
        }
        let span = Span::new(first.offset, end);
        let value = self.source[span.range()]
            .parse::<i64>()
            .map_err(|_| LexicalError {
                kind: LexicalErrorKind::IntegerOutOfRange,
                span,
            })?;
        Ok(Token {
            kind: TokenKind::Integer(value),
            span,
        })
    }

    fn lex_ident_or_keyword(&mut self, first: SourceChar) -> Token {
        let mut end = first.next_offset();
        while let Some(c) = self.next_char_if(|c| c.is_ascii_alphanumeric() || c == '_') {
            end = c.next_offset();
        }
        let span = Span::new(first.offset, end);
        let lexeme = &self.source[span.range()];
        Token {
            kind: KEYWORD_HASHMAP
                .get(lexeme)
                .copied()
                .unwrap_or(TokenKind::Ident),
            span,
        }
    }

    /// Scans the next token. Once the source is exhausted every call yields `Eof`.
    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        loop {
            let Some(current) = self.next_char() else {
                let end = self.source.len();
                return Ok(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(end, end),
                });
            };

            let token = match current.value {
                // Single character tokens
                '(' => Self::just(current, TokenKind::LeftParenthesis),
                ')' => Self::just(current, TokenKind::RightParenthesis),
                '{' => Self::just(current, TokenKind::LeftBrace),
                '}' => Self::just(current, TokenKind::RightBrace),
                '[' => Self::just(current, TokenKind::LeftBracket),
                ']' => Self::just(current, TokenKind::RightBracket),
                ',' => Self::just(current, TokenKind::Comma),
                ';' => Self::just(current, TokenKind::Semicolon),
                '\n' => Self::just(current, TokenKind::Newline),
                '+' => Self::just(current, TokenKind::Plus),
                '-' => Self::just(current, TokenKind::Minus),
                '*' => Self::just(current, TokenKind::Star),
                '/' => Self::just(current, TokenKind::Slash),
                '%' => Self::just(current, TokenKind::Percent),
                // Possibly two character tokens
                '=' => self.one_or_two(current, '=', TokenKind::Equal, TokenKind::EqualEqual),
                '<' => self.one_or_two(
                    current,
                    '=',
                    TokenKind::LessThan,
                    TokenKind::LessThanEqual,
                ),
                '>' => self.one_or_two(
                    current,
                    '=',
                    TokenKind::GreaterThan,
                    TokenKind::GreaterThanEqual,
                ),
                '!' => match self.next_char_if(|c| c == '=') {
                    Some(next) => Token {
                        kind: TokenKind::BangEqual,
                        span: Span::new(current.offset, next.next_offset()),
                    },
                    None => {
                        return Err(LexicalError {
                            kind: LexicalErrorKind::Unrecognized('!'),
                            span: Span::new(current.offset, current.next_offset()),
                        })
                    }
                },
                '#' => {
                    self.skip_comment();
                    continue;
                }
                '0'..='9' => return self.lex_integer(current),
                'a'..='z' | 'A'..='Z' | '_' => self.lex_ident_or_keyword(current),
                c if c.is_whitespace() => continue,
                c => {
                    return Err(LexicalError {
                        kind: LexicalErrorKind::Unrecognized(c),
                        span: Span::new(current.offset, current.next_offset()),
                    })
                }
            };
            return Ok(token);
        }
    }

    /// Scans the whole source, stopping at the first lexical error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexicalError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            tokens.push(token);
            if matches!(token.kind, TokenKind::Eof) {
                return Ok(tokens);
            }
        }
    }
}
