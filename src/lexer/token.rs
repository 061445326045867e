use std::collections::HashMap;
use std::fmt::Display;
use std::ops::Range;
use std::sync::LazyLock;

/// The hashmap for keywords
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("and", TokenKind::KeywordAnd);
    map.insert("elif", TokenKind::KeywordElif);
    map.insert("else", TokenKind::KeywordElse);
    map.insert("false", TokenKind::KeywordFalse);
    map.insert("fn", TokenKind::KeywordFn);
    map.insert("if", TokenKind::KeywordIf);
    map.insert("let", TokenKind::KeywordLet);
    map.insert("not", TokenKind::KeywordNot);
    map.insert("or", TokenKind::KeywordOr);
    map.insert("print", TokenKind::KeywordPrint);
    map.insert("true", TokenKind::KeywordTrue);
    map
});

/// A half-open byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The byte position of the start of the token.
    pub start: u32,
    /// The byte position one past the end of the token.
    pub end: u32,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Parentheses
    LeftParenthesis,
    RightParenthesis,
    // Braces
    LeftBrace,
    RightBrace,
    // Brackets
    LeftBracket,
    RightBracket,
    // Miscellaneous
    Comma,
    Semicolon,
    Newline,
    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    EqualEqual,
    BangEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,

    // Literals
    Integer(i64),
    Ident,

    // Keywords
    KeywordAnd,
    KeywordElif,
    KeywordElse,
    KeywordFalse,
    KeywordFn,
    KeywordIf,
    KeywordLet,
    KeywordNot,
    KeywordOr,
    KeywordPrint,
    KeywordTrue,

    // End of file.
    Eof,
}

impl TokenKind {
    /// Tokens that separate two statements.
    pub fn is_separator(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Semicolon)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::LeftParenthesis => write!(f, "LEFT_PAREN"),
            TokenKind::RightParenthesis => write!(f, "RIGHT_PAREN"),
            TokenKind::LeftBrace => write!(f, "LEFT_BRACE"),
            TokenKind::RightBrace => write!(f, "RIGHT_BRACE"),
            TokenKind::LeftBracket => write!(f, "LEFT_BRACKET"),
            TokenKind::RightBracket => write!(f, "RIGHT_BRACKET"),
            TokenKind::Comma => write!(f, "COMMA"),
            TokenKind::Semicolon => write!(f, "SEMICOLON"),
            TokenKind::Newline => write!(f, "NEWLINE"),
            TokenKind::Plus => write!(f, "PLUS"),
            TokenKind::Minus => write!(f, "MINUS"),
            TokenKind::Star => write!(f, "STAR"),
            TokenKind::Slash => write!(f, "SLASH"),
            TokenKind::Percent => write!(f, "PERCENT"),
            TokenKind::Equal => write!(f, "EQUAL"),
            TokenKind::EqualEqual => write!(f, "EQUAL_EQUAL"),
            TokenKind::BangEqual => write!(f, "BANG_EQUAL"),
            TokenKind::LessThan => write!(f, "LESS"),
            TokenKind::LessThanEqual => write!(f, "LESS_EQUAL"),
            TokenKind::GreaterThan => write!(f, "GREATER"),
            TokenKind::GreaterThanEqual => write!(f, "GREATER_EQUAL"),
            TokenKind::Integer(_) => write!(f, "INTEGER"),
            TokenKind::Ident => write!(f, "IDENTIFIER"),
            TokenKind::KeywordAnd => write!(f, "AND"),
            TokenKind::KeywordElif => write!(f, "ELIF"),
            TokenKind::KeywordElse => write!(f, "ELSE"),
            TokenKind::KeywordFalse => write!(f, "FALSE"),
            TokenKind::KeywordFn => write!(f, "FN"),
            TokenKind::KeywordIf => write!(f, "IF"),
            TokenKind::KeywordLet => write!(f, "LET"),
            TokenKind::KeywordNot => write!(f, "NOT"),
            TokenKind::KeywordOr => write!(f, "OR"),
            TokenKind::KeywordPrint => write!(f, "PRINT"),
            TokenKind::KeywordTrue => write!(f, "TRUE"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
