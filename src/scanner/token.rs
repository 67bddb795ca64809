use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TokenKind {
    // Delimiters
    LeftParen,
    RightParen,
    Semicolon,

    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // One or two character operators
    Equal,
    EqualEqual,
    BangEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    Si,
    Entonces,
    Sino,
    FinSi,
    Repite,
    FinRepite,
    Escribir,
    Y,
    O,
    No,

    Eof,
    /// Unrecognized character or unterminated string; reported by the parser.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        let end = (other.offset + other.len).max(self.offset + self.len);
        Span::new(self.offset, end - self.offset)
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.offset.into(), span.len)
    }
}

/// A lexeme with its kind and position. `line` and `column` are 1-based;
/// `column` counts characters, not bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        span: Span,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} '{}' {}:{}",
            self.kind, self.lexeme, self.line, self.column
        )
    }
}

pub fn keyword_kind(ident: &str) -> Option<TokenKind> {
    match ident {
        "si" => Some(TokenKind::Si),
        "entonces" => Some(TokenKind::Entonces),
        "sino" => Some(TokenKind::Sino),
        "fin_si" => Some(TokenKind::FinSi),
        "repite" => Some(TokenKind::Repite),
        "fin_repite" => Some(TokenKind::FinRepite),
        "escribir" => Some(TokenKind::Escribir),
        "y" => Some(TokenKind::Y),
        "o" => Some(TokenKind::O),
        "no" => Some(TokenKind::No),
        _ => None,
    }
}
