use winnow::combinator::{alt, opt};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location};
use winnow::token::{any, take_till, take_while};

use crate::scanner::token::{Span, Token, TokenKind, keyword_kind};

type Input<'a> = LocatingSlice<&'a str>;

/// Each sub-scanner yields the token kind and its lexeme; positions are
/// attached by `scan_all`, which brackets every call with offsets.
type Lexeme = (TokenKind, String);

fn whitespace_and_comments(input: &mut Input<'_>) -> ModalResult<()> {
    loop {
        let before = input.current_token_start();
        take_while(0.., |c: char| {
            c == ' ' || c == '\t' || c == '\r' || c == '\n'
        })
        .void()
        .parse_next(input)?;

        if input.starts_with("//") {
            take_while(0.., |c: char| c != '\n')
                .void()
                .parse_next(input)?;
        } else if input.current_token_start() == before {
            break;
        }
    }
    Ok(())
}

/// Strings are raw: everything between the quotes, newlines included, with
/// no escape processing. A missing closing quote swallows the rest of the
/// input into an error token.
fn string_literal(input: &mut Input<'_>) -> ModalResult<Lexeme> {
    '"'.parse_next(input)?;
    let body: &str = take_till(0.., '"').parse_next(input)?;
    let closing: Option<char> = opt('"').parse_next(input)?;
    match closing {
        Some(_) => Ok((TokenKind::String, body.to_string())),
        None => Ok((TokenKind::Error, format!("\"{body}"))),
    }
}

fn number_literal(input: &mut Input<'_>) -> ModalResult<Lexeme> {
    let whole: &str = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let mut lexeme = whole.to_string();

    let checkpoint = input.checkpoint();
    let dot_result: Result<char, winnow::error::ErrMode<ContextError>> = '.'.parse_next(input);
    if dot_result.is_ok() {
        match take_while::<_, _, ContextError>(1.., |c: char| c.is_ascii_digit()).parse_next(input)
        {
            Ok(frac) => {
                lexeme.push('.');
                lexeme.push_str(frac);
            }
            Err(_) => {
                input.reset(&checkpoint);
            }
        }
    }

    Ok((TokenKind::Number, lexeme))
}

fn identifier_or_keyword(input: &mut Input<'_>) -> ModalResult<Lexeme> {
    let first: char = any
        .verify(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .parse_next(input)?;
    let rest: &str =
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)?;
    let mut lexeme = String::with_capacity(1 + rest.len());
    lexeme.push(first);
    lexeme.push_str(rest);
    let kind = keyword_kind(&lexeme).unwrap_or(TokenKind::Identifier);
    Ok((kind, lexeme))
}

fn two_char_token(input: &mut Input<'_>) -> ModalResult<Lexeme> {
    let (kind, lexeme) = alt((
        "!=".value((TokenKind::BangEqual, "!=")),
        "==".value((TokenKind::EqualEqual, "==")),
        ">=".value((TokenKind::GreaterEqual, ">=")),
        "<=".value((TokenKind::LessEqual, "<=")),
    ))
    .parse_next(input)?;
    Ok((kind, lexeme.to_string()))
}

fn single_char_token(input: &mut Input<'_>) -> ModalResult<Lexeme> {
    let c = any
        .verify(|c: &char| "();+-*/%=<>".contains(*c))
        .parse_next(input)?;
    let kind = match c {
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        ';' => TokenKind::Semicolon,
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '%' => TokenKind::Percent,
        '=' => TokenKind::Equal,
        '<' => TokenKind::Less,
        '>' => TokenKind::Greater,
        _ => unreachable!("verify guarantees valid char"),
    };
    Ok((kind, c.to_string()))
}

fn scan_token(input: &mut Input<'_>) -> ModalResult<Lexeme> {
    alt((
        string_literal,
        number_literal,
        identifier_or_keyword,
        two_char_token,
        single_char_token,
    ))
    .parse_next(input)
}

/// Maps byte offsets to 1-based line and character column.
struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    fn locate(&self, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let start = self.line_starts[line - 1];
        let column = self.source[start..offset].chars().count() + 1;
        (line, column)
    }
}

/// Scan all tokens from source. Never fails: unrecognized characters and
/// unterminated strings become `TokenKind::Error` tokens, and the result
/// always ends with exactly one `Eof` token.
pub fn scan_all(source: &str) -> Vec<Token> {
    let lines = LineIndex::new(source);
    let mut input = LocatingSlice::new(source);
    let mut tokens = Vec::new();

    loop {
        if whitespace_and_comments(&mut input).is_err() {
            break;
        }
        if input.is_empty() {
            break;
        }
        let start = input.current_token_start();
        let (kind, lexeme) = match scan_token(&mut input) {
            Ok(lexeme) => lexeme,
            Err(_) => {
                let c = any::<_, ContextError>.parse_next(&mut input).ok();
                (TokenKind::Error, c.map(String::from).unwrap_or_default())
            }
        };
        let end = input.current_token_start();
        let (line, column) = lines.locate(start);
        tokens.push(Token::new(
            kind,
            lexeme,
            Span::new(start, end - start),
            line,
            column,
        ));
    }

    let eof_offset = source.len();
    let (line, column) = lines.locate(eof_offset);
    tokens.push(Token::new(
        TokenKind::Eof,
        "",
        Span::new(eof_offset, 0),
        line,
        column,
    ));
    tokens
}
