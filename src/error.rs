use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::interpreter::value::ValueType;
use crate::scanner::token::{Span, Token, TokenKind};

// ============= Compile-time errors (with miette diagnostics) =============

#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    /// The parser reached an error token produced by the scanner.
    #[error("lexical error at {line}:{column}: {message}")]
    #[diagnostic(code(pseudo::lex))]
    Lexical {
        message: String,
        lexeme: String,
        line: usize,
        column: usize,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("parse error at {line}:{column}: {message}, found {found}")]
    #[diagnostic(code(pseudo::parse))]
    Parse {
        message: String,
        kind: TokenKind,
        found: String,
        line: usize,
        column: usize,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },
}

impl CompileError {
    pub fn lexical(message: impl Into<String>, token: &Token) -> Self {
        Self::Lexical {
            message: message.into(),
            lexeme: token.lexeme.clone(),
            line: token.line,
            column: token.column,
            span: label_span(token.span),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn parse(message: impl Into<String>, token: &Token) -> Self {
        let found = match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", token.lexeme),
        };
        Self::Parse {
            message: message.into(),
            kind: token.kind,
            found,
            line: token.line,
            column: token.column,
            span: label_span(token.span),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Self::Lexical { line, .. } | Self::Parse { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            Self::Lexical { column, .. } | Self::Parse { column, .. } => *column,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexical { message, .. } | Self::Parse { message, .. } => message,
        }
    }

    /// Attach source code for fancy miette diagnostics
    pub fn with_source_code(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        match self {
            Self::Lexical {
                message,
                lexeme,
                line,
                column,
                span,
                ..
            } => Self::Lexical {
                message,
                lexeme,
                line,
                column,
                span: clamp_span(span, &source),
                src: miette::NamedSource::new(name.into(), source),
            },
            Self::Parse {
                message,
                kind,
                found,
                line,
                column,
                span,
                ..
            } => Self::Parse {
                message,
                kind,
                found,
                line,
                column,
                span: clamp_span(span, &source),
                src: miette::NamedSource::new(name.into(), source),
            },
        }
    }
}

/// Zero-length spans (end of input) still get a visible one-column label.
fn label_span(span: Span) -> SourceSpan {
    Span::new(span.offset, span.len.max(1)).into()
}

/// Keeps a label inside `source`; an end-of-input label moves onto the
/// last character.
fn clamp_span(span: SourceSpan, source: &str) -> SourceSpan {
    if span.offset() + span.len() <= source.len() {
        return span;
    }
    match source.char_indices().next_back() {
        Some((offset, c)) => SourceSpan::new(offset.into(), c.len_utf8()),
        None => SourceSpan::new(0.into(), 0),
    }
}

// ============= Runtime errors (simple, no miette) =============

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String, span: Option<Span> },

    #[error("type mismatch: cannot assign {found} to '{name}' of type {declared}")]
    TypeMismatch {
        name: String,
        declared: ValueType,
        found: ValueType,
        span: Option<Span>,
    },

    #[error("{message}")]
    InvalidOperand { message: String, span: Option<Span> },

    #[error("division by zero")]
    DivisionByZero { span: Option<Span> },

    #[error("modulo by zero")]
    ModuloByZero { span: Option<Span> },

    #[error("integer overflow in '{operator}'")]
    IntegerOverflow { operator: String, span: Option<Span> },

    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),
}

impl RuntimeError {
    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            name: name.into(),
            span: None,
        }
    }

    pub fn invalid_operand(message: impl Into<String>, span: Span) -> Self {
        Self::InvalidOperand {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UndefinedVariable { span, .. }
            | Self::TypeMismatch { span, .. }
            | Self::InvalidOperand { span, .. }
            | Self::DivisionByZero { span }
            | Self::ModuloByZero { span }
            | Self::IntegerOverflow { span, .. } => *span,
            Self::Output(_) => None,
        }
    }

    /// Attach a source span unless the error already carries one.
    pub fn at(mut self, at: Span) -> Self {
        match &mut self {
            Self::UndefinedVariable { span, .. }
            | Self::TypeMismatch { span, .. }
            | Self::InvalidOperand { span, .. }
            | Self::DivisionByZero { span }
            | Self::ModuloByZero { span }
            | Self::IntegerOverflow { span, .. } => {
                span.get_or_insert(at);
            }
            Self::Output(_) => {}
        }
        self
    }

    /// Format error with line number (requires source code)
    pub fn display_with_line(&self, source: &str) -> String {
        match self.span() {
            Some(span) => {
                let line = offset_to_line(source, span.offset);
                format!("Error: line {line}: {self}")
            }
            None => format!("Error: {self}"),
        }
    }
}

/// Calculate line number from byte offset in source
fn offset_to_line(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .chars()
        .filter(|&c| c == '\n')
        .count()
        + 1
}

// ============= Tests =============

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, lexeme: &str, offset: usize, line: usize, column: usize) -> Token {
        Token::new(kind, lexeme, Span::new(offset, lexeme.len()), line, column)
    }

    #[test]
    fn compile_error_implements_diagnostic() {
        let err = CompileError::parse("expected '='", &token(TokenKind::Number, "1", 2, 1, 3));
        let diag: &dyn Diagnostic = &err;
        assert!(diag.code().is_some());
    }

    #[test]
    fn parse_error_carries_token_position() {
        let err = CompileError::parse(
            "expected 'fin_si'",
            &token(TokenKind::Identifier, "x", 20, 3, 5),
        );
        assert_eq!(err.line(), 3);
        assert_eq!(err.column(), 5);
        assert_eq!(err.message(), "expected 'fin_si'");
        assert_eq!(
            err.to_string(),
            "parse error at 3:5: expected 'fin_si', found 'x'"
        );
    }

    #[test]
    fn parse_error_at_end_of_input() {
        let err = CompileError::parse("expected expression", &token(TokenKind::Eof, "", 9, 2, 1));
        assert!(err.to_string().ends_with("found end of input"));
    }

    #[test]
    fn compile_error_with_source() {
        let err = CompileError::lexical(
            "unexpected character '@'",
            &token(TokenKind::Error, "@", 4, 1, 5),
        )
        .with_source_code("test.pseudo", "x = @\n");
        assert!(matches!(err, CompileError::Lexical { line: 1, column: 5, .. }));
    }

    #[test]
    fn label_covers_the_token() {
        let err = CompileError::parse("expected '='", &token(TokenKind::Number, "42", 2, 1, 3));
        match err {
            CompileError::Parse { span, .. } => assert_eq!((span.offset(), span.len()), (2, 2)),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = CompileError::parse("expected expression", &token(TokenKind::Eof, "", 9, 2, 1));
        match err {
            CompileError::Parse { span, .. } => assert_eq!((span.offset(), span.len()), (9, 1)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn end_of_input_label_stays_inside_source() {
        let err = CompileError::parse("expected 'fin_si'", &token(TokenKind::Eof, "", 6, 2, 1))
            .with_source_code("test.pseudo", "si (x)");
        match err {
            CompileError::Parse { span, .. } => {
                assert_eq!(span.offset(), 5);
                assert_eq!(span.len(), 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn runtime_error_display() {
        let err = RuntimeError::undefined_variable("x");
        assert_eq!(err.to_string(), "undefined variable 'x'");
        assert!(err.span().is_none());
    }

    #[test]
    fn at_keeps_innermost_span() {
        let err = RuntimeError::DivisionByZero {
            span: Some(Span::new(3, 1)),
        }
        .at(Span::new(0, 10));
        assert_eq!(err.span(), Some(Span::new(3, 1)));

        let err = RuntimeError::undefined_variable("y").at(Span::new(7, 1));
        assert_eq!(err.span(), Some(Span::new(7, 1)));
    }

    #[test]
    fn type_mismatch_names_both_types() {
        let err = RuntimeError::TypeMismatch {
            name: "y".to_string(),
            declared: ValueType::Integer,
            found: ValueType::Float,
            span: None,
        };
        assert_eq!(
            err.to_string(),
            "type mismatch: cannot assign float to 'y' of type integer"
        );
    }

    #[test]
    fn offset_to_line_basic() {
        let source = "line 1\nline 2\nline 3";
        assert_eq!(offset_to_line(source, 0), 1); // Start of line 1
        assert_eq!(offset_to_line(source, 7), 2); // Start of line 2
        assert_eq!(offset_to_line(source, 14), 3); // Start of line 3
    }

    #[test]
    fn offset_to_line_past_end() {
        let source = "short";
        assert_eq!(offset_to_line(source, 100), 1); // Past end, still line 1
    }

    #[test]
    fn runtime_error_display_with_line() {
        let source = "x = 1\ny = x + z\n";
        let err = RuntimeError::undefined_variable("z").at(Span::new(14, 1));
        assert_eq!(
            err.display_with_line(source),
            "Error: line 2: undefined variable 'z'"
        );
    }

    #[test]
    fn runtime_error_display_no_span() {
        let err = RuntimeError::ModuloByZero { span: None };
        assert_eq!(err.display_with_line("dummy"), "Error: modulo by zero");
    }
}
