pub mod lexer;
pub mod token;

use token::Token;

/// Scan source code into a list of tokens terminated by `Eof`.
///
/// Lexical problems do not abort the scan; they surface as
/// `TokenKind::Error` tokens that the parser reports.
pub fn scan(source: &str) -> Vec<Token> {
    lexer::scan_all(source)
}
