#![allow(unused_assignments)]

pub mod ast;
pub mod codegen;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod repl;
pub mod scanner;

// Re-export error types for convenience
pub use error::{CompileError, RuntimeError};

use ast::Program;

/// Scan and parse `source` into a program.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    parser::Parser::new(scanner::scan(source)).parse()
}
