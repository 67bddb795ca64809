use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::interpreter::Interpreter;
use crate::scanner::{self, token::TokenKind};

/// Run the interactive REPL. Variables persist across inputs.
///
/// Lines are buffered until every `si` and `repite` opened in the buffer
/// has been closed, then the buffer runs as one program.
pub fn run_repl() -> Result<(), ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    let mut interpreter = Interpreter::new();
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "> " } else { "... " };
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        };

        if buffer.is_empty() {
            match line.trim() {
                "" => continue,
                ".vars" => {
                    print!("{}", interpreter.scopes());
                    continue;
                }
                ".exit" | "salir" => break,
                _ => {}
            }
        }

        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(&line);
        if !is_block_complete(&buffer) {
            continue;
        }

        let _ = editor.add_history_entry(buffer.as_str());
        let source = std::mem::take(&mut buffer);
        match crate::compile(&source) {
            Ok(program) => {
                if let Err(e) = interpreter.run_additional(&program) {
                    eprintln!("{}", e.display_with_line(&source));
                }
            }
            Err(e) => {
                let report = miette::Report::new(e.with_source_code("<repl>", source));
                eprintln!("{report:?}");
            }
        }
    }

    Ok(())
}

/// Whether every block opened in `source` has been closed and no string
/// literal is left open.
fn is_block_complete(source: &str) -> bool {
    let mut depth: i64 = 0;
    for token in scanner::scan(source) {
        match token.kind {
            TokenKind::Si | TokenKind::Repite => depth += 1,
            TokenKind::FinSi | TokenKind::FinRepite => depth -= 1,
            TokenKind::Error if token.lexeme.starts_with('"') => return false,
            _ => {}
        }
    }
    depth <= 0
}
