pub mod python;

use crate::ast::Program;

/// Translate a program to a self-executing Python 3 script.
pub fn render(program: &Program) -> String {
    python::PythonRenderer::new().render(program)
}
