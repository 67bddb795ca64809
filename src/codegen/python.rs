//! Python 3 transliteration of a parsed program.
//!
//! Every statement maps to one Python statement. Binary and unary operands
//! that are not literals or identifiers are wrapped in parentheses, so the
//! output never depends on Python agreeing with our precedence table.

use crate::ast::*;
use crate::interpreter::value::format_float;

const HEADER: &str = "#!/usr/bin/env python3\n\
                      # -*- coding: utf-8 -*-\n\
                      # Generated automatically from pseudocode\n\n";

const INDENT: &str = "    ";

/// Python keywords plus `print`, which the translated program calls.
const RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "print", "raise",
    "return", "try", "while", "with", "yield",
];

pub struct PythonRenderer {
    buf: String,
    indent: usize,
}

impl Default for PythonRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonRenderer {
    pub fn new() -> Self {
        Self {
            buf: String::new(),
            indent: 0,
        }
    }

    /// Render a complete script. The renderer is reset first, so one
    /// instance can render many programs.
    pub fn render(&mut self, program: &Program) -> String {
        self.buf.clear();
        self.indent = 0;
        self.buf.push_str(HEADER);
        if !program.statements.is_empty() {
            program.accept(self);
        }
        std::mem::take(&mut self.buf)
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Emits `statements` one level deeper; an empty block becomes `pass`.
    fn block(&mut self, statements: &[Stmt]) {
        self.indent += 1;
        if statements.is_empty() {
            self.line("pass");
        }
        for stmt in statements {
            stmt.accept(self);
        }
        self.indent -= 1;
    }

    fn operand(&mut self, expr: &Expr) -> String {
        let text = expr.accept(self);
        if expr.is_atom() {
            text
        } else {
            format!("({text})")
        }
    }
}

impl StmtVisitor for PythonRenderer {
    type Output = ();

    fn visit_program(&mut self, program: &Program) {
        self.line("def main():");
        self.block(&program.statements);
        self.buf.push_str("\n\nif __name__ == '__main__':\n");
        self.buf.push_str(INDENT);
        self.buf.push_str("main()\n");
    }

    fn visit_assign(&mut self, stmt: &AssignStmt) {
        let value = stmt.value.accept(self);
        self.line(&format!("{} = {value}", identifier(&stmt.name)));
    }

    fn visit_if(&mut self, stmt: &IfStmt) {
        let condition = stmt.condition.accept(self);
        self.line(&format!("if {condition}:"));
        self.block(&stmt.then_branch);
        // An empty `sino` runs nothing; dropping it keeps the output minimal
        match stmt.else_branch {
            Some(ref else_branch) if !else_branch.is_empty() => {
                self.line("else:");
                self.block(else_branch);
            }
            _ => {}
        }
    }

    fn visit_loop(&mut self, stmt: &LoopStmt) {
        let condition = stmt.condition.accept(self);
        self.line(&format!("while {condition}:"));
        self.block(&stmt.body);
    }

    fn visit_write(&mut self, stmt: &WriteStmt) {
        let value = stmt.expression.accept(self);
        self.line(&format!("print({value})"));
    }
}

impl ExprVisitor for PythonRenderer {
    type Output = String;

    fn visit_binary(&mut self, expr: &BinaryExpr) -> String {
        let left = self.operand(&expr.left);
        let right = self.operand(&expr.right);
        format!("{left} {} {right}", binary_operator(expr.operator))
    }

    fn visit_unary(&mut self, expr: &UnaryExpr) -> String {
        let operand = self.operand(&expr.operand);
        match expr.operator {
            UnaryOp::Negate => format!("-{operand}"),
            UnaryOp::Not => format!("not {operand}"),
        }
    }

    fn visit_literal(&mut self, expr: &LiteralExpr) -> String {
        match &expr.value {
            LiteralValue::Integer(n) => n.to_string(),
            LiteralValue::Float(n) => format_float(*n),
            LiteralValue::String(s) => string_literal(s),
        }
    }

    fn visit_identifier(&mut self, expr: &IdentifierExpr) -> String {
        identifier(&expr.name)
    }
}

fn binary_operator(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Subtract => "-",
        BinaryOp::Multiply => "*",
        BinaryOp::Divide => "/",
        BinaryOp::Modulo => "%",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual => "!=",
        BinaryOp::Less => "<",
        BinaryOp::LessEqual => "<=",
        BinaryOp::Greater => ">",
        BinaryOp::GreaterEqual => ">=",
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
    }
}

/// Python keywords get a trailing underscore. So do names that already end
/// in one, which keeps `pass` and `pass_` apart.
fn identifier(name: &str) -> String {
    if RESERVED.contains(&name) || name.ends_with('_') {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner;
    use rstest::rstest;

    fn render(source: &str) -> String {
        let program = Parser::new(scanner::scan(source))
            .parse()
            .expect("parse should succeed");
        PythonRenderer::new().render(&program)
    }

    /// The translated body without header and trailer.
    fn body(source: &str) -> String {
        let script = render(source);
        let start = script.find("def main():\n").expect("main") + "def main():\n".len();
        let end = script.find("\n\nif __name__").expect("trailer");
        script[start..end].trim_end().to_string()
    }

    #[test]
    fn empty_program_is_only_the_header() {
        assert_eq!(render(""), HEADER);
    }

    #[test]
    fn full_script_layout() {
        assert_eq!(
            render("x = 5\nescribir x + 3"),
            "#!/usr/bin/env python3\n\
             # -*- coding: utf-8 -*-\n\
             # Generated automatically from pseudocode\n\
             \n\
             def main():\n    x = 5\n    print(x + 3)\n\
             \n\
             \n\
             if __name__ == '__main__':\n    main()\n"
        );
    }

    #[rstest]
    #[case("escribir 1 + 2 * 3", "print(1 + (2 * 3))")]
    #[case("escribir (1 + 2) * 3", "print((1 + 2) * 3)")]
    #[case("escribir -(a + b)", "print(-(a + b))")]
    #[case("escribir -a", "print(-a)")]
    #[case("escribir no (a < b)", "print(not (a < b))")]
    #[case("escribir no a y b", "print((not a) and b)")]
    #[case("escribir a < b o c", "print((a < b) or c)")]
    #[case("escribir a < b < c", "print((a < b) < c)")]
    #[case("escribir a == b", "print(a == b)")]
    #[case("escribir a != b", "print(a != b)")]
    #[case("escribir 7 % 2", "print(7 % 2)")]
    #[case("escribir 7 / 2", "print(7 / 2)")]
    fn expressions(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(body(source), format!("    {expected}"));
    }

    #[rstest]
    #[case("x = 3.0", "x = 3.0")]
    #[case("x = 0.25", "x = 0.25")]
    #[case("x = 42", "x = 42")]
    #[case("x = 10000000000000000.0", "x = 1e+16")]
    #[case("x = 0.0000001", "x = 1e-07")]
    fn number_literals(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(body(source), format!("    {expected}"));
    }

    #[rstest]
    #[case("s = \"hola\"", "s = \"hola\"")]
    #[case("s = \"a\\b\"", "s = \"a\\\\b\"")]
    #[case("s = \"dos\nlineas\"", "s = \"dos\\nlineas\"")]
    #[case("s = \"tab\there\"", "s = \"tab\\there\"")]
    #[case("s = \"cr\rx\"", "s = \"cr\\rx\"")]
    fn strings_are_escaped(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(body(source), format!("    {expected}"));
    }

    #[test]
    fn if_else_blocks() {
        assert_eq!(
            body("si (x > 1) entonces\nescribir 1\nsino\nescribir 2\nfin_si"),
            "    if x > 1:\n        print(1)\n    else:\n        print(2)"
        );
    }

    #[test]
    fn empty_branches_emit_pass() {
        assert_eq!(body("si (x) entonces fin_si"), "    if x:\n        pass");
        assert_eq!(body("repite (x) fin_repite"), "    while x:\n        pass");
    }

    #[test]
    fn empty_else_is_omitted() {
        assert_eq!(
            body("si (x) entonces escribir 1 sino fin_si"),
            "    if x:\n        print(1)"
        );
    }

    #[test]
    fn nested_blocks_indent_per_level() {
        let source = "i = 0\nrepite (i < 3)\nsi (i % 2 == 0) entonces\nescribir i\nfin_si\ni = i + 1\nfin_repite";
        assert_eq!(
            body(source),
            "    i = 0\n\
             \x20   while i < 3:\n\
             \x20       if (i % 2) == 0:\n\
             \x20           print(i)\n\
             \x20       i = i + 1"
        );
    }

    #[rstest]
    #[case("pass = 1", "pass_ = 1")]
    #[case("print = 1", "print_ = 1")]
    #[case("None = 1", "None_ = 1")]
    #[case("lista = 1", "lista = 1")]
    #[case("pass_ = 1", "pass__ = 1")]
    #[case("total_ = 1", "total__ = 1")]
    fn reserved_names_are_renamed(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(body(source), format!("    {expected}"));
    }

    #[test]
    fn renamed_keyword_does_not_clash_with_existing_name() {
        assert_eq!(
            body("pass = 1\npass_ = 2\nescribir pass"),
            "    pass_ = 1\n    pass__ = 2\n    print(pass_)"
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let program = Parser::new(scanner::scan(
            "x = 1\nrepite (x < 5)\nx = x + 1\nfin_repite\nescribir \"fin\"",
        ))
        .parse()
        .expect("parse should succeed");
        let mut renderer = PythonRenderer::new();
        let first = renderer.render(&program);
        let second = renderer.render(&program);
        assert_eq!(first, second);
        assert_eq!(first, PythonRenderer::new().render(&program));
    }
}
