use crate::ast::*;
use crate::interpreter::value::format_float;

/// One statement per line, each as an s-expression.
pub fn to_sexp(program: &Program) -> String {
    program.accept(&mut SexpPrinter)
}

pub fn to_json(program: &Program) -> String {
    serde_json::to_string_pretty(program).expect("AST should be serializable")
}

struct SexpPrinter;

impl SexpPrinter {
    fn list(&mut self, head: &str, stmts: &[Stmt]) -> String {
        let mut out = format!("({head}");
        for stmt in stmts {
            out.push(' ');
            out.push_str(&stmt.accept(self));
        }
        out.push(')');
        out
    }
}

impl StmtVisitor for SexpPrinter {
    type Output = String;

    fn visit_program(&mut self, program: &Program) -> String {
        let mut out = String::new();
        for stmt in &program.statements {
            out.push_str(&stmt.accept(self));
            out.push('\n');
        }
        out
    }

    fn visit_assign(&mut self, stmt: &AssignStmt) -> String {
        format!("(= {} {})", stmt.name, stmt.value.accept(self))
    }

    fn visit_if(&mut self, stmt: &IfStmt) -> String {
        let mut out = format!(
            "(si {} {}",
            stmt.condition.accept(self),
            self.list("entonces", &stmt.then_branch)
        );
        if let Some(ref else_branch) = stmt.else_branch {
            out.push(' ');
            out.push_str(&self.list("sino", else_branch));
        }
        out.push(')');
        out
    }

    fn visit_loop(&mut self, stmt: &LoopStmt) -> String {
        let head = format!("repite {}", stmt.condition.accept(self));
        self.list(&head, &stmt.body)
    }

    fn visit_write(&mut self, stmt: &WriteStmt) -> String {
        format!("(escribir {})", stmt.expression.accept(self))
    }
}

impl ExprVisitor for SexpPrinter {
    type Output = String;

    fn visit_binary(&mut self, expr: &BinaryExpr) -> String {
        format!(
            "({} {} {})",
            expr.operator,
            expr.left.accept(self),
            expr.right.accept(self)
        )
    }

    fn visit_unary(&mut self, expr: &UnaryExpr) -> String {
        format!("({} {})", expr.operator, expr.operand.accept(self))
    }

    fn visit_literal(&mut self, expr: &LiteralExpr) -> String {
        match &expr.value {
            LiteralValue::Integer(n) => n.to_string(),
            LiteralValue::Float(n) => format_float(*n),
            LiteralValue::String(s) => format!("\"{s}\""),
        }
    }

    fn visit_identifier(&mut self, expr: &IdentifierExpr) -> String {
        expr.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i64, offset: usize) -> Box<Expr> {
        Box::new(Expr::Literal(LiteralExpr {
            value: LiteralValue::Integer(value),
            span: Span::new(offset, 1),
        }))
    }

    #[test]
    fn sexp_binary_expression() {
        let program = Program {
            statements: vec![Stmt::Write(WriteStmt {
                expression: Expr::Binary(BinaryExpr {
                    left: int(1, 9),
                    operator: BinaryOp::Add,
                    right: Box::new(Expr::Binary(BinaryExpr {
                        left: int(2, 13),
                        operator: BinaryOp::Multiply,
                        right: int(3, 17),
                        span: Span::new(13, 5),
                    })),
                    span: Span::new(9, 9),
                }),
                span: Span::new(0, 18),
            })],
        };
        assert_eq!(to_sexp(&program).trim(), "(escribir (+ 1 (* 2 3)))");
    }

    #[test]
    fn sexp_float_keeps_decimal_point() {
        let program = Program {
            statements: vec![Stmt::Assign(AssignStmt {
                name: "x".to_string(),
                value: Expr::Literal(LiteralExpr {
                    value: LiteralValue::Float(3.0),
                    span: Span::new(4, 3),
                }),
                span: Span::new(0, 7),
            })],
        };
        assert_eq!(to_sexp(&program).trim(), "(= x 3.0)");
    }

    #[test]
    fn sexp_blocks_and_statements() {
        let program = crate::compile(
            "si (no x) entonces y = \"a\" sino fin_si\nrepite (x < 2.5) escribir -x fin_repite",
        )
        .expect("compile");
        assert_eq!(
            to_sexp(&program),
            "(si (no x) (entonces (= y \"a\")) (sino))\n(repite (< x 2.5) (escribir (- x)))\n"
        );
    }

    #[test]
    fn json_output_is_valid() {
        let program = Program {
            statements: vec![Stmt::Assign(AssignStmt {
                name: "x".to_string(),
                value: *int(42, 4),
                span: Span::new(0, 6),
            })],
        };
        let json = to_json(&program);
        let parsed: serde_json::Value =
            serde_json::from_str(&json).expect("JSON output should be valid");
        assert_eq!(parsed["statements"][0]["type"], "Assign");
        assert_eq!(parsed["statements"][0]["name"], "x");
    }
}
