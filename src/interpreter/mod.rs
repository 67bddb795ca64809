pub mod scope;
pub mod value;

use std::cmp::Ordering;
use std::io::Write;

use crate::ast::*;
use crate::error::RuntimeError;
use crate::interpreter::scope::ScopeTable;
use crate::interpreter::value::Value;
use crate::scanner::token::Span;

/// Tree-walking interpreter. Statements run for effect; every `escribir`
/// writes one line to the sink. Only a capturing interpreter also keeps
/// the lines in `output()`.
pub struct Interpreter {
    scopes: ScopeTable,
    output: Vec<String>,
    capture: bool,
    /// Writer for program output (allows testing without stdout)
    writer: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write>) -> Self {
        Self {
            scopes: ScopeTable::new(),
            output: Vec::new(),
            capture: false,
            writer,
        }
    }

    /// Create an interpreter that discards its output stream and records
    /// each written line in `output()` instead.
    pub fn capturing() -> Self {
        Self {
            capture: true,
            ..Self::with_writer(Box::new(std::io::sink()))
        }
    }

    /// Run a program from a fresh scope table.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.scopes = ScopeTable::new();
        self.output.clear();
        self.run_additional(program)
    }

    /// Run a program against the variables left by earlier runs (for REPL).
    pub fn run_additional(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let result = program.accept(self);
        self.writer.flush()?;
        result
    }

    /// Lines written by the last `run` and any later `run_additional`.
    /// Always empty unless the interpreter was built with `capturing()`.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn scopes(&self) -> &ScopeTable {
        &self.scopes
    }

    /// Runs `statements` in a fresh frame, popping it on success and on error.
    fn execute_block(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        self.scopes.enter_scope();
        let result = statements.iter().try_for_each(|s| s.accept(self));
        self.scopes.exit_scope();
        result
    }
}

impl StmtVisitor for Interpreter {
    type Output = Result<(), RuntimeError>;

    fn visit_program(&mut self, program: &Program) -> Result<(), RuntimeError> {
        program.statements.iter().try_for_each(|s| s.accept(self))
    }

    fn visit_assign(&mut self, stmt: &AssignStmt) -> Result<(), RuntimeError> {
        let value = stmt.value.accept(self)?;
        if self.scopes.exists(&stmt.name) {
            self.scopes
                .assign(&stmt.name, value)
                .map_err(|e| e.at(stmt.span))
        } else {
            self.scopes.define(stmt.name.clone(), value);
            Ok(())
        }
    }

    fn visit_if(&mut self, stmt: &IfStmt) -> Result<(), RuntimeError> {
        if stmt.condition.accept(self)?.is_truthy() {
            self.execute_block(&stmt.then_branch)
        } else if let Some(ref else_branch) = stmt.else_branch {
            self.execute_block(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_loop(&mut self, stmt: &LoopStmt) -> Result<(), RuntimeError> {
        while stmt.condition.accept(self)?.is_truthy() {
            self.execute_block(&stmt.body)?;
        }
        Ok(())
    }

    fn visit_write(&mut self, stmt: &WriteStmt) -> Result<(), RuntimeError> {
        let text = stmt.expression.accept(self)?.to_string();
        writeln!(self.writer, "{text}")?;
        if self.capture {
            self.output.push(text);
        }
        Ok(())
    }
}

impl ExprVisitor for Interpreter {
    type Output = Result<Value, RuntimeError>;

    fn visit_binary(&mut self, expr: &BinaryExpr) -> Result<Value, RuntimeError> {
        // Both operands are evaluated, left first, for every operator
        let left = expr.left.accept(self)?;
        let right = expr.right.accept(self)?;
        let span = expr.span;

        match expr.operator {
            BinaryOp::Add => add(&left, &right, span),
            BinaryOp::Subtract => arithmetic(&left, &right, expr, i64::checked_sub, |a, b| a - b),
            BinaryOp::Multiply => arithmetic(&left, &right, expr, i64::checked_mul, |a, b| a * b),
            BinaryOp::Divide => divide(&left, &right, span),
            BinaryOp::Modulo => modulo(&left, &right, span),
            BinaryOp::Equal => Ok(Value::Bool(left.is_equal(&right))),
            BinaryOp::NotEqual => Ok(Value::Bool(!left.is_equal(&right))),
            BinaryOp::Less => relational(&left, &right, expr, Ordering::is_lt),
            BinaryOp::LessEqual => relational(&left, &right, expr, Ordering::is_le),
            BinaryOp::Greater => relational(&left, &right, expr, Ordering::is_gt),
            BinaryOp::GreaterEqual => relational(&left, &right, expr, Ordering::is_ge),
            BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
            BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        }
    }

    fn visit_unary(&mut self, expr: &UnaryExpr) -> Result<Value, RuntimeError> {
        let operand = expr.operand.accept(self)?;
        match expr.operator {
            UnaryOp::Negate => match operand {
                Value::Integer(n) => n.checked_neg().map(Value::Integer).ok_or_else(|| {
                    RuntimeError::IntegerOverflow {
                        operator: "-".to_string(),
                        span: Some(expr.span),
                    }
                }),
                Value::Float(n) => Ok(Value::Float(-n)),
                other => Err(RuntimeError::invalid_operand(
                    format!("operand of '-' must be a number, found {}", other.value_type()),
                    expr.span,
                )),
            },
            UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        }
    }

    fn visit_literal(&mut self, expr: &LiteralExpr) -> Result<Value, RuntimeError> {
        Ok(Value::from(&expr.value))
    }

    fn visit_identifier(&mut self, expr: &IdentifierExpr) -> Result<Value, RuntimeError> {
        self.scopes.get(&expr.name).map_err(|e| e.at(expr.span))
    }
}

fn operand_types(left: &Value, right: &Value) -> String {
    format!("{} and {}", left.value_type(), right.value_type())
}

/// `+` concatenates when either side is a string, otherwise adds numbers.
fn add(left: &Value, right: &Value, span: Span) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(format!("{left}{right}"))),
        (Value::Integer(a), Value::Integer(b)) => {
            a.checked_add(*b)
                .map(Value::Integer)
                .ok_or_else(|| RuntimeError::IntegerOverflow {
                    operator: "+".to_string(),
                    span: Some(span),
                })
        }
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => Ok(Value::Float(a + b)),
            _ => Err(RuntimeError::invalid_operand(
                format!(
                    "operands of '+' must be numbers or strings, found {}",
                    operand_types(left, right)
                ),
                span,
            )),
        },
    }
}

/// Integer arithmetic when both sides are integers, float otherwise.
fn arithmetic(
    left: &Value,
    right: &Value,
    expr: &BinaryExpr,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    if let (Value::Integer(a), Value::Integer(b)) = (left, right) {
        return int_op(*a, *b)
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::IntegerOverflow {
                operator: expr.operator.to_string(),
                span: Some(expr.span),
            });
    }
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok(Value::Float(float_op(a, b))),
        _ => Err(RuntimeError::invalid_operand(
            format!(
                "operands of '{}' must be numbers, found {}",
                expr.operator,
                operand_types(left, right)
            ),
            expr.span,
        )),
    }
}

/// Division always promotes both operands to float.
fn divide(left: &Value, right: &Value, span: Span) -> Result<Value, RuntimeError> {
    match (left.as_number(), right.as_number()) {
        (Some(_), Some(b)) if b == 0.0 => Err(RuntimeError::DivisionByZero { span: Some(span) }),
        (Some(a), Some(b)) => Ok(Value::Float(a / b)),
        _ => Err(RuntimeError::invalid_operand(
            format!(
                "operands of '/' must be numbers, found {}",
                operand_types(left, right)
            ),
            span,
        )),
    }
}

fn modulo(left: &Value, right: &Value, span: Span) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Integer(_), Value::Integer(0)) => {
            Err(RuntimeError::ModuloByZero { span: Some(span) })
        }
        (Value::Integer(a), Value::Integer(b)) => {
            a.checked_rem(*b)
                .map(Value::Integer)
                .ok_or_else(|| RuntimeError::IntegerOverflow {
                    operator: "%".to_string(),
                    span: Some(span),
                })
        }
        _ => Err(RuntimeError::invalid_operand(
            format!(
                "operands of '%' must be integers, found {}",
                operand_types(left, right)
            ),
            span,
        )),
    }
}

/// Numbers compare by promoted float value, strings lexicographically;
/// any other pairing is an error. NaN compares false against everything.
fn relational(
    left: &Value,
    right: &Value,
    expr: &BinaryExpr,
    holds: fn(Ordering) -> bool,
) -> Result<Value, RuntimeError> {
    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => {
                return Err(RuntimeError::invalid_operand(
                    format!(
                        "cannot compare {} with '{}'",
                        operand_types(left, right),
                        expr.operator
                    ),
                    expr.span,
                ));
            }
        },
    };
    Ok(Value::Bool(ordering.is_some_and(holds)))
}
