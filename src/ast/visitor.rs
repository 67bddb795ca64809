//! Double-dispatch traversal over the closed node set.
//!
//! A traversal implements both traits once; nodes route themselves to the
//! matching `visit_*` method through `accept`. Adding a traversal never
//! touches the node definitions.

use crate::ast::*;

pub trait StmtVisitor {
    type Output;

    fn visit_program(&mut self, program: &Program) -> Self::Output;
    fn visit_assign(&mut self, stmt: &AssignStmt) -> Self::Output;
    fn visit_if(&mut self, stmt: &IfStmt) -> Self::Output;
    fn visit_loop(&mut self, stmt: &LoopStmt) -> Self::Output;
    fn visit_write(&mut self, stmt: &WriteStmt) -> Self::Output;
}

pub trait ExprVisitor {
    type Output;

    fn visit_binary(&mut self, expr: &BinaryExpr) -> Self::Output;
    fn visit_unary(&mut self, expr: &UnaryExpr) -> Self::Output;
    fn visit_literal(&mut self, expr: &LiteralExpr) -> Self::Output;
    fn visit_identifier(&mut self, expr: &IdentifierExpr) -> Self::Output;
}

impl Program {
    pub fn accept<V: StmtVisitor>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_program(self)
    }
}

impl Stmt {
    pub fn accept<V: StmtVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Assign(s) => visitor.visit_assign(s),
            Self::If(s) => visitor.visit_if(s),
            Self::Loop(s) => visitor.visit_loop(s),
            Self::Write(s) => visitor.visit_write(s),
        }
    }
}

impl Expr {
    pub fn accept<V: ExprVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Binary(e) => visitor.visit_binary(e),
            Self::Unary(e) => visitor.visit_unary(e),
            Self::Literal(e) => visitor.visit_literal(e),
            Self::Identifier(e) => visitor.visit_identifier(e),
        }
    }
}
