pub mod printer;
pub mod visitor;

use serde::Serialize;

use crate::scanner::token::Span;

pub use visitor::{ExprVisitor, StmtVisitor};

/// Top-level program: an ordered list of statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Stmt {
    Assign(AssignStmt),
    If(IfStmt),
    Loop(LoopStmt),
    Write(WriteStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Self::Assign(s) => s.span,
            Self::If(s) => s.span,
            Self::Loop(s) => s.span,
            Self::Write(s) => s.span,
        }
    }
}

/// `name = value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignStmt {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// `si (condition) entonces ... [sino ...] fin_si`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Vec<Stmt>,
    /// `None` when there is no `sino`; `Some(vec![])` for an empty one.
    pub else_branch: Option<Vec<Stmt>>,
    pub span: Span,
}

/// `repite (condition) ... fin_repite`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `escribir expression`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteStmt {
    pub expression: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Literal(LiteralExpr),
    Identifier(IdentifierExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Literal(e) => e.span,
            Self::Identifier(e) => e.span,
        }
    }

    /// Literals and identifiers; everything else is a composite expression.
    pub fn is_atom(&self) -> bool {
        matches!(self, Self::Literal(_) | Self::Identifier(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOp,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Binary operators, displayed with their source spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Modulo,
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEqual,
    #[strum(serialize = "y")]
    And,
    #[strum(serialize = "o")]
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpr {
    pub operator: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum UnaryOp {
    #[strum(serialize = "-")]
    Negate,
    #[strum(serialize = "no")]
    Not,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiteralExpr {
    pub value: LiteralValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    Integer(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifierExpr {
    pub name: String,
    pub span: Span,
}
