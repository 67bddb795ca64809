use crate::ast::*;
use crate::error::CompileError;
use crate::scanner::token::{Span, Token, TokenKind};

/// Deepest run of nested parentheses, unary operators, or blocks.
pub const MAX_NESTING: usize = 64;

/// Tallest expression tree, counting every operator node on the way down.
/// Bounds left-nested chains such as `1 + 1 + ... + 1`, which parse
/// iteratively but are evaluated recursively.
pub const MAX_EXPR_HEIGHT: usize = 256;

/// An expression with the height of its tree.
type Measured = (Expr, usize);

/// Recursive-descent parser over a scanned token list.
///
/// Parsing is strict: the first mismatch aborts with a single
/// `CompileError`, and no partial program is returned.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl Parser {
    /// `tokens` must end with an `Eof` token, as `scanner::scan` guarantees.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<Program, CompileError> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.statement()?);
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt, CompileError> {
        match self.peek().kind {
            TokenKind::Identifier => self.assignment(),
            TokenKind::Si => self.if_statement(),
            TokenKind::Repite => self.loop_statement(),
            TokenKind::Escribir => self.write_statement(),
            _ => Err(self.error_at_current("expected statement")),
        }
    }

    fn assignment(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        let name = self.advance().lexeme.clone();
        self.consume(TokenKind::Equal, "expected '=' after identifier")?;
        let value = self.expression()?;
        let span = self.span_from(start);
        Ok(Stmt::Assign(AssignStmt { name, value, span }))
    }

    fn if_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'si'
        self.consume(TokenKind::LeftParen, "expected '(' after 'si'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "expected ')' after condition")?;
        self.consume(TokenKind::Entonces, "expected 'entonces' after condition")?;

        let then_branch = self.block(&[TokenKind::Sino, TokenKind::FinSi])?;
        let else_branch = if self.match_token(TokenKind::Sino) {
            Some(self.block(&[TokenKind::FinSi])?)
        } else {
            None
        };

        self.consume(TokenKind::FinSi, "expected 'fin_si'")?;
        let span = self.span_from(start);
        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            span,
        }))
    }

    fn loop_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'repite'
        self.consume(TokenKind::LeftParen, "expected '(' after 'repite'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "expected ')' after condition")?;

        let body = self.block(&[TokenKind::FinRepite])?;
        self.consume(TokenKind::FinRepite, "expected 'fin_repite'")?;
        let span = self.span_from(start);
        Ok(Stmt::Loop(LoopStmt {
            condition,
            body,
            span,
        }))
    }

    fn write_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'escribir'
        let expression = self.expression()?;
        let span = self.span_from(start);
        Ok(Stmt::Write(WriteStmt { expression, span }))
    }

    /// Statements up to (not including) one of `terminators` or end of input.
    fn block(&mut self, terminators: &[TokenKind]) -> Result<Vec<Stmt>, CompileError> {
        self.nested("blocks nested too deeply", |parser| {
            let mut statements = Vec::new();
            while !terminators.iter().any(|&kind| parser.check(kind)) && !parser.is_at_end() {
                statements.push(parser.statement()?);
            }
            Ok(statements)
        })
    }

    fn expression(&mut self) -> Result<Expr, CompileError> {
        self.logic().map(|(expr, _)| expr)
    }

    fn logic(&mut self) -> Result<Measured, CompileError> {
        self.binary_level(&[TokenKind::Y, TokenKind::O], Self::equality)
    }

    fn equality(&mut self) -> Result<Measured, CompileError> {
        self.binary_level(
            &[TokenKind::EqualEqual, TokenKind::BangEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> Result<Measured, CompileError> {
        self.binary_level(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> Result<Measured, CompileError> {
        self.binary_level(&[TokenKind::Plus, TokenKind::Minus], Self::factor)
    }

    fn factor(&mut self) -> Result<Measured, CompileError> {
        self.binary_level(
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
            Self::unary,
        )
    }

    /// One left-associative precedence level: `operand (op operand)*`.
    fn binary_level(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> Result<Measured, CompileError>,
    ) -> Result<Measured, CompileError> {
        let (mut expr, mut height) = operand(self)?;
        while let Some(op) = self.match_binary_op(operators) {
            let operator_at = self.current - 1;
            let (right, right_height) = operand(self)?;
            height = height.max(right_height) + 1;
            if height > MAX_EXPR_HEIGHT {
                return Err(CompileError::parse(
                    "expression nested too deeply",
                    &self.tokens[operator_at],
                ));
            }
            let span = expr.span().to(right.span());
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                operator: op,
                right: Box::new(right),
                span,
            });
        }
        Ok((expr, height))
    }

    fn unary(&mut self) -> Result<Measured, CompileError> {
        let operator = match self.peek().kind {
            TokenKind::No => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.primary(),
        };
        let start = self.current_span();
        let operator_at = self.current;
        self.nested("expression nested too deeply", |parser| {
            parser.advance();
            let (operand, height) = parser.unary()?;
            if height + 1 > MAX_EXPR_HEIGHT {
                return Err(CompileError::parse(
                    "expression nested too deeply",
                    &parser.tokens[operator_at],
                ));
            }
            let span = start.to(operand.span());
            let expr = Expr::Unary(UnaryExpr {
                operator,
                operand: Box::new(operand),
                span,
            });
            Ok((expr, height + 1))
        })
    }

    fn primary(&mut self) -> Result<Measured, CompileError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value = parse_number(&token.lexeme).ok_or_else(|| {
                    CompileError::parse(format!("malformed number '{}'", token.lexeme), &token)
                })?;
                Ok((
                    Expr::Literal(LiteralExpr {
                        value,
                        span: token.span,
                    }),
                    1,
                ))
            }
            TokenKind::String => {
                self.advance();
                Ok((
                    Expr::Literal(LiteralExpr {
                        value: LiteralValue::String(token.lexeme),
                        span: token.span,
                    }),
                    1,
                ))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok((
                    Expr::Identifier(IdentifierExpr {
                        name: token.lexeme,
                        span: token.span,
                    }),
                    1,
                ))
            }
            TokenKind::LeftParen => self.nested("expression nested too deeply", |parser| {
                parser.advance();
                let inner = parser.logic()?;
                parser.consume(TokenKind::RightParen, "expected ')' after expression")?;
                Ok(inner)
            }),
            _ => Err(self.error_at_current("expected expression")),
        }
    }

    // --- Helper methods ---

    /// Runs `parse` one nesting level deeper, failing at the current token
    /// once `MAX_NESTING` levels are open.
    fn nested<T>(
        &mut self,
        message: &str,
        parse: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        if self.depth >= MAX_NESTING {
            return Err(CompileError::parse(message, self.peek()));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_binary_op(&mut self, kinds: &[TokenKind]) -> Option<BinaryOp> {
        let kind = self.peek().kind;
        if !kinds.contains(&kind) {
            return None;
        }
        self.advance();
        token_to_binary_op(kind)
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, CompileError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(message))
        }
    }

    /// Error for the current token. Scanner error tokens are reported as
    /// lexical errors whatever the parser was expecting.
    fn error_at_current(&self, expectation: &str) -> CompileError {
        let token = self.peek();
        if token.kind == TokenKind::Error {
            let message = if token.lexeme.starts_with('"') {
                "unterminated string".to_string()
            } else {
                format!("unexpected character '{}'", token.lexeme)
            };
            CompileError::lexical(message, token)
        } else {
            CompileError::parse(expectation, token)
        }
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.current - 1].span
    }

    fn span_from(&self, start: Span) -> Span {
        start.to(self.previous_span())
    }
}

/// Numerals with a `.` are floats, the rest integers. `None` when the text
/// does not fit the target type.
fn parse_number(lexeme: &str) -> Option<LiteralValue> {
    if lexeme.contains('.') {
        lexeme
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(LiteralValue::Float)
    } else {
        lexeme.parse::<i64>().ok().map(LiteralValue::Integer)
    }
}

fn token_to_binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Subtract,
        TokenKind::Star => BinaryOp::Multiply,
        TokenKind::Slash => BinaryOp::Divide,
        TokenKind::Percent => BinaryOp::Modulo,
        TokenKind::EqualEqual => BinaryOp::Equal,
        TokenKind::BangEqual => BinaryOp::NotEqual,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEqual => BinaryOp::LessEqual,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
        TokenKind::Y => BinaryOp::And,
        TokenKind::O => BinaryOp::Or,
        _ => return None,
    };
    Some(op)
}
