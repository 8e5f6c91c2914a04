use crate::ast::*;
use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

const MAX_NESTING_DEPTH: u32 = 256;

pub struct Parser {
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    depth: u32,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned<Lexeme>>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    /// Parse a whole program: a `Group` of top-level statements.
    ///
    /// Reporting stops at the first syntactic violation; the returned
    /// diagnostics carry the source coordinate and what was expected.
    pub fn parse_program(mut self) -> Result<Stmt, Vec<Diagnostic>> {
        let mut stmts = Vec::new();
        while !self.at(&Lexeme::Eof) && self.diagnostics.is_empty() {
            self.parse_stmt(&mut stmts);
        }

        if !self.diagnostics.is_empty() {
            return Err(self.diagnostics);
        }
        Ok(Stmt::Group(stmts))
    }

    /// Parse one statement into `out`.
    ///
    /// Declare-assign sugar (`num x = e;`) appends two statements, which
    /// keeps the tree identical to the explicit two-statement form.
    fn parse_stmt(&mut self, out: &mut Vec<Stmt>) {
        match self.peek().clone() {
            Lexeme::If => {
                let stmt = self.parse_if();
                out.push(stmt);
            }
            Lexeme::While => {
                let stmt = self.parse_while();
                out.push(stmt);
            }
            Lexeme::Return => {
                self.advance();
                let expr = self.parse_expr();
                self.expect(&Lexeme::Semicolon);
                out.push(Stmt::Return(expr));
            }
            Lexeme::Ident(first) => match self.peek_ahead(1) {
                // `type name ...`: declaration, declare-assign, or function
                Lexeme::Ident(_) => self.parse_declaration_or_fn(out),
                Lexeme::Assign => {
                    self.advance();
                    self.advance();
                    let value = self.parse_expr();
                    self.expect(&Lexeme::Semicolon);
                    out.push(Stmt::Assign { name: first, value });
                }
                Lexeme::LParen => {
                    self.advance(); // consume the callee name
                    let call = self.parse_call(first);
                    self.expect(&Lexeme::Semicolon);
                    out.push(Stmt::CallStmt(call));
                }
                _ => {
                    self.advance();
                    self.error_with_help(
                        &format!(
                            "expected declaration, assignment, or call after identifier '{}'",
                            first
                        ),
                        "statements look like `num x;`, `x = 1;`, or `f(1);`",
                    );
                }
            },
            other => {
                self.error_at_current(&format!("expected statement, found {}", other.description()));
                self.advance();
            }
        }
    }

    fn parse_declaration_or_fn(&mut self, out: &mut Vec<Stmt>) {
        let ty_name = self.expect_ident();
        let name = self.expect_ident();
        let ty = Ty(ty_name.node);

        match self.peek() {
            Lexeme::Semicolon => {
                self.advance();
                out.push(Stmt::Declare {
                    name: name.node,
                    ty,
                });
            }
            Lexeme::Assign => {
                self.advance();
                let value = self.parse_expr();
                self.expect(&Lexeme::Semicolon);
                out.push(Stmt::Declare {
                    name: name.node.clone(),
                    ty,
                });
                out.push(Stmt::Assign {
                    name: name.node,
                    value,
                });
            }
            Lexeme::LParen => {
                let def = self.parse_fn_def(name.node, ty);
                out.push(Stmt::FnDef(def));
            }
            other => {
                let msg = format!(
                    "expected ';', '=', or '(' after declaration of '{}', found {}",
                    name.node,
                    other.description()
                );
                self.error_at_current(&msg);
            }
        }
    }

    fn parse_fn_def(&mut self, name: String, return_ty: Ty) -> FnDef {
        self.expect(&Lexeme::LParen);
        let mut params = Vec::new();
        while !self.at(&Lexeme::RParen) && !self.at(&Lexeme::Eof) && self.diagnostics.is_empty() {
            let ty = self.expect_ident();
            let param = self.expect_ident();
            params.push(Param {
                name: param.node,
                ty: Ty(ty.node),
            });
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        self.expect(&Lexeme::RParen);
        let body = self.parse_block();
        FnDef {
            name,
            return_ty,
            params,
            body: Box::new(body),
        }
    }

    fn parse_if(&mut self) -> Stmt {
        self.expect(&Lexeme::If);
        self.expect(&Lexeme::LParen);
        let cond = self.parse_expr();
        self.expect(&Lexeme::RParen);
        let then_body = self.parse_body();

        let else_body = if self.eat(&Lexeme::Else) {
            if self.at(&Lexeme::If) {
                // `else if` chains nest in else position
                Some(Box::new(self.parse_if()))
            } else {
                Some(Box::new(self.parse_body()))
            }
        } else {
            None
        };

        Stmt::If {
            cond,
            then_body: Box::new(then_body),
            else_body,
        }
    }

    fn parse_while(&mut self) -> Stmt {
        self.expect(&Lexeme::While);
        self.expect(&Lexeme::LParen);
        let cond = self.parse_expr();
        self.expect(&Lexeme::RParen);
        let body = self.parse_body();
        Stmt::While {
            cond,
            body: Box::new(body),
        }
    }

    /// A braced block, or a single statement standing for its own block.
    fn parse_body(&mut self) -> Stmt {
        if self.at(&Lexeme::LBrace) {
            self.parse_block()
        } else {
            let mut stmts = Vec::new();
            self.parse_stmt(&mut stmts);
            Stmt::Group(stmts)
        }
    }

    fn parse_block(&mut self) -> Stmt {
        if !self.enter_nesting() {
            return Stmt::Group(Vec::new());
        }
        self.expect(&Lexeme::LBrace);
        let mut stmts = Vec::new();
        while !self.at(&Lexeme::RBrace) && !self.at(&Lexeme::Eof) && self.diagnostics.is_empty() {
            self.parse_stmt(&mut stmts);
        }
        self.expect(&Lexeme::RBrace);
        self.exit_nesting();
        Stmt::Group(stmts)
    }

    // --- Expressions ---

    fn parse_expr(&mut self) -> Expr {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Expr {
        if !self.enter_nesting() {
            return Expr::Literal("0".to_string());
        }
        let mut lhs = self.parse_primary();

        loop {
            let op = match self.peek() {
                Lexeme::EqEq => BinOp::Eq,
                Lexeme::Ne => BinOp::Ne,
                Lexeme::Lt => BinOp::Lt,
                Lexeme::Gt => BinOp::Gt,
                Lexeme::Le => BinOp::Le,
                Lexeme::Ge => BinOp::Ge,
                Lexeme::Plus => BinOp::Add,
                Lexeme::Minus => BinOp::Sub,
                Lexeme::Star => BinOp::Mul,
                Lexeme::Slash => BinOp::Div,
                Lexeme::Percent => BinOp::Mod,
                _ => break,
            };

            let (l_bp, r_bp) = op_binding_power(op);
            if l_bp < min_bp {
                break;
            }

            self.advance(); // consume operator
            let rhs = self.parse_expr_bp(r_bp);
            lhs = Expr::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        self.exit_nesting();
        lhs
    }

    fn parse_primary(&mut self) -> Expr {
        match self.peek().clone() {
            Lexeme::Number(text) => {
                self.advance();
                Expr::Literal(text)
            }
            Lexeme::Ident(name) => {
                self.advance();
                if self.at(&Lexeme::LParen) {
                    self.parse_call(name)
                } else {
                    Expr::Var(name)
                }
            }
            Lexeme::LParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(&Lexeme::RParen);
                inner
            }
            other => {
                self.error_with_help(
                    &format!("expected expression, found {}", other.description()),
                    "expressions are numbers, variables, calls, or parenthesized forms",
                );
                self.advance();
                Expr::Literal("0".to_string())
            }
        }
    }

    /// Parse a call's argument list; the callee name is already consumed.
    fn parse_call(&mut self, callee: String) -> Expr {
        self.expect(&Lexeme::LParen);
        let mut args = Vec::new();
        while !self.at(&Lexeme::RParen) && !self.at(&Lexeme::Eof) && self.diagnostics.is_empty() {
            args.push(self.parse_expr());
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        self.expect(&Lexeme::RParen);
        Expr::Call { callee, args }
    }

    // --- Utility methods ---

    fn enter_nesting(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.error_with_help(
                "nesting depth exceeded (maximum 256 levels)",
                "simplify the program by extracting deeply nested code into functions",
            );
            return false;
        }
        true
    }

    fn exit_nesting(&mut self) {
        self.depth -= 1;
    }

    fn peek(&self) -> &Lexeme {
        &self.tokens[self.pos].node
    }

    fn peek_ahead(&self, n: usize) -> &Lexeme {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].node
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn advance(&mut self) -> &Spanned<Lexeme> {
        let tok = &self.tokens[self.pos];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, token: &Lexeme) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn eat(&mut self, token: &Lexeme) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Lexeme) -> Span {
        if self.at(token) {
            let span = self.current_span();
            self.advance();
            span
        } else {
            self.error_at_current(&format!(
                "expected {}, found {}",
                token.description(),
                self.peek().description()
            ));
            self.current_span()
        }
    }

    fn expect_ident(&mut self) -> Spanned<String> {
        if let Lexeme::Ident(name) = self.peek().clone() {
            let span = self.current_span();
            self.advance();
            Spanned::new(name, span)
        } else {
            self.error_at_current(&format!(
                "expected identifier, found {}",
                self.peek().description()
            ));
            Spanned::new("_error_".to_string(), self.current_span())
        }
    }

    // Only the first violation is reported; everything after it is noise
    // from a parser that has lost its footing.
    fn error_at_current(&mut self, msg: &str) {
        if self.diagnostics.is_empty() {
            self.diagnostics
                .push(Diagnostic::error(msg.to_string(), self.current_span()));
        }
    }

    fn error_with_help(&mut self, msg: &str, help: &str) {
        if self.diagnostics.is_empty() {
            self.diagnostics.push(
                Diagnostic::error(msg.to_string(), self.current_span()).with_help(help.to_string()),
            );
        }
    }
}

/// Returns (left, right) binding power for a binary operator.
/// Higher binding power = higher precedence; all operators left-associate.
fn op_binding_power(op: BinOp) -> (u8, u8) {
    match op {
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => (2, 3),
        BinOp::Add | BinOp::Sub => (4, 5),
        BinOp::Mul | BinOp::Div | BinOp::Mod => (6, 7),
    }
}
