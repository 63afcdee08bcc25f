use vela_lex::{Token, TokenKind};
use vela_util::{Diagnostic, Handler, Span, Symbol};

use crate::ast::{Block, ControlKeyword, Expr, Literal, Program, Stmt, UnOp};

/// Recursive-descent parser with precedence climbing for expressions.
///
/// On a syntax error, a diagnostic is emitted and the offending
/// statement is skipped up to the next statement boundary (`;` or the
/// enclosing `}`), so parsing can keep producing diagnostics for the
/// rest of the file instead of stopping at the first mistake. Callers
/// must still check [`Handler::has_errors`] before trusting the
/// returned tree.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    handler: &'a Handler,
}

fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    use TokenKind::*;
    Some(match kind {
        Or => (1, 2),
        And => (3, 4),
        Eq | Ne => (5, 6),
        Lt | Le | Gt | Ge => (7, 8),
        Plus | Minus => (9, 10),
        Times | Divide | Mod => (11, 12),
        _ => return None,
    })
}

const UNARY_BP: u8 = 13;

fn token_to_binop(kind: &TokenKind) -> Option<crate::ast::BinOp> {
    use crate::ast::BinOp as B;
    use TokenKind::*;
    Some(match kind {
        Plus => B::Add,
        Minus => B::Sub,
        Times => B::Mul,
        Divide => B::Div,
        Mod => B::Mod,
        Eq => B::Eq,
        Ne => B::Ne,
        Lt => B::Lt,
        Le => B::Le,
        Gt => B::Gt,
        Ge => B::Ge,
        And => B::And,
        Or => B::Or,
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, handler: &'a Handler) -> Self {
        Self { tokens, position: 0, handler }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self, offset: usize) -> &TokenKind {
        let idx = (self.position + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn is_at_end(&self) -> bool {
        self.current().is_eof()
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Token {
        if self.check(&kind) {
            self.advance()
        } else {
            self.error(&format!("expected {what}"));
            self.current().clone()
        }
    }

    /// Like [`Self::expect`], but for identifiers specifically: any
    /// `Identifier(_)` matches regardless of which name was interned
    /// (an `expect(TokenKind::Identifier(..))` would require an exact
    /// symbol match, which is never what callers want here).
    fn expect_identifier(&mut self, what: &str) -> Symbol {
        if let TokenKind::Identifier(name) = self.current().kind {
            self.advance();
            name
        } else {
            self.error(&format!("expected {what}"));
            Symbol::intern("<error>")
        }
    }

    fn describe_current(&self) -> String {
        if self.is_at_end() {
            "EOF".to_string()
        } else {
            format!("{:?}", self.current().kind)
        }
    }

    fn error(&mut self, message: &str) {
        let line = self.current().line;
        let found = self.describe_current();
        Diagnostic::error(format!("{message}, found {found}"))
            .span(Span::at_line(line))
            .emit(self.handler);
    }

    /// Skips tokens until a statement boundary so parsing can resume.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.check(&TokenKind::Semi) {
                self.advance();
                return;
            }
            if self.check(&TokenKind::RBrace) {
                return;
            }
            self.advance();
        }
    }

    pub fn parse(&mut self) -> Program {
        let _span = tracing::debug_span!("par::parse").entered();
        let mut statements = Vec::new();
        while !self.is_at_end() {
            let before = self.handler.error_count();
            let stmt = self.parse_statement();
            if self.handler.error_count() > before {
                self.synchronize();
            }
            if let Some(stmt) = stmt {
                statements.push(stmt);
            }
        }
        Program { statements }
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        match &self.current().kind {
            TokenKind::LBrace => Some(Stmt::Block(self.parse_block())),
            TokenKind::If => Some(self.parse_if()),
            TokenKind::While => Some(self.parse_while()),
            TokenKind::For => Some(self.parse_for()),
            TokenKind::Func => Some(self.parse_function_def()),
            TokenKind::Return => Some(self.parse_return()),
            TokenKind::Break => {
                let line = self.advance().line;
                self.expect(TokenKind::Semi, "';' after 'break'");
                Some(Stmt::ControlFlow { keyword: ControlKeyword::Break, line })
            }
            TokenKind::Continue => {
                let line = self.advance().line;
                self.expect(TokenKind::Semi, "';' after 'continue'");
                Some(Stmt::ControlFlow { keyword: ControlKeyword::Continue, line })
            }
            TokenKind::Identifier(_) if *self.peek_kind(1) == TokenKind::Equals => {
                Some(self.parse_assignment())
            }
            _ => Some(self.parse_expr_statement()),
        }
    }

    fn parse_block(&mut self) -> Block {
        let line = self.expect(TokenKind::LBrace, "'{'").line;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let before = self.handler.error_count();
            let stmt = self.parse_statement();
            if self.handler.error_count() > before {
                self.synchronize();
            }
            if let Some(stmt) = stmt {
                statements.push(stmt);
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        Block { statements, line }
    }

    fn parse_assignment(&mut self) -> Stmt {
        let name_tok = self.advance();
        let line = name_tok.line;
        let target = match name_tok.kind {
            TokenKind::Identifier(s) => s,
            _ => unreachable!("guarded by caller"),
        };
        self.expect(TokenKind::Equals, "'='");
        let value = self.parse_expr(0);
        self.expect(TokenKind::Semi, "';' after assignment");
        Stmt::Assignment { target, value, line }
    }

    /// An init/update clause inside a `for(...)`: either `IDENT = expr`
    /// or a bare expression, with no trailing `;` consumed here.
    fn parse_for_clause(&mut self) -> Stmt {
        if let TokenKind::Identifier(_) = &self.current().kind {
            if *self.peek_kind(1) == TokenKind::Equals {
                let name_tok = self.advance();
                let line = name_tok.line;
                let target = match name_tok.kind {
                    TokenKind::Identifier(s) => s,
                    _ => unreachable!(),
                };
                self.advance(); // '='
                let value = self.parse_expr(0);
                return Stmt::Assignment { target, value, line };
            }
        }
        let line = self.current().line;
        let expr = self.parse_expr(0);
        Stmt::ExprStatement { expr, line }
    }

    fn parse_if(&mut self) -> Stmt {
        let line = self.advance().line; // 'if'
        self.expect(TokenKind::LParen, "'(' after 'if'");
        let condition = self.parse_expr(0);
        self.expect(TokenKind::RParen, "')' after condition");
        let then_body = Box::new(self.parse_statement().unwrap_or_else(|| Self::empty_block_stmt(line)));
        let else_body = if self.check(&TokenKind::Else) {
            self.advance();
            Some(Box::new(self.parse_statement().unwrap_or_else(|| Self::empty_block_stmt(line))))
        } else {
            None
        };
        Stmt::If { condition, then_body, else_body, line }
    }

    fn parse_while(&mut self) -> Stmt {
        let line = self.advance().line; // 'while'
        self.expect(TokenKind::LParen, "'(' after 'while'");
        let condition = self.parse_expr(0);
        self.expect(TokenKind::RParen, "')' after condition");
        let body = Box::new(self.parse_statement().unwrap_or_else(|| Self::empty_block_stmt(line)));
        Stmt::While { condition, body, line }
    }

    fn parse_for(&mut self) -> Stmt {
        let line = self.advance().line; // 'for'
        self.expect(TokenKind::LParen, "'(' after 'for'");

        let init = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(Box::new(self.parse_for_clause()))
        };
        self.expect(TokenKind::Semi, "';' after for-init");

        let condition = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr(0))
        };
        self.expect(TokenKind::Semi, "';' after for-condition");

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_for_clause()))
        };
        self.expect(TokenKind::RParen, "')' after for-update");

        let body = Box::new(self.parse_statement().unwrap_or_else(|| Self::empty_block_stmt(line)));
        Stmt::For { init, condition, update, body, line }
    }

    fn parse_function_def(&mut self) -> Stmt {
        let line = self.advance().line; // 'func'
        let name = self.expect_identifier("function name");
        self.expect(TokenKind::LParen, "'(' after function name");
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier("parameter name"));
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')' after parameters");
        let body = self.parse_block();
        Stmt::FunctionDef { name, params, body, line }
    }

    fn parse_return(&mut self) -> Stmt {
        let line = self.advance().line; // 'return'
        let value = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr(0))
        };
        self.expect(TokenKind::Semi, "';' after return value");
        Stmt::Return { value, line }
    }

    fn parse_expr_statement(&mut self) -> Stmt {
        let line = self.current().line;
        let expr = self.parse_expr(0);
        self.expect(TokenKind::Semi, "';' after expression");
        Stmt::ExprStatement { expr, line }
    }

    fn empty_block_stmt(line: u32) -> Stmt {
        Stmt::Block(Block { statements: Vec::new(), line })
    }

    fn parse_expr(&mut self, min_bp: u8) -> Expr {
        let mut lhs = self.parse_prefix();
        loop {
            let Some((lbp, rbp)) = infix_binding_power(&self.current().kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            let op_tok = self.advance();
            let op = token_to_binop(&op_tok.kind).expect("checked by infix_binding_power");
            let rhs = self.parse_expr(rbp);
            lhs = Expr::BinOp {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                line: op_tok.line,
            };
        }
        lhs
    }

    fn parse_prefix(&mut self) -> Expr {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::Minus => {
                self.advance();
                let expr = self.parse_expr(UNARY_BP);
                Expr::UnaryOp { op: UnOp::Neg, expr: Box::new(expr), line: tok.line }
            }
            TokenKind::Not => {
                self.advance();
                let expr = self.parse_expr(UNARY_BP);
                Expr::UnaryOp { op: UnOp::Not, expr: Box::new(expr), line: tok.line }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr(0);
                self.expect(TokenKind::RParen, "')'");
                expr
            }
            TokenKind::Int(v) => {
                self.advance();
                Expr::Literal { value: Literal::Int(v), line: tok.line }
            }
            TokenKind::Float(v) => {
                self.advance();
                Expr::Literal { value: Literal::Float(v), line: tok.line }
            }
            TokenKind::Str(ref s) => {
                self.advance();
                Expr::Literal { value: Literal::Str(s.clone()), line: tok.line }
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expr(0));
                            if self.check(&TokenKind::Comma) {
                                self.advance();
                            } else {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "')' after arguments");
                    Expr::FunCall { callee: name, args, line: tok.line }
                } else {
                    Expr::Identifier { name, line: tok.line }
                }
            }
            _ => {
                self.error("expected an expression");
                Expr::Literal { value: Literal::Null, line: tok.line }
            }
        }
    }
}

/// Parses a token stream into a [`Program`]. Callers must check
/// `handler.has_errors()` before trusting the result (a syntax error
/// still yields a partial or empty tree, per the driver contract).
pub fn parse(tokens: Vec<Token>, handler: &Handler) -> Program {
    Parser::new(tokens, handler).parse()
}
