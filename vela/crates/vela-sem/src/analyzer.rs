//! Walks the AST, maintaining a [`SymbolTable`], a `current_function`
//! name, and a `loop_depth` counter, exactly as described by §4.3.
//! Dispatch is an exhaustive match on the AST's tagged variants rather
//! than string-keyed visitor lookup.

use vela_par::{BinOp, Block, ControlKeyword, Expr, Literal, Program, Stmt, UnOp};
use vela_util::{Diagnostic, Handler, Span, Symbol as Name};

use crate::error::SemanticError;
use crate::symbol_table::{Symbol, SymbolTable};
use crate::types::Type;

pub struct SemanticAnalyzer<'a> {
    symbols: SymbolTable,
    current_function: Option<Name>,
    loop_depth: u32,
    handler: &'a Handler,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(handler: &'a Handler) -> Self {
        Self {
            symbols: SymbolTable::new(),
            current_function: None,
            loop_depth: 0,
            handler,
        }
    }

    pub fn analyze(&mut self, program: &Program) -> Result<(), SemanticError> {
        let _span = tracing::debug_span!("sem::analyze").entered();
        for stmt in &program.statements {
            if let Err(e) = self.analyze_stmt(stmt) {
                Diagnostic::error(e.to_string()).span(Span::at_line(e.line())).emit(self.handler);
                return Err(e);
            }
        }
        Ok(())
    }

    fn analyze_scoped(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        self.symbols.push_scope();
        let result = match stmt {
            Stmt::Block(block) => self.analyze_statements(&block.statements),
            other => self.analyze_stmt(other),
        };
        self.symbols.pop_scope();
        result
    }

    fn analyze_statements(&mut self, statements: &[Stmt]) -> Result<(), SemanticError> {
        for stmt in statements {
            self.analyze_stmt(stmt)?;
        }
        Ok(())
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::ExprStatement { expr, .. } => {
                self.analyze_expr(expr)?;
                Ok(())
            }
            Stmt::Assignment { target, value, line } => {
                self.analyze_assignment(*target, value, *line)
            }
            Stmt::Block(_) => self.analyze_scoped(stmt),
            Stmt::If { condition, then_body, else_body, .. } => {
                self.analyze_expr(condition)?;
                self.analyze_scoped(then_body)?;
                if let Some(else_body) = else_body {
                    self.analyze_scoped(else_body)?;
                }
                Ok(())
            }
            Stmt::While { condition, body, .. } => {
                self.analyze_expr(condition)?;
                self.loop_depth += 1;
                let result = self.analyze_scoped(body);
                self.loop_depth -= 1;
                result
            }
            Stmt::For { init, condition, update, body, .. } => self.analyze_for(init, condition, update, body),
            Stmt::FunctionDef { name, params, body, line } => {
                self.analyze_function_def(*name, params, body, *line)
            }
            Stmt::Return { value, line } => self.analyze_return(value, *line),
            Stmt::ControlFlow { keyword, line } => self.analyze_control_flow(*keyword, *line),
        }
    }

    fn analyze_assignment(&mut self, target: Name, value: &Expr, line: u32) -> Result<(), SemanticError> {
        let value_type = self.analyze_expr(value)?;
        match self.symbols.resolve(target) {
            Some(existing) => {
                let current = existing.ty;
                if value_type == Type::Null {
                    if current == Type::Unknown {
                        self.symbols.set_type(target, Type::Null);
                    }
                    // otherwise: assigning null over a concrete type is a no-op
                } else {
                    self.symbols.set_type(target, value_type);
                }
            }
            None => {
                self.symbols.declare(Symbol::new(target, value_type, line));
            }
        }
        Ok(())
    }

    fn analyze_for(
        &mut self,
        init: &Option<Box<Stmt>>,
        condition: &Option<Expr>,
        update: &Option<Box<Stmt>>,
        body: &Stmt,
    ) -> Result<(), SemanticError> {
        self.symbols.push_scope();
        let result = (|| {
            if let Some(init) = init {
                self.analyze_stmt(init)?;
            }
            if let Some(condition) = condition {
                self.analyze_expr(condition)?;
            }
            if let Some(update) = update {
                self.analyze_stmt(update)?;
            }
            self.loop_depth += 1;
            let body_result = self.analyze_scoped(body);
            self.loop_depth -= 1;
            body_result
        })();
        self.symbols.pop_scope();
        result
    }

    fn analyze_function_def(
        &mut self,
        name: Name,
        params: &[Name],
        body: &Block,
        line: u32,
    ) -> Result<(), SemanticError> {
        self.symbols.declare(Symbol::function(name, params.to_vec(), line));
        self.symbols.push_scope();
        let previous_function = self.current_function.replace(name);
        for param in params {
            self.symbols.declare(Symbol::new(*param, Type::Unknown, line));
        }
        let result = self.analyze_scoped(&Stmt::Block(body.clone()));
        self.current_function = previous_function;
        self.symbols.pop_scope();
        result
    }

    fn analyze_return(&mut self, value: &Option<Expr>, line: u32) -> Result<(), SemanticError> {
        if self.current_function.is_none() {
            return Err(SemanticError::ReturnOutsideFunction { line });
        }
        if let Some(value) = value {
            self.analyze_expr(value)?;
        }
        Ok(())
    }

    fn analyze_control_flow(&mut self, keyword: ControlKeyword, line: u32) -> Result<(), SemanticError> {
        if self.loop_depth == 0 {
            let keyword = match keyword {
                ControlKeyword::Break => "break",
                ControlKeyword::Continue => "continue",
            };
            return Err(SemanticError::ControlFlowOutsideLoop { keyword, line });
        }
        Ok(())
    }

    fn analyze_expr(&mut self, expr: &Expr) -> Result<Type, SemanticError> {
        match expr {
            Expr::Literal { value, .. } => Ok(literal_type(value)),
            Expr::Identifier { name, line } => self
                .symbols
                .resolve(*name)
                .map(|sym| sym.ty)
                .ok_or(SemanticError::UndefinedVariable { name: name.to_string(), line: *line }),
            Expr::BinOp { op, left, right, line } => self.analyze_binop(*op, left, right, *line),
            Expr::UnaryOp { op, expr, .. } => self.analyze_unary(*op, expr),
            Expr::FunCall { callee, args, line } => self.analyze_funcall(*callee, args, *line),
        }
    }

    fn analyze_unary(&mut self, _op: UnOp, expr: &Expr) -> Result<Type, SemanticError> {
        self.analyze_expr(expr)
    }

    fn analyze_funcall(&mut self, callee: Name, args: &[Expr], line: u32) -> Result<Type, SemanticError> {
        let symbol = self
            .symbols
            .resolve(callee)
            .cloned()
            .ok_or(SemanticError::UndefinedVariable { name: callee.to_string(), line })?;
        if symbol.ty != Type::Function {
            return Err(SemanticError::NotAFunction { name: callee.to_string(), line });
        }
        if args.len() != symbol.params.len() {
            return Err(SemanticError::ArityMismatch { name: callee.to_string(), line });
        }
        for arg in args {
            self.analyze_expr(arg)?;
        }
        Ok(Type::Unknown)
    }

    fn analyze_binop(&mut self, op: BinOp, left: &Expr, right: &Expr, line: u32) -> Result<Type, SemanticError> {
        let mut lt = self.analyze_expr(left)?;
        let mut rt = self.analyze_expr(right)?;

        if lt == Type::Unknown && rt != Type::Unknown {
            lt = rt;
            self.propagate_to_identifier(left, lt);
        }
        if rt == Type::Unknown && lt != Type::Unknown {
            rt = lt;
            self.propagate_to_identifier(right, rt);
        }
        if lt == Type::Unknown && rt == Type::Unknown && is_arithmetic(op) {
            lt = Type::Int;
            rt = Type::Int;
            self.propagate_to_identifier(left, lt);
            self.propagate_to_identifier(right, rt);
        }

        if op == BinOp::Add && (lt == Type::String || rt == Type::String) {
            return Ok(Type::String);
        }

        if op == BinOp::Mod {
            return if lt == Type::Int && rt == Type::Int {
                Ok(Type::Int)
            } else {
                Err(SemanticError::NonIntegerModulo {
                    lhs: lt.name().to_string(),
                    rhs: rt.name().to_string(),
                    line,
                })
            };
        }

        if matches!(op, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div) {
            if lt.is_numeric() && rt.is_numeric() {
                return Ok(if lt == Type::Float || rt == Type::Float { Type::Float } else { Type::Int });
            }
            return Err(SemanticError::TypeMismatch {
                message: format!("operator '{}' not supported between '{lt}' and '{rt}'", op_symbol(op)),
                line,
            });
        }

        if matches!(op, BinOp::Eq | BinOp::Ne) {
            if lt == Type::Null || rt == Type::Null {
                return Ok(Type::Bool);
            }
            if lt != rt {
                return Err(SemanticError::TypeMismatch {
                    message: format!("cannot compare '{lt}' with '{rt}' using '{}'", op_symbol(op)),
                    line,
                });
            }
            return Ok(Type::Bool);
        }

        if matches!(op, BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge) {
            if lt.is_numeric() && rt.is_numeric() {
                return Ok(Type::Bool);
            }
            if lt == Type::String && rt == Type::String {
                return Ok(Type::Bool);
            }
            return Err(SemanticError::TypeMismatch {
                message: format!("operator '{}' not supported between '{lt}' and '{rt}'", op_symbol(op)),
                line,
            });
        }

        // And | Or
        if lt == Type::Bool && rt == Type::Bool {
            Ok(Type::Bool)
        } else {
            Err(SemanticError::TypeMismatch {
                message: format!(
                    "logical operator '{}' requires bool operands, got '{lt}' and '{rt}'",
                    op_symbol(op)
                ),
                line,
            })
        }
    }

    fn propagate_to_identifier(&mut self, expr: &Expr, ty: Type) {
        if let Expr::Identifier { name, .. } = expr {
            self.symbols.set_type(*name, ty);
        }
    }
}

fn is_arithmetic(op: BinOp) -> bool {
    matches!(op, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod)
}

fn literal_type(literal: &Literal) -> Type {
    match literal {
        Literal::Int(_) => Type::Int,
        Literal::Float(_) => Type::Float,
        Literal::Str(_) => Type::String,
        Literal::Bool(_) => Type::Bool,
        Literal::Null => Type::Null,
    }
}

fn op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}
