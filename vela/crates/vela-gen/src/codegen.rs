//! Lowers an AST into a flat `Vec<Instr>`, per §4.4. Program statements
//! are emitted in two passes: non-function statements first, then
//! `HALT`, then every function body, so straight-line execution from
//! index 0 never falls through into a function.

use vela_par::{BinOp, Block, Expr, Literal, Program, Stmt, UnOp};
use vela_util::Symbol;

use crate::error::CodegenError;
use crate::instr::{Instr, Value};

pub struct CodeGenerator {
    code: Vec<Instr>,
    function_code: Vec<Instr>,
    label_count: u32,
    loop_stack: Vec<(String, String)>,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self { code: Vec::new(), function_code: Vec::new(), label_count: 0, loop_stack: Vec::new() }
    }

    pub fn generate(program: &Program) -> Result<Vec<Instr>, CodegenError> {
        let _span = tracing::debug_span!("gen::generate").entered();
        let mut generator = Self::new();
        generator.gen_program(program)?;
        Ok(generator.code)
    }

    fn new_label(&mut self, prefix: &str) -> String {
        self.label_count += 1;
        format!("{prefix}{}", self.label_count)
    }

    fn gen_program(&mut self, program: &Program) -> Result<(), CodegenError> {
        for stmt in &program.statements {
            if !matches!(stmt, Stmt::FunctionDef { .. }) {
                self.gen_stmt(stmt)?;
            }
        }
        self.code.push(Instr::Halt);
        for stmt in &program.statements {
            if let Stmt::FunctionDef { name, params, body, .. } = stmt {
                self.gen_function_def(*name, params, body)?;
            }
        }
        let function_code = std::mem::take(&mut self.function_code);
        self.code.extend(function_code);
        Ok(())
    }

    fn gen_function_def(&mut self, name: Symbol, params: &[Symbol], body: &Block) -> Result<(), CodegenError> {
        let saved = std::mem::take(&mut self.code);
        self.code.push(Instr::Label(format!("FUNC_{name}")));
        for param in params.iter().rev() {
            self.code.push(Instr::Store(param.to_string()));
        }
        for stmt in &body.statements {
            self.gen_stmt(stmt)?;
        }
        self.code.push(Instr::Push(Value::Int(0)));
        self.code.push(Instr::Ret);
        let generated = std::mem::replace(&mut self.code, saved);
        self.function_code.extend(generated);
        Ok(())
    }

    fn gen_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::ExprStatement { expr, .. } => {
                self.gen_expr(expr);
                self.code.push(Instr::Pop);
                Ok(())
            }
            Stmt::Assignment { target, value, .. } => {
                self.gen_expr(value);
                self.code.push(Instr::Store(target.to_string()));
                Ok(())
            }
            Stmt::Block(block) => {
                for stmt in &block.statements {
                    self.gen_stmt(stmt)?;
                }
                Ok(())
            }
            Stmt::If { condition, then_body, else_body, .. } => self.gen_if(condition, then_body, else_body.as_deref()),
            Stmt::While { condition, body, .. } => self.gen_while(condition, body),
            Stmt::For { init, condition, update, body, .. } => {
                self.gen_for(init.as_deref(), condition.as_ref(), update.as_deref(), body)
            }
            Stmt::FunctionDef { name, params, body, .. } => self.gen_function_def(*name, params, body),
            Stmt::Return { value, .. } => {
                match value {
                    Some(value) => self.gen_expr(value),
                    None => self.code.push(Instr::Push(Value::Int(0))),
                }
                self.code.push(Instr::Ret);
                Ok(())
            }
            Stmt::ControlFlow { keyword, line } => self.gen_control_flow(*keyword, *line),
        }
    }

    fn gen_if(&mut self, condition: &Expr, then_body: &Stmt, else_body: Option<&Stmt>) -> Result<(), CodegenError> {
        let else_label = self.new_label("ELSE");
        let end_label = self.new_label("ENDIF");

        self.gen_expr(condition);
        self.code.push(Instr::Jz(else_label.clone()));
        self.gen_stmt(then_body)?;
        self.code.push(Instr::Jmp(end_label.clone()));
        self.code.push(Instr::Label(else_label));
        if let Some(else_body) = else_body {
            self.gen_stmt(else_body)?;
        }
        self.code.push(Instr::Label(end_label));
        Ok(())
    }

    fn gen_while(&mut self, condition: &Expr, body: &Stmt) -> Result<(), CodegenError> {
        let start_label = self.new_label("WHILE_START");
        let end_label = self.new_label("WHILE_END");
        self.loop_stack.push((end_label.clone(), start_label.clone()));

        self.code.push(Instr::Label(start_label.clone()));
        self.gen_expr(condition);
        self.code.push(Instr::JmpIfFalse(end_label.clone()));
        let result = self.gen_stmt(body);
        self.code.push(Instr::Jmp(start_label));
        self.code.push(Instr::Label(end_label));

        self.loop_stack.pop();
        result
    }

    fn gen_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        update: Option<&Stmt>,
        body: &Stmt,
    ) -> Result<(), CodegenError> {
        if let Some(init) = init {
            self.gen_stmt(init)?;
        }

        let start_label = self.new_label("FOR_START");
        let end_label = self.new_label("FOR_END");
        let update_label = self.new_label("FOR_UPDATE");
        self.loop_stack.push((end_label.clone(), update_label.clone()));

        let result = (|| {
            self.code.push(Instr::Label(start_label.clone()));
            if let Some(condition) = condition {
                self.gen_expr(condition);
                self.code.push(Instr::JmpIfFalse(end_label.clone()));
            }
            self.gen_stmt(body)?;
            self.code.push(Instr::Label(update_label.clone()));
            if let Some(update) = update {
                self.gen_stmt(update)?;
            }
            self.code.push(Instr::Jmp(start_label));
            Ok(())
        })();
        self.code.push(Instr::Label(end_label));

        self.loop_stack.pop();
        result
    }

    fn gen_control_flow(&mut self, keyword: vela_par::ControlKeyword, line: u32) -> Result<(), CodegenError> {
        let Some((break_label, continue_label)) = self.loop_stack.last().cloned() else {
            let keyword_name = match keyword {
                vela_par::ControlKeyword::Break => "break",
                vela_par::ControlKeyword::Continue => "continue",
            };
            return Err(CodegenError::ControlFlowOutsideLoop { keyword: keyword_name, line });
        };
        match keyword {
            vela_par::ControlKeyword::Break => self.code.push(Instr::Jmp(break_label)),
            vela_par::ControlKeyword::Continue => self.code.push(Instr::Jmp(continue_label)),
        }
        Ok(())
    }

    fn gen_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal { value, .. } => self.code.push(Instr::Push(literal_value(value))),
            Expr::Identifier { name, .. } => self.code.push(Instr::Load(name.to_string())),
            Expr::BinOp { op, left, right, .. } => {
                self.gen_expr(left);
                self.gen_expr(right);
                self.code.push(binop_instr(*op));
            }
            Expr::UnaryOp { op, expr, .. } => {
                self.gen_expr(expr);
                if *op == UnOp::Neg {
                    self.code.push(Instr::Neg);
                }
                // Unary '!' carries no runtime opcode; preserved from the
                // original, which never defined a logical-not instruction.
            }
            Expr::FunCall { callee, args, .. } => {
                for arg in args {
                    self.gen_expr(arg);
                }
                self.code.push(Instr::Call { label: format!("FUNC_{callee}"), argc: args.len() });
            }
        }
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Int(v) => Value::Int(*v),
        Literal::Float(v) => Value::Float(*v),
        Literal::Str(s) => Value::Str(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
        // unreachable from valid source: the grammar has no literal
        // syntax for `null`; kept for exhaustiveness of the AST match.
        Literal::Null => Value::Int(0),
    }
}

fn binop_instr(op: BinOp) -> Instr {
    match op {
        BinOp::Add => Instr::Add,
        BinOp::Sub => Instr::Sub,
        BinOp::Mul => Instr::Mul,
        BinOp::Div => Instr::Div,
        BinOp::Mod => Instr::Mod,
        BinOp::Lt => Instr::Lt,
        BinOp::Le => Instr::Le,
        BinOp::Gt => Instr::Gt,
        BinOp::Ge => Instr::Ge,
        BinOp::Eq => Instr::Eq,
        BinOp::Ne => Instr::Ne,
        BinOp::And => Instr::And,
        BinOp::Or => Instr::Or,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> Vec<Instr> {
        let handler = vela_util::Handler::new();
        let tokens = vela_lex::tokenize(source, &handler);
        let program = vela_par::parse(tokens, &handler);
        assert!(!handler.has_errors());
        CodeGenerator::generate(&program).expect("codegen should succeed")
    }

    #[test]
    fn arithmetic_assignment_emits_expected_sequence() {
        let code = compile("x = 2 + 3 * 4;");
        let text: Vec<String> = code.iter().map(Instr::to_text).collect();
        assert_eq!(
            text,
            vec!["PUSH 2", "PUSH 3", "PUSH 4", "MUL", "ADD", "STORE x", "HALT"]
        );
    }

    #[test]
    fn halt_precedes_function_bodies() {
        let code = compile("func add(a, b) { return a + b; } z = add(7, 35);");
        let halt_index = code.iter().position(|i| *i == Instr::Halt).unwrap();
        let func_label_index = code.iter().position(|i| matches!(i, Instr::Label(l) if l == "FUNC_add")).unwrap();
        assert!(halt_index < func_label_index);
    }

    #[test]
    fn break_outside_loop_is_rejected_defensively() {
        let handler = vela_util::Handler::new();
        let tokens = vela_lex::tokenize("if (1) { break; }", &handler);
        let program = vela_par::parse(tokens, &handler);
        let result = CodeGenerator::generate(&program);
        assert!(matches!(result, Err(CodegenError::ControlFlowOutsideLoop { .. })));
    }

    #[test]
    fn for_loop_emits_update_before_backward_jump() {
        let code = compile("for (i = 0; i < 10; i = i + 1) { }");
        let update_label_pos =
            code.iter().position(|i| matches!(i, Instr::Label(l) if l.starts_with("FOR_UPDATE"))).unwrap();
        let store_i_pos = code
            .iter()
            .skip(update_label_pos)
            .position(|i| matches!(i, Instr::Store(name) if name == "i"))
            .unwrap()
            + update_label_pos;
        assert!(store_i_pos > update_label_pos);
    }
}
