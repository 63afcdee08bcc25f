//! The stack machine, per §4.5/§3.5. Operand stack, a flat variable
//! map, a call stack of return addresses, and an instruction pointer.

use rustc_hash::FxHashMap;
use vela_gen::Instr;

use crate::error::VmError;
use crate::value::RtValue;

pub struct StackMachine {
    code: Vec<Instr>,
    labels: FxHashMap<String, usize>,
    stack: Vec<RtValue>,
    vars: FxHashMap<String, RtValue>,
    call_stack: Vec<usize>,
    ip: usize,
}

impl StackMachine {
    pub fn new(code: Vec<Instr>) -> Self {
        let labels = code
            .iter()
            .enumerate()
            .filter_map(|(i, instr)| match instr {
                Instr::Label(name) => Some((name.clone(), i)),
                _ => None,
            })
            .collect();
        Self { code, labels, stack: Vec::new(), vars: FxHashMap::default(), call_stack: Vec::new(), ip: 0 }
    }

    /// Runs to completion and returns the final variable map.
    pub fn run(&mut self) -> Result<FxHashMap<String, RtValue>, VmError> {
        let _span = tracing::debug_span!("vm::run").entered();
        while self.ip < self.code.len() {
            let instr = self.code[self.ip].clone();
            self.ip += 1;
            if self.step(&instr)? {
                break;
            }
        }
        Ok(self.vars.clone())
    }

    /// Executes one instruction. Returns `Ok(true)` when execution should
    /// halt (HALT, or RET from the top-level frame).
    fn step(&mut self, instr: &Instr) -> Result<bool, VmError> {
        match instr {
            Instr::Label(_) => {}
            Instr::Push(v) => self.stack.push(v.clone().into()),
            Instr::Load(name) => {
                let value = self.vars.get(name).cloned().unwrap_or(RtValue::Int(0));
                self.stack.push(value);
            }
            Instr::Store(name) => {
                let value = self.pop()?;
                self.vars.insert(name.clone(), value);
            }
            Instr::Add => self.binary_numeric("add", |a, b| a + b, |a, b| a + b)?,
            Instr::Sub => self.binary_numeric("subtract", |a, b| a - b, |a, b| a - b)?,
            Instr::Mul => self.binary_arith(|a, b| a * b, |a, b| a * b)?,
            Instr::Div => self.div()?,
            Instr::Mod => self.modulo()?,
            Instr::Lt => self.compare(|o| o.is_lt())?,
            Instr::Le => self.compare(|o| o.is_le())?,
            Instr::Gt => self.compare(|o| o.is_gt())?,
            Instr::Ge => self.compare(|o| o.is_ge())?,
            Instr::Eq => self.equality(true)?,
            Instr::Ne => self.equality(false)?,
            Instr::And => self.logical(|a| !a)?,
            Instr::Or => self.logical(|a| a)?,
            Instr::Neg => self.negate()?,
            Instr::Jz(label) | Instr::JmpIfFalse(label) => {
                let cond = self.pop()?;
                if !cond.is_truthy() {
                    self.jump(label)?;
                }
            }
            Instr::Jmp(label) => self.jump(label)?,
            Instr::Call { label, .. } => {
                self.call_stack.push(self.ip);
                self.jump(label)?;
            }
            Instr::Ret => {
                let Some(return_ip) = self.call_stack.pop() else {
                    return Ok(true);
                };
                self.ip = return_ip;
            }
            Instr::Pop => {
                self.pop()?;
            }
            Instr::Halt => return Ok(true),
        }
        Ok(false)
    }

    fn jump(&mut self, label: &str) -> Result<(), VmError> {
        let target = self.labels.get(label).ok_or_else(|| VmError::UnknownLabel(label.to_string()))?;
        self.ip = *target;
        Ok(())
    }

    fn pop(&mut self) -> Result<RtValue, VmError> {
        self.stack.pop().ok_or(VmError::StackUnderflow)
    }

    fn pop_pair(&mut self) -> Result<(RtValue, RtValue), VmError> {
        let b = self.pop()?;
        let a = self.pop()?;
        Ok((a, b))
    }

    /// `ADD`/`SUB`: the only opcodes the VM itself type-checks.
    fn binary_numeric(
        &mut self,
        op: &'static str,
        int_op: fn(i64, i64) -> i64,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<(), VmError> {
        let (a, b) = self.pop_pair()?;
        if !a.is_numeric() || !b.is_numeric() {
            return Err(VmError::TypeMismatch { op, lhs: a.type_name(), rhs: b.type_name() });
        }
        self.stack.push(promote(&a, &b, int_op, float_op));
        Ok(())
    }

    /// `MUL`/`MOD`'s numeric path; by construction (the analyzer already
    /// rejected anything else) operands here are always numeric.
    fn binary_arith(&mut self, int_op: fn(i64, i64) -> i64, float_op: fn(f64, f64) -> f64) -> Result<(), VmError> {
        let (a, b) = self.pop_pair()?;
        if !a.is_numeric() || !b.is_numeric() {
            return Err(VmError::TypeMismatch { op: "multiply", lhs: a.type_name(), rhs: b.type_name() });
        }
        self.stack.push(promote(&a, &b, int_op, float_op));
        Ok(())
    }

    /// `/` is always true division, even for two integers, matching the
    /// source language's host-language division semantics.
    fn div(&mut self) -> Result<(), VmError> {
        let (a, b) = self.pop_pair()?;
        let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) else {
            return Err(VmError::TypeMismatch { op: "divide", lhs: a.type_name(), rhs: b.type_name() });
        };
        if b == 0.0 {
            return Err(VmError::DivisionByZero);
        }
        self.stack.push(RtValue::Float(a / b));
        Ok(())
    }

    fn modulo(&mut self) -> Result<(), VmError> {
        let (a, b) = self.pop_pair()?;
        let (RtValue::Int(a), RtValue::Int(b)) = (&a, &b) else {
            return Err(VmError::TypeMismatch { op: "modulo", lhs: a.type_name(), rhs: b.type_name() });
        };
        if *b == 0 {
            return Err(VmError::DivisionByZero);
        }
        self.stack.push(RtValue::Int(((*a % *b) + *b) % *b));
        Ok(())
    }

    fn compare(&mut self, accept: fn(std::cmp::Ordering) -> bool) -> Result<(), VmError> {
        let (a, b) = self.pop_pair()?;
        let ordering = match (&a, &b) {
            (RtValue::Str(x), RtValue::Str(y)) => x.partial_cmp(y),
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        };
        let Some(ordering) = ordering else {
            return Err(VmError::TypeMismatch { op: "compare", lhs: a.type_name(), rhs: b.type_name() });
        };
        self.stack.push(RtValue::Bool(accept(ordering)));
        Ok(())
    }

    fn equality(&mut self, want_equal: bool) -> Result<(), VmError> {
        let (a, b) = self.pop_pair()?;
        let equal = match (&a, &b) {
            (RtValue::Int(x), RtValue::Int(y)) => x == y,
            (RtValue::Float(x), RtValue::Float(y)) => x == y,
            (RtValue::Int(x), RtValue::Float(y)) | (RtValue::Float(y), RtValue::Int(x)) => *x as f64 == *y,
            (RtValue::Str(x), RtValue::Str(y)) => x == y,
            (RtValue::Bool(x), RtValue::Bool(y)) => x == y,
            _ => false,
        };
        self.stack.push(RtValue::Bool(equal == want_equal));
        Ok(())
    }

    /// `AND`/`OR` return one of the operands, not a coerced boolean —
    /// preserved deliberately; see the design notes.
    fn logical(&mut self, short_circuit_on: fn(bool) -> bool) -> Result<(), VmError> {
        let (a, b) = self.pop_pair()?;
        let result = if short_circuit_on(a.is_truthy()) { a } else { b };
        self.stack.push(result);
        Ok(())
    }

    fn negate(&mut self) -> Result<(), VmError> {
        let a = self.pop()?;
        let negated = match a {
            RtValue::Int(v) => RtValue::Int(-v),
            RtValue::Float(v) => RtValue::Float(-v),
            other => return Err(VmError::TypeMismatch { op: "negate", lhs: other.type_name(), rhs: other.type_name() }),
        };
        self.stack.push(negated);
        Ok(())
    }
}

fn promote(a: &RtValue, b: &RtValue, int_op: fn(i64, i64) -> i64, float_op: fn(f64, f64) -> f64) -> RtValue {
    match (a, b) {
        (RtValue::Int(x), RtValue::Int(y)) => RtValue::Int(int_op(*x, *y)),
        _ => RtValue::Float(float_op(a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0))),
    }
}
