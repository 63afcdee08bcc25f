use thiserror::Error;

/// Bytecode carries no line information, so `VmError` reports on
/// operand types and opcodes rather than source positions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VmError {
    #[error("cannot {op} {lhs} and {rhs}")]
    TypeMismatch { op: &'static str, lhs: &'static str, rhs: &'static str },

    #[error("division by zero")]
    DivisionByZero,

    #[error("operand stack underflow")]
    StackUnderflow,

    #[error("unknown label '{0}'")]
    UnknownLabel(String),
}
