use thiserror::Error;

/// A semantic rule violation. Carries the source line so the driver
/// can render the single-line failure message the error-handling
/// design calls for.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SemanticError {
    #[error("use of undefined variable '{name}' at line {line}")]
    UndefinedVariable { name: String, line: u32 },

    #[error("{message} at line {line}")]
    TypeMismatch { message: String, line: u32 },

    #[error("'{keyword}' used outside loop at line {line}")]
    ControlFlowOutsideLoop { keyword: &'static str, line: u32 },

    #[error("'return' outside function at line {line}")]
    ReturnOutsideFunction { line: u32 },

    #[error("argument count mismatch calling '{name}' at line {line}")]
    ArityMismatch { name: String, line: u32 },

    #[error("modulo '%' requires integer operands, got {lhs} and {rhs} at line {line}")]
    NonIntegerModulo { lhs: String, rhs: String, line: u32 },

    #[error("'{name}' is not a function at line {line}")]
    NotAFunction { name: String, line: u32 },
}

impl SemanticError {
    pub fn line(&self) -> u32 {
        match self {
            SemanticError::UndefinedVariable { line, .. }
            | SemanticError::TypeMismatch { line, .. }
            | SemanticError::ControlFlowOutsideLoop { line, .. }
            | SemanticError::ReturnOutsideFunction { line, .. }
            | SemanticError::ArityMismatch { line, .. }
            | SemanticError::NonIntegerModulo { line, .. }
            | SemanticError::NotAFunction { line, .. } => *line,
        }
    }
}
