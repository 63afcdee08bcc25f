use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodegenError {
    #[error("'{keyword}' used outside loop at line {line}")]
    ControlFlowOutsideLoop { keyword: &'static str, line: u32 },
}
