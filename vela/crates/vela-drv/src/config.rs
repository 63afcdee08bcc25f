use std::path::PathBuf;

/// What intermediate representation (if any) to print instead of
/// running the program to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitStage {
    Tokens,
    Ast,
    Bytecode,
    Run,
}

impl Default for EmitStage {
    fn default() -> Self {
        EmitStage::Run
    }
}

/// Library-level configuration for one compile-and-run invocation.
/// Populated from the `Cli` args struct in `main.rs`.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: Option<PathBuf>,
    pub emit: EmitStage,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { input: None, emit: EmitStage::default(), verbose: false }
    }
}
