use thiserror::Error;

/// Illegal characters are reported through the shared `Handler` and
/// skipped rather than raised as a hard error; this type exists so a
/// caller embedding the lexer without the rest of the pipeline still has
/// something concrete to convert a diagnostic into.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("illegal character '{ch}' at line {line}")]
    IllegalCharacter { ch: char, line: u32 },
}
