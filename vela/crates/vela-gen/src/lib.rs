pub mod codegen;
pub mod error;
pub mod instr;

pub use codegen::CodeGenerator;
pub use error::CodegenError;
pub use instr::{parse_text, BytecodeParseError, Instr, Value};
