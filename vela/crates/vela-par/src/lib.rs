//! Parsing: turns a token stream into an AST rooted at a [`Program`]
//! node, per the grammar's operator-precedence table. A syntax error
//! is reported through the shared diagnostic handler and does not stop
//! parsing outright — callers must check `handler.has_errors()` before
//! trusting the tree (see the driver contract).

pub mod ast;
pub mod parser;

pub use ast::{Block, BinOp, ControlKeyword, Expr, Literal, Program, Stmt, UnOp};
pub use parser::{parse, Parser};
