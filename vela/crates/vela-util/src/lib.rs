//! Shared infrastructure for the vela toolchain: source spans, string
//! interning, and diagnostics. Every pipeline stage crate depends on
//! this one and nothing else in the workspace.

pub mod diagnostic;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level};
pub use span::{SourceFile, Span};
pub use symbol::Symbol;
