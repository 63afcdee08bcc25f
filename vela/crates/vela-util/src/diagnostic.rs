//! Diagnostics collected by the lexer, parser, and analyzer.
//!
//! Mirrors the taxonomy in the error-handling design: each stage reports
//! through a shared [`Handler`] rather than failing immediately, so a
//! stage can keep going (the lexer skips a bad character and continues)
//! while still recording that something went wrong.

use std::cell::RefCell;
use std::fmt;

use crate::span::{SourceFile, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(Level::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(Level::Warning, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "{}: {} at line {}", self.level, self.message, span.line),
            None => write!(f, "{}: {}", self.level, self.message),
        }
    }
}

pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Option<Span>,
}

impl DiagnosticBuilder {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), span: None }
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> Diagnostic {
        Diagnostic { level: self.level, message: self.message, span: self.span }
    }

    pub fn emit(self, handler: &Handler) {
        handler.emit(self.build());
    }
}

/// Collects diagnostics for a single compilation run. Stages share one
/// handler so ordering across the lexer, parser, and analyzer is
/// preserved in the order diagnostics were raised.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, diagnostic: Diagnostic) {
        tracing::error!(message = %diagnostic, "diagnostic");
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.level == Level::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.borrow().iter().filter(|d| d.level == Level::Error).count()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Renders every collected diagnostic as a single-line message per
    /// the user-visible failure contract, one per line.
    pub fn render(&self, _source: &SourceFile) -> String {
        self.diagnostics
            .borrow()
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
