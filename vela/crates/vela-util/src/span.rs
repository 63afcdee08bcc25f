//! Source locations.
//!
//! A [`Span`] is a half-open byte range into a single source file, paired
//! with the line/column of its start for human-facing diagnostics. The
//! pipeline only ever compiles one source at a time, so unlike a
//! multi-file compiler's `SourceMap` this stays a single owned string.

use std::fmt;

/// A byte range `[start, end)` into the source text, plus the 1-based
/// line and column of `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self { start, end, line, column }
    }

    /// A span that only carries a line number, for nodes synthesized
    /// after lexing (the parser and later stages mostly care about
    /// `line`, not exact byte offsets).
    pub fn at_line(line: u32) -> Self {
        Self { start: 0, end: 0, line, column: 0 }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Holds the original source text and exposes line lookups for
/// diagnostic rendering.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub contents: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        let contents = contents.into();
        let mut line_starts = vec![0];
        for (i, b) in contents.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { name: name.into(), contents, line_starts }
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Returns the 1-based line's text, without its trailing newline.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let idx = line.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&e| e.saturating_sub(1))
            .unwrap_or(self.contents.len());
        self.contents.get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_text_splits_on_newlines() {
        let f = SourceFile::new("t", "x = 1;\ny = 2;\n");
        assert_eq!(f.line_text(1), Some("x = 1;"));
        assert_eq!(f.line_text(2), Some("y = 2;"));
        assert_eq!(f.line_count(), 3);
    }

    #[test]
    fn span_display_is_line_colon_column() {
        let s = Span::new(0, 1, 4, 7);
        assert_eq!(s.to_string(), "4:7");
    }
}
