use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a lexeme or node inside a definition's text.
///
/// Lines and columns are 1-based so they can be shown to users as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "line")]
    pub start_line: u32,
    #[serde(rename = "column")]
    pub start_col: u32,
    pub end_line: u32,
    #[serde(rename = "end_column")]
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// A zero-width span at a single position.
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        let (start_line, start_col) =
            (self.start_line, self.start_col).min((other.start_line, other.start_col));
        let (end_line, end_col) = (self.end_line, self.end_col).max((other.end_line, other.end_col));
        Span::new(start_line, start_col, end_line, end_col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Definition text plus a line index, used to quote the offending line in
/// syntax errors.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub source: String,
    line_starts: Vec<usize>,
}

impl SourceText {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    /// Extract a line by 1-based line number, without its terminator.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = line_number.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| s.saturating_sub(1))
            .unwrap_or(self.source.len());
        Some(self.source[start..end].trim_end_matches('\r'))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge_across_lines() {
        let a = Span::new(1, 5, 1, 10);
        let b = Span::new(2, 3, 2, 8);
        assert_eq!(a.merge(b), Span::new(1, 5, 2, 8));
    }

    #[test]
    fn test_span_merge_same_line() {
        let a = Span::new(1, 5, 1, 10);
        let b = Span::new(1, 3, 1, 8);
        assert_eq!(a.merge(b), Span::new(1, 3, 1, 10));
    }

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(3, 7, 3, 15).to_string(), "3:7");
    }

    #[test]
    fn test_span_json_field_names() {
        let json = serde_json::to_string(&Span::new(1, 2, 1, 4)).unwrap();
        assert_eq!(json, r#"{"line":1,"column":2,"end_line":1,"end_column":4}"#);
    }

    #[test]
    fn test_source_text_lines() {
        let src = SourceText::new("f(x) =\r\n  x^2 + a\n");
        assert_eq!(src.line(1), Some("f(x) ="));
        assert_eq!(src.line(2), Some("  x^2 + a"));
        assert_eq!(src.line(3), Some(""));
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(4), None);
        assert_eq!(src.line_count(), 3);
    }

    #[test]
    fn test_source_text_empty() {
        let src = SourceText::new("");
        assert_eq!(src.line_count(), 1);
        assert_eq!(src.line(1), Some(""));
    }
}
