//! Diagnostic reporting for analysis results
//!
//! Positions are 1-based lines and 1-based byte columns; an end position points just past
//! the last character covered.

use crate::parser::ParsedFile;
use crate::rules::{Confidence, Severity};
use crate::syntax::Span;

/// Replacement of a source range. An empty range inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(
        line: usize,
        column: usize,
        end_line: usize,
        end_column: usize,
        new_text: impl Into<String>,
    ) -> Self {
        Self {
            line,
            column,
            end_line,
            end_column,
            new_text: new_text.into(),
        }
    }

    pub fn replace_span(file: &ParsedFile, span: Span, new_text: impl Into<String>) -> Self {
        let (line, column, end_line, end_column) = file.range(span);
        Self::new(line, column, end_line, end_column, new_text)
    }

    pub fn insert_at(file: &ParsedFile, offset: u32, text: impl Into<String>) -> Self {
        let (line, column) = file.location(offset);
        Self::new(line, column, line, column, text)
    }

    pub fn is_insertion(&self) -> bool {
        self.line == self.end_line && self.column == self.end_column
    }
}

/// A titled set of edits applied together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub title: String,
    pub edits: Vec<TextEdit>,
}

impl Fix {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            edits: Vec::new(),
        }
    }

    pub fn with_edit(mut self, edit: TextEdit) -> Self {
        self.edits.push(edit);
        self
    }

    pub fn with_edits(mut self, edits: impl IntoIterator<Item = TextEdit>) -> Self {
        self.edits.extend(edits);
        self
    }

    pub fn replace(
        title: impl Into<String>,
        new_text: impl Into<String>,
        line: usize,
        column: usize,
        end_line: usize,
        end_column: usize,
    ) -> Self {
        Self::new(title).with_edit(TextEdit::new(line, column, end_line, end_column, new_text))
    }

    pub fn insert_before(title: impl Into<String>, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(title).with_edit(TextEdit::new(line, column, line, column, text))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub rule_id: String,
    pub severity: Severity,
    pub confidence: Confidence,
    pub message: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub suggestion: Option<String>,
    pub fixes: Vec<Fix>,
}

impl Diagnostic {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        file: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            confidence: Confidence::default(),
            message: message.into(),
            file: file.into(),
            line,
            column,
            end_line: line,
            end_column: column,
            suggestion: None,
            fixes: Vec::new(),
        }
    }

    /// Diagnostic covering `span` of `file`.
    pub fn at_span(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        file: &ParsedFile,
        span: Span,
    ) -> Self {
        let (line, column, end_line, end_column) = file.range(span);
        Self::new(rule_id, severity, message, &file.metadata().filename, line, column)
            .with_end(end_line, end_column)
    }

    pub fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fixes.push(fix);
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}]",
            self.file, self.line, self.column, self.message, self.rule_id
        )
    }
}
