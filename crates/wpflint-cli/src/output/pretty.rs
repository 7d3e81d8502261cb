//! Terminal output with the offending source line underlined
//!
//! ```text
//! warning[WPF0001]: `ErrorProperty` should be named `BarProperty`
//!  --> Foo.cs:3:43
//!   |
//! 3 | public static readonly DependencyProperty ErrorProperty;
//!   |                                           ^^^^^^^^^^^^^
//!   = fix: Rename to `BarProperty`
//! ```

use colored::{ColoredString, Colorize};
use std::collections::{HashMap, HashSet};
use wpflint_core::diagnostic::Diagnostic;
use wpflint_core::rules::Severity;

/// Renders diagnostics; source lines are shown for files whose text was supplied.
#[derive(Default)]
pub struct PrettyFormatter {
    sources: HashMap<String, String>,
}

impl PrettyFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(sources: HashMap<String, String>) -> Self {
        Self { sources }
    }

    pub fn format(&self, diagnostics: &[Diagnostic]) -> String {
        if diagnostics.is_empty() {
            return String::new();
        }

        let mut blocks: Vec<String> = diagnostics.iter().map(|diag| self.render(diag)).collect();
        blocks.push(summary(diagnostics));
        blocks.join("\n")
    }

    fn render(&self, diag: &Diagnostic) -> String {
        let gutter = Gutter::for_line(diag.line);
        let mut lines = vec![
            format!(
                "{}[{}]: {}",
                colorize_severity(&diag.severity),
                diag.rule_id.dimmed(),
                diag.message
            ),
            format!(
                "{}{} {}:{}:{}",
                gutter.pad(),
                "-->".blue(),
                diag.file,
                diag.line,
                diag.column
            ),
        ];

        if let Some(text) = self.line_text(&diag.file, diag.line) {
            let (indent, width) = underline(diag, text);
            lines.push(gutter.empty());
            lines.push(gutter.numbered(diag.line, text));
            lines.push(gutter.annotate(&format!(
                "{}{}",
                " ".repeat(indent),
                "^".repeat(width).red()
            )));
            lines.push(gutter.empty());
        }

        if let Some(suggestion) = &diag.suggestion {
            lines.push(gutter.note("suggestion:", suggestion));
        }
        lines.extend(diag.fixes.iter().map(|fix| gutter.note("fix:", &fix.title)));

        lines.push(String::new());
        lines.join("\n")
    }

    fn line_text(&self, file: &str, line: usize) -> Option<&str> {
        self.sources.get(file)?.lines().nth(line.checked_sub(1)?)
    }
}

/// Left margin wide enough for the line number being shown.
struct Gutter {
    width: usize,
}

impl Gutter {
    fn for_line(line: usize) -> Self {
        Self {
            width: line.to_string().len(),
        }
    }

    fn pad(&self) -> String {
        " ".repeat(self.width)
    }

    fn empty(&self) -> String {
        format!("{} {}", self.pad(), "|".blue())
    }

    fn numbered(&self, line: usize, text: &str) -> String {
        format!("{} {} {}", line.to_string().blue(), "|".blue(), text)
    }

    fn annotate(&self, marker: &str) -> String {
        format!("{} {} {}", self.pad(), "|".blue(), marker)
    }

    fn note(&self, label: &str, text: &str) -> String {
        format!("{} {} {} {}", self.pad(), "=".blue(), label.green(), text)
    }
}

/// Indent and width of the caret run under `text`. Spans that continue onto later
/// lines are underlined to the end of the first one.
fn underline(diag: &Diagnostic, text: &str) -> (usize, usize) {
    let indent = diag.column.saturating_sub(1).min(text.len());
    let width = if diag.end_line == diag.line && diag.end_column > diag.column {
        diag.end_column - diag.column
    } else {
        text.len() - indent
    };
    (indent, width.max(1))
}

pub fn colorize_severity(severity: &Severity) -> ColoredString {
    let label = severity.as_str();
    match severity {
        Severity::Error => label.red(),
        Severity::Warning => label.yellow(),
        Severity::Info => label.blue(),
        Severity::Hint => label.cyan(),
    }
    .bold()
}

fn summary(diagnostics: &[Diagnostic]) -> String {
    let tally = |severity| diagnostics.iter().filter(|d| d.severity == severity).count();
    let files: HashSet<&str> = diagnostics.iter().map(|d| d.file.as_str()).collect();

    format!(
        "Found {} ({}, {}) in {}\n",
        counted(diagnostics.len(), "problem").bold(),
        counted(tally(Severity::Error), "error").red(),
        counted(tally(Severity::Warning), "warning").yellow(),
        counted(files.len(), "file")
    )
}

fn counted(count: usize, noun: &str) -> String {
    match count {
        1 => format!("1 {noun}"),
        _ => format!("{count} {noun}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpflint_core::diagnostic::Fix;

    const SOURCE: &str =
        "using System.Windows;\n\npublic static readonly DependencyProperty ErrorProperty;";

    fn misnamed(severity: Severity, line: usize, column: usize) -> Diagnostic {
        Diagnostic::new(
            "WPF0001",
            severity,
            "`ErrorProperty` should be named `BarProperty`",
            "Foo.cs",
            line,
            column,
        )
        .with_end(line, column + 13)
    }

    fn with_source() -> PrettyFormatter {
        PrettyFormatter::with_sources(HashMap::from([("Foo.cs".to_string(), SOURCE.to_string())]))
    }

    #[test]
    fn underlines_the_reported_span() {
        colored::control::set_override(false);

        let output = with_source().format(&[misnamed(Severity::Error, 3, 43)]);

        assert!(output.contains("error[WPF0001]: `ErrorProperty` should be named `BarProperty`"));
        assert!(output.contains("--> Foo.cs:3:43"));
        assert!(output.contains("3 | public static readonly DependencyProperty ErrorProperty;"));
        assert!(output.contains(&format!("| {}{}", " ".repeat(42), "^".repeat(13))));
    }

    #[test]
    fn multi_line_span_is_underlined_to_end_of_line() {
        let diag = Diagnostic::new("WPF0001", Severity::Warning, "Misnamed", "Foo.cs", 3, 24)
            .with_end(5, 2);
        let text = "public static readonly DependencyProperty ErrorProperty;";

        assert_eq!(underline(&diag, text), (23, text.len() - 23));
    }

    #[test]
    fn column_past_line_end_still_gets_a_caret() {
        let diag = Diagnostic::new("WPF0001", Severity::Warning, "Misnamed", "Foo.cs", 1, 40);

        assert_eq!(underline(&diag, "short"), (5, 1));
    }

    #[test]
    fn severity_labels_are_coloured() {
        assert_eq!(
            colorize_severity(&Severity::Error).to_string(),
            "error".red().bold().to_string()
        );
        assert_eq!(
            colorize_severity(&Severity::Warning).to_string(),
            "warning".yellow().bold().to_string()
        );
        assert_eq!(
            colorize_severity(&Severity::Info).to_string(),
            "info".blue().bold().to_string()
        );
        assert_eq!(
            colorize_severity(&Severity::Hint).to_string(),
            "hint".cyan().bold().to_string()
        );
    }

    #[test]
    fn summary_counts_problems_and_files() {
        colored::control::set_override(false);
        let mut other_file = misnamed(Severity::Warning, 3, 2);
        other_file.file = "Bar.cs".to_string();
        let diags = vec![
            misnamed(Severity::Error, 1, 2),
            misnamed(Severity::Error, 2, 2),
            other_file,
        ];

        let output = PrettyFormatter::new().format(&diags);

        assert!(output.ends_with("Found 3 problems (2 errors, 1 warning) in 2 files\n"));
    }

    #[test]
    fn summary_uses_singular_nouns() {
        colored::control::set_override(false);

        let output = PrettyFormatter::new().format(&[misnamed(Severity::Error, 1, 2)]);

        assert!(output.ends_with("Found 1 problem (1 error, 0 warnings) in 1 file\n"));
    }

    #[test]
    fn notes_list_suggestion_and_fixes() {
        colored::control::set_override(false);
        let diag = misnamed(Severity::Warning, 3, 43)
            .with_suggestion("Rename the field")
            .with_fix(Fix::replace("Rename to `BarProperty`", "BarProperty", 3, 43, 3, 56));

        let output = with_source().format(&[diag]);

        assert!(output.contains("= suggestion: Rename the field"));
        assert!(output.contains("= fix: Rename to `BarProperty`"));
    }

    #[test]
    fn nothing_to_report_prints_nothing() {
        assert!(PrettyFormatter::new().format(&[]).is_empty());
    }

    #[test]
    fn unknown_source_skips_the_snippet() {
        let output = PrettyFormatter::new().format(&[misnamed(Severity::Error, 1, 2)]);

        assert!(output.contains("WPF0001"));
        assert!(!output.contains('^'));
    }
}
