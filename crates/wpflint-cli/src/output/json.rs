//! Machine-readable output
//!
//! `json` writes one document; `ndjson` streams a metadata record, one record per
//! diagnostic and a closing summary, each on its own line.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io::{self, Write};
use wpflint_core::diagnostic::{Diagnostic, Fix, TextEdit};
use wpflint_core::rules::{Confidence, Rule, RuleCategory, RuleRegistry, Severity};

const FORMAT_VERSION: &str = "1.0";

#[derive(Serialize)]
struct Report<'a> {
    version: &'static str,
    metadata: RunInfo<'a>,
    summary: Summary,
    diagnostics: Vec<Entry<'a>>,
}

#[derive(Serialize)]
struct RunInfo<'a> {
    wpflint_version: &'static str,
    working_directory: String,
    analyzed_paths: &'a [String],
}

#[derive(Serialize)]
struct Summary {
    total_files: usize,
    files_with_issues: usize,
    total_diagnostics: usize,
    by_severity: BTreeMap<&'static str, usize>,
    by_category: BTreeMap<&'static str, usize>,
}

#[derive(Serialize)]
struct Entry<'a> {
    rule_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'static str>,
    severity: Severity,
    confidence: Confidence,
    message: &'a str,
    location: Location<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fixes: Vec<FixEntry<'a>>,
}

#[derive(Serialize)]
struct Location<'a> {
    file: &'a str,
    start: Position,
    end: Position,
}

#[derive(Serialize, Clone, Copy)]
struct Position {
    line: usize,
    column: usize,
}

#[derive(Serialize)]
struct FixEntry<'a> {
    title: &'a str,
    edits: Vec<EditEntry<'a>>,
}

#[derive(Serialize)]
struct EditEntry<'a> {
    start: Position,
    end: Position,
    new_text: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Record<'a> {
    Metadata(RunInfo<'a>),
    Diagnostic(Entry<'a>),
    Summary(Summary),
}

/// Without a registry, entries carry no rule name or category.
#[derive(Default)]
pub struct JsonFormatter<'a> {
    registry: Option<&'a RuleRegistry>,
}

impl<'a> JsonFormatter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: &'a RuleRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    pub fn format(&self, diagnostics: &[Diagnostic], total_files: usize, analyzed_paths: &[String]) -> String {
        let report = Report {
            version: FORMAT_VERSION,
            metadata: run_info(analyzed_paths),
            summary: self.summary(diagnostics, total_files),
            diagnostics: diagnostics.iter().map(|d| self.entry(d)).collect(),
        };
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_ndjson<W: Write>(
        &self,
        diagnostics: &[Diagnostic],
        total_files: usize,
        analyzed_paths: &[String],
        writer: &mut W,
    ) -> io::Result<()> {
        let records = std::iter::once(Record::Metadata(run_info(analyzed_paths)))
            .chain(diagnostics.iter().map(|d| Record::Diagnostic(self.entry(d))))
            .chain(std::iter::once(Record::Summary(self.summary(diagnostics, total_files))));

        for record in records {
            serde_json::to_writer(&mut *writer, &record)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn rule(&self, id: &str) -> Option<&'a dyn Rule> {
        self.registry?.get_rule(id)
    }

    fn summary(&self, diagnostics: &[Diagnostic], total_files: usize) -> Summary {
        let mut by_severity: BTreeMap<&'static str, usize> =
            [Severity::Error, Severity::Warning, Severity::Info, Severity::Hint]
                .iter()
                .map(|severity| (severity.as_str(), 0))
                .collect();
        let mut by_category: BTreeMap<&'static str, usize> =
            [RuleCategory::Naming, RuleCategory::Correctness, RuleCategory::Usage]
                .iter()
                .map(|category| (category.as_str(), 0))
                .collect();

        for diag in diagnostics {
            *by_severity.entry(diag.severity.as_str()).or_default() += 1;
            if let Some(rule) = self.rule(&diag.rule_id) {
                *by_category.entry(rule.metadata().category.as_str()).or_default() += 1;
            }
        }
        let files: HashSet<&str> = diagnostics.iter().map(|d| d.file.as_str()).collect();

        Summary {
            total_files,
            files_with_issues: files.len(),
            total_diagnostics: diagnostics.len(),
            by_severity,
            by_category,
        }
    }

    fn entry<'d>(&self, diag: &'d Diagnostic) -> Entry<'d> {
        let metadata = self.rule(&diag.rule_id).map(|rule| rule.metadata());

        Entry {
            rule_id: &diag.rule_id,
            rule_name: metadata.map(|m| m.name),
            category: metadata.map(|m| m.category.as_str()),
            severity: diag.severity,
            confidence: diag.confidence,
            message: &diag.message,
            location: Location {
                file: &diag.file,
                start: Position::at(diag.line, diag.column),
                end: Position::at(diag.end_line, diag.end_column),
            },
            suggestion: diag.suggestion.as_deref(),
            fixes: diag.fixes.iter().map(fix_entry).collect(),
        }
    }
}

impl Position {
    fn at(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

fn run_info(analyzed_paths: &[String]) -> RunInfo<'_> {
    RunInfo {
        wpflint_version: env!("CARGO_PKG_VERSION"),
        working_directory: std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default(),
        analyzed_paths,
    }
}

fn fix_entry(fix: &Fix) -> FixEntry<'_> {
    FixEntry {
        title: &fix.title,
        edits: fix.edits.iter().map(edit_entry).collect(),
    }
}

fn edit_entry(edit: &TextEdit) -> EditEntry<'_> {
    EditEntry {
        start: Position::at(edit.line, edit.column),
        end: Position::at(edit.end_line, edit.end_column),
        new_text: &edit.new_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wpflint_core::rules::default_registry;

    fn paths() -> Vec<String> {
        vec!["./src".to_string()]
    }

    fn set_value_call() -> Diagnostic {
        Diagnostic::new(
            "WPF0041",
            Severity::Warning,
            "Use SetCurrentValue to change `BarProperty`",
            "Foo.cs",
            10,
            13,
        )
        .with_end(10, 21)
        .with_confidence(Confidence::Medium)
        .with_suggestion("Use SetCurrentValue")
    }

    fn document(formatter: &JsonFormatter<'_>, diagnostics: &[Diagnostic], files: usize) -> Value {
        serde_json::from_str(&formatter.format(diagnostics, files, &paths())).unwrap()
    }

    #[test]
    fn document_carries_version_and_run_info() {
        let parsed = document(&JsonFormatter::new(), &[set_value_call()], 5);

        assert_eq!(parsed["version"], FORMAT_VERSION);
        assert_eq!(parsed["metadata"]["wpflint_version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(parsed["metadata"]["analyzed_paths"], serde_json::json!(["./src"]));
        assert_eq!(parsed["diagnostics"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn summary_counts_severities_categories_and_files() {
        let registry = default_registry();
        let diagnostics = [
            Diagnostic::new("WPF0010", Severity::Error, "Error 1", "A.cs", 1, 1),
            Diagnostic::new("WPF0001", Severity::Warning, "Warning 1", "A.cs", 2, 1),
            Diagnostic::new("WPF0041", Severity::Warning, "Warning 2", "B.cs", 1, 1),
            Diagnostic::new("PARSE", Severity::Error, "Syntax error", "C.cs", 1, 1),
        ];

        let parsed = document(&JsonFormatter::with_registry(&registry), &diagnostics, 10);

        let summary = &parsed["summary"];
        assert_eq!(summary["total_files"], 10);
        assert_eq!(summary["files_with_issues"], 3);
        assert_eq!(summary["total_diagnostics"], 4);
        assert_eq!(
            summary["by_severity"],
            serde_json::json!({"error": 2, "hint": 0, "info": 0, "warning": 2})
        );
        assert_eq!(
            summary["by_category"],
            serde_json::json!({"correctness": 1, "naming": 1, "usage": 1})
        );
    }

    #[test]
    fn entry_is_enriched_from_the_registry() {
        let registry = default_registry();

        let parsed = document(&JsonFormatter::with_registry(&registry), &[set_value_call()], 1);

        let diag = &parsed["diagnostics"][0];
        assert_eq!(diag["rule_id"], "WPF0041");
        assert_eq!(diag["rule_name"], "set-mutable-with-set-current-value");
        assert_eq!(diag["category"], "usage");
        assert_eq!(diag["severity"], "warning");
        assert_eq!(diag["confidence"], "medium");
        assert_eq!(diag["location"]["file"], "Foo.cs");
        assert_eq!(diag["location"]["start"], serde_json::json!({"line": 10, "column": 13}));
        assert_eq!(diag["location"]["end"], serde_json::json!({"line": 10, "column": 21}));
        assert_eq!(diag["suggestion"], "Use SetCurrentValue");
        assert!(diag.get("fixes").is_none());
    }

    #[test]
    fn entry_without_registry_omits_rule_details() {
        let parsed = document(&JsonFormatter::new(), &[set_value_call()], 1);

        let diag = &parsed["diagnostics"][0];
        assert!(diag.get("rule_name").is_none());
        assert!(diag.get("category").is_none());
        assert_eq!(parsed["summary"]["by_category"]["usage"], 0);
    }

    #[test]
    fn fixes_list_their_edits() {
        let diag = set_value_call().with_fix(Fix::replace(
            "Use SetCurrentValue",
            "SetCurrentValue",
            10,
            13,
            10,
            21,
        ));

        let parsed = document(&JsonFormatter::new(), &[diag], 1);

        let fix = &parsed["diagnostics"][0]["fixes"][0];
        assert_eq!(fix["title"], "Use SetCurrentValue");
        assert_eq!(fix["edits"][0]["new_text"], "SetCurrentValue");
        assert_eq!(fix["edits"][0]["start"]["column"], 13);
        assert_eq!(fix["edits"][0]["end"]["column"], 21);
    }

    #[test]
    fn ndjson_frames_diagnostics_with_metadata_and_summary() {
        let mut output = Vec::new();

        JsonFormatter::new()
            .format_ndjson(&[set_value_call(), set_value_call()], 5, &paths(), &mut output)
            .unwrap();

        let records: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let types: Vec<&str> = records.iter().map(|r| r["type"].as_str().unwrap()).collect();
        assert_eq!(types, ["metadata", "diagnostic", "diagnostic", "summary"]);
        assert_eq!(records[1]["rule_id"], "WPF0041");
        assert_eq!(records[3]["total_diagnostics"], 2);
    }

    #[test]
    fn no_diagnostics_is_still_a_document() {
        let parsed = document(&JsonFormatter::new(), &[], 0);

        assert_eq!(parsed["summary"]["total_diagnostics"], 0);
        assert_eq!(parsed["summary"]["files_with_issues"], 0);
        assert!(parsed["diagnostics"].as_array().unwrap().is_empty());
    }
}
