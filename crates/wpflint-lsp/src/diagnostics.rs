//! Conversion of analyzer diagnostics and locations into LSP types

use tower_lsp::lsp_types::{
    CodeDescription, Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range, Url,
};
use wpflint_core::diagnostic::Diagnostic as CoreDiagnostic;
use wpflint_core::parser::ParsedFile;
use wpflint_core::rules::{RuleRegistry, Severity};

pub const SOURCE: &str = "wpflint";
const PARSE_RULE_ID: &str = "PARSE";

pub fn convert_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Info => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}

/// LSP position of a 1-based line and byte column; characters are counted in UTF-16 units.
pub fn to_position(file: &ParsedFile, line: usize, column: usize) -> Position {
    let character = file
        .get_line(line)
        .map(|text| {
            let byte = column.saturating_sub(1).min(text.len());
            let prefix = text.get(..byte).unwrap_or(text);
            prefix.encode_utf16().count()
        })
        .unwrap_or_else(|| column.saturating_sub(1));

    Position {
        line: line.saturating_sub(1) as u32,
        character: character as u32,
    }
}

pub fn to_range(
    file: &ParsedFile,
    line: usize,
    column: usize,
    end_line: usize,
    end_column: usize,
) -> Range {
    Range {
        start: to_position(file, line, column),
        end: to_position(file, end_line, end_column),
    }
}

pub fn convert_diagnostic(
    file: &ParsedFile,
    diag: &CoreDiagnostic,
    registry: Option<&RuleRegistry>,
) -> Diagnostic {
    let mut range = to_range(file, diag.line, diag.column, diag.end_line, diag.end_column);
    if range.start == range.end {
        range.end.character += 1;
    }

    let is_parse_error = diag.rule_id == PARSE_RULE_ID;
    let docs_url = registry
        .and_then(|r| r.get_rule(&diag.rule_id))
        .and_then(|rule| rule.metadata().docs_url)
        .and_then(|url| Url::parse(url).ok());

    Diagnostic {
        range,
        severity: Some(convert_severity(diag.severity)),
        code: (!is_parse_error).then(|| NumberOrString::String(diag.rule_id.clone())),
        code_description: docs_url.map(|href| CodeDescription { href }),
        source: Some(SOURCE.to_string()),
        message: diag.message.clone(),
        related_information: None,
        tags: None,
        data: None,
    }
}

pub fn convert_diagnostics(
    file: &ParsedFile,
    diagnostics: &[CoreDiagnostic],
    registry: Option<&RuleRegistry>,
) -> Vec<Diagnostic> {
    diagnostics
        .iter()
        .map(|diag| convert_diagnostic(file, diag, registry))
        .collect()
}
