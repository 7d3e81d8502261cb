//! Code action generation from diagnostics with fixes

use std::collections::HashMap;

use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Range, TextEdit, Url, WorkspaceEdit,
};
use wpflint_core::diagnostic::{Diagnostic as CoreDiagnostic, Fix};
use wpflint_core::parser::ParsedFile;

use crate::diagnostics::{convert_diagnostic, to_range};

pub fn generate_code_actions(
    uri: &Url,
    file: &ParsedFile,
    diagnostics: &[CoreDiagnostic],
    range: &Range,
) -> Vec<CodeActionOrCommand> {
    let mut actions = Vec::new();

    for diag in diagnostics {
        let lsp_diagnostic = convert_diagnostic(file, diag, None);
        if !ranges_overlap(&lsp_diagnostic.range, range) {
            continue;
        }

        for (index, fix) in diag.fixes.iter().enumerate() {
            let edit = fix_to_workspace_edit(uri, file, fix);
            actions.push(CodeActionOrCommand::CodeAction(CodeAction {
                title: fix.title.clone(),
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: Some(vec![lsp_diagnostic.clone()]),
                edit: Some(edit),
                command: None,
                is_preferred: Some(index == 0),
                disabled: None,
                data: None,
            }));
        }
    }

    actions
}

/// All edits of `fix` apply to the document the diagnostic was reported in.
pub fn fix_to_workspace_edit(uri: &Url, file: &ParsedFile, fix: &Fix) -> WorkspaceEdit {
    let edits: Vec<TextEdit> = fix
        .edits
        .iter()
        .map(|edit| TextEdit {
            range: to_range(file, edit.line, edit.column, edit.end_line, edit.end_column),
            new_text: edit.new_text.clone(),
        })
        .collect();

    let mut changes = HashMap::new();
    changes.insert(uri.clone(), edits);

    WorkspaceEdit {
        changes: Some(changes),
        document_changes: None,
        change_annotations: None,
    }
}

fn ranges_overlap(a: &Range, b: &Range) -> bool {
    a.start.line <= b.end.line && b.start.line <= a.end.line
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::{NumberOrString, Position};
    use wpflint_core::diagnostic::TextEdit as CoreTextEdit;
    use wpflint_core::rules::Severity;

    const SOURCE: &str = "using System.Windows;\n\npublic class Foo : FrameworkElement\n{\n    public static readonly DependencyProperty ErrorProperty = DependencyProperty.Register(\n        nameof(Bar), typeof(int), typeof(Foo));\n}\n";

    fn file() -> ParsedFile {
        ParsedFile::from_source("Foo.cs", SOURCE)
    }

    fn uri() -> Url {
        Url::parse("file:///Foo.cs").unwrap()
    }

    fn line_range(start: u32, end: u32) -> Range {
        Range {
            start: Position {
                line: start,
                character: 0,
            },
            end: Position {
                line: end,
                character: 0,
            },
        }
    }

    fn misnamed() -> CoreDiagnostic {
        CoreDiagnostic::new("WPF0001", Severity::Warning, "Misnamed", "Foo.cs", 5, 47)
            .with_end(5, 60)
            .with_fix(Fix::replace("Rename to `BarProperty`", "BarProperty", 5, 47, 5, 60))
    }

    #[test]
    fn generates_code_action_for_replace_fix() {
        let actions = generate_code_actions(&uri(), &file(), &[misnamed()], &line_range(4, 5));

        assert_eq!(actions.len(), 1);
        let CodeActionOrCommand::CodeAction(action) = &actions[0] else {
            panic!("expected a code action");
        };
        assert_eq!(action.title, "Rename to `BarProperty`");
        assert_eq!(action.kind, Some(CodeActionKind::QUICKFIX));
        assert_eq!(action.is_preferred, Some(true));

        let edits = &action.edit.as_ref().unwrap().changes.as_ref().unwrap()[&uri()];
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, "BarProperty");
        assert_eq!(edits[0].range.start, Position { line: 4, character: 46 });
        assert_eq!(edits[0].range.end, Position { line: 4, character: 59 });
    }

    #[test]
    fn multi_edit_fix_becomes_one_workspace_edit() {
        let fix = Fix::new("Rename `Error` to `Bar`")
            .with_edit(CoreTextEdit::new(5, 47, 5, 52, "Bar"))
            .with_edit(CoreTextEdit::new(6, 16, 6, 19, "Error"));

        let edit = fix_to_workspace_edit(&uri(), &file(), &fix);

        let changes = edit.changes.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[&uri()].len(), 2);
    }

    #[test]
    fn insert_fix_has_empty_range() {
        let fix = Fix::insert_before("Add `readonly`", "readonly ", 5, 19);

        let edit = fix_to_workspace_edit(&uri(), &file(), &fix);

        let edits = &edit.changes.unwrap()[&uri()];
        assert_eq!(edits[0].range.start, edits[0].range.end);
        assert_eq!(edits[0].new_text, "readonly ");
    }

    #[test]
    fn generates_multiple_actions_for_multiple_fixes() {
        let diag = misnamed().with_fix(Fix::replace("Rename to `Bar2Property`", "Bar2Property", 5, 47, 5, 60));

        let actions = generate_code_actions(&uri(), &file(), &[diag], &line_range(4, 4));

        assert_eq!(actions.len(), 2);
        let CodeActionOrCommand::CodeAction(second) = &actions[1] else {
            panic!("expected a code action");
        };
        assert_eq!(second.is_preferred, Some(false));
    }

    #[test]
    fn filters_diagnostics_outside_range() {
        let actions = generate_code_actions(&uri(), &file(), &[misnamed()], &line_range(0, 1));

        assert!(actions.is_empty());
    }

    #[test]
    fn diagnostics_without_fixes_produce_no_actions() {
        let diag = CoreDiagnostic::new("WPF0036", Severity::Warning, "Side effect", "Foo.cs", 5, 5);

        let actions = generate_code_actions(&uri(), &file(), &[diag], &line_range(0, 10));

        assert!(actions.is_empty());
    }

    #[test]
    fn code_action_includes_linked_diagnostic() {
        let actions = generate_code_actions(&uri(), &file(), &[misnamed()], &line_range(4, 4));

        let CodeActionOrCommand::CodeAction(action) = &actions[0] else {
            panic!("expected a code action");
        };
        let linked = action.diagnostics.as_ref().unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].code, Some(NumberOrString::String("WPF0001".to_string())));
        assert_eq!(linked[0].source, Some("wpflint".to_string()));
    }
}
