//! Whole-workspace analysis of the open documents

use std::sync::Arc;

use tower_lsp::lsp_types::Url;
use wpflint_core::analysis::AnalysisEngine;
use wpflint_core::cancellation::CancellationToken;
use wpflint_core::diagnostic::Diagnostic as CoreDiagnostic;
use wpflint_core::parser::ParsedFile;

use crate::document::OpenDocument;

/// Diagnostics of one document together with the text they were computed on.
#[derive(Debug, Clone)]
pub struct AnalyzedDocument {
    pub uri: Url,
    pub version: i32,
    pub file: Arc<ParsedFile>,
    pub diagnostics: Vec<CoreDiagnostic>,
}

/// Analyzes `documents` as one compilation.
///
/// Answers `None` when `cancellation` fired before every document was analyzed.
pub fn analyze_documents(
    engine: &AnalysisEngine,
    documents: &[OpenDocument],
    cancellation: &CancellationToken,
) -> Option<Vec<AnalyzedDocument>> {
    let compilation = engine.compile(documents.iter().map(|doc| doc.file.as_ref()));

    let mut analyzed = Vec::with_capacity(documents.len());
    for document in documents {
        if cancellation.is_cancelled() {
            return None;
        }
        let diagnostics = engine.analyze_in(&compilation, &document.file, cancellation);
        analyzed.push(AnalyzedDocument {
            uri: document.uri.clone(),
            version: document.version,
            file: Arc::clone(&document.file),
            diagnostics,
        });
    }

    if cancellation.is_cancelled() {
        return None;
    }
    Some(analyzed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const BASE: &str = r#"using System.Windows;

public class Base : FrameworkElement
{
    public static readonly DependencyProperty SizeProperty = DependencyProperty.Register(
        nameof(Size), typeof(double), typeof(Base), new PropertyMetadata(1.0));

    public double Size
    {
        get => (double)GetValue(SizeProperty);
        set => SetValue(SizeProperty, value);
    }
}
"#;

    const DERIVED: &str = r#"using System.Windows;

public class Derived : Base
{
    public void Grow()
    {
        SetValue(SizeProperty, "large");
    }
}
"#;

    fn document(name: &str, source: &str) -> OpenDocument {
        OpenDocument {
            uri: Url::parse(&format!("file:///project/{name}")).unwrap(),
            version: 1,
            file: Arc::new(ParsedFile::from_source(&format!("/project/{name}"), source)),
        }
    }

    fn rule_ids(document: &AnalyzedDocument) -> Vec<&str> {
        document.diagnostics.iter().map(|d| d.rule_id.as_str()).collect()
    }

    #[test]
    fn documents_see_each_other() {
        let engine = AnalysisEngine::new();
        let documents = vec![document("Base.cs", BASE), document("Derived.cs", DERIVED)];

        let analyzed = analyze_documents(&engine, &documents, &CancellationToken::new()).unwrap();

        assert_eq!(analyzed.len(), 2);
        assert!(rule_ids(&analyzed[0]).is_empty());
        assert!(rule_ids(&analyzed[1]).contains(&"WPF0014"));
    }

    #[test]
    fn syntax_errors_become_diagnostics() {
        let engine = AnalysisEngine::new();
        let documents = vec![document("Broken.cs", "public class { int = ; }")];

        let analyzed = analyze_documents(&engine, &documents, &CancellationToken::new()).unwrap();

        assert!(rule_ids(&analyzed[0]).contains(&"PARSE"));
    }

    #[test]
    fn cancelled_analysis_answers_none() {
        let engine = AnalysisEngine::new();
        let documents = vec![document("Base.cs", BASE)];
        let token = CancellationToken::new();
        token.cancel();

        assert!(analyze_documents(&engine, &documents, &token).is_none());
    }

    #[test]
    fn large_document_is_analyzed_quickly() {
        let engine = AnalysisEngine::new();
        let mut code = String::from("using System.Windows;\n\npublic class Big : FrameworkElement\n{\n");
        for i in 0..100 {
            code.push_str(&format!(
                "    public static readonly DependencyProperty P{i}Property = DependencyProperty.Register(nameof(P{i}), typeof(int), typeof(Big));\n    public int P{i} {{ get => (int)GetValue(P{i}Property); set => SetValue(P{i}Property, value); }}\n"
            ));
        }
        code.push_str("}\n");
        let documents = vec![document("Big.cs", &code)];

        let start = Instant::now();
        let analyzed = analyze_documents(&engine, &documents, &CancellationToken::new()).unwrap();

        assert!(analyzed[0].diagnostics.is_empty());
        assert!(start.elapsed().as_secs() < 2);
    }
}
