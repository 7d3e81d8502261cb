//! Analysis engine for code analysis and diagnostic generation
//!
//! Provides the core analysis functionality for CLI and other consumers.

use crate::cancellation::CancellationToken;
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{default_registry, Confidence, RuleContext, RuleRegistry, Severity};
use crate::semantic::Compilation;

pub struct AnalysisEngine {
    registry: RuleRegistry,
    framework: bool,
    min_confidence: Option<Confidence>,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self {
            registry: default_registry(),
            framework: true,
            min_confidence: None,
        }
    }

    pub fn with_config(config: &Config) -> Self {
        let mut registry = default_registry();
        registry.configure(&config.rules);
        Self {
            registry,
            framework: config.analysis.framework,
            min_confidence: config.rules.min_confidence,
        }
    }

    /// Drops diagnostics below `confidence`; overrides the configured value.
    pub fn with_min_confidence(mut self, confidence: Option<Confidence>) -> Self {
        if confidence.is_some() {
            self.min_confidence = confidence;
        }
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// One compilation over `files`, with the reference model when it is enabled.
    pub fn compile<'a>(&self, files: impl IntoIterator<Item = &'a ParsedFile>) -> Compilation<'a> {
        Compilation::builder()
            .with_framework(self.framework)
            .add_files(files)
            .build()
    }

    /// Analyzes one file on its own.
    pub fn analyze(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let compilation = self.compile([file]);
        self.analyze_in(&compilation, file, &CancellationToken::new())
    }

    /// Analyzes `files` as one program; diagnostics come back grouped by file, in order.
    pub fn analyze_files(&self, files: &[ParsedFile]) -> Vec<Diagnostic> {
        let compilation = self.compile(files);
        let token = CancellationToken::new();
        files
            .iter()
            .flat_map(|file| self.analyze_in(&compilation, file, &token))
            .collect()
    }

    /// Runs the enabled rules on one file of `compilation`.
    ///
    /// Answers only the parse diagnostics when `file` is not part of the compilation.
    pub fn analyze_in(
        &self,
        compilation: &Compilation<'_>,
        file: &ParsedFile,
        cancellation: &CancellationToken,
    ) -> Vec<Diagnostic> {
        let started = std::time::Instant::now();
        let mut diagnostics: Vec<Diagnostic> = file
            .errors()
            .iter()
            .map(|error| {
                Diagnostic::new(
                    "PARSE",
                    Severity::Error,
                    &error.message,
                    &file.metadata().filename,
                    error.line,
                    error.column,
                )
            })
            .collect();

        if let Some(model) = compilation.model_for(file) {
            let ctx = RuleContext::new(model, cancellation);
            diagnostics.extend(self.registry.run_all(&ctx));
        }

        let directives = file.disable_directives();
        diagnostics.retain(|diagnostic| {
            let name = self.registry.rule_name(&diagnostic.rule_id);
            !directives.is_disabled_for(diagnostic.line, &diagnostic.rule_id, name)
                && self.meets_confidence(diagnostic)
        });

        tracing::debug!(
            file = %file.metadata().filename,
            diagnostics = diagnostics.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Analyzed file"
        );
        diagnostics
    }

    fn meets_confidence(&self, diagnostic: &Diagnostic) -> bool {
        self.min_confidence
            .is_none_or(|min| diagnostic.confidence >= min)
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;

    fn make_parsed_file(filename: &str, content: &str) -> ParsedFile {
        ParsedFile::from_source(filename, content)
    }

    const MISNAMED: &str = r#"
using System.Windows;

public class Foo : FrameworkElement
{
    public static readonly DependencyProperty ErrorProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(default(int)));

    public int Bar
    {
        get => (int)GetValue(ErrorProperty);
        set => SetValue(ErrorProperty, value);
    }
}
"#;

    #[test]
    fn analyze_reports_rule_diagnostics() {
        let engine = AnalysisEngine::new();
        let file = make_parsed_file("Foo.cs", MISNAMED);

        let diagnostics = engine.analyze(&file);

        assert!(
            diagnostics.iter().any(|d| d.rule_id == "WPF0001" && d.line == 6),
            "Expected WPF0001 for ErrorProperty, got {diagnostics:?}"
        );
    }

    #[test]
    fn syntax_errors_become_diagnostics() {
        let engine = AnalysisEngine::new();
        let file = make_parsed_file("Broken.cs", "public class Foo { public int = ; }");

        let diagnostics = engine.analyze(&file);

        assert!(
            diagnostics.iter().any(|d| d.rule_id == "PARSE"),
            "Expected PARSE diagnostic for syntax error"
        );
    }

    #[test]
    fn disable_next_line_by_id_suppresses_diagnostic() {
        let engine = AnalysisEngine::new();
        let code = MISNAMED.replace(
            "    public static readonly DependencyProperty ErrorProperty",
            "    // wpflint-disable-next-line WPF0001\n    public static readonly DependencyProperty ErrorProperty",
        );
        let file = make_parsed_file("Foo.cs", &code);

        let diagnostics = engine.analyze(&file);

        assert!(!diagnostics.iter().any(|d| d.rule_id == "WPF0001"));
    }

    #[test]
    fn disable_line_by_name_suppresses_diagnostic() {
        let engine = AnalysisEngine::new();
        let code = MISNAMED.replace(
            "DependencyProperty ErrorProperty = DependencyProperty.Register(",
            "DependencyProperty ErrorProperty = DependencyProperty.Register( // wpflint-disable-line backing-field-name",
        );
        let file = make_parsed_file("Foo.cs", &code);

        let diagnostics = engine.analyze(&file);

        assert!(!diagnostics.iter().any(|d| d.rule_id == "WPF0001"));
    }

    #[test]
    fn pragma_disable_suppresses_rest_of_file() {
        let engine = AnalysisEngine::new();
        let code = format!("#pragma warning disable WPF0001{MISNAMED}");
        let file = make_parsed_file("Foo.cs", &code);

        let diagnostics = engine.analyze(&file);

        assert!(!diagnostics.iter().any(|d| d.rule_id == "WPF0001"));
    }

    #[test]
    fn disable_does_not_affect_other_lines() {
        let engine = AnalysisEngine::new();
        let code = MISNAMED.replace(
            "    public int Bar\n",
            "    // wpflint-disable-next-line\n    public int Bar\n",
        );
        let file = make_parsed_file("Foo.cs", &code);

        let diagnostics = engine.analyze(&file);

        assert!(diagnostics.iter().any(|d| d.rule_id == "WPF0001" && d.line == 6));
    }

    #[test]
    fn disabled_rule_in_config_does_not_run() {
        let config = Config {
            rules: RulesConfig {
                disabled: vec!["backing-field-name".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let engine = AnalysisEngine::with_config(&config);
        let file = make_parsed_file("Foo.cs", MISNAMED);

        let diagnostics = engine.analyze(&file);

        assert!(!engine.registry().is_rule_enabled("WPF0001"));
        assert!(!diagnostics.iter().any(|d| d.rule_id == "WPF0001"));
    }

    #[test]
    fn min_confidence_filters_medium_diagnostics() {
        let code = r#"
using System.Windows;

public class Foo : FrameworkElement
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(default(int)));

    public int Bar
    {
        get => (int)GetValue(BarProperty);
        set => SetValue(BarProperty, value);
    }

    public void Reset()
    {
        SetValue(BarProperty, 0);
    }
}
"#;
        let file = make_parsed_file("Foo.cs", code);
        let high_only = Config {
            rules: RulesConfig {
                min_confidence: Some(Confidence::High),
                ..Default::default()
            },
            ..Default::default()
        };

        let all = AnalysisEngine::new().analyze(&file);
        let filtered = AnalysisEngine::with_config(&high_only).analyze(&file);

        assert!(all.iter().any(|d| d.rule_id == "WPF0041"));
        assert!(!filtered.iter().any(|d| d.rule_id == "WPF0041"));
    }

    #[test]
    fn analyze_files_resolves_across_files() {
        let base = make_parsed_file(
            "Base.cs",
            r#"
using System.Windows;

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
"#,
        );
        let derived = make_parsed_file(
            "Derived.cs",
            r#"
using System.Windows;

public class Derived : Base
{
    public void Grow()
    {
        SetValue(SizeProperty, "large");
    }
}
"#,
        );
        let files = vec![base, derived];

        let diagnostics = AnalysisEngine::new().analyze_files(&files);

        assert!(
            diagnostics
                .iter()
                .any(|d| d.rule_id == "WPF0014" && d.file == "Derived.cs" && d.line == 8),
            "Expected WPF0014 in Derived.cs, got {diagnostics:?}"
        );
    }

    #[test]
    fn analyze_in_skips_rules_for_foreign_files() {
        let engine = AnalysisEngine::new();
        let inside = make_parsed_file("Foo.cs", MISNAMED);
        let outside = make_parsed_file("Other.cs", MISNAMED);
        let compilation = engine.compile([&inside]);

        let diagnostics = engine.analyze_in(&compilation, &outside, &CancellationToken::new());

        assert!(diagnostics.is_empty());
    }

    #[test]
    fn cancelled_analysis_reports_nothing_from_rules() {
        let engine = AnalysisEngine::new();
        let file = make_parsed_file("Foo.cs", MISNAMED);
        let compilation = engine.compile([&file]);
        let token = CancellationToken::new();
        token.cancel();

        let diagnostics = engine.analyze_in(&compilation, &file, &token);

        assert!(diagnostics.is_empty());
    }
}
