//! Integration tests over the C# fixtures in tests/fixtures/

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use insta::assert_json_snapshot;
use wpflint_core::analysis::AnalysisEngine;
use wpflint_core::cancellation::CancellationToken;
use wpflint_core::dependency_property::{collect_facts, BackingKind, CallbackKind, RegistrationKind};
use wpflint_core::parser::ParsedFile;
use wpflint_core::rules::default_registry;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures");
const EXPECT_MARKER: &str = "// expect: ";

fn collect_fixtures(subdir: &str) -> Vec<ParsedFile> {
    let dir_path = Path::new(FIXTURES_DIR).join(subdir);
    let mut paths: Vec<_> = fs::read_dir(&dir_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", dir_path.display(), e))
        .map(|entry| entry.expect("Failed to read directory entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "cs"))
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let content = fs::read_to_string(path).expect("Failed to read fixture file");
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            ParsedFile::from_source(&name, &content)
        })
        .collect()
}

fn expected_rules(file: &ParsedFile) -> BTreeSet<String> {
    file.source()
        .lines()
        .filter_map(|line| line.trim().strip_prefix(EXPECT_MARKER))
        .map(|id| id.trim().to_string())
        .collect()
}

#[test]
fn all_fixtures_parse_without_errors() {
    let mut fixtures = collect_fixtures("valid");
    fixtures.extend(collect_fixtures("invalid"));

    assert!(fixtures.len() >= 5, "Expected fixtures in {FIXTURES_DIR}");
    for file in &fixtures {
        assert!(
            file.errors().is_empty(),
            "Fixture {} failed to parse: {:?}",
            file.metadata().filename,
            file.errors()
        );
    }
}

#[test]
fn valid_fixtures_have_no_diagnostics() {
    let fixtures = collect_fixtures("valid");

    let diagnostics = AnalysisEngine::new().analyze_files(&fixtures);

    assert!(diagnostics.is_empty(), "Unexpected diagnostics: {diagnostics:#?}");
}

#[test]
fn invalid_fixtures_report_expected_rules() {
    let fixtures = collect_fixtures("invalid");
    let engine = AnalysisEngine::new();
    let compilation = engine.compile(&fixtures);
    let token = CancellationToken::new();

    for file in &fixtures {
        let expected = expected_rules(file);
        let found: BTreeSet<String> = engine
            .analyze_in(&compilation, file, &token)
            .into_iter()
            .map(|d| d.rule_id)
            .collect();

        assert!(!expected.is_empty(), "{} has no expectations", file.metadata().filename);
        let missing: Vec<_> = expected.difference(&found).collect();
        assert!(
            missing.is_empty(),
            "{}: missing {:?}, found {:?}",
            file.metadata().filename,
            missing,
            found
        );
    }
}

#[test]
fn facts_for_valid_control() {
    let fixtures = collect_fixtures("valid");
    let engine = AnalysisEngine::new();
    let compilation = engine.compile(&fixtures);
    let gauge = fixtures
        .iter()
        .find(|f| f.metadata().filename == "Gauge.cs")
        .expect("Gauge.cs fixture");
    let model = compilation.model_for(gauge).expect("model");

    let facts = collect_facts(&model, &CancellationToken::new());

    let members: Vec<(&str, BackingKind)> = facts.iter().map(|f| (f.member.as_str(), f.kind)).collect();
    assert_eq!(
        members,
        vec![
            ("MaximumProperty", BackingKind::Field),
            ("IsActivePropertyKey", BackingKind::KeyField),
            ("IsActiveProperty", BackingKind::Field),
        ]
    );

    let maximum = &facts[0];
    assert_eq!(maximum.registration, Some(RegistrationKind::Register));
    assert_eq!(maximum.registered_name.as_deref(), Some("Maximum"));
    assert_eq!(maximum.registered_type.as_deref(), Some("System.Double"));
    assert!(maximum.clr_property.as_ref().is_some_and(|p| p.valid_pair));
    let callbacks: Vec<(CallbackKind, bool)> = maximum
        .callbacks
        .iter()
        .map(|c| (c.kind, c.resolved && c.expected_name.as_deref() == Some(c.name.as_str())))
        .collect();
    assert_eq!(
        callbacks,
        vec![
            (CallbackKind::PropertyChanged, true),
            (CallbackKind::CoerceValue, true),
            (CallbackKind::ValidateValue, true),
        ]
    );

    let is_active = &facts[2];
    assert_eq!(is_active.registration, Some(RegistrationKind::RegisterReadOnly));
    assert_eq!(is_active.registered_name.as_deref(), Some("IsActive"));
}

#[test]
fn facts_are_stable_across_runs() {
    let fixtures = collect_fixtures("valid");
    let engine = AnalysisEngine::new();
    let compilation = engine.compile(&fixtures);
    let token = CancellationToken::new();

    for file in &fixtures {
        let model = compilation.model_for(file).expect("model");
        assert_eq!(collect_facts(&model, &token), collect_facts(&model, &token));
    }
}

#[test]
fn built_in_rules() {
    let registry = default_registry();
    let rules: Vec<String> = registry
        .rules()
        .map(|rule| format!("{} {}", rule.metadata().id, rule.metadata().name))
        .collect();

    assert_json_snapshot!(rules, @r###"
    [
      "WPF0001 backing-field-name",
      "WPF0002 backing-key-name",
      "WPF0003 clr-property-name",
      "WPF0004 attached-accessor-name",
      "WPF0005 property-changed-callback-name",
      "WPF0006 coerce-value-callback-name",
      "WPF0007 validate-value-callback-name",
      "WPF0010 default-value-type",
      "WPF0011 registered-owner-type",
      "WPF0012 clr-property-type",
      "WPF0013 attached-accessor-type",
      "WPF0014 set-value-type",
      "WPF0015 owner-is-dependency-object",
      "WPF0016 use-nameof-for-registered-name",
      "WPF0030 backing-field-static-readonly",
      "WPF0031 key-declared-before-property",
      "WPF0032 accessors-use-same-property",
      "WPF0035 setter-uses-set-value",
      "WPF0036 no-side-effects-in-clr-accessors",
      "WPF0040 read-only-set-via-key",
      "WPF0041 set-mutable-with-set-current-value",
      "WPF0043 no-set-current-value-for-data-context"
    ]
    "###);
}
