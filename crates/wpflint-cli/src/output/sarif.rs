//! SARIF 2.1.0 log for code scanning services.
//!
//! Rule findings become results that point into the run's rule and artifact tables by
//! index. Syntax errors are not rule findings and are reported as tool execution
//! notifications.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use wpflint_core::diagnostic::{Diagnostic, Fix, TextEdit};
use wpflint_core::rules::{Confidence, Rule, RuleRegistry, Severity};

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";
const SRCROOT: &str = "%SRCROOT%";
const PARSE_RULE_ID: &str = "PARSE";

#[derive(Serialize)]
struct Log {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<Run>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Run {
    tool: Tool,
    invocations: Vec<Invocation>,
    results: Vec<FindingResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    artifacts: Vec<Artifact>,
}

#[derive(Serialize)]
struct Tool {
    driver: Driver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Driver {
    name: &'static str,
    semantic_version: &'static str,
    information_uri: &'static str,
    rules: Vec<ReportingDescriptor>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportingDescriptor {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'static str>,
    short_description: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<Help>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help_uri: Option<&'static str>,
    default_configuration: Configuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<RuleProperties>,
}

#[derive(Serialize)]
struct Message {
    text: String,
}

#[derive(Serialize)]
struct Help {
    text: String,
    markdown: String,
}

#[derive(Serialize)]
struct Configuration {
    level: &'static str,
}

#[derive(Serialize)]
struct RuleProperties {
    tags: Vec<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Invocation {
    execution_successful: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_execution_notifications: Vec<Notification>,
}

#[derive(Serialize)]
struct Notification {
    level: &'static str,
    message: Message,
    locations: Vec<Location>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FindingResult {
    rule_id: String,
    rule_index: usize,
    level: &'static str,
    message: Message,
    locations: Vec<Location>,
    partial_fingerprints: Fingerprints,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fixes: Vec<ProposedFix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<ResultProperties>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    physical_location: PhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PhysicalLocation {
    artifact_location: ArtifactLocation,
    region: Region,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactLocation {
    uri: String,
    uri_base_id: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Region {
    start_line: usize,
    start_column: usize,
    end_line: usize,
    end_column: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Fingerprints {
    primary_location_line_hash: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProposedFix {
    description: Message,
    artifact_changes: Vec<ArtifactChange>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactChange {
    artifact_location: ArtifactLocation,
    replacements: Vec<Replacement>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Replacement {
    deleted_region: Region,
    #[serde(skip_serializing_if = "Option::is_none")]
    inserted_content: Option<Message>,
}

#[derive(Serialize)]
struct Artifact {
    location: ArtifactLocation,
}

#[derive(Serialize)]
struct ResultProperties {
    confidence: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
}

/// Descriptors of the enabled rules, extended with any rule id a finding reports that
/// the registry does not know.
struct RuleTable {
    descriptors: Vec<ReportingDescriptor>,
    indices: HashMap<String, usize>,
}

impl RuleTable {
    fn new(registry: Option<&RuleRegistry>) -> Self {
        let mut table = Self {
            descriptors: Vec::new(),
            indices: HashMap::new(),
        };
        if let Some(registry) = registry {
            for rule in registry.rules() {
                if registry.is_rule_enabled(rule.metadata().id) {
                    table.push(describe_rule(rule, registry));
                }
            }
        }
        table
    }

    fn push(&mut self, descriptor: ReportingDescriptor) -> usize {
        let index = self.descriptors.len();
        self.indices.insert(descriptor.id.clone(), index);
        self.descriptors.push(descriptor);
        index
    }

    fn index_of(&mut self, rule_id: &str) -> usize {
        match self.indices.get(rule_id) {
            Some(index) => *index,
            None => self.push(ReportingDescriptor {
                id: rule_id.to_string(),
                name: None,
                short_description: Message {
                    text: rule_id.to_string(),
                },
                help: None,
                help_uri: None,
                default_configuration: Configuration { level: "warning" },
                properties: None,
            }),
        }
    }
}

/// Files in the order findings first mention them.
#[derive(Default)]
struct ArtifactTable {
    artifacts: Vec<Artifact>,
    indices: HashMap<String, usize>,
}

impl ArtifactTable {
    fn location(&mut self, file: &str) -> ArtifactLocation {
        let uri = normalize_path(file);
        let index = match self.indices.get(&uri) {
            Some(index) => *index,
            None => {
                let index = self.artifacts.len();
                self.artifacts.push(Artifact {
                    location: ArtifactLocation {
                        uri: uri.clone(),
                        uri_base_id: SRCROOT,
                        index: None,
                    },
                });
                self.indices.insert(uri.clone(), index);
                index
            }
        };
        ArtifactLocation {
            uri,
            uri_base_id: SRCROOT,
            index: Some(index),
        }
    }
}

pub struct SarifFormatter<'a> {
    registry: Option<&'a RuleRegistry>,
}

impl<'a> SarifFormatter<'a> {
    pub fn new() -> Self {
        Self { registry: None }
    }

    pub fn with_registry(registry: &'a RuleRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    pub fn format(&self, diagnostics: &[Diagnostic]) -> String {
        serde_json::to_string_pretty(&self.build_log(diagnostics)).unwrap_or_else(|_| "{}".to_string())
    }

    fn build_log(&self, diagnostics: &[Diagnostic]) -> Log {
        let mut rules = RuleTable::new(self.registry);
        let mut artifacts = ArtifactTable::default();
        let mut results = Vec::new();
        let mut notifications = Vec::new();

        for diag in diagnostics {
            if diag.rule_id == PARSE_RULE_ID {
                notifications.push(Notification {
                    level: "error",
                    message: Message {
                        text: diag.message.clone(),
                    },
                    locations: vec![location(diag, &mut artifacts)],
                });
            } else {
                let rule_index = rules.index_of(&diag.rule_id);
                results.push(finding(diag, rule_index, &mut artifacts));
            }
        }

        Log {
            schema: SARIF_SCHEMA,
            version: SARIF_VERSION,
            runs: vec![Run {
                tool: Tool {
                    driver: Driver {
                        name: "wpflint",
                        semantic_version: env!("CARGO_PKG_VERSION"),
                        information_uri: env!("CARGO_PKG_REPOSITORY"),
                        rules: rules.descriptors,
                    },
                },
                invocations: vec![Invocation {
                    execution_successful: true,
                    tool_execution_notifications: notifications,
                }],
                results,
                artifacts: artifacts.artifacts,
            }],
        }
    }
}

impl Default for SarifFormatter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn describe_rule(rule: &dyn Rule, registry: &RuleRegistry) -> ReportingDescriptor {
    let metadata = rule.metadata();
    ReportingDescriptor {
        id: metadata.id.to_string(),
        name: Some(metadata.name),
        short_description: Message {
            text: metadata.description.to_string(),
        },
        help: metadata.examples.map(|examples| Help {
            text: examples.to_string(),
            markdown: format!("```csharp\n{examples}\n```"),
        }),
        help_uri: metadata.docs_url,
        default_configuration: Configuration {
            level: level(registry.effective_severity(rule)),
        },
        properties: Some(RuleProperties {
            tags: vec!["wpf", metadata.category.as_str()],
        }),
    }
}

fn finding(diag: &Diagnostic, rule_index: usize, artifacts: &mut ArtifactTable) -> FindingResult {
    let properties = (diag.confidence != Confidence::High || diag.suggestion.is_some()).then(|| {
        ResultProperties {
            confidence: diag.confidence.as_str(),
            suggestion: diag.suggestion.clone(),
        }
    });

    FindingResult {
        rule_id: diag.rule_id.clone(),
        rule_index,
        level: level(diag.severity),
        message: Message {
            text: diag.message.clone(),
        },
        locations: vec![location(diag, artifacts)],
        partial_fingerprints: Fingerprints {
            primary_location_line_hash: fingerprint(diag),
        },
        fixes: diag
            .fixes
            .iter()
            .map(|fix| proposed_fix(fix, &diag.file, artifacts))
            .collect(),
        properties,
    }
}

fn location(diag: &Diagnostic, artifacts: &mut ArtifactTable) -> Location {
    Location {
        physical_location: PhysicalLocation {
            artifact_location: artifacts.location(&diag.file),
            region: Region {
                start_line: diag.line,
                start_column: diag.column,
                end_line: diag.end_line,
                end_column: diag.end_column,
            },
        },
    }
}

fn proposed_fix(fix: &Fix, file: &str, artifacts: &mut ArtifactTable) -> ProposedFix {
    ProposedFix {
        description: Message {
            text: fix.title.clone(),
        },
        artifact_changes: vec![ArtifactChange {
            artifact_location: artifacts.location(file),
            replacements: fix.edits.iter().map(replacement).collect(),
        }],
    }
}

fn replacement(edit: &TextEdit) -> Replacement {
    Replacement {
        deleted_region: Region {
            start_line: edit.line,
            start_column: edit.column,
            end_line: edit.end_line,
            end_column: edit.end_column,
        },
        inserted_content: (!edit.new_text.is_empty()).then(|| Message {
            text: edit.new_text.clone(),
        }),
    }
}

fn level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info | Severity::Hint => "note",
    }
}

fn normalize_path(path: &str) -> String {
    path.trim_start_matches("./").replace('\\', "/")
}

/// Independent of the line so a finding keeps its identity when code above it moves.
fn fingerprint(diag: &Diagnostic) -> String {
    let mut hasher = DefaultHasher::new();
    diag.rule_id.hash(&mut hasher);
    normalize_path(&diag.file).hash(&mut hasher);
    diag.message.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
