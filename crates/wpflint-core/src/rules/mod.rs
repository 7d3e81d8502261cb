//! Rule system for code analysis
//!
//! Provides naming, correctness and usage rules for WPF dependency property declarations.

pub mod correctness;
pub mod helpers;
pub mod naming;
pub mod usage;

use crate::cancellation::CancellationToken;
use crate::config::RulesConfig;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::semantic::{Compilation, SemanticModel};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }
}

/// How sure a rule is that a finding is real. Ordered from least to most certain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    #[default]
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    Naming,
    Correctness,
    Usage,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Naming => "naming",
            RuleCategory::Correctness => "correctness",
            RuleCategory::Usage => "usage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: RuleCategory,
    pub severity: Severity,
    pub docs_url: Option<&'static str>,
    pub examples: Option<&'static str>,
}

impl RuleMetadata {
    /// Whether `reference` is this rule's id or its kebab-case name.
    pub fn is_named(&self, reference: &str) -> bool {
        self.id == reference || self.name == reference
    }
}

/// What a rule sees: one file of a compilation.
#[derive(Clone, Copy)]
pub struct RuleContext<'r, 'c, 'a> {
    pub model: SemanticModel<'c, 'a>,
    pub cancellation: &'r CancellationToken,
}

impl<'r, 'c, 'a> RuleContext<'r, 'c, 'a> {
    pub fn new(model: SemanticModel<'c, 'a>, cancellation: &'r CancellationToken) -> Self {
        Self { model, cancellation }
    }

    pub fn file(&self) -> &'a ParsedFile {
        self.model.file()
    }

    pub fn compilation(&self) -> &'c Compilation<'a> {
        self.model.compilation()
    }

    pub fn filename(&self) -> &'a str {
        &self.model.file().metadata().filename
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

pub trait Rule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;
    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic>;
}

/// Built-in rules plus the `[rules]` settings that switch them off or change their severity.
///
/// Settings name rules by id or by name; both resolve to the id when the registry is
/// configured, so entries naming no registered rule have no effect.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    disabled: HashSet<&'static str>,
    disabled_categories: HashSet<RuleCategory>,
    severities: HashMap<&'static str, Severity>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Replaces any earlier settings with `config`.
    pub fn configure(&mut self, config: &RulesConfig) {
        self.disabled = config
            .disabled
            .iter()
            .filter_map(|reference| self.resolve_id(reference))
            .collect();
        self.severities = config
            .severity
            .iter()
            .filter_map(|(reference, severity)| Some((self.resolve_id(reference)?, *severity)))
            .collect();
        self.disabled_categories = [
            (RuleCategory::Naming, config.naming),
            (RuleCategory::Correctness, config.correctness),
            (RuleCategory::Usage, config.usage),
        ]
        .into_iter()
        .filter(|(_, enabled)| *enabled == Some(false))
        .map(|(category, _)| category)
        .collect();
    }

    fn resolve_id(&self, reference: &str) -> Option<&'static str> {
        let id = self.find(reference).map(|rule| rule.metadata().id);
        if id.is_none() {
            tracing::debug!(reference, "configuration names an unknown rule");
        }
        id
    }

    fn find(&self, reference: &str) -> Option<&dyn Rule> {
        self.rules()
            .find(|rule| rule.metadata().is_named(reference))
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    fn enabled_rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules().filter(|rule| self.runs(rule.metadata()))
    }

    pub fn run_all(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let mut found = Vec::new();
        for rule in self.enabled_rules() {
            if ctx.is_cancelled() {
                break;
            }
            let started = std::time::Instant::now();
            let mut diagnostics = rule.check(ctx);
            tracing::trace!(
                rule = rule.metadata().id,
                file = ctx.filename(),
                found = diagnostics.len(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "rule finished"
            );
            if let Some(&severity) = self.severities.get(rule.metadata().id) {
                diagnostics.iter_mut().for_each(|d| d.severity = severity);
            }
            found.append(&mut diagnostics);
        }
        found
    }

    fn runs(&self, metadata: &RuleMetadata) -> bool {
        !self.disabled_categories.contains(&metadata.category)
            && !self.disabled.contains(metadata.id)
    }

    /// Severity the rule reports with once `[rules.severity]` overrides apply.
    pub fn effective_severity(&self, rule: &dyn Rule) -> Severity {
        let metadata = rule.metadata();
        self.severities
            .get(metadata.id)
            .copied()
            .unwrap_or(metadata.severity)
    }

    pub fn is_rule_enabled(&self, id_or_name: &str) -> bool {
        self.find(id_or_name)
            .is_some_and(|rule| self.runs(rule.metadata()))
    }

    pub fn get_rule(&self, id: &str) -> Option<&dyn Rule> {
        self.rules().find(|r| r.metadata().id == id)
    }

    pub fn get_rule_by_name(&self, name: &str) -> Option<&dyn Rule> {
        self.rules().find(|r| r.metadata().name == name)
    }

    /// Name of the rule with this id, for disable comments written with rule names.
    pub fn rule_name(&self, id: &str) -> Option<&'static str> {
        self.get_rule(id).map(|rule| rule.metadata().name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Registry with every built-in rule.
pub fn default_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();

    registry.register(Box::new(naming::BackingFieldName::new()));
    registry.register(Box::new(naming::BackingKeyName::new()));
    registry.register(Box::new(naming::ClrPropertyName::new()));
    registry.register(Box::new(naming::AttachedAccessorName::new()));
    registry.register(Box::new(naming::PropertyChangedCallbackName::new()));
    registry.register(Box::new(naming::CoerceValueCallbackName::new()));
    registry.register(Box::new(naming::ValidateValueCallbackName::new()));

    registry.register(Box::new(correctness::DefaultValueType::new()));
    registry.register(Box::new(correctness::RegisteredOwnerType::new()));
    registry.register(Box::new(correctness::ClrPropertyType::new()));
    registry.register(Box::new(correctness::AttachedAccessorType::new()));
    registry.register(Box::new(correctness::SetValueType::new()));
    registry.register(Box::new(correctness::OwnerIsDependencyObject::new()));
    registry.register(Box::new(correctness::UseNameofForRegisteredName::new()));

    registry.register(Box::new(usage::BackingFieldStaticReadonly::new()));
    registry.register(Box::new(usage::KeyDeclaredBeforeProperty::new()));
    registry.register(Box::new(usage::AccessorsUseSameProperty::new()));
    registry.register(Box::new(usage::SetterUsesSetValue::new()));
    registry.register(Box::new(usage::NoSideEffectsInClrAccessors::new()));
    registry.register(Box::new(usage::ReadOnlySetViaKey::new()));
    registry.register(Box::new(usage::SetMutableWithSetCurrentValue::new()));
    registry.register(Box::new(usage::NoSetCurrentValueForDataContext::new()));

    registry
}

#[macro_export]
macro_rules! declare_rule {
    (
        $name:ident,
        id = $id:literal,
        name = $rule_name:literal,
        description = $desc:literal,
        category = $cat:ident,
        severity = $sev:ident
        $(, docs_url = $url:literal)?
        $(, examples = $examples:literal)?
    ) => {
        pub struct $name {
            metadata: $crate::rules::RuleMetadata,
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    metadata: $crate::rules::RuleMetadata {
                        id: $id,
                        name: $rule_name,
                        description: $desc,
                        category: $crate::rules::RuleCategory::$cat,
                        severity: $crate::rules::Severity::$sev,
                        docs_url: declare_rule!(@docs_url $($url)?),
                        examples: declare_rule!(@examples $($examples)?),
                    },
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
    (@docs_url $url:literal) => { Some($url) };
    (@docs_url) => { None };
    (@examples $examples:literal) => { Some($examples) };
    (@examples) => { None };
}
