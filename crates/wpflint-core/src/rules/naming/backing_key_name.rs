//! backing-key-name rule (WPF0002): `DependencyPropertyKey` members are named
//! `{RegisteredName}PropertyKey`.

use super::misnamed_backing_members;
use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    BackingKeyName,
    id = "WPF0002",
    name = "backing-key-name",
    description = "Backing member of a read-only dependency property key should be named after the registered name with a `PropertyKey` suffix",
    category = Naming,
    severity = Warning,
    examples = "// Bad\nprivate static readonly DependencyPropertyKey BarKey = DependencyProperty.RegisterReadOnly(\n    nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(0));\n\n// Good\nprivate static readonly DependencyPropertyKey BarPropertyKey = DependencyProperty.RegisterReadOnly(\n    nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(0));"
);

impl Rule for BackingKeyName {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        misnamed_backing_members(ctx, &self.metadata, true)
    }
}
