//! property-changed-callback-name rule (WPF0005): change callbacks are named
//! `On{Name}Changed`.

use super::misnamed_callbacks;
use crate::declare_rule;
use crate::dependency_property::CallbackKind;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    PropertyChangedCallbackName,
    id = "WPF0005",
    name = "property-changed-callback-name",
    description = "PropertyChangedCallback should be named `On{Name}Changed`",
    category = Naming,
    severity = Info,
    examples = "// Bad\nnew PropertyMetadata(0, OnChanged)\n\n// Good\nnew PropertyMetadata(0, OnBarChanged)"
);

impl Rule for PropertyChangedCallbackName {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        misnamed_callbacks(ctx, &self.metadata, CallbackKind::PropertyChanged)
    }
}
