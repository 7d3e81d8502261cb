//! validate-value-callback-name rule (WPF0007): validation callbacks are named
//! `Validate{Name}` or `{Name}ValidateValue`.

use super::misnamed_callbacks;
use crate::declare_rule;
use crate::dependency_property::CallbackKind;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    ValidateValueCallbackName,
    id = "WPF0007",
    name = "validate-value-callback-name",
    description = "ValidateValueCallback should be named `Validate{Name}`",
    category = Naming,
    severity = Info,
    examples = "// Bad\nDependencyProperty.Register(nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(0), IsPositive);\n\n// Good\nDependencyProperty.Register(nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(0), ValidateBar);"
);

impl Rule for ValidateValueCallbackName {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        misnamed_callbacks(ctx, &self.metadata, CallbackKind::ValidateValue)
    }
}
