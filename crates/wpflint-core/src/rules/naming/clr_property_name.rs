//! clr-property-name rule (WPF0003): a CLR wrapper has the name the property was
//! registered with.

use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::rules::helpers::{clr_properties, rename_fix};
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    ClrPropertyName,
    id = "WPF0003",
    name = "clr-property-name",
    description = "CLR property wrapping a dependency property should have the registered name",
    category = Naming,
    severity = Warning,
    examples = "// Bad\npublic int Error\n{\n    get => (int)GetValue(BarProperty);\n    set => SetValue(BarProperty, value);\n}\n\n// Good\npublic int Bar\n{\n    get => (int)GetValue(BarProperty);\n    set => SetValue(BarProperty, value);\n}"
);

impl Rule for ClrPropertyName {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;

        clr_properties(ctx)
            .into_iter()
            .take_while(|_| !ctx.is_cancelled())
            .filter_map(|property| {
                let backing = property.backing_member(&model)?;
                let registered = backing.registered_name(&model, ctx.cancellation)?;
                let actual = &property.decl.name.text;
                if registered.name.is_empty() || *actual == registered.name {
                    return None;
                }

                let mut diagnostic = Diagnostic::at_span(
                    self.metadata.id,
                    self.metadata.severity,
                    format!(
                        "Property `{actual}` wraps `{}` and should be named `{}`",
                        backing.name(ctx.compilation()),
                        registered.name
                    ),
                    ctx.file(),
                    property.decl.name.span,
                )
                .with_suggestion(format!("Rename to `{}`", registered.name));
                if let Some(fix) = rename_fix(property.symbol, &registered.name, &model) {
                    diagnostic = diagnostic.with_fix(fix);
                }
                Some(diagnostic)
            })
            .collect()
    }
}
