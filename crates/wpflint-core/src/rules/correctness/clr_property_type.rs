//! clr-property-type rule (WPF0012): a CLR wrapper is declared with the registered type.

use super::{is_concrete, retype_fix, type_name};
use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::rules::helpers::clr_properties;
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    ClrPropertyType,
    id = "WPF0012",
    name = "clr-property-type",
    description = "CLR property type should match the registered type",
    category = Correctness,
    severity = Warning,
    examples = "// Bad\npublic static readonly DependencyProperty BarProperty = DependencyProperty.Register(\n    nameof(Bar), typeof(int), typeof(Foo));\n\npublic double Bar\n{\n    get => (double)GetValue(BarProperty);\n    set => SetValue(BarProperty, value);\n}\n\n// Good\npublic int Bar\n{\n    get => (int)GetValue(BarProperty);\n    set => SetValue(BarProperty, value);\n}"
);

impl Rule for ClrPropertyType {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;
        let compilation = ctx.compilation();

        clr_properties(ctx)
            .into_iter()
            .take_while(|_| !ctx.is_cancelled())
            .filter_map(|property| {
                let backing = property.backing_member(&model)?;
                let registered = backing.registered_type(&model, ctx.cancellation)?;
                let actual = model.symbol_type(property.symbol);
                if !is_concrete(&actual) || !is_concrete(&registered) || actual == registered {
                    return None;
                }

                let expected = type_name(&registered, compilation);
                let span = property.decl.ty.span();
                let mut diagnostic = Diagnostic::at_span(
                    self.metadata.id,
                    self.metadata.severity,
                    format!(
                        "Property `{}` is of type `{}` but `{}` is registered as `{expected}`",
                        property.decl.name.text,
                        type_name(&actual, compilation),
                        backing.name(compilation)
                    ),
                    ctx.file(),
                    span,
                )
                .with_suggestion(format!("Change the property type to `{expected}`"));
                if let Some(fix) = retype_fix(ctx.file(), span, &registered, compilation) {
                    diagnostic = diagnostic.with_fix(fix);
                }
                Some(diagnostic)
            })
            .collect()
    }
}
