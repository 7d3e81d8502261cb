//! set-value-type rule (WPF0014): values passed to `SetValue` / `SetCurrentValue` are of
//! the registered type.

use super::{is_concrete, type_name};
use crate::catalog::SYSTEM_OBJECT;
use crate::declare_rule;
use crate::dependency_property::ValueCallKind;
use crate::diagnostic::Diagnostic;
use crate::rules::helpers::value_calls;
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    SetValueType,
    id = "WPF0014",
    name = "set-value-type",
    description = "Value passed to SetValue must be of the registered type",
    category = Correctness,
    severity = Error,
    examples = "// Bad, BarProperty is registered with typeof(int)\nthis.SetValue(BarProperty, 1.0);\n\n// Good\nthis.SetValue(BarProperty, 1);"
);

impl Rule for SetValueType {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;
        let compilation = ctx.compilation();

        value_calls(ctx)
            .into_iter()
            .filter(|call| call.kind != ValueCallKind::GetValue)
            .take_while(|_| !ctx.is_cancelled())
            .filter_map(|call| {
                let value = call.value?;
                let backing = call.backing_member(&model)?;
                let registered = backing.registered_type(&model, ctx.cancellation)?;
                let actual = model.type_of(&value.expr);
                // `object` values are checked by the framework at runtime.
                if SYSTEM_OBJECT.is_type(&actual, compilation)
                    || !is_concrete(&actual)
                    || !is_concrete(&registered)
                    || model.is_assignable(&actual, &registered)
                {
                    return None;
                }

                let expected = type_name(&registered, compilation);
                Some(
                    Diagnostic::at_span(
                        self.metadata.id,
                        self.metadata.severity,
                        format!(
                            "{} passes `{}` to `{}` which is registered as `{expected}`",
                            call.kind.method_name(),
                            type_name(&actual, compilation),
                            backing.name(compilation)
                        ),
                        ctx.file(),
                        value.span,
                    )
                    .with_suggestion(format!("Pass a value of type `{expected}`")),
                )
            })
            .collect()
    }
}
