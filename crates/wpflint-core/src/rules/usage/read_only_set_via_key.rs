//! read-only-set-via-key rule (WPF0040): read-only dependency properties are written
//! through their `DependencyPropertyKey`.

use super::rename_callee_edit;
use crate::declare_rule;
use crate::dependency_property::{resolve_registration, ValueCallKind};
use crate::diagnostic::{Diagnostic, Fix, TextEdit};
use crate::rules::helpers::value_calls;
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    ReadOnlySetViaKey,
    id = "WPF0040",
    name = "read-only-set-via-key",
    description = "Read-only dependency property must be set through its DependencyPropertyKey",
    category = Usage,
    severity = Error,
    examples = "// Bad\nthis.SetValue(StateProperty, value);\n\n// Good\nthis.SetValue(StatePropertyKey, value);"
);

impl Rule for ReadOnlySetViaKey {
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
                let backing = call.backing_member(&model)?;
                if backing.is_key() {
                    return None;
                }
                let resolved = resolve_registration(backing, compilation, ctx.cancellation)?;
                if !resolved.call.kind.is_read_only() {
                    return None;
                }
                let key = resolved.chain.iter().find(|member| member.is_key())?;
                let key_name = key.name(compilation);

                let mut diagnostic = Diagnostic::at_span(
                    self.metadata.id,
                    self.metadata.severity,
                    format!(
                        "`{}` is read-only and must be set through `{key_name}`",
                        backing.name(compilation)
                    ),
                    ctx.file(),
                    call.property.span,
                )
                .with_suggestion(format!("Use SetValue({key_name}, ...)"));

                if model.enclosing_type(call.invocation.span.lo) == Some(key.containing_type) {
                    let mut fix = Fix::new(format!("Use SetValue({key_name}, ...)"))
                        .with_edit(TextEdit::replace_span(ctx.file(), call.property.expr.span(), key_name));
                    if call.kind == ValueCallKind::SetCurrentValue {
                        fix = fix.with_edits(rename_callee_edit(ctx.file(), call.invocation, "SetValue"));
                    }
                    diagnostic = diagnostic.with_fix(fix);
                }
                Some(diagnostic)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{apply_first_fix, run_rule};

    const CODE: &str = r#"
using System.Windows;

public class Foo : DependencyObject
{
    private static readonly DependencyPropertyKey StatePropertyKey = DependencyProperty.RegisterReadOnly(
        nameof(State), typeof(string), typeof(Foo), new PropertyMetadata(null));

    public static readonly DependencyProperty StateProperty = StatePropertyKey.DependencyProperty;

    public string State => (string)GetValue(StateProperty);

    public void Load()
    {
        SetValue(StateProperty, "loaded");
        SetCurrentValue(StateProperty, "busy");
        SetValue(StatePropertyKey, "done");
    }
}
"#;

    fn run_read_only_set_via_key(code: &str) -> Vec<Diagnostic> {
        run_rule(&ReadOnlySetViaKey::new(), code)
    }

    #[test]
    fn flags_writes_through_the_public_property() {
        let diagnostics = run_read_only_set_via_key(CODE);

        let lines: Vec<usize> = diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, [15, 16]);
        assert_eq!(diagnostics[0].rule_id, "WPF0040");
        assert_eq!(
            diagnostics[0].message,
            "`StateProperty` is read-only and must be set through `StatePropertyKey`"
        );
    }

    #[test]
    fn fix_uses_the_key() {
        let diagnostics = run_read_only_set_via_key(CODE);

        let set_value = apply_first_fix(CODE, &diagnostics[0]);
        let set_current_value = apply_first_fix(CODE, &diagnostics[1]);

        assert!(set_value.contains("SetValue(StatePropertyKey, \"loaded\");"));
        assert!(set_current_value.contains("SetValue(StatePropertyKey, \"busy\");"));
        assert!(!set_current_value.contains("SetCurrentValue"));
    }

    #[test]
    fn ignores_mutable_properties() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo));

    public void Reset() => SetValue(BarProperty, 0);
}
"#;
        assert!(run_read_only_set_via_key(code).is_empty());
    }
}
