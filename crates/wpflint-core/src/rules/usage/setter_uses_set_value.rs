//! setter-uses-set-value rule (WPF0035): CLR setters call `SetValue`.

use super::rename_callee_fix;
use crate::declare_rule;
use crate::dependency_property::ValueCallKind;
use crate::diagnostic::Diagnostic;
use crate::rules::helpers::{callee_name_span, clr_properties};
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    SetterUsesSetValue,
    id = "WPF0035",
    name = "setter-uses-set-value",
    description = "CLR property setter should call SetValue, not SetCurrentValue",
    category = Usage,
    severity = Warning,
    examples = "// Bad\npublic int Bar\n{\n    get => (int)GetValue(BarProperty);\n    set => SetCurrentValue(BarProperty, value);\n}\n\n// Good\npublic int Bar\n{\n    get => (int)GetValue(BarProperty);\n    set => SetValue(BarProperty, value);\n}"
);

impl Rule for SetterUsesSetValue {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;

        clr_properties(ctx)
            .into_iter()
            .take_while(|_| !ctx.is_cancelled())
            .filter_map(|property| {
                let setter = property.setter_call(&model)?;
                if setter.kind != ValueCallKind::SetCurrentValue {
                    return None;
                }
                let mut diagnostic = Diagnostic::at_span(
                    self.metadata.id,
                    self.metadata.severity,
                    format!("Setter of `{}` should call SetValue", property.decl.name.text),
                    ctx.file(),
                    callee_name_span(setter.invocation)?,
                )
                .with_suggestion("Use SetValue");
                if let Some(fix) = rename_callee_fix(ctx.file(), setter.invocation, "SetValue") {
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

    fn run_setter_uses_set_value(code: &str) -> Vec<Diagnostic> {
        run_rule(&SetterUsesSetValue::new(), code)
    }

    #[test]
    fn flags_set_current_value_in_setter() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo));

    public int Bar
    {
        get { return (int)this.GetValue(BarProperty); }
        set { this.SetCurrentValue(BarProperty, value); }
    }
}
"#;
        let diagnostics = run_setter_uses_set_value(code);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule_id, "WPF0035");
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (12, 20));
        let fixed = apply_first_fix(code, &diagnostics[0]);
        assert!(fixed.contains("set { this.SetValue(BarProperty, value); }"));
    }

    #[test]
    fn accepts_set_value_in_setter() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo));

    public int Bar
    {
        get => (int)GetValue(BarProperty);
        set => SetValue(BarProperty, value);
    }

    public void Reset() => SetCurrentValue(BarProperty, 0);
}
"#;
        assert!(run_setter_uses_set_value(code).is_empty());
    }
}
