//! coerce-value-callback-name rule (WPF0006): coerce callbacks are named `Coerce{Name}`.

use super::misnamed_callbacks;
use crate::declare_rule;
use crate::dependency_property::CallbackKind;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    CoerceValueCallbackName,
    id = "WPF0006",
    name = "coerce-value-callback-name",
    description = "CoerceValueCallback should be named `Coerce{Name}`",
    category = Naming,
    severity = Info,
    examples = "// Bad\nnew PropertyMetadata(0, OnBarChanged, Clamp)\n\n// Good\nnew PropertyMetadata(0, OnBarChanged, CoerceBar)"
);

impl Rule for CoerceValueCallbackName {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        misnamed_callbacks(ctx, &self.metadata, CallbackKind::CoerceValue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{apply_first_fix, run_rule};

    fn run_coerce_value_callback_name(code: &str) -> Vec<Diagnostic> {
        run_rule(&CoerceValueCallbackName::new(), code)
    }

    #[test]
    fn flags_misnamed_coerce_callback() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(0, OnBarChanged, Clamp));

    public int Bar
    {
        get => (int)GetValue(BarProperty);
        set => SetValue(BarProperty, value);
    }

    private static void OnBarChanged(DependencyObject d, DependencyPropertyChangedEventArgs e)
    {
    }

    private static object Clamp(DependencyObject d, object baseValue) => baseValue;
}
"#;
        let diagnostics = run_coerce_value_callback_name(code);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule_id, "WPF0006");
        assert!(diagnostics[0].message.ends_with("should be named `CoerceBar`"));
        let fixed = apply_first_fix(code, &diagnostics[0]);
        assert!(fixed.contains("private static object CoerceBar(DependencyObject d, object baseValue)"));
    }

    #[test]
    fn accepts_conventional_name_and_this_qualified_reference() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(0, null, Foo.CoerceBar));

    public int Bar
    {
        get => (int)GetValue(BarProperty);
        set => SetValue(BarProperty, value);
    }

    private static object CoerceBar(DependencyObject d, object baseValue) => baseValue;
}
"#;
        assert!(run_coerce_value_callback_name(code).is_empty());
    }
}
