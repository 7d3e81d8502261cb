//! backing-field-name rule (WPF0001): `DependencyProperty` members are named
//! `{RegisteredName}Property`.

use super::misnamed_backing_members;
use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    BackingFieldName,
    id = "WPF0001",
    name = "backing-field-name",
    description = "Backing member of a dependency property should be named after the registered name with a `Property` suffix",
    category = Naming,
    severity = Warning,
    examples = "// Bad\npublic static readonly DependencyProperty ErrorProperty = DependencyProperty.Register(\n    nameof(Bar), typeof(int), typeof(Foo));\n\n// Good\npublic static readonly DependencyProperty BarProperty = DependencyProperty.Register(\n    nameof(Bar), typeof(int), typeof(Foo));"
);

impl Rule for BackingFieldName {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        misnamed_backing_members(ctx, &self.metadata, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{apply_first_fix, run_rule};

    fn run_backing_field_name(code: &str) -> Vec<Diagnostic> {
        run_rule(&BackingFieldName::new(), code)
    }

    #[test]
    fn accepts_conventional_name() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo));

    public int Bar { get; set; }
}
"#;
        assert!(run_backing_field_name(code).is_empty());
    }

    #[test]
    fn flags_mismatched_field_and_renames_references() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty ErrorProperty = DependencyProperty.Register(
        "Bar", typeof(int), typeof(Foo));

    public int Bar
    {
        get => (int)GetValue(ErrorProperty);
        set => SetValue(ErrorProperty, value);
    }
}
"#;
        let diagnostics = run_backing_field_name(code);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule_id, "WPF0001");
        assert_eq!(diagnostics[0].line, 6);
        assert!(diagnostics[0].message.contains("`BarProperty`"));
        let fixed = apply_first_fix(code, &diagnostics[0]);
        assert!(!fixed.contains("ErrorProperty"));
        assert_eq!(fixed.matches("BarProperty").count(), 3);
    }

    #[test]
    fn follows_key_to_registered_name() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    private static readonly DependencyPropertyKey BarPropertyKey = DependencyProperty.RegisterReadOnly(
        nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(0));

    public static readonly DependencyProperty WrongProperty = BarPropertyKey.DependencyProperty;

    public int Bar => (int)GetValue(WrongProperty);
}
"#;
        let diagnostics = run_backing_field_name(code);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.starts_with("`WrongProperty` should be named `BarProperty`"));
    }

    #[test]
    fn add_owner_uses_inherited_name() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        "Bar", typeof(int), typeof(Foo));
}

public class Other : DependencyObject
{
    public static readonly DependencyProperty OtherBarProperty = Foo.BarProperty.AddOwner(typeof(Other));
}
"#;
        let diagnostics = run_backing_field_name(code);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 12);
    }

    #[test]
    fn ignores_keys_and_unresolved_names() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    private static readonly DependencyPropertyKey OddKey = DependencyProperty.RegisterReadOnly(
        "Bar", typeof(int), typeof(Foo), new PropertyMetadata(0));

    public static readonly DependencyProperty DynamicProperty = DependencyProperty.Register(
        GetName(), typeof(int), typeof(Foo));

    private static string GetName() => "Dynamic";
}
"#;
        assert!(run_backing_field_name(code).is_empty());
    }
}
