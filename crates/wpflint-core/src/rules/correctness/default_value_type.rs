//! default-value-type rule (WPF0010): the default value in property metadata matches the
//! registered property type.

use super::{is_concrete, registered_type_of, type_name};
use crate::declare_rule;
use crate::dependency_property::PropertyMetadataCall;
use crate::diagnostic::Diagnostic;
use crate::rules::helpers::registration_calls;
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    DefaultValueType,
    id = "WPF0010",
    name = "default-value-type",
    description = "Default value must be of the registered property type",
    category = Correctness,
    severity = Error,
    examples = "// Bad: int default for a double property\nDependencyProperty.Register(nameof(Bar), typeof(double), typeof(Foo), new PropertyMetadata(1));\n\n// Good\nDependencyProperty.Register(nameof(Bar), typeof(double), typeof(Foo), new PropertyMetadata(1.0));"
);

impl Rule for DefaultValueType {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;
        let compilation = ctx.compilation();

        registration_calls(ctx)
            .iter()
            .take_while(|_| !ctx.is_cancelled())
            .filter_map(|call| {
                let metadata = PropertyMetadataCall::match_argument(call.metadata?, &model)?;
                let argument = metadata.default_value?;
                let actual = metadata.default_value_type(&model)?;
                let registered = registered_type_of(call, ctx)?;
                if !is_concrete(&actual) || !is_concrete(&registered) || model.is_assignable(&actual, &registered) {
                    return None;
                }
                let expected = type_name(&registered, compilation);
                Some(
                    Diagnostic::at_span(
                        self.metadata.id,
                        self.metadata.severity,
                        format!(
                            "Default value of type `{}` is not assignable to the registered type `{expected}`",
                            type_name(&actual, compilation)
                        ),
                        ctx.file(),
                        argument.span,
                    )
                    .with_suggestion(format!("Use a default value of type `{expected}`")),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run_rule;

    fn run_default_value_type(code: &str) -> Vec<Diagnostic> {
        run_rule(&DefaultValueType::new(), code)
    }

    #[test]
    fn flags_integer_default_for_double_property() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(double), typeof(Foo), new PropertyMetadata(1));

    public double Bar
    {
        get => (double)GetValue(BarProperty);
        set => SetValue(BarProperty, value);
    }
}
"#;
        let diagnostics = run_default_value_type(code);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule_id, "WPF0010");
        assert_eq!(diagnostics[0].line, 7);
        assert_eq!(
            diagnostics[0].message,
            "Default value of type `int` is not assignable to the registered type `double`"
        );
    }

    #[test]
    fn flags_string_default_in_framework_metadata() {
        let code = r#"
using System.Windows;

public class Foo : FrameworkElement
{
    public static readonly DependencyProperty CountProperty = DependencyProperty.Register(
        nameof(Count),
        typeof(int),
        typeof(Foo),
        new FrameworkPropertyMetadata("0"));

    public int Count => (int)GetValue(CountProperty);
}
"#;
        let diagnostics = run_default_value_type(code);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 10);
    }

    #[test]
    fn checks_override_metadata_against_the_overridden_property() {
        let code = r#"
using System.Windows;

public class Foo : FrameworkElement
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(bool), typeof(Foo), new PropertyMetadata(false));

    public bool Bar => (bool)GetValue(BarProperty);
}

public class Derived : Foo
{
    static Derived()
    {
        BarProperty.OverrideMetadata(typeof(Derived), new PropertyMetadata("yes"));
    }
}
"#;
        let diagnostics = run_default_value_type(code);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 16);
    }

    #[test]
    fn accepts_compatible_defaults() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(double), typeof(Foo), new PropertyMetadata(1.0));

    public static readonly DependencyProperty TextProperty = DependencyProperty.Register(
        nameof(Text), typeof(string), typeof(Foo), new PropertyMetadata(null));

    public static readonly DependencyProperty ValueProperty = DependencyProperty.Register(
        nameof(Value), typeof(object), typeof(Foo), new PropertyMetadata(1));

    public static readonly DependencyProperty CountProperty = DependencyProperty.Register(
        nameof(Count), typeof(int?), typeof(Foo), new PropertyMetadata(null));

    public static readonly DependencyProperty SizeProperty = DependencyProperty.Register(
        nameof(Size), typeof(double), typeof(Foo), new PropertyMetadata(default(double)));

    public static readonly DependencyProperty NoDefaultProperty = DependencyProperty.Register(
        nameof(NoDefault), typeof(int), typeof(Foo), new PropertyMetadata(OnNoDefaultChanged));

    private static void OnNoDefaultChanged(DependencyObject d, DependencyPropertyChangedEventArgs e)
    {
    }
}
"#;
        assert!(run_default_value_type(code).is_empty());
    }

    #[test]
    fn ignores_generic_registered_types() {
        let code = r#"
using System.Windows;

public class Foo<T> : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        "Bar", typeof(T), typeof(Foo<T>), new PropertyMetadata(default(T)));
}
"#;
        assert!(run_default_value_type(code).is_empty());
    }
}
