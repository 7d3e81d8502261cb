//! attached-accessor-name rule (WPF0004): `Get{Name}` / `Set{Name}` accessors of an
//! attached property use the registered name.

use crate::declare_rule;
use crate::dependency_property::{match_attached_get, match_attached_set, resolve_registration};
use crate::diagnostic::Diagnostic;
use crate::rules::helpers::{declared_methods, rename_fix};
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    AttachedAccessorName,
    id = "WPF0004",
    name = "attached-accessor-name",
    description = "Accessor methods of an attached property should be named `Get{Name}` and `Set{Name}`",
    category = Naming,
    severity = Warning,
    examples = "// Bad\npublic static int ReadBar(DependencyObject element) => (int)element.GetValue(BarProperty);\n\n// Good\npublic static int GetBar(DependencyObject element) => (int)element.GetValue(BarProperty);"
);

impl Rule for AttachedAccessorName {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;
        let compilation = ctx.compilation();

        declared_methods(ctx)
            .into_iter()
            .take_while(|_| !ctx.is_cancelled())
            .filter_map(|(method, decl)| {
                let (prefix, accessor) = match match_attached_get(method, compilation) {
                    Some(get) => ("Get", get),
                    None => ("Set", match_attached_set(method, compilation)?),
                };
                let resolved = resolve_registration(accessor.backing, compilation, ctx.cancellation)?;
                if !resolved.call.kind.is_attached() {
                    return None;
                }
                let registered = accessor.backing.registered_name(&model, ctx.cancellation)?;
                if registered.name.is_empty() {
                    return None;
                }
                let expected = format!("{prefix}{}", registered.name);
                if decl.name.text == expected {
                    return None;
                }

                let mut diagnostic = Diagnostic::at_span(
                    self.metadata.id,
                    self.metadata.severity,
                    format!(
                        "Method `{}` accesses attached property `{}` and should be named `{expected}`",
                        decl.name.text, registered.name
                    ),
                    ctx.file(),
                    decl.name.span,
                )
                .with_suggestion(format!("Rename to `{expected}`"));
                if let Some(fix) = rename_fix(method, &expected, &model) {
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

    fn run_attached_accessor_name(code: &str) -> Vec<Diagnostic> {
        run_rule(&AttachedAccessorName::new(), code)
    }

    #[test]
    fn flags_misnamed_get_and_set() {
        let code = r#"
using System.Windows;

public static class Foo
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.RegisterAttached(
        "Bar", typeof(int), typeof(Foo), new PropertyMetadata(0));

    public static void WriteBar(DependencyObject element, int value) => element.SetValue(BarProperty, value);

    public static int ReadBar(DependencyObject element) => (int)element.GetValue(BarProperty);
}
"#;
        let diagnostics = run_attached_accessor_name(code);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].line, 9);
        assert!(diagnostics[0].message.ends_with("should be named `SetBar`"));
        assert_eq!(diagnostics[1].line, 11);
        assert!(diagnostics[1].message.ends_with("should be named `GetBar`"));
        let fixed = apply_first_fix(code, &diagnostics[1]);
        assert!(fixed.contains("public static int GetBar(DependencyObject element)"));
    }

    #[test]
    fn accepts_conventional_accessors() {
        let code = r#"
using System.Windows;

public static class Foo
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.RegisterAttached(
        nameof(BarProperty).Replace("Property", ""), typeof(int), typeof(Foo));

    public static readonly DependencyProperty BazProperty = DependencyProperty.RegisterAttached(
        "Baz", typeof(int), typeof(Foo));

    public static void SetBaz(DependencyObject element, int value) => element.SetValue(BazProperty, value);

    public static int GetBaz(DependencyObject element)
    {
        return (int)element.GetValue(BazProperty);
    }
}
"#;
        assert!(run_attached_accessor_name(code).is_empty());
    }

    #[test]
    fn ignores_accessors_of_plain_registrations() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        "Bar", typeof(int), typeof(Foo));

    public static int Read(DependencyObject element) => (int)element.GetValue(BarProperty);
}
"#;
        assert!(run_attached_accessor_name(code).is_empty());
    }
}
