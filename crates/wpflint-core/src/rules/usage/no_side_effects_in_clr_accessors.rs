//! no-side-effects-in-clr-accessors rule (WPF0036): CLR wrappers do nothing but call
//! `GetValue` / `SetValue`.

use crate::declare_rule;
use crate::dependency_property::backing::single_expression;
use crate::dependency_property::{find_value_calls, ClrProperty};
use crate::diagnostic::Diagnostic;
use crate::rules::helpers::index_file;
use crate::rules::{Rule, RuleContext, RuleMetadata};
use crate::syntax::AccessorKind;

declare_rule!(
    NoSideEffectsInClrAccessors,
    id = "WPF0036",
    name = "no-side-effects-in-clr-accessors",
    description = "CLR accessors of a dependency property should only call GetValue and SetValue",
    category = Usage,
    severity = Warning,
    examples = "// Bad\npublic int Bar\n{\n    get => (int)GetValue(BarProperty);\n    set\n    {\n        SetValue(BarProperty, value);\n        Refresh();\n    }\n}\n\n// Good: react in a PropertyChangedCallback\npublic int Bar\n{\n    get => (int)GetValue(BarProperty);\n    set => SetValue(BarProperty, value);\n}"
);

impl Rule for NoSideEffectsInClrAccessors {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;
        let compilation = ctx.compilation();
        let mut diagnostics = Vec::new();

        let properties = index_file(ctx)
            .properties
            .into_iter()
            .filter_map(|decl| model.declared_symbol(&decl.name))
            .filter_map(|symbol| ClrProperty::match_symbol(symbol, compilation));
        for property in properties {
            if ctx.is_cancelled() {
                break;
            }
            for accessor in &property.decl.accessors {
                let Some(body) = &accessor.body else {
                    continue;
                };
                if single_expression(body).is_some() || find_value_calls(body, &model).is_empty() {
                    continue;
                }
                let (keyword, call) = match accessor.kind {
                    AccessorKind::Get => ("get", "GetValue"),
                    AccessorKind::Set => ("set", "SetValue"),
                    AccessorKind::Init => ("init", "SetValue"),
                    AccessorKind::Other => continue,
                };
                diagnostics.push(
                    Diagnostic::at_span(
                        self.metadata.id,
                        self.metadata.severity,
                        format!(
                            "The {keyword} accessor of `{}` should only call {call}",
                            property.decl.name.text
                        ),
                        ctx.file(),
                        accessor.span,
                    )
                    .with_suggestion("Move the extra code into a property changed or coerce value callback"),
                );
            }
        }

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run_rule;

    fn run_no_side_effects(code: &str) -> Vec<Diagnostic> {
        run_rule(&NoSideEffectsInClrAccessors::new(), code)
    }

    #[test]
    fn flags_accessors_with_extra_statements() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo));

    private int reads;

    public int Bar
    {
        get
        {
            reads++;
            return (int)GetValue(BarProperty);
        }
        set
        {
            if (value > 0)
            {
                SetValue(BarProperty, value);
            }
        }
    }
}
"#;
        let diagnostics = run_no_side_effects(code);

        let lines: Vec<usize> = diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, [13, 18]);
        assert_eq!(diagnostics[0].rule_id, "WPF0036");
        assert_eq!(diagnostics[0].message, "The get accessor of `Bar` should only call GetValue");
        assert_eq!(diagnostics[1].message, "The set accessor of `Bar` should only call SetValue");
    }

    #[test]
    fn accepts_plain_wrappers_and_ordinary_properties() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo));

    private int count;

    public int Bar
    {
        get { return (int)GetValue(BarProperty); }
        set { SetValue(BarProperty, value); }
    }

    public int Count
    {
        get { return count; }
        set
        {
            count = value;
            System.Console.WriteLine(value);
        }
    }
}
"#;
        assert!(run_no_side_effects(code).is_empty());
    }
}
