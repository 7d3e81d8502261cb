//! accessors-use-same-property rule (WPF0032): getter and setter of a wrapper, or `GetBar`
//! and `SetBar` of an attached property, use the same dependency property.

use crate::declare_rule;
use crate::dependency_property::accessors::agree;
use crate::dependency_property::{match_attached_get, match_attached_set, BackingMember, ValueCall};
use crate::diagnostic::Diagnostic;
use crate::rules::helpers::{clr_properties, declared_methods};
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    AccessorsUseSameProperty,
    id = "WPF0032",
    name = "accessors-use-same-property",
    description = "Getter and setter should use the same dependency property",
    category = Usage,
    severity = Error,
    examples = "// Bad\npublic int Bar\n{\n    get => (int)GetValue(BarProperty);\n    set => SetValue(BazProperty, value);\n}\n\n// Good\npublic int Bar\n{\n    get => (int)GetValue(BarProperty);\n    set => SetValue(BarProperty, value);\n}"
);

impl AccessorsUseSameProperty {
    fn mismatch(
        &self,
        ctx: &RuleContext<'_, '_, '_>,
        owner: &str,
        read: BackingMember,
        setter: &ValueCall<'_>,
        written: BackingMember,
    ) -> Option<Diagnostic> {
        let compilation = ctx.compilation();
        if agree(read, written, compilation) {
            return None;
        }
        let read = read.name(compilation);
        Some(
            Diagnostic::at_span(
                self.metadata.id,
                self.metadata.severity,
                format!(
                    "{owner} reads `{read}` but writes `{}`",
                    written.name(compilation)
                ),
                ctx.file(),
                setter.property.span,
            )
            .with_suggestion(format!("Use `{read}` in both accessors")),
        )
    }
}

impl Rule for AccessorsUseSameProperty {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;
        let compilation = ctx.compilation();
        let mut diagnostics = Vec::new();

        for property in clr_properties(ctx) {
            if ctx.is_cancelled() {
                return diagnostics;
            }
            let Some(getter) = property.getter_call(&model) else {
                continue;
            };
            let Some(setter) = property.setter_call(&model) else {
                continue;
            };
            let (Some(read), Some(written)) = (getter.backing_member(&model), setter.backing_member(&model)) else {
                continue;
            };
            let owner = format!("Property `{}`", property.decl.name.text);
            diagnostics.extend(self.mismatch(ctx, &owner, read, &setter, written));
        }

        for (method, decl) in declared_methods(ctx) {
            if ctx.is_cancelled() {
                break;
            }
            let Some(get) = match_attached_get(method, compilation) else {
                continue;
            };
            let Some(name) = decl.name.text.strip_prefix("Get") else {
                continue;
            };
            let Some(container) = model.symbol(method).container else {
                continue;
            };
            let set = compilation
                .symbols()
                .members_named(container, &format!("Set{name}"))
                .iter()
                .filter(|&&candidate| model.symbol(candidate).file == Some(model.file_id()))
                .find_map(|&candidate| match_attached_set(candidate, compilation));
            let Some(set) = set else {
                continue;
            };
            let owner = format!("`Get{name}`/`Set{name}`");
            diagnostics.extend(self.mismatch(ctx, &owner, get.backing, &set.call, set.backing));
        }

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run_rule;

    fn run_same_property(code: &str) -> Vec<Diagnostic> {
        run_rule(&AccessorsUseSameProperty::new(), code)
    }

    #[test]
    fn flags_wrapper_writing_another_property() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo));

    public static readonly DependencyProperty BazProperty = DependencyProperty.Register(
        "Baz", typeof(int), typeof(Foo));

    public int Bar
    {
        get => (int)GetValue(BarProperty);
        set => SetValue(BazProperty, value);
    }
}
"#;
        let diagnostics = run_same_property(code);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule_id, "WPF0032");
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (15, 25));
        assert_eq!(
            diagnostics[0].message,
            "Property `Bar` reads `BarProperty` but writes `BazProperty`"
        );
    }

    #[test]
    fn flags_attached_accessors_on_different_properties() {
        let code = r#"
using System.Windows;

public static class Attached
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.RegisterAttached(
        "Bar", typeof(int), typeof(Attached));

    public static readonly DependencyProperty BazProperty = DependencyProperty.RegisterAttached(
        "Baz", typeof(int), typeof(Attached));

    public static void SetBar(DependencyObject element, int value) => element.SetValue(BazProperty, value);

    public static int GetBar(DependencyObject element) => (int)element.GetValue(BarProperty);
}
"#;
        let diagnostics = run_same_property(code);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 12);
        assert_eq!(
            diagnostics[0].message,
            "`GetBar`/`SetBar` reads `BarProperty` but writes `BazProperty`"
        );
    }

    #[test]
    fn accepts_read_only_key_in_setter() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    private static readonly DependencyPropertyKey StatePropertyKey = DependencyProperty.RegisterReadOnly(
        nameof(State), typeof(string), typeof(Foo), new PropertyMetadata(null));

    public static readonly DependencyProperty StateProperty = StatePropertyKey.DependencyProperty;

    public string State
    {
        get => (string)GetValue(StateProperty);
        private set => SetValue(StatePropertyKey, value);
    }
}
"#;
        assert!(run_same_property(code).is_empty());
    }
}
