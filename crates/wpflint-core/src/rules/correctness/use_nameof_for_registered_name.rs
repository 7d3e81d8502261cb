//! use-nameof-for-registered-name rule (WPF0016).

use crate::declare_rule;
use crate::diagnostic::{Diagnostic, Fix, TextEdit};
use crate::rules::helpers::registration_calls;
use crate::rules::{Rule, RuleContext, RuleMetadata};
use crate::syntax::{Expr, LiteralKind};

declare_rule!(
    UseNameofForRegisteredName,
    id = "WPF0016",
    name = "use-nameof-for-registered-name",
    description = "Use nameof() when the registered name refers to a member",
    category = Correctness,
    severity = Info,
    examples = "// Bad\nDependencyProperty.Register(\"Bar\", typeof(int), typeof(Foo));\n\n// Good\nDependencyProperty.Register(nameof(Bar), typeof(int), typeof(Foo));"
);

impl Rule for UseNameofForRegisteredName {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;

        registration_calls(ctx)
            .iter()
            .filter(|call| call.kind.is_register())
            .take_while(|_| !ctx.is_cancelled())
            .filter_map(|call| {
                let argument = call.name?;
                let Expr::Literal(literal) = argument.expr.unparenthesized() else {
                    return None;
                };
                let LiteralKind::String(name) = &literal.kind else {
                    return None;
                };
                let containing = model.enclosing_type(call.invocation.span.lo)?;
                if name.is_empty() || model.symbols().members_named(containing, name).is_empty() {
                    return None;
                }

                let replacement = format!("nameof({name})");
                Some(
                    Diagnostic::at_span(
                        self.metadata.id,
                        self.metadata.severity,
                        format!("Use `{replacement}` for the registered name"),
                        ctx.file(),
                        argument.span,
                    )
                    .with_fix(
                        Fix::new(format!("Use `{replacement}`"))
                            .with_edit(TextEdit::replace_span(ctx.file(), argument.expr.span(), replacement)),
                    ),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{apply_first_fix, run_rule};

    fn run_use_nameof(code: &str) -> Vec<Diagnostic> {
        run_rule(&UseNameofForRegisteredName::new(), code)
    }

    #[test]
    fn flags_literal_naming_a_member() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        "Bar", typeof(int), typeof(Foo));

    public int Bar => (int)GetValue(BarProperty);
}
"#;
        let diagnostics = run_use_nameof(code);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule_id, "WPF0016");
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (7, 9));
        let fixed = apply_first_fix(code, &diagnostics[0]);
        assert!(fixed.contains("        nameof(Bar), typeof(int), typeof(Foo));"));
    }

    #[test]
    fn ignores_nameof_and_names_without_member() {
        let code = r#"
using System.Windows;

public class Foo : DependencyObject
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo));

    public static readonly DependencyProperty BazProperty = DependencyProperty.RegisterAttached(
        "Baz", typeof(int), typeof(Foo));

    public int Bar => (int)GetValue(BarProperty);
}
"#;
        assert!(run_use_nameof(code).is_empty());
    }
}
