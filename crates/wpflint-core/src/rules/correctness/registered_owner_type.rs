//! registered-owner-type rule (WPF0011): the owner passed to a registration is the type
//! that declares it.

use crate::declare_rule;
use crate::diagnostic::{Diagnostic, Fix, TextEdit};
use crate::rules::helpers::registration_calls;
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    RegisteredOwnerType,
    id = "WPF0011",
    name = "registered-owner-type",
    description = "Owner type of a registration should be the containing type",
    category = Correctness,
    severity = Error,
    examples = "// Bad\npublic class Foo : DependencyObject\n{\n    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(\n        nameof(Bar), typeof(int), typeof(Baz));\n}\n\n// Good\npublic class Foo : DependencyObject\n{\n    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(\n        nameof(Bar), typeof(int), typeof(Foo));\n}"
);

impl Rule for RegisteredOwnerType {
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
                let argument = call.owner_type?;
                let owner = call.registered_owner(compilation)?.symbol()?;
                let containing = model.enclosing_type(call.invocation.span.lo)?;
                if owner == containing {
                    return None;
                }

                let containing = model.symbol(containing);
                let mut diagnostic = Diagnostic::at_span(
                    self.metadata.id,
                    self.metadata.severity,
                    format!(
                        "{} registers owner `{}` but is declared in `{}`",
                        call.kind.method_name(),
                        model.symbol(owner).name,
                        containing.name
                    ),
                    ctx.file(),
                    argument.span,
                )
                .with_suggestion(format!("Use `typeof({})`", containing.name));
                if containing.type_parameters.is_empty() {
                    let replacement = format!("typeof({})", containing.name);
                    diagnostic = diagnostic.with_fix(
                        Fix::new(format!("Use `{replacement}`"))
                            .with_edit(TextEdit::replace_span(ctx.file(), argument.expr.span(), replacement)),
                    );
                }
                Some(diagnostic)
            })
            .collect()
    }
}
