//! owner-is-dependency-object rule (WPF0015): only types deriving from `DependencyObject`
//! own non-attached dependency properties.

use super::{has_known_ancestry, type_name};
use crate::catalog::DEPENDENCY_OBJECT;
use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::rules::helpers::registration_calls;
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    OwnerIsDependencyObject,
    id = "WPF0015",
    name = "owner-is-dependency-object",
    description = "Owner of a non-attached dependency property must derive from DependencyObject",
    category = Correctness,
    severity = Warning,
    examples = "// Bad\npublic class Foo\n{\n    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(\n        nameof(Bar), typeof(int), typeof(Foo));\n}\n\n// Good: register an attached property instead\npublic static class Foo\n{\n    public static readonly DependencyProperty BarProperty = DependencyProperty.RegisterAttached(\n        \"Bar\", typeof(int), typeof(Foo));\n}"
);

impl Rule for OwnerIsDependencyObject {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let compilation = ctx.compilation();
        if DEPENDENCY_OBJECT.resolve(compilation).is_none() {
            return Vec::new();
        }

        registration_calls(ctx)
            .iter()
            .filter(|call| !call.kind.is_attached())
            .take_while(|_| !ctx.is_cancelled())
            .filter_map(|call| {
                let argument = call.owner_type?;
                let owner = call.registered_owner(compilation)?;
                // Unresolved bases may well be DependencyObjects.
                if !has_known_ancestry(&owner, compilation) || DEPENDENCY_OBJECT.is_base_of(&owner, compilation) {
                    return None;
                }
                Some(
                    Diagnostic::at_span(
                        self.metadata.id,
                        self.metadata.severity,
                        format!(
                            "Owner type `{}` of {} does not derive from DependencyObject",
                            type_name(&owner, compilation),
                            call.kind.method_name()
                        ),
                        ctx.file(),
                        argument.span,
                    )
                    .with_suggestion("Derive the owner from DependencyObject or register an attached property"),
                )
            })
            .collect()
    }
}
