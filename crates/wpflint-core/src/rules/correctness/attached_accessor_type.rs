//! attached-accessor-type rule (WPF0013): `GetBar` returns and `SetBar` accepts the
//! registered type.

use super::{is_concrete, retype_fix, type_name};
use crate::declare_rule;
use crate::dependency_property::{match_attached_get, match_attached_set, AttachedAccessor};
use crate::diagnostic::Diagnostic;
use crate::rules::helpers::declared_methods;
use crate::rules::{Rule, RuleContext, RuleMetadata};
use crate::semantic::TypeRef;
use crate::syntax::Span;

declare_rule!(
    AttachedAccessorType,
    id = "WPF0013",
    name = "attached-accessor-type",
    description = "Attached property accessors should use the registered type",
    category = Correctness,
    severity = Warning,
    examples = "// Bad\npublic static string GetBar(DependencyObject element) => (string)element.GetValue(BarProperty);\n\n// Good, BarProperty is registered with typeof(int)\npublic static int GetBar(DependencyObject element) => (int)element.GetValue(BarProperty);"
);

impl AttachedAccessorType {
    /// Declared type and its span: the return type of a getter, the value parameter of a
    /// setter.
    fn accessor_type(
        accessor: &AttachedAccessor<'_>,
        ctx: &RuleContext<'_, '_, '_>,
        is_get: bool,
    ) -> Option<(TypeRef, Span)> {
        let method = ctx.model.symbol(accessor.method);
        if is_get {
            return Some((method.ty.clone(), accessor.decl.return_type.span()));
        }
        let value = *method.parameters.get(1)?;
        let span = accessor.decl.parameters.get(1)?.ty.as_ref()?.span();
        Some((ctx.model.symbol(value).ty.clone(), span))
    }
}

impl Rule for AttachedAccessorType {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;
        let compilation = ctx.compilation();

        declared_methods(ctx)
            .into_iter()
            .take_while(|_| !ctx.is_cancelled())
            .filter_map(|(method, _)| {
                let (accessor, is_get) = match match_attached_get(method, compilation) {
                    Some(get) => (get, true),
                    None => (match_attached_set(method, compilation)?, false),
                };
                let registered = accessor.backing.registered_type(&model, ctx.cancellation)?;
                let (actual, span) = Self::accessor_type(&accessor, ctx, is_get)?;
                if !is_concrete(&actual) || !is_concrete(&registered) || actual == registered {
                    return None;
                }

                let expected = type_name(&registered, compilation);
                let what = if is_get { "returns" } else { "accepts" };
                let mut diagnostic = Diagnostic::at_span(
                    self.metadata.id,
                    self.metadata.severity,
                    format!(
                        "`{}` {what} `{}` but `{}` is registered as `{expected}`",
                        accessor.decl.name.text,
                        type_name(&actual, compilation),
                        accessor.backing.name(compilation)
                    ),
                    ctx.file(),
                    span,
                )
                .with_suggestion(format!("Use `{expected}`"));
                if let Some(fix) = retype_fix(ctx.file(), span, &registered, compilation) {
                    diagnostic = diagnostic.with_fix(fix);
                }
                Some(diagnostic)
            })
            .collect()
    }
}
