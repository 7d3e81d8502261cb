//! backing-field-static-readonly rule (WPF0030): backing fields are `static readonly`,
//! backing properties are static and get-only.

use crate::declare_rule;
use crate::dependency_property::{backing_members, resolve_registration, BackingMember};
use crate::diagnostic::{Diagnostic, Fix, TextEdit};
use crate::rules::{Rule, RuleContext, RuleMetadata};
use crate::semantic::Declaration;
use crate::syntax::FieldDecl;

declare_rule!(
    BackingFieldStaticReadonly,
    id = "WPF0030",
    name = "backing-field-static-readonly",
    description = "Backing field of a dependency property should be static readonly",
    category = Usage,
    severity = Warning,
    examples = "// Bad\npublic static DependencyProperty BarProperty = DependencyProperty.Register(\n    nameof(Bar), typeof(int), typeof(Foo));\n\n// Good\npublic static readonly DependencyProperty BarProperty = DependencyProperty.Register(\n    nameof(Bar), typeof(int), typeof(Foo));"
);

impl BackingFieldStaticReadonly {
    fn check_field(
        &self,
        ctx: &RuleContext<'_, '_, '_>,
        backing: BackingMember,
        field: &FieldDecl,
    ) -> Option<Diagnostic> {
        let compilation = ctx.compilation();
        let flags = compilation.symbols().get(backing.symbol).flags;
        let missing = match (flags.is_static, flags.is_readonly) {
            (true, true) => return None,
            (false, false) => "static readonly",
            (false, true) => "static",
            (true, false) => "readonly",
        };

        // `static` goes before an existing `readonly`, the rest right before the type.
        let offset = match field.modifiers.list.iter().find(|m| m.keyword == "readonly") {
            Some(readonly) if missing == "static" => readonly.span.lo,
            _ => field.ty.span().lo,
        };
        let name = backing.name(compilation);
        Some(
            Diagnostic::at_span(
                self.metadata.id,
                self.metadata.severity,
                format!("Backing field `{name}` should be `static readonly`"),
                ctx.file(),
                backing.name_span(compilation)?,
            )
            .with_suggestion(format!("Add `{missing}`"))
            .with_fix(
                Fix::new(format!("Make `{name}` static readonly"))
                    .with_edit(TextEdit::insert_at(ctx.file(), offset, format!("{missing} "))),
            ),
        )
    }

    fn check_property(&self, ctx: &RuleContext<'_, '_, '_>, backing: BackingMember) -> Option<Diagnostic> {
        let compilation = ctx.compilation();
        let symbol = compilation.symbols().get(backing.symbol);
        if symbol.flags.is_static && !symbol.flags.has_setter {
            return None;
        }
        let name = backing.name(compilation);
        Some(
            Diagnostic::at_span(
                self.metadata.id,
                self.metadata.severity,
                format!("Backing property `{name}` should be static and get-only"),
                ctx.file(),
                backing.name_span(compilation)?,
            )
            .with_suggestion("Use a `static readonly` field"),
        )
    }
}

impl Rule for BackingFieldStaticReadonly {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;
        let compilation = ctx.compilation();

        backing_members(&model)
            .into_iter()
            .take_while(|_| !ctx.is_cancelled())
            .filter(|backing| resolve_registration(*backing, compilation, ctx.cancellation).is_some())
            .filter_map(|backing| match compilation.declaration(backing.symbol)? {
                Declaration::Field { field, .. } => self.check_field(ctx, backing, field),
                Declaration::Property(_) => self.check_property(ctx, backing),
                _ => None,
            })
            .collect()
    }
}
