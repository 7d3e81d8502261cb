//! set-mutable-with-set-current-value rule (WPF0041): code that changes a mutable
//! dependency property after construction uses `SetCurrentValue`.

use super::{is_local_value_property, rename_callee_fix};
use crate::declare_rule;
use crate::dependency_property::{
    match_attached_set, match_value_call, resolve_registration, BackingMember, ClrProperty,
    ValueCall, ValueCallKind,
};
use crate::diagnostic::{Diagnostic, Fix, TextEdit};
use crate::rules::helpers::{callee_name_span, index_file};
use crate::rules::{Confidence, Rule, RuleContext, RuleMetadata};
use crate::semantic::SymbolKind;
use crate::syntax::{Assignment, Expr};

declare_rule!(
    SetMutableWithSetCurrentValue,
    id = "WPF0041",
    name = "set-mutable-with-set-current-value",
    description = "Use SetCurrentValue when changing a mutable dependency property",
    category = Usage,
    severity = Warning,
    examples = "// Bad\nprivate void OnClick() => this.SetValue(BarProperty, 1);\n\n// Good\nprivate void OnClick() => this.SetCurrentValue(BarProperty, 1);"
);

impl SetMutableWithSetCurrentValue {
    /// Read-only registrations, keys, and properties meant to be set with `SetValue`.
    fn is_excluded(backing: BackingMember, ctx: &RuleContext<'_, '_, '_>) -> bool {
        let compilation = ctx.compilation();
        backing.is_key()
            || is_local_value_property(backing.symbol, compilation)
            || resolve_registration(backing, compilation, ctx.cancellation)
                .is_some_and(|resolved| resolved.call.kind.is_read_only())
    }

    /// The call is the body of a CLR setter or attached `Set` accessor, or sits in an
    /// instance constructor.
    fn is_setter_or_initialization(call: &ValueCall<'_>, ctx: &RuleContext<'_, '_, '_>) -> bool {
        let model = ctx.model;
        let compilation = ctx.compilation();
        let Some(member) = model.enclosing_member(call.invocation.span.lo) else {
            return false;
        };
        let symbol = model.symbol(member);
        match symbol.kind {
            SymbolKind::Constructor => !symbol.is_static(),
            SymbolKind::Property => ClrProperty::match_symbol(member, compilation)
                .and_then(|property| property.setter_call(&model))
                .is_some_and(|setter| std::ptr::eq(setter.invocation, call.invocation)),
            SymbolKind::Method => match_attached_set(member, compilation)
                .is_some_and(|set| std::ptr::eq(set.call.invocation, call.invocation)),
            _ => false,
        }
    }

    fn check_assignment(&self, ctx: &RuleContext<'_, '_, '_>, assignment: &Assignment) -> Option<Diagnostic> {
        let model = ctx.model;
        let compilation = ctx.compilation();
        let target = assignment.left.unparenthesized();
        let receiver = match target {
            Expr::Name(_) => "",
            Expr::MemberAccess(access) if matches!(access.target.as_ref(), Expr::This(_)) => "this.",
            _ => return None,
        };
        let symbol = model.symbol_info(target)?;
        let property = ClrProperty::match_symbol(symbol, compilation)?;
        let pair = property.accessor_pair(&model)?;
        let setter = pair.setter?;
        if setter.kind != ValueCallKind::SetValue
            || setter.backing_member(&model)?.is_key()
            || Self::is_excluded(pair.backing, ctx)
        {
            return None;
        }
        let member = model.enclosing_member(assignment.span.lo)?;
        let enclosing = model.symbol(member);
        if member == symbol || (enclosing.kind == SymbolKind::Constructor && !enclosing.is_static()) {
            return None;
        }

        let backing = pair.backing.name(compilation);
        let mut diagnostic = Diagnostic::at_span(
            self.metadata.id,
            self.metadata.severity,
            format!(
                "Assigning `{}` calls SetValue; use SetCurrentValue({backing}, ...)",
                property.decl.name.text
            ),
            ctx.file(),
            target.span(),
        )
        .with_suggestion("Use SetCurrentValue")
        .with_confidence(Confidence::Medium);
        if let Some(value) = ctx.file().text(assignment.right.span()) {
            let replacement = format!("{receiver}SetCurrentValue({backing}, {value})");
            diagnostic = diagnostic.with_fix(
                Fix::new("Use SetCurrentValue")
                    .with_edit(TextEdit::replace_span(ctx.file(), assignment.span, replacement)),
            );
        }
        Some(diagnostic)
    }
}

impl Rule for SetMutableWithSetCurrentValue {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;
        let compilation = ctx.compilation();
        let index = index_file(ctx);
        let mut diagnostics = Vec::new();

        for &invocation in &index.invocations {
            if ctx.is_cancelled() {
                return diagnostics;
            }
            let Some(call) = match_value_call(ValueCallKind::SetValue, invocation, &model) else {
                continue;
            };
            let Some(backing) = call.backing_member(&model) else {
                continue;
            };
            if Self::is_excluded(backing, ctx) || Self::is_setter_or_initialization(&call, ctx) {
                continue;
            }
            let Some(span) = callee_name_span(invocation) else {
                continue;
            };
            let mut diagnostic = Diagnostic::at_span(
                self.metadata.id,
                self.metadata.severity,
                format!("Use SetCurrentValue to change `{}`", backing.name(compilation)),
                ctx.file(),
                span,
            )
            .with_suggestion("Use SetCurrentValue")
            .with_confidence(Confidence::Medium);
            if let Some(fix) = rename_callee_fix(ctx.file(), invocation, "SetCurrentValue") {
                diagnostic = diagnostic.with_fix(fix);
            }
            diagnostics.push(diagnostic);
        }

        diagnostics.extend(
            index
                .assignments
                .iter()
                .filter(|assignment| assignment.operator == "=" && !index.in_object_initializer(assignment.span))
                .filter_map(|assignment| self.check_assignment(ctx, assignment)),
        );
        diagnostics
    }
}
