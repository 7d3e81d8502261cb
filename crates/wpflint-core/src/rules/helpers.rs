//! Shared helper functions for rule implementations.
//!
//! Collectors over the syntax of one file and the rename fix used by the naming rules.

use std::ops::ControlFlow;

use crate::dependency_property::registration::{self, RegistrationCall};
use crate::dependency_property::{match_any_value_call, ClrProperty, ValueCall};
use crate::diagnostic::{Fix, TextEdit};
use crate::rules::RuleContext;
use crate::semantic::{SemanticModel, SymbolId};
use crate::syntax::{Assignment, Expr, Invocation, MethodDecl, ObjectCreation, PropertyDecl, Span};
use crate::visitor::{walk_ast, AstVisitor, VisitorContext};

/// Declarations and calls of one file, in source order.
#[derive(Default)]
pub struct SyntaxIndex<'a> {
    pub properties: Vec<&'a PropertyDecl>,
    pub methods: Vec<&'a MethodDecl>,
    pub invocations: Vec<&'a Invocation>,
    pub assignments: Vec<&'a Assignment>,
    pub creations: Vec<&'a ObjectCreation>,
}

impl SyntaxIndex<'_> {
    /// `span` lies in the `{ ... }` initializer of an object creation.
    pub fn in_object_initializer(&self, span: Span) -> bool {
        self.creations.iter().any(|creation| {
            creation
                .initializer
                .iter()
                .any(|member| member.span().lo <= span.lo && span.hi <= member.span().hi)
        })
    }
}

impl<'a> AstVisitor<'a> for SyntaxIndex<'a> {
    fn visit_property(&mut self, node: &'a PropertyDecl, _ctx: &VisitorContext) -> ControlFlow<()> {
        self.properties.push(node);
        ControlFlow::Continue(())
    }

    fn visit_method(&mut self, node: &'a MethodDecl, _ctx: &VisitorContext) -> ControlFlow<()> {
        self.methods.push(node);
        ControlFlow::Continue(())
    }

    fn visit_invocation(&mut self, node: &'a Invocation, _ctx: &VisitorContext) -> ControlFlow<()> {
        self.invocations.push(node);
        ControlFlow::Continue(())
    }

    fn visit_assignment(&mut self, node: &'a Assignment, _ctx: &VisitorContext) -> ControlFlow<()> {
        self.assignments.push(node);
        ControlFlow::Continue(())
    }

    fn visit_object_creation(&mut self, node: &'a ObjectCreation, _ctx: &VisitorContext) -> ControlFlow<()> {
        self.creations.push(node);
        ControlFlow::Continue(())
    }
}

pub fn index_file<'a>(ctx: &RuleContext<'_, '_, 'a>) -> SyntaxIndex<'a> {
    let file = ctx.file();
    let mut index = SyntaxIndex::default();
    let visitor_ctx = VisitorContext::new(file).with_cancellation(ctx.cancellation);
    let _ = walk_ast(file.unit(), &mut index, &visitor_ctx);
    index
}

/// Register*, `AddOwner` and `OverrideMetadata` calls in the file.
pub fn registration_calls<'a>(ctx: &RuleContext<'_, '_, 'a>) -> Vec<RegistrationCall<'a>> {
    let model = ctx.model;
    index_file(ctx)
        .invocations
        .into_iter()
        .take_while(|_| !ctx.is_cancelled())
        .filter_map(|invocation| {
            registration::match_any(invocation, &model)
                .or_else(|| registration::match_add_owner(invocation, &model))
                .or_else(|| registration::match_override_metadata(invocation, &model))
        })
        .collect()
}

/// `GetValue`, `SetValue` and `SetCurrentValue` calls in the file.
pub fn value_calls<'a>(ctx: &RuleContext<'_, '_, 'a>) -> Vec<ValueCall<'a>> {
    let model = ctx.model;
    index_file(ctx)
        .invocations
        .into_iter()
        .take_while(|_| !ctx.is_cancelled())
        .filter_map(|invocation| match_any_value_call(invocation, &model))
        .collect()
}

/// Instance properties declared in the file.
pub fn clr_properties<'a>(ctx: &RuleContext<'_, '_, 'a>) -> Vec<ClrProperty<'a>> {
    let model = ctx.model;
    index_file(ctx)
        .properties
        .into_iter()
        .filter_map(|decl| model.declared_symbol(&decl.name))
        .filter_map(|symbol| ClrProperty::match_symbol(symbol, model.compilation()))
        .collect()
}

/// Methods declared in the file.
pub fn declared_methods<'a>(ctx: &RuleContext<'_, '_, 'a>) -> Vec<(SymbolId, &'a MethodDecl)> {
    let model = ctx.model;
    index_file(ctx)
        .methods
        .into_iter()
        .filter_map(|decl| Some((model.declared_symbol(&decl.name)?, decl)))
        .collect()
}

/// Identifier of the invoked method, e.g. `SetValue` in `this.SetValue(...)`.
pub fn callee_name_span(invocation: &Invocation) -> Option<Span> {
    match invocation.callee.as_ref() {
        Expr::Name(name) => Some(name.ident.span),
        Expr::MemberAccess(access) => Some(access.name.span),
        _ => None,
    }
}

/// Renames a symbol declared in this file and every reference to it in the file.
///
/// `None` when the symbol is declared elsewhere, is not source, or the new name is taken
/// by another member of its type.
pub fn rename_fix(symbol: SymbolId, new_name: &str, model: &SemanticModel<'_, '_>) -> Option<Fix> {
    let declared = model.symbol(symbol);
    if declared.file != Some(model.file_id()) {
        return None;
    }
    let container = declared.container?;
    if model
        .symbols()
        .members_named(container, new_name)
        .iter()
        .any(|&other| other != symbol)
    {
        return None;
    }
    let file = model.file();
    let mut spans = vec![declared.name_span?];
    spans.extend(model.find_references(symbol));
    spans.sort();
    spans.dedup();

    Some(
        Fix::new(format!("Rename to `{new_name}`"))
            .with_edits(spans.into_iter().map(|span| TextEdit::replace_span(file, span, new_name))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::parser::ParsedFile;
    use crate::dependency_property::RegistrationKind;
    use crate::semantic::Compilation;

    const CODE: &str = r#"
using System.Windows;

public class Foo : FrameworkElement
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(0, OnChanged));

    public int Bar
    {
        get => (int)GetValue(BarProperty);
        set => SetValue(BarProperty, value);
    }

    public static void Touch(Foo foo)
    {
        foo.SetCurrentValue(Foo.BarProperty, 1);
        OnChanged(foo, default(DependencyPropertyChangedEventArgs));
    }

    private static void OnChanged(DependencyObject d, DependencyPropertyChangedEventArgs e)
    {
    }
}
"#;

    fn with_context<R>(code: &str, f: impl FnOnce(&RuleContext<'_, '_, '_>) -> R) -> R {
        let file = ParsedFile::from_source("Foo.cs", code);
        let compilation = Compilation::builder().add_file(&file).build();
        let model = compilation.model_for(&file).expect("model");
        let token = CancellationToken::new();
        f(&RuleContext::new(model, &token))
    }

    #[test]
    fn collects_registrations_and_value_calls() {
        with_context(CODE, |ctx| {
            let registrations = registration_calls(ctx);
            let calls = value_calls(ctx);

            assert_eq!(registrations.len(), 1);
            assert_eq!(registrations[0].kind, RegistrationKind::Register);
            let names: Vec<&str> = calls.iter().map(|c| c.kind.method_name()).collect();
            assert_eq!(names, ["GetValue", "SetValue", "SetCurrentValue"]);
        });
    }

    #[test]
    fn collects_clr_properties_and_methods() {
        with_context(CODE, |ctx| {
            let properties = clr_properties(ctx);
            let methods: Vec<&str> = declared_methods(ctx)
                .iter()
                .map(|(_, decl)| decl.name.text.as_str())
                .collect();

            assert_eq!(properties.len(), 1);
            assert_eq!(properties[0].decl.name.text, "Bar");
            assert_eq!(methods, ["Touch", "OnChanged"]);
        });
    }

    #[test]
    fn rename_fix_edits_declaration_and_references() {
        with_context(CODE, |ctx| {
            let (method, _) = declared_methods(ctx)
                .into_iter()
                .find(|(_, decl)| decl.name.text == "OnChanged")
                .expect("method");

            let fix = rename_fix(method, "OnBarChanged", &ctx.model).expect("fix");

            assert_eq!(fix.title, "Rename to `OnBarChanged`");
            assert_eq!(fix.edits.len(), 3);
            assert!(fix.edits.iter().all(|edit| edit.new_text == "OnBarChanged"));
            assert!(fix.edits.windows(2).all(|w| (w[0].line, w[0].column) < (w[1].line, w[1].column)));
        });
    }

    #[test]
    fn rename_fix_skips_reference_symbols() {
        with_context(CODE, |ctx| {
            let data_context = ctx
                .compilation()
                .symbols()
                .all_symbols()
                .find(|s| s.name == "DataContextProperty")
                .expect("reference field")
                .id;

            assert!(rename_fix(data_context, "Other", &ctx.model).is_none());
        });
    }

    #[test]
    fn rename_fix_refuses_taken_names() {
        with_context(CODE, |ctx| {
            let (method, _) = declared_methods(ctx)
                .into_iter()
                .find(|(_, decl)| decl.name.text == "OnChanged")
                .expect("method");

            assert!(rename_fix(method, "Touch", &ctx.model).is_none());
        });
    }

    #[test]
    fn callee_name_for_member_access_and_simple_name() {
        with_context(CODE, |ctx| {
            let calls = value_calls(ctx);
            let file = ctx.file();

            let texts: Vec<&str> = calls
                .iter()
                .filter_map(|c| callee_name_span(c.invocation))
                .filter_map(|span| file.text(span))
                .collect();

            assert_eq!(texts, ["GetValue", "SetValue", "SetCurrentValue"]);
        });
    }
}
