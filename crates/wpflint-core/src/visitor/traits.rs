//! AstVisitor trait for uniform AST traversal.
//!
//! Hooks are called in pre-order. Returning `ControlFlow::Break(())` from any hook stops
//! the whole walk.

use std::ops::ControlFlow;

use crate::syntax::{
    Accessor, Assignment, ConstructorDecl, Expr, FieldDecl, Invocation, Lambda, MemberAccess,
    MethodDecl, NameExpr, NamespaceDecl, ObjectCreation, PropertyDecl, Stmt, TypeDecl,
};

use super::context::VisitorContext;

pub trait AstVisitor<'ast> {
    fn visit_namespace(
        &mut self,
        _node: &'ast NamespaceDecl,
        _ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_type_decl(&mut self, _node: &'ast TypeDecl, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_field(&mut self, _node: &'ast FieldDecl, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_property(
        &mut self,
        _node: &'ast PropertyDecl,
        _ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_accessor(&mut self, _node: &'ast Accessor, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_method(&mut self, _node: &'ast MethodDecl, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_constructor(
        &mut self,
        _node: &'ast ConstructorDecl,
        _ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_stmt(&mut self, _node: &'ast Stmt, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called for every expression before the variant-specific hook.
    fn visit_expr(&mut self, _node: &'ast Expr, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_name(&mut self, _node: &'ast NameExpr, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_member_access(
        &mut self,
        _node: &'ast MemberAccess,
        _ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_invocation(
        &mut self,
        _node: &'ast Invocation,
        _ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_object_creation(
        &mut self,
        _node: &'ast ObjectCreation,
        _ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_assignment(
        &mut self,
        _node: &'ast Assignment,
        _ctx: &VisitorContext,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn visit_lambda(&mut self, _node: &'ast Lambda, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}
