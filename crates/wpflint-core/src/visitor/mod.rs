//! Depth-first traversal of the syntax model.

mod context;
mod traits;

pub use context::VisitorContext;
pub use traits::AstVisitor;

use std::ops::ControlFlow;

use crate::syntax::{
    Argument, Attribute, Block, Body, CompilationUnit, Expr, Member, NamespaceDecl, Parameter,
    Stmt, TypeDecl,
};

/// Walks a whole compilation unit. Returns `Break` when a hook stopped the walk or the
/// context was cancelled.
pub fn walk_ast<'ast, V: AstVisitor<'ast>>(
    unit: &'ast CompilationUnit,
    visitor: &mut V,
    ctx: &VisitorContext,
) -> ControlFlow<()> {
    for namespace in &unit.namespaces {
        walk_namespace(namespace, visitor, ctx)?;
    }
    for ty in &unit.types {
        walk_type(ty, visitor, ctx)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_namespace<'ast, V: AstVisitor<'ast>>(
    namespace: &'ast NamespaceDecl,
    visitor: &mut V,
    ctx: &VisitorContext,
) -> ControlFlow<()> {
    check(ctx)?;
    visitor.visit_namespace(namespace, ctx)?;
    for nested in &namespace.namespaces {
        walk_namespace(nested, visitor, ctx)?;
    }
    for ty in &namespace.types {
        walk_type(ty, visitor, ctx)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_type<'ast, V: AstVisitor<'ast>>(
    ty: &'ast TypeDecl,
    visitor: &mut V,
    ctx: &VisitorContext,
) -> ControlFlow<()> {
    check(ctx)?;
    visitor.visit_type_decl(ty, ctx)?;
    walk_attributes(&ty.attributes, visitor, ctx)?;
    if let Some((_, parameters)) = &ty.delegate_signature {
        walk_parameters(parameters, visitor, ctx)?;
    }
    for member in &ty.members {
        walk_member(member, visitor, ctx)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_member<'ast, V: AstVisitor<'ast>>(
    member: &'ast Member,
    visitor: &mut V,
    ctx: &VisitorContext,
) -> ControlFlow<()> {
    check(ctx)?;
    match member {
        Member::Field(field) => {
            visitor.visit_field(field, ctx)?;
            walk_attributes(&field.attributes, visitor, ctx)?;
            for declarator in &field.declarators {
                if let Some(init) = &declarator.initializer {
                    walk_expr(init, visitor, ctx)?;
                }
            }
        }
        Member::Property(property) => {
            visitor.visit_property(property, ctx)?;
            walk_attributes(&property.attributes, visitor, ctx)?;
            for accessor in &property.accessors {
                visitor.visit_accessor(accessor, ctx)?;
                if let Some(body) = &accessor.body {
                    walk_body(body, visitor, ctx)?;
                }
            }
            if let Some(expr) = &property.expression_body {
                walk_expr(expr, visitor, ctx)?;
            }
            if let Some(init) = &property.initializer {
                walk_expr(init, visitor, ctx)?;
            }
        }
        Member::Method(method) => {
            visitor.visit_method(method, ctx)?;
            walk_attributes(&method.attributes, visitor, ctx)?;
            walk_parameters(&method.parameters, visitor, ctx)?;
            if let Some(body) = &method.body {
                walk_body(body, visitor, ctx)?;
            }
        }
        Member::Constructor(ctor) => {
            visitor.visit_constructor(ctor, ctx)?;
            walk_parameters(&ctor.parameters, visitor, ctx)?;
            walk_arguments(&ctor.initializer, visitor, ctx)?;
            if let Some(body) = &ctor.body {
                walk_body(body, visitor, ctx)?;
            }
        }
        Member::Type(ty) => walk_type(ty, visitor, ctx)?,
        Member::Other(_) => {}
    }
    ControlFlow::Continue(())
}

pub fn walk_body<'ast, V: AstVisitor<'ast>>(
    body: &'ast Body,
    visitor: &mut V,
    ctx: &VisitorContext,
) -> ControlFlow<()> {
    match body {
        Body::Block(block) => walk_block(block, visitor, ctx),
        Body::Expression(expr) => walk_expr(expr, visitor, ctx),
    }
}

pub fn walk_block<'ast, V: AstVisitor<'ast>>(
    block: &'ast Block,
    visitor: &mut V,
    ctx: &VisitorContext,
) -> ControlFlow<()> {
    for stmt in &block.statements {
        walk_stmt(stmt, visitor, ctx)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_stmt<'ast, V: AstVisitor<'ast>>(
    stmt: &'ast Stmt,
    visitor: &mut V,
    ctx: &VisitorContext,
) -> ControlFlow<()> {
    check(ctx)?;
    visitor.visit_stmt(stmt, ctx)?;
    match stmt {
        Stmt::Block(block) => walk_block(block, visitor, ctx)?,
        Stmt::Return { expr, .. } => {
            if let Some(expr) = expr {
                walk_expr(expr, visitor, ctx)?;
            }
        }
        Stmt::Expression { expr, .. } => walk_expr(expr, visitor, ctx)?,
        Stmt::LocalDeclaration { declarators, .. } => {
            for declarator in declarators {
                if let Some(init) = &declarator.initializer {
                    walk_expr(init, visitor, ctx)?;
                }
            }
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            walk_expr(condition, visitor, ctx)?;
            walk_stmt(then_branch, visitor, ctx)?;
            if let Some(else_branch) = else_branch {
                walk_stmt(else_branch, visitor, ctx)?;
            }
        }
        Stmt::Other {
            statements, exprs, ..
        } => {
            for expr in exprs {
                walk_expr(expr, visitor, ctx)?;
            }
            for stmt in statements {
                walk_stmt(stmt, visitor, ctx)?;
            }
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_expr<'ast, V: AstVisitor<'ast>>(
    expr: &'ast Expr,
    visitor: &mut V,
    ctx: &VisitorContext,
) -> ControlFlow<()> {
    check(ctx)?;
    visitor.visit_expr(expr, ctx)?;
    match expr {
        Expr::Name(name) => visitor.visit_name(name, ctx)?,
        Expr::MemberAccess(access) => {
            visitor.visit_member_access(access, ctx)?;
            walk_expr(&access.target, visitor, ctx)?;
        }
        Expr::Invocation(invocation) => {
            visitor.visit_invocation(invocation, ctx)?;
            walk_expr(&invocation.callee, visitor, ctx)?;
            walk_arguments(&invocation.arguments, visitor, ctx)?;
        }
        Expr::ObjectCreation(creation) => {
            visitor.visit_object_creation(creation, ctx)?;
            walk_arguments(&creation.arguments, visitor, ctx)?;
            for init in &creation.initializer {
                walk_expr(init, visitor, ctx)?;
            }
        }
        Expr::Cast(cast) => walk_expr(&cast.expr, visitor, ctx)?,
        Expr::As(as_expr) => walk_expr(&as_expr.expr, visitor, ctx)?,
        Expr::Unary(unary) => walk_expr(&unary.operand, visitor, ctx)?,
        Expr::Parenthesized(paren) => walk_expr(&paren.expr, visitor, ctx)?,
        Expr::Assignment(assignment) => {
            visitor.visit_assignment(assignment, ctx)?;
            walk_expr(&assignment.left, visitor, ctx)?;
            walk_expr(&assignment.right, visitor, ctx)?;
        }
        Expr::Lambda(lambda) => {
            visitor.visit_lambda(lambda, ctx)?;
            walk_body(&lambda.body, visitor, ctx)?;
        }
        Expr::Other(other) => {
            for child in &other.children {
                walk_expr(child, visitor, ctx)?;
            }
            for stmt in &other.statements {
                walk_stmt(stmt, visitor, ctx)?;
            }
        }
        Expr::TypeOf(_)
        | Expr::Default(_)
        | Expr::Literal(_)
        | Expr::This(_)
        | Expr::PredefinedType(_) => {}
    }
    ControlFlow::Continue(())
}

fn walk_arguments<'ast, V: AstVisitor<'ast>>(
    arguments: &'ast [Argument],
    visitor: &mut V,
    ctx: &VisitorContext,
) -> ControlFlow<()> {
    for argument in arguments {
        walk_expr(&argument.expr, visitor, ctx)?;
    }
    ControlFlow::Continue(())
}

fn walk_parameters<'ast, V: AstVisitor<'ast>>(
    parameters: &'ast [Parameter],
    visitor: &mut V,
    ctx: &VisitorContext,
) -> ControlFlow<()> {
    for default in parameters.iter().filter_map(|p| p.default.as_ref()) {
        walk_expr(default, visitor, ctx)?;
    }
    ControlFlow::Continue(())
}

fn walk_attributes<'ast, V: AstVisitor<'ast>>(
    attributes: &'ast [Attribute],
    visitor: &mut V,
    ctx: &VisitorContext,
) -> ControlFlow<()> {
    for attribute in attributes {
        walk_arguments(&attribute.arguments, visitor, ctx)?;
    }
    ControlFlow::Continue(())
}

fn check(ctx: &VisitorContext) -> ControlFlow<()> {
    if ctx.is_cancelled() {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::parser::ParsedFile;
    use crate::syntax::Invocation;

    #[derive(Default)]
    struct InvocationCollector<'ast> {
        names: Vec<&'ast str>,
        stop_after: Option<usize>,
    }

    impl<'ast> AstVisitor<'ast> for InvocationCollector<'ast> {
        fn visit_invocation(
            &mut self,
            node: &'ast Invocation,
            _ctx: &VisitorContext,
        ) -> ControlFlow<()> {
            if let Some(name) = node.method_name() {
                self.names.push(name);
            }
            match self.stop_after {
                Some(limit) if self.names.len() >= limit => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            }
        }
    }

    const CODE: &str = r#"
namespace Demo
{
    public class Foo
    {
        public static readonly int A = Compute(1);

        public int B
        {
            get { return Read(); }
            set { Write(value); }
        }

        public void Run()
        {
            if (Check())
            {
                Outer(Inner());
            }
        }
    }
}
"#;

    #[test]
    fn visits_invocations_in_every_member() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let ctx = VisitorContext::new(&file);
        let mut collector = InvocationCollector::default();

        let flow = walk_ast(file.unit(), &mut collector, &ctx);

        assert!(flow.is_continue());
        assert_eq!(
            collector.names,
            vec!["Compute", "Read", "Write", "Check", "Outer", "Inner"]
        );
    }

    #[test]
    fn break_stops_the_walk() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let ctx = VisitorContext::new(&file);
        let mut collector = InvocationCollector {
            stop_after: Some(2),
            ..Default::default()
        };

        let flow = walk_ast(file.unit(), &mut collector, &ctx);

        assert!(flow.is_break());
        assert_eq!(collector.names, vec!["Compute", "Read"]);
    }

    #[test]
    fn cancelled_walk_visits_nothing() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let token = CancellationToken::new();
        token.cancel();
        let ctx = VisitorContext::new(&file).with_cancellation(&token);
        let mut collector = InvocationCollector::default();

        let flow = walk_ast(file.unit(), &mut collector, &ctx);

        assert!(flow.is_break());
        assert!(collector.names.is_empty());
    }
}
