//! Typed C# syntax model.
//!
//! The model is a closed set of nodes lowered from the tree-sitter concrete tree. It only
//! distinguishes the shapes the analyzer reasons about; everything else is kept as
//! `Expr::Other` / `Stmt::Other` with its children so traversals still reach nested code.

use serde::Serialize;

/// Byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize)]
pub struct Span {
    pub lo: u32,
    pub hi: u32,
}

impl Span {
    pub fn new(lo: u32, hi: u32) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, offset: u32) -> bool {
        self.lo <= offset && offset < self.hi
    }

    pub fn encloses(&self, other: Span) -> bool {
        self.lo <= other.lo && other.hi <= self.hi
    }

    pub fn len(&self) -> u32 {
        self.hi.saturating_sub(self.lo)
    }

    pub fn is_empty(&self) -> bool {
        self.hi <= self.lo
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub usings: Vec<UsingDirective>,
    pub namespaces: Vec<NamespaceDecl>,
    pub types: Vec<TypeDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct UsingDirective {
    pub alias: Option<Ident>,
    pub name: TypeSyntax,
    pub is_static: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct NamespaceDecl {
    pub name: Vec<Ident>,
    pub usings: Vec<UsingDirective>,
    pub namespaces: Vec<NamespaceDecl>,
    pub types: Vec<TypeDecl>,
    pub file_scoped: bool,
    pub span: Span,
}

impl NamespaceDecl {
    pub fn dotted_name(&self) -> String {
        self.name
            .iter()
            .map(|i| i.text.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Record,
    Delegate,
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: Ident,
    pub modifiers: Modifiers,
    pub attributes: Vec<Attribute>,
    pub type_parameters: Vec<Ident>,
    pub base_types: Vec<TypeSyntax>,
    pub members: Vec<Member>,
    /// Enum member names, in declaration order.
    pub enum_members: Vec<Ident>,
    /// Return type and parameters when `kind` is `Delegate`.
    pub delegate_signature: Option<(TypeSyntax, Vec<Parameter>)>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Member {
    Field(FieldDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Type(TypeDecl),
    Other(Span),
}

impl Member {
    pub fn span(&self) -> Span {
        match self {
            Member::Field(f) => f.span,
            Member::Property(p) => p.span,
            Member::Method(m) => m.span,
            Member::Constructor(c) => c.span,
            Member::Type(t) => t.span,
            Member::Other(span) => *span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Modifier {
    pub keyword: String,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct Modifiers {
    pub list: Vec<Modifier>,
}

impl Modifiers {
    pub fn has(&self, keyword: &str) -> bool {
        self.list.iter().any(|m| m.keyword == keyword)
    }

    pub fn is_static(&self) -> bool {
        self.has("static")
    }

    pub fn span(&self) -> Option<Span> {
        let first = self.list.first()?;
        let last = self.list.last()?;
        Some(Span::new(first.span.lo, last.span.hi))
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: TypeSyntax,
    pub arguments: Vec<Argument>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub attributes: Vec<Attribute>,
    pub ty: TypeSyntax,
    pub declarators: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    pub name: Ident,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub modifiers: Modifiers,
    pub attributes: Vec<Attribute>,
    pub ty: TypeSyntax,
    pub name: Ident,
    pub explicit_interface: Option<TypeSyntax>,
    pub accessors: Vec<Accessor>,
    pub expression_body: Option<Expr>,
    pub initializer: Option<Expr>,
    pub span: Span,
}

impl PropertyDecl {
    pub fn getter(&self) -> Option<&Accessor> {
        self.accessors.iter().find(|a| a.kind == AccessorKind::Get)
    }

    pub fn setter(&self) -> Option<&Accessor> {
        self.accessors
            .iter()
            .find(|a| matches!(a.kind, AccessorKind::Set | AccessorKind::Init))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Set,
    Init,
    Other,
}

#[derive(Debug, Clone)]
pub struct Accessor {
    pub kind: AccessorKind,
    pub modifiers: Modifiers,
    pub body: Option<Body>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Body {
    Block(Block),
    Expression(Expr),
}

impl Body {
    pub fn span(&self) -> Span {
        match self {
            Body::Block(block) => block.span,
            Body::Expression(expr) => expr.span(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub attributes: Vec<Attribute>,
    pub return_type: TypeSyntax,
    pub name: Ident,
    pub explicit_interface: Option<TypeSyntax>,
    pub type_parameters: Vec<Ident>,
    pub parameters: Vec<Parameter>,
    pub body: Option<Body>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub modifiers: Modifiers,
    pub name: Ident,
    pub parameters: Vec<Parameter>,
    pub initializer: Vec<Argument>,
    pub body: Option<Body>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub modifiers: Modifiers,
    pub ty: Option<TypeSyntax>,
    pub name: Ident,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Option<Ident>,
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeSyntax {
    Predefined {
        keyword: String,
        span: Span,
    },
    Named {
        segments: Vec<TypeSegment>,
        span: Span,
    },
    Nullable {
        inner: Box<TypeSyntax>,
        span: Span,
    },
    Array {
        element: Box<TypeSyntax>,
        span: Span,
    },
    Other {
        text: String,
        span: Span,
    },
}

#[derive(Debug, Clone)]
pub struct TypeSegment {
    pub ident: Ident,
    pub type_arguments: Vec<TypeSyntax>,
}

impl TypeSyntax {
    pub fn span(&self) -> Span {
        match self {
            TypeSyntax::Predefined { span, .. }
            | TypeSyntax::Named { span, .. }
            | TypeSyntax::Nullable { span, .. }
            | TypeSyntax::Array { span, .. }
            | TypeSyntax::Other { span, .. } => *span,
        }
    }

    /// Last identifier of a named type, e.g. `Bar` for `Foo.Bar<int>`.
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            TypeSyntax::Named { segments, .. } => segments.last().map(|s| s.ident.text.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Block),
    Return {
        expr: Option<Expr>,
        span: Span,
    },
    Expression {
        expr: Expr,
        span: Span,
    },
    LocalDeclaration {
        ty: TypeSyntax,
        declarators: Vec<VariableDeclarator>,
        span: Span,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        span: Span,
    },
    Other {
        kind: String,
        statements: Vec<Stmt>,
        exprs: Vec<Expr>,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(block) => block.span,
            Stmt::Return { span, .. }
            | Stmt::Expression { span, .. }
            | Stmt::LocalDeclaration { span, .. }
            | Stmt::If { span, .. }
            | Stmt::Other { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Name(NameExpr),
    MemberAccess(MemberAccess),
    Invocation(Invocation),
    ObjectCreation(ObjectCreation),
    Cast(Cast),
    As(AsExpr),
    TypeOf(TypeOfExpr),
    Default(DefaultExpr),
    Literal(Literal),
    Unary(Unary),
    Parenthesized(Parenthesized),
    Assignment(Assignment),
    Lambda(Lambda),
    This(Span),
    PredefinedType(PredefinedTypeExpr),
    Other(OtherExpr),
}

#[derive(Debug, Clone)]
pub struct NameExpr {
    pub ident: Ident,
    pub type_arguments: Vec<TypeSyntax>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MemberAccess {
    pub target: Box<Expr>,
    pub name: Ident,
    pub type_arguments: Vec<TypeSyntax>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub callee: Box<Expr>,
    pub arguments: Vec<Argument>,
    pub span: Span,
}

impl Invocation {
    /// Name of the invoked member as written, e.g. `Register` for `DependencyProperty.Register(...)`.
    pub fn method_name(&self) -> Option<&str> {
        match self.callee.as_ref() {
            Expr::Name(name) => Some(&name.ident.text),
            Expr::MemberAccess(access) => Some(&access.name.text),
            _ => None,
        }
    }

    /// `nameof(x)` when `nameof` is the contextual keyword, not a user method.
    pub fn is_nameof(&self) -> bool {
        matches!(self.callee.as_ref(), Expr::Name(name) if name.ident.text == "nameof")
            && self.arguments.len() == 1
    }
}

#[derive(Debug, Clone)]
pub struct ObjectCreation {
    pub ty: TypeSyntax,
    pub arguments: Vec<Argument>,
    pub initializer: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Cast {
    pub ty: TypeSyntax,
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AsExpr {
    pub expr: Box<Expr>,
    pub ty: TypeSyntax,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeOfExpr {
    pub ty: TypeSyntax,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DefaultExpr {
    pub ty: Option<TypeSyntax>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralKind {
    String(String),
    Char(char),
    Integer { value: u64, suffix: String },
    Real { value: f64, suffix: String },
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub kind: LiteralKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Unary {
    pub operator: String,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Parenthesized {
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub left: Box<Expr>,
    pub operator: String,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Lambda {
    pub parameters: Vec<Parameter>,
    pub body: Box<Body>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PredefinedTypeExpr {
    pub keyword: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct OtherExpr {
    pub kind: String,
    pub children: Vec<Expr>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Name(e) => e.span,
            Expr::MemberAccess(e) => e.span,
            Expr::Invocation(e) => e.span,
            Expr::ObjectCreation(e) => e.span,
            Expr::Cast(e) => e.span,
            Expr::As(e) => e.span,
            Expr::TypeOf(e) => e.span,
            Expr::Default(e) => e.span,
            Expr::Literal(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Parenthesized(e) => e.span,
            Expr::Assignment(e) => e.span,
            Expr::Lambda(e) => e.span,
            Expr::This(span) => *span,
            Expr::PredefinedType(e) => e.span,
            Expr::Other(e) => e.span,
        }
    }

    pub fn as_invocation(&self) -> Option<&Invocation> {
        match self {
            Expr::Invocation(inv) => Some(inv),
            _ => None,
        }
    }

    /// Identifier text when the expression is a bare simple name.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Name(name) if name.type_arguments.is_empty() => Some(&name.ident.text),
            _ => None,
        }
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr {
        let mut current = self;
        while let Expr::Parenthesized(p) = current {
            current = &p.expr;
        }
        current
    }
}
