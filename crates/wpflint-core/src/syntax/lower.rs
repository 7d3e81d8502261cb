//! Lowering from the tree-sitter C# concrete tree into the typed syntax model.
//!
//! Lowering is total: every grammar node either maps to a typed node or to an `Other`
//! node that keeps its children. Missing optional pieces (partially typed code) become
//! `None` rather than errors; syntax errors are collected separately by
//! [`collect_errors`].

use tree_sitter::Node;

use super::ast::*;

pub(crate) struct Lowerer<'s> {
    source: &'s str,
}

fn span_of(node: Node<'_>) -> Span {
    Span::new(node.start_byte() as u32, node.end_byte() as u32)
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn all_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn is_statement_kind(kind: &str) -> bool {
    kind == "block" || kind.ends_with("_statement")
}

fn is_type_declaration_kind(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "struct_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "record_struct_declaration"
            | "delegate_declaration"
    )
}

impl<'s> Lowerer<'s> {
    pub(crate) fn new(source: &'s str) -> Self {
        Self { source }
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
    }

    fn ident(&self, node: Node<'_>) -> Ident {
        Ident {
            text: self.text(node).trim_start_matches('@').to_string(),
            span: span_of(node),
        }
    }

    fn has_token(&self, node: Node<'_>, token: &str) -> bool {
        all_children(node)
            .iter()
            .any(|child| !child.is_named() && child.kind() == token)
    }

    pub(crate) fn lower_unit(&self, root: Node<'_>) -> CompilationUnit {
        let mut unit = CompilationUnit {
            span: span_of(root),
            ..Default::default()
        };
        let mut file_namespace: Option<NamespaceDecl> = None;

        for child in named_children(root) {
            let kind = child.kind();
            match kind {
                "using_directive" => {
                    if let Some(using) = self.lower_using(child) {
                        match file_namespace.as_mut() {
                            Some(ns) => ns.usings.push(using),
                            None => unit.usings.push(using),
                        }
                    }
                }
                "namespace_declaration" => {
                    if let Some(ns) = self.lower_namespace(child) {
                        match file_namespace.as_mut() {
                            Some(outer) => outer.namespaces.push(ns),
                            None => unit.namespaces.push(ns),
                        }
                    }
                }
                "file_scoped_namespace_declaration" => {
                    if let Some(mut ns) = self.lower_namespace(child) {
                        ns.file_scoped = true;
                        ns.span = Span::new(ns.span.lo, unit.span.hi);
                        file_namespace = Some(ns);
                    }
                }
                _ if is_type_declaration_kind(kind) => {
                    if let Some(ty) = self.lower_type_decl(child) {
                        match file_namespace.as_mut() {
                            Some(ns) => ns.types.push(ty),
                            None => unit.types.push(ty),
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(ns) = file_namespace {
            unit.namespaces.push(ns);
        }
        unit
    }

    fn lower_using(&self, node: Node<'_>) -> Option<UsingDirective> {
        let is_static = self.has_token(node, "static");
        let children = named_children(node);
        let target = children.last().copied()?;
        let name_equals = children
            .iter()
            .copied()
            .find(|child| child.kind() == "name_equals");
        let alias = if let Some(name_equals) = name_equals {
            named_children(name_equals)
                .first()
                .map(|alias| self.ident(*alias))
        } else if self.has_token(node, "=") {
            node.child_by_field_name("name")
                .or_else(|| children.first().copied())
                .filter(|alias| alias.id() != target.id())
                .map(|alias| self.ident(alias))
        } else {
            None
        };
        Some(UsingDirective {
            alias,
            name: self.lower_type(target),
            is_static,
            span: span_of(node),
        })
    }

    fn lower_namespace(&self, node: Node<'_>) -> Option<NamespaceDecl> {
        let name_node = node.child_by_field_name("name")?;
        let mut ns = NamespaceDecl {
            name: self.flatten_name(name_node),
            usings: Vec::new(),
            namespaces: Vec::new(),
            types: Vec::new(),
            file_scoped: false,
            span: span_of(node),
        };

        let members: Vec<Node<'_>> = match node.child_by_field_name("body") {
            Some(body) => named_children(body),
            None => named_children(node)
                .into_iter()
                .filter(|child| child.id() != name_node.id())
                .collect(),
        };

        for child in members {
            let kind = child.kind();
            match kind {
                "using_directive" => ns.usings.extend(self.lower_using(child)),
                "namespace_declaration" => ns.namespaces.extend(self.lower_namespace(child)),
                _ if is_type_declaration_kind(kind) => {
                    ns.types.extend(self.lower_type_decl(child));
                }
                _ => {}
            }
        }
        Some(ns)
    }

    fn flatten_name(&self, node: Node<'_>) -> Vec<Ident> {
        match node.kind() {
            "qualified_name" => {
                let mut parts = Vec::new();
                let qualifier = node.child_by_field_name("qualifier");
                let name = node.child_by_field_name("name");
                match (qualifier, name) {
                    (Some(q), Some(n)) => {
                        parts.extend(self.flatten_name(q));
                        parts.extend(self.flatten_name(n));
                    }
                    _ => {
                        for child in named_children(node) {
                            parts.extend(self.flatten_name(child));
                        }
                    }
                }
                parts
            }
            "alias_qualified_name" => {
                let mut parts = Vec::new();
                for child in named_children(node) {
                    parts.extend(self.flatten_name(child));
                }
                parts.retain(|part| part.text != "global");
                parts
            }
            "generic_name" => named_children(node)
                .into_iter()
                .find(|child| child.kind() == "identifier")
                .map(|child| vec![self.ident(child)])
                .unwrap_or_default(),
            _ => vec![self.ident(node)],
        }
    }

    fn lower_modifiers(&self, node: Node<'_>) -> Modifiers {
        let list = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "modifier")
            .map(|child| Modifier {
                keyword: self.text(child).trim().to_string(),
                span: span_of(child),
            })
            .collect();
        Modifiers { list }
    }

    fn lower_attributes(&self, node: Node<'_>) -> Vec<Attribute> {
        let mut attributes = Vec::new();
        for list in named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "attribute_list")
        {
            for attr in named_children(list)
                .into_iter()
                .filter(|child| child.kind() == "attribute")
            {
                let Some(name) = attr
                    .child_by_field_name("name")
                    .or_else(|| named_children(attr).first().copied())
                else {
                    continue;
                };
                let arguments = named_children(attr)
                    .into_iter()
                    .filter(|child| child.kind() == "attribute_argument_list")
                    .flat_map(named_children)
                    .filter_map(|arg| self.lower_argument(arg))
                    .collect();
                attributes.push(Attribute {
                    name: self.lower_type(name),
                    arguments,
                    span: span_of(attr),
                });
            }
        }
        attributes
    }

    fn lower_type_parameters(&self, node: Node<'_>) -> Vec<Ident> {
        let list = node
            .child_by_field_name("type_parameters")
            .or_else(|| {
                named_children(node)
                    .into_iter()
                    .find(|child| child.kind() == "type_parameter_list")
            });
        let Some(list) = list else {
            return Vec::new();
        };
        named_children(list)
            .into_iter()
            .filter(|child| child.kind() == "type_parameter")
            .filter_map(|param| {
                param
                    .child_by_field_name("name")
                    .or_else(|| {
                        named_children(param)
                            .into_iter()
                            .find(|c| c.kind() == "identifier")
                    })
                    .map(|name| self.ident(name))
            })
            .collect()
    }

    fn lower_type_decl(&self, node: Node<'_>) -> Option<TypeDecl> {
        let kind = match node.kind() {
            "class_declaration" => TypeKind::Class,
            "struct_declaration" | "record_struct_declaration" => TypeKind::Struct,
            "interface_declaration" => TypeKind::Interface,
            "enum_declaration" => TypeKind::Enum,
            "record_declaration" => TypeKind::Record,
            "delegate_declaration" => TypeKind::Delegate,
            _ => return None,
        };
        let name = self.ident(node.child_by_field_name("name")?);
        let children = named_children(node);

        let base_types = children
            .iter()
            .filter(|child| child.kind() == "base_list")
            .flat_map(|list| named_children(*list))
            .filter(|child| child.kind() != "argument_list")
            .map(|child| match child.kind() {
                "primary_constructor_base_type" => named_children(child)
                    .first()
                    .map(|first| self.lower_type(*first))
                    .unwrap_or_else(|| self.lower_type(child)),
                _ => self.lower_type(child),
            })
            .collect();

        let mut decl = TypeDecl {
            kind,
            name,
            modifiers: self.lower_modifiers(node),
            attributes: self.lower_attributes(node),
            type_parameters: self.lower_type_parameters(node),
            base_types,
            members: Vec::new(),
            enum_members: Vec::new(),
            delegate_signature: None,
            span: span_of(node),
        };

        if kind == TypeKind::Delegate {
            let returns = node
                .child_by_field_name("returns")
                .or_else(|| node.child_by_field_name("type"))
                .map(|t| self.lower_type(t))
                .unwrap_or_else(|| TypeSyntax::Other {
                    text: String::new(),
                    span: decl.span,
                });
            decl.delegate_signature = Some((returns, self.lower_parameter_list(node)));
            return Some(decl);
        }

        let body = node.child_by_field_name("body").or_else(|| {
            children.iter().copied().find(|child| {
                matches!(
                    child.kind(),
                    "declaration_list" | "enum_member_declaration_list"
                )
            })
        });
        let Some(body) = body else {
            return Some(decl);
        };

        for member in named_children(body) {
            match member.kind() {
                "enum_member_declaration" => {
                    if let Some(name) = member.child_by_field_name("name").or_else(|| {
                        named_children(member)
                            .into_iter()
                            .find(|c| c.kind() == "identifier")
                    }) {
                        decl.enum_members.push(self.ident(name));
                    }
                }
                _ => {
                    if let Some(lowered) = self.lower_member(member) {
                        decl.members.push(lowered);
                    }
                }
            }
        }
        Some(decl)
    }

    fn lower_member(&self, node: Node<'_>) -> Option<Member> {
        let kind = node.kind();
        if is_type_declaration_kind(kind) {
            return self.lower_type_decl(node).map(Member::Type);
        }
        match kind {
            "field_declaration" => self.lower_field(node).map(Member::Field),
            "property_declaration" => self.lower_property(node).map(Member::Property),
            "method_declaration" => self.lower_method(node).map(Member::Method),
            "constructor_declaration" => self.lower_constructor(node).map(Member::Constructor),
            "attribute_list" | "comment" => None,
            _ => Some(Member::Other(span_of(node))),
        }
    }

    fn lower_field(&self, node: Node<'_>) -> Option<FieldDecl> {
        let declaration = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "variable_declaration")?;
        let (ty, declarators) = self.lower_variable_declaration(declaration)?;
        Some(FieldDecl {
            modifiers: self.lower_modifiers(node),
            attributes: self.lower_attributes(node),
            ty,
            declarators,
            span: span_of(node),
        })
    }

    fn lower_variable_declaration(
        &self,
        node: Node<'_>,
    ) -> Option<(TypeSyntax, Vec<VariableDeclarator>)> {
        let ty_node = node.child_by_field_name("type")?;
        let declarators = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "variable_declarator")
            .filter_map(|child| self.lower_declarator(child))
            .collect();
        Some((self.lower_type(ty_node), declarators))
    }

    fn lower_declarator(&self, node: Node<'_>) -> Option<VariableDeclarator> {
        let children = named_children(node);
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| children.iter().copied().find(|c| c.kind() == "identifier"))?;

        let initializer = children
            .iter()
            .copied()
            .filter(|child| child.id() != name_node.id())
            .filter(|child| child.kind() != "bracketed_argument_list")
            .find_map(|child| match child.kind() {
                "equals_value_clause" => named_children(child)
                    .first()
                    .map(|value| self.lower_expr(*value)),
                _ => Some(self.lower_expr(child)),
            });

        Some(VariableDeclarator {
            name: self.ident(name_node),
            initializer,
            span: span_of(node),
        })
    }

    fn explicit_interface(&self, node: Node<'_>) -> Option<TypeSyntax> {
        named_children(node)
            .into_iter()
            .find(|child| child.kind() == "explicit_interface_specifier")
            .and_then(|spec| named_children(spec).first().copied())
            .map(|ty| self.lower_type(ty))
    }

    fn lower_property(&self, node: Node<'_>) -> Option<PropertyDecl> {
        let ty = self.lower_type(node.child_by_field_name("type")?);
        let name = self.ident(node.child_by_field_name("name")?);

        let accessors = node
            .child_by_field_name("accessors")
            .or_else(|| {
                named_children(node)
                    .into_iter()
                    .find(|child| child.kind() == "accessor_list")
            })
            .map(|list| {
                named_children(list)
                    .into_iter()
                    .filter(|child| child.kind() == "accessor_declaration")
                    .map(|child| self.lower_accessor(child))
                    .collect()
            })
            .unwrap_or_default();

        let mut expression_body = None;
        let mut initializer = None;
        let arrow = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "arrow_expression_clause");
        if let Some(arrow) = arrow {
            expression_body = named_children(arrow)
                .first()
                .map(|expr| self.lower_expr(*expr));
        } else if let Some(value) = node.child_by_field_name("value") {
            initializer = Some(match value.kind() {
                "equals_value_clause" => named_children(value)
                    .first()
                    .map(|expr| self.lower_expr(*expr))
                    .unwrap_or_else(|| self.lower_expr(value)),
                _ => self.lower_expr(value),
            });
        }

        Some(PropertyDecl {
            modifiers: self.lower_modifiers(node),
            attributes: self.lower_attributes(node),
            ty,
            name,
            explicit_interface: self.explicit_interface(node),
            accessors,
            expression_body,
            initializer,
            span: span_of(node),
        })
    }

    fn lower_accessor(&self, node: Node<'_>) -> Accessor {
        let keyword = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .or_else(|| {
                all_children(node)
                    .into_iter()
                    .map(|child| self.text(child))
                    .find(|text| matches!(*text, "get" | "set" | "init"))
            })
            .unwrap_or("");
        let kind = match keyword {
            "get" => AccessorKind::Get,
            "set" => AccessorKind::Set,
            "init" => AccessorKind::Init,
            _ => AccessorKind::Other,
        };
        Accessor {
            kind,
            modifiers: self.lower_modifiers(node),
            body: self.lower_function_body(node),
            span: span_of(node),
        }
    }

    fn lower_function_body(&self, node: Node<'_>) -> Option<Body> {
        let body = node.child_by_field_name("body").or_else(|| {
            named_children(node)
                .into_iter()
                .find(|child| matches!(child.kind(), "block" | "arrow_expression_clause"))
        })?;
        match body.kind() {
            "block" => Some(Body::Block(self.lower_block(body))),
            "arrow_expression_clause" => named_children(body)
                .first()
                .map(|expr| Body::Expression(self.lower_expr(*expr))),
            _ => None,
        }
    }

    fn lower_method(&self, node: Node<'_>) -> Option<MethodDecl> {
        let return_type = node
            .child_by_field_name("returns")
            .or_else(|| node.child_by_field_name("type"))?;
        let name = node.child_by_field_name("name")?;
        Some(MethodDecl {
            modifiers: self.lower_modifiers(node),
            attributes: self.lower_attributes(node),
            return_type: self.lower_type(return_type),
            name: self.ident(name),
            explicit_interface: self.explicit_interface(node),
            type_parameters: self.lower_type_parameters(node),
            parameters: self.lower_parameter_list(node),
            body: self.lower_function_body(node),
            span: span_of(node),
        })
    }

    fn lower_constructor(&self, node: Node<'_>) -> Option<ConstructorDecl> {
        let name = node.child_by_field_name("name")?;
        let initializer = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "constructor_initializer")
            .map(|init| self.lower_argument_list(init))
            .unwrap_or_default();
        Some(ConstructorDecl {
            modifiers: self.lower_modifiers(node),
            name: self.ident(name),
            parameters: self.lower_parameter_list(node),
            initializer,
            body: self.lower_function_body(node),
            span: span_of(node),
        })
    }

    fn lower_parameter_list(&self, node: Node<'_>) -> Vec<Parameter> {
        let list = node.child_by_field_name("parameters").or_else(|| {
            named_children(node)
                .into_iter()
                .find(|child| child.kind() == "parameter_list")
        });
        let Some(list) = list else {
            return Vec::new();
        };
        self.lower_parameters(list)
    }

    fn lower_parameters(&self, list: Node<'_>) -> Vec<Parameter> {
        named_children(list)
            .into_iter()
            .filter(|child| child.kind() == "parameter")
            .filter_map(|param| self.lower_parameter(param))
            .collect()
    }

    fn lower_parameter(&self, node: Node<'_>) -> Option<Parameter> {
        let name = node.child_by_field_name("name").or_else(|| {
            named_children(node)
                .into_iter()
                .filter(|c| c.kind() == "identifier")
                .last()
        })?;
        let ty = node.child_by_field_name("type").map(|t| self.lower_type(t));
        let default = named_children(node)
            .into_iter()
            .skip_while(|child| child.id() != name.id())
            .nth(1)
            .and_then(|child| match child.kind() {
                "equals_value_clause" => named_children(child)
                    .first()
                    .map(|expr| self.lower_expr(*expr)),
                _ => Some(self.lower_expr(child)),
            });
        let mut modifiers = self.lower_modifiers(node);
        for child in all_children(node) {
            if !child.is_named() && matches!(child.kind(), "ref" | "out" | "in" | "params" | "this")
            {
                modifiers.list.push(Modifier {
                    keyword: child.kind().to_string(),
                    span: span_of(child),
                });
            }
        }
        Some(Parameter {
            modifiers,
            ty,
            name: self.ident(name),
            default,
            span: span_of(node),
        })
    }

    fn lower_argument_list(&self, node: Node<'_>) -> Vec<Argument> {
        let list = if node.kind() == "argument_list" {
            Some(node)
        } else {
            node.child_by_field_name("arguments").or_else(|| {
                named_children(node)
                    .into_iter()
                    .find(|child| child.kind() == "argument_list")
            })
        };
        list.map(|list| {
            named_children(list)
                .into_iter()
                .filter_map(|arg| self.lower_argument(arg))
                .collect()
        })
        .unwrap_or_default()
    }

    fn lower_argument(&self, node: Node<'_>) -> Option<Argument> {
        if !matches!(node.kind(), "argument" | "attribute_argument") {
            return None;
        }
        let children = named_children(node);
        let name_node = node.child_by_field_name("name").or_else(|| {
            let has_colon = all_children(node)
                .iter()
                .any(|c| !c.is_named() && matches!(c.kind(), ":" | "="));
            if has_colon && children.len() > 1 {
                children.first().copied()
            } else {
                None
            }
        });
        let expr_node = children
            .iter()
            .copied()
            .filter(|child| Some(child.id()) != name_node.map(|n| n.id()))
            .last()?;
        Some(Argument {
            name: name_node.map(|n| self.ident(n)),
            expr: self.lower_expr(expr_node),
            span: span_of(node),
        })
    }

    pub(crate) fn lower_type(&self, node: Node<'_>) -> TypeSyntax {
        let span = span_of(node);
        match node.kind() {
            "predefined_type" => TypeSyntax::Predefined {
                keyword: self.text(node).trim().to_string(),
                span,
            },
            "identifier" | "implicit_type" => TypeSyntax::Named {
                segments: vec![TypeSegment {
                    ident: self.ident(node),
                    type_arguments: Vec::new(),
                }],
                span,
            },
            "generic_name" | "qualified_name" | "alias_qualified_name" => TypeSyntax::Named {
                segments: self.type_segments(node),
                span,
            },
            "nullable_type" => match node
                .child_by_field_name("type")
                .or_else(|| named_children(node).first().copied())
            {
                Some(inner) => TypeSyntax::Nullable {
                    inner: Box::new(self.lower_type(inner)),
                    span,
                },
                None => self.other_type(node),
            },
            "array_type" => match node
                .child_by_field_name("type")
                .or_else(|| named_children(node).first().copied())
            {
                Some(element) => TypeSyntax::Array {
                    element: Box::new(self.lower_type(element)),
                    span,
                },
                None => self.other_type(node),
            },
            "type" | "type_argument" => match named_children(node).first() {
                Some(inner) => self.lower_type(*inner),
                None => self.other_type(node),
            },
            _ => self.other_type(node),
        }
    }

    fn other_type(&self, node: Node<'_>) -> TypeSyntax {
        TypeSyntax::Other {
            text: self.text(node).to_string(),
            span: span_of(node),
        }
    }

    fn type_segments(&self, node: Node<'_>) -> Vec<TypeSegment> {
        match node.kind() {
            "qualified_name" => {
                let mut segments = Vec::new();
                match (
                    node.child_by_field_name("qualifier"),
                    node.child_by_field_name("name"),
                ) {
                    (Some(q), Some(n)) => {
                        segments.extend(self.type_segments(q));
                        segments.extend(self.type_segments(n));
                    }
                    _ => {
                        for child in named_children(node) {
                            segments.extend(self.type_segments(child));
                        }
                    }
                }
                segments
            }
            "alias_qualified_name" => {
                let mut segments = Vec::new();
                for child in named_children(node) {
                    segments.extend(self.type_segments(child));
                }
                segments.retain(|s| s.ident.text != "global");
                segments
            }
            "generic_name" => {
                let children = named_children(node);
                let Some(name) = children.iter().find(|c| c.kind() == "identifier") else {
                    return Vec::new();
                };
                vec![TypeSegment {
                    ident: self.ident(*name),
                    type_arguments: self.type_arguments(node),
                }]
            }
            _ => vec![TypeSegment {
                ident: self.ident(node),
                type_arguments: Vec::new(),
            }],
        }
    }

    fn type_arguments(&self, node: Node<'_>) -> Vec<TypeSyntax> {
        named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "type_argument_list")
            .flat_map(named_children)
            .map(|arg| self.lower_type(arg))
            .collect()
    }

    fn lower_block(&self, node: Node<'_>) -> Block {
        Block {
            statements: named_children(node)
                .into_iter()
                .filter(|child| child.kind() != "comment")
                .map(|child| self.lower_stmt(child))
                .collect(),
            span: span_of(node),
        }
    }

    fn lower_stmt(&self, node: Node<'_>) -> Stmt {
        let span = span_of(node);
        match node.kind() {
            "block" => Stmt::Block(self.lower_block(node)),
            "return_statement" => Stmt::Return {
                expr: named_children(node)
                    .first()
                    .map(|expr| self.lower_expr(*expr)),
                span,
            },
            "expression_statement" => match named_children(node).first() {
                Some(expr) => Stmt::Expression {
                    expr: self.lower_expr(*expr),
                    span,
                },
                None => self.other_stmt(node),
            },
            "local_declaration_statement" | "variable_declaration" => {
                let declaration = if node.kind() == "variable_declaration" {
                    Some(node)
                } else {
                    named_children(node)
                        .into_iter()
                        .find(|child| child.kind() == "variable_declaration")
                };
                match declaration.and_then(|d| self.lower_variable_declaration(d)) {
                    Some((ty, declarators)) => Stmt::LocalDeclaration {
                        ty,
                        declarators,
                        span,
                    },
                    None => self.other_stmt(node),
                }
            }
            "if_statement" => {
                let condition = node.child_by_field_name("condition");
                let consequence = node.child_by_field_name("consequence");
                match (condition, consequence) {
                    (Some(condition), Some(consequence)) => Stmt::If {
                        condition: self.lower_expr(condition),
                        then_branch: Box::new(self.lower_stmt(consequence)),
                        else_branch: node
                            .child_by_field_name("alternative")
                            .map(|alt| Box::new(self.lower_stmt(alt))),
                        span,
                    },
                    _ => self.other_stmt(node),
                }
            }
            _ => self.other_stmt(node),
        }
    }

    fn other_stmt(&self, node: Node<'_>) -> Stmt {
        let mut statements = Vec::new();
        let mut exprs = Vec::new();
        for child in named_children(node) {
            let kind = child.kind();
            if kind == "comment" {
                continue;
            }
            if is_statement_kind(kind) || kind == "variable_declaration" {
                statements.push(self.lower_stmt(child));
            } else {
                exprs.push(self.lower_expr(child));
            }
        }
        Stmt::Other {
            kind: node.kind().to_string(),
            statements,
            exprs,
            span: span_of(node),
        }
    }

    pub(crate) fn lower_expr(&self, node: Node<'_>) -> Expr {
        let span = span_of(node);
        match node.kind() {
            "identifier" => Expr::Name(NameExpr {
                ident: self.ident(node),
                type_arguments: Vec::new(),
                span,
            }),
            "generic_name" => match named_children(node)
                .into_iter()
                .find(|c| c.kind() == "identifier")
            {
                Some(name) => Expr::Name(NameExpr {
                    ident: self.ident(name),
                    type_arguments: self.type_arguments(node),
                    span,
                }),
                None => self.other_expr(node),
            },
            "qualified_name" | "alias_qualified_name" => self.qualified_name_expr(node),
            "member_access_expression" => {
                let target = node.child_by_field_name("expression");
                let name = node.child_by_field_name("name");
                match (target, name) {
                    (Some(target), Some(name)) => {
                        let (ident, type_arguments) = match name.kind() {
                            "generic_name" => match named_children(name)
                                .into_iter()
                                .find(|c| c.kind() == "identifier")
                            {
                                Some(id) => (self.ident(id), self.type_arguments(name)),
                                None => (self.ident(name), Vec::new()),
                            },
                            _ => (self.ident(name), Vec::new()),
                        };
                        Expr::MemberAccess(MemberAccess {
                            target: Box::new(self.lower_expr(target)),
                            name: ident,
                            type_arguments,
                            span,
                        })
                    }
                    _ => self.other_expr(node),
                }
            }
            "invocation_expression" => match node.child_by_field_name("function") {
                Some(function) => Expr::Invocation(Invocation {
                    callee: Box::new(self.lower_expr(function)),
                    arguments: self.lower_argument_list(node),
                    span,
                }),
                None => self.other_expr(node),
            },
            "object_creation_expression" => match node.child_by_field_name("type") {
                Some(ty) => Expr::ObjectCreation(ObjectCreation {
                    ty: self.lower_type(ty),
                    arguments: self.lower_argument_list(node),
                    initializer: node
                        .child_by_field_name("initializer")
                        .map(|init| {
                            named_children(init)
                                .into_iter()
                                .map(|e| self.lower_expr(e))
                                .collect()
                        })
                        .unwrap_or_default(),
                    span,
                }),
                None => self.other_expr(node),
            },
            "cast_expression" => {
                let ty = node.child_by_field_name("type");
                let value = node.child_by_field_name("value");
                match (ty, value) {
                    (Some(ty), Some(value)) => Expr::Cast(Cast {
                        ty: self.lower_type(ty),
                        expr: Box::new(self.lower_expr(value)),
                        span,
                    }),
                    _ => self.other_expr(node),
                }
            }
            "as_expression" => {
                let children = named_children(node);
                let left = node
                    .child_by_field_name("left")
                    .or_else(|| children.first().copied());
                let right = node
                    .child_by_field_name("right")
                    .or_else(|| children.last().copied());
                match (left, right) {
                    (Some(left), Some(right)) if left.id() != right.id() => Expr::As(AsExpr {
                        expr: Box::new(self.lower_expr(left)),
                        ty: self.lower_type(right),
                        span,
                    }),
                    _ => self.other_expr(node),
                }
            }
            "typeof_expression" => match node
                .child_by_field_name("type")
                .or_else(|| named_children(node).first().copied())
            {
                Some(ty) => Expr::TypeOf(TypeOfExpr {
                    ty: self.lower_type(ty),
                    span,
                }),
                None => self.other_expr(node),
            },
            "default_expression" => Expr::Default(DefaultExpr {
                ty: node
                    .child_by_field_name("type")
                    .or_else(|| named_children(node).first().copied())
                    .map(|ty| self.lower_type(ty)),
                span,
            }),
            "parenthesized_expression" => match named_children(node).first() {
                Some(inner) => Expr::Parenthesized(Parenthesized {
                    expr: Box::new(self.lower_expr(*inner)),
                    span,
                }),
                None => self.other_expr(node),
            },
            "prefix_unary_expression" => {
                let operand = node
                    .child_by_field_name("operand")
                    .or_else(|| named_children(node).last().copied());
                let operator = all_children(node)
                    .into_iter()
                    .find(|child| !child.is_named())
                    .map(|op| self.text(op).to_string())
                    .unwrap_or_default();
                match operand {
                    Some(operand) => Expr::Unary(Unary {
                        operator,
                        operand: Box::new(self.lower_expr(operand)),
                        span,
                    }),
                    None => self.other_expr(node),
                }
            }
            "assignment_expression" => {
                let left = node.child_by_field_name("left");
                let right = node.child_by_field_name("right");
                let operator = node
                    .child_by_field_name("operator")
                    .map(|op| self.text(op).to_string())
                    .or_else(|| {
                        all_children(node)
                            .into_iter()
                            .find(|child| !child.is_named())
                            .map(|op| self.text(op).to_string())
                    })
                    .unwrap_or_else(|| "=".to_string());
                match (left, right) {
                    (Some(left), Some(right)) => Expr::Assignment(Assignment {
                        left: Box::new(self.lower_expr(left)),
                        operator,
                        right: Box::new(self.lower_expr(right)),
                        span,
                    }),
                    _ => self.other_expr(node),
                }
            }
            "lambda_expression" | "anonymous_method_expression" => self.lower_lambda(node),
            "this" | "this_expression" => Expr::This(span),
            "predefined_type" => Expr::PredefinedType(PredefinedTypeExpr {
                keyword: self.text(node).trim().to_string(),
                span,
            }),
            "string_literal" | "verbatim_string_literal" | "raw_string_literal" => {
                Expr::Literal(Literal {
                    kind: LiteralKind::String(unquote_string(self.text(node))),
                    span,
                })
            }
            "character_literal" => match unquote_char(self.text(node)) {
                Some(c) => Expr::Literal(Literal {
                    kind: LiteralKind::Char(c),
                    span,
                }),
                None => self.other_expr(node),
            },
            "integer_literal" => match parse_integer(self.text(node)) {
                Some((value, suffix)) => Expr::Literal(Literal {
                    kind: LiteralKind::Integer { value, suffix },
                    span,
                }),
                None => self.other_expr(node),
            },
            "real_literal" => match parse_real(self.text(node)) {
                Some((value, suffix)) => Expr::Literal(Literal {
                    kind: LiteralKind::Real { value, suffix },
                    span,
                }),
                None => self.other_expr(node),
            },
            "boolean_literal" => Expr::Literal(Literal {
                kind: LiteralKind::Boolean(self.text(node).trim() == "true"),
                span,
            }),
            "null_literal" => Expr::Literal(Literal {
                kind: LiteralKind::Null,
                span,
            }),
            _ => self.other_expr(node),
        }
    }

    fn qualified_name_expr(&self, node: Node<'_>) -> Expr {
        let segments = self.type_segments(node);
        let mut iter = segments.into_iter();
        let Some(first) = iter.next() else {
            return self.other_expr(node);
        };
        let lo = first.ident.span.lo;
        let mut expr = Expr::Name(NameExpr {
            span: first.ident.span,
            ident: first.ident,
            type_arguments: first.type_arguments,
        });
        for segment in iter {
            let span = Span::new(lo, segment.ident.span.hi);
            expr = Expr::MemberAccess(MemberAccess {
                target: Box::new(expr),
                name: segment.ident,
                type_arguments: segment.type_arguments,
                span,
            });
        }
        expr
    }

    fn lower_lambda(&self, node: Node<'_>) -> Expr {
        let span = span_of(node);
        let parameters = match node.child_by_field_name("parameters").or_else(|| {
            named_children(node)
                .into_iter()
                .find(|child| child.kind() == "parameter_list")
        }) {
            Some(params) if params.kind() == "parameter_list" => self.lower_parameters(params),
            Some(param) => vec![Parameter {
                modifiers: Modifiers::default(),
                ty: None,
                name: self.ident(param),
                default: None,
                span: span_of(param),
            }],
            None => Vec::new(),
        };
        let body = node
            .child_by_field_name("body")
            .or_else(|| named_children(node).last().copied());
        let Some(body) = body else {
            return self.other_expr(node);
        };
        let body = match body.kind() {
            "block" => Body::Block(self.lower_block(body)),
            _ => Body::Expression(self.lower_expr(body)),
        };
        Expr::Lambda(Lambda {
            parameters,
            body: Box::new(body),
            span,
        })
    }

    fn other_expr(&self, node: Node<'_>) -> Expr {
        let mut children = Vec::new();
        let mut statements = Vec::new();
        for child in named_children(node) {
            let kind = child.kind();
            if kind == "comment" {
                continue;
            }
            if is_statement_kind(kind) {
                statements.push(self.lower_stmt(child));
            } else {
                children.push(self.lower_expr(child));
            }
        }
        Expr::Other(OtherExpr {
            kind: node.kind().to_string(),
            children,
            statements,
            span: span_of(node),
        })
    }
}

/// Syntax errors as `(span, message)` pairs, outermost error node only.
pub(crate) fn collect_errors(root: Node<'_>, source: &str) -> Vec<(Span, String)> {
    let mut errors = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_missing() {
            errors.push((span_of(node), format!("Missing '{}'", node.kind())));
            continue;
        }
        if node.is_error() {
            let text = source
                .get(node.start_byte()..node.end_byte())
                .unwrap_or("")
                .lines()
                .next()
                .unwrap_or("")
                .trim();
            let message = if text.is_empty() {
                "Syntax error".to_string()
            } else {
                format!("Syntax error near '{}'", truncate(text, 40))
            };
            errors.push((span_of(node), message));
            continue;
        }
        if !node.has_error() {
            continue;
        }
        let mut children = all_children(node);
        children.reverse();
        stack.extend(children);
    }
    errors
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn unquote_string(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(verbatim) = raw.strip_prefix("@\"").or_else(|| raw.strip_prefix("$@\"")) {
        return verbatim
            .strip_suffix('"')
            .unwrap_or(verbatim)
            .replace("\"\"", "\"");
    }
    if raw.starts_with("\"\"\"") {
        return raw.trim_matches('"').trim().to_string();
    }
    let body = raw.strip_suffix("u8").unwrap_or(raw);
    let body = body.strip_prefix('"').unwrap_or(body);
    let body = body.strip_suffix('"').unwrap_or(body);
    unescape(body)
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn unquote_char(raw: &str) -> Option<char> {
    let inner = raw.trim().strip_prefix('\'')?.strip_suffix('\'')?;
    unescape(inner).chars().next()
}

fn parse_integer(raw: &str) -> Option<(u64, String)> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    let digits_end = cleaned
        .trim_end_matches(['u', 'U', 'l', 'L'])
        .len();
    let (digits, suffix) = cleaned.split_at(digits_end);
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        u64::from_str_radix(bin, 2).ok()?
    } else {
        digits.parse().ok()?
    };
    Some((value, suffix.to_ascii_lowercase()))
}

fn parse_real(raw: &str) -> Option<(f64, String)> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    let digits_end = cleaned
        .trim_end_matches(['f', 'F', 'd', 'D', 'm', 'M'])
        .len();
    let (digits, suffix) = cleaned.split_at(digits_end);
    let value = digits.parse().ok()?;
    Some((value, suffix.to_ascii_lowercase()))
}
