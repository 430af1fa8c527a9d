//! Mapping the reconstructed source tree into the lossless syntax tree
//!
//! The mapper walks the [`PsiTree`] node by node, dispatching on node kind,
//! and emits immutable LST nodes with their exact leading trivia. A running
//! source cursor guarantees losslessness mechanically: every byte of the
//! input is consumed exactly once, either as a node's prefix or as literal
//! token text, so printing the result reproduces the input.
//!
//! The mapper is intentionally partial. Node kinds it does not implement are
//! an immediate [`KataError::UnsupportedSyntax`] — the supported set is
//! expected to grow, and silently skipping a construct would break the
//! losslessness guarantee.
//!
//! Type information comes from a [`TypeAttribution`] table associating
//! reconstructed nodes with semantic symbols or type references, resolved
//! through the [`TypeMapper`] as nodes are emitted.

use std::collections::HashMap;

use crate::error::KataError;
use crate::lst::tree::{
    Binary, BinaryOp, ClassBody, ClassDeclaration, ClassKeyword, CompilationUnit, Container,
    Expression, FieldAccess, Identifier, ImportAlias, ImportDirective, Initializer, Literal,
    LiteralValue, MethodInvocation, PackageDirective, ParameterizedTypeTree, Parentheses, Property,
    PropertyKeyword, RightPadded, Selector, Space, Statement, TypeAlias, TypeClause, TypeTree,
};
use crate::psi::{KtSyntaxKind, NodeId, PsiTree, SourceRange, Token};
use crate::result::Result;
use crate::types::{SemanticModel, SymbolId, TypeId, TypeMapper, TypeRef, TypeStore};

/// What the frontend resolved a syntax node to
#[derive(Debug, Clone)]
pub enum Attributed {
    Symbol(SymbolId),
    Type(TypeRef),
}

/// Associations from reconstructed nodes to semantic descriptors
///
/// Keyed by `(range, kind)`, the same identity the reconstruction uses for
/// nodes.
#[derive(Debug, Default)]
pub struct TypeAttribution {
    entries: HashMap<(SourceRange, KtSyntaxKind), Attributed>,
}

impl TypeAttribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, range: SourceRange, kind: KtSyntaxKind, attributed: Attributed) {
        self.entries.insert((range, kind), attributed);
    }

    pub fn get(&self, range: SourceRange, kind: KtSyntaxKind) -> Option<&Attributed> {
        self.entries.get(&(range, kind))
    }
}

/// Maps a reconstructed tree to a [`CompilationUnit`]
pub struct LstMapper<'a> {
    tree: &'a PsiTree,
    attribution: &'a TypeAttribution,
    types: TypeMapper<'a>,
    cursor: usize,
    last_token_range: SourceRange,
}

impl<'a> LstMapper<'a> {
    pub fn new(
        tree: &'a PsiTree,
        attribution: &'a TypeAttribution,
        model: &'a SemanticModel,
        store: &'a mut TypeStore,
    ) -> Self {
        Self {
            tree,
            attribution,
            types: TypeMapper::new(model, store),
            cursor: 0,
            last_token_range: SourceRange::new(0, 0),
        }
    }

    pub fn map_compilation_unit(&mut self) -> Result<CompilationUnit> {
        let root = self
            .tree
            .root()
            .ok_or_else(|| KataError::unsupported_descriptor("source tree has no root"))?;

        let mut package = None;
        let mut imports = Vec::new();
        let mut statements = Vec::new();

        for child in self.non_trivia_children(root) {
            match self.tree.node(child).kind {
                KtSyntaxKind::PackageDirective => package = Some(self.map_package(child)?),
                KtSyntaxKind::ImportList => {
                    for import in self.non_trivia_children(child) {
                        if self.tree.node(import).kind == KtSyntaxKind::ImportDirective {
                            imports.push(self.map_import(import)?);
                        }
                    }
                }
                _ => statements.push(self.map_statement(child)?),
            }
        }

        let eof = Space::new(&self.tree.source()[self.cursor..]);
        self.cursor = self.tree.source().len();
        Ok(CompilationUnit {
            package,
            imports,
            statements,
            eof,
        })
    }

    fn map_statement(&mut self, id: NodeId) -> Result<Statement> {
        let node = self.tree.node(id);
        match node.kind {
            KtSyntaxKind::Property => Ok(Statement::Property(self.map_property(id)?)),
            KtSyntaxKind::Typealias => Ok(Statement::TypeAlias(self.map_typealias(id)?)),
            KtSyntaxKind::Class => Ok(Statement::Class(self.map_class(id)?)),
            kind if is_expression_kind(kind) => {
                Ok(Statement::Expression(self.map_expression(id)?))
            }
            kind => Err(KataError::UnsupportedSyntax {
                kind,
                range: node.range,
            }),
        }
    }

    fn map_package(&mut self, id: NodeId) -> Result<PackageDirective> {
        let end = self.tree.node(id).range.end();
        let prefix = self.expect_token(KtSyntaxKind::PackageKw)?;
        let name = self.map_qualified_name(end)?;
        Ok(PackageDirective { prefix, name })
    }

    fn map_import(&mut self, id: NodeId) -> Result<ImportDirective> {
        let end = self.tree.node(id).range.end();
        let prefix = self.expect_token(KtSyntaxKind::ImportKw)?;
        let name = self.map_qualified_name(end)?;
        let alias = match self.peek_kind(end) {
            Some(KtSyntaxKind::AsKw) => {
                let as_prefix = self.expect_token(KtSyntaxKind::AsKw)?;
                let ident_prefix = self.expect_token(KtSyntaxKind::Identifier)?;
                let name_range = self.last_token_range;
                let text = self.tree.source()[name_range.start()..name_range.end()].to_string();
                Some(ImportAlias {
                    as_prefix,
                    name: Identifier::new(ident_prefix, text, None),
                })
            }
            _ => None,
        };
        Ok(ImportDirective {
            prefix,
            name,
            alias,
        })
    }

    /// Dotted name parsed straight from the token stream: identifiers joined
    /// by dots, with `*` allowed as the final segment of a star import
    fn map_qualified_name(&mut self, end: usize) -> Result<Expression> {
        let prefix = self.expect_token(KtSyntaxKind::Identifier)?;
        let first = self.last_token_range;
        let mut expr = Expression::Identifier(Identifier::new(
            prefix,
            &self.tree.source()[first.start()..first.end()],
            None,
        ));
        while self.peek_kind(end) == Some(KtSyntaxKind::Dot) {
            let dot_prefix = self.expect_token(KtSyntaxKind::Dot)?;
            let segment = self.next_meaningful_token(end).cloned().ok_or_else(|| {
                KataError::UnexpectedToken {
                    expected: KtSyntaxKind::Identifier,
                    found: KtSyntaxKind::Unknown,
                    range: SourceRange::new(end, end),
                }
            })?;
            if segment.kind != KtSyntaxKind::Identifier && segment.kind != KtSyntaxKind::Mul {
                return Err(KataError::UnexpectedToken {
                    expected: KtSyntaxKind::Identifier,
                    found: segment.kind,
                    range: segment.range,
                });
            }
            let name_prefix = self.space_to(segment.range.start());
            self.cursor = segment.range.end();
            expr = Expression::FieldAccess(Box::new(FieldAccess {
                prefix: Space::empty(),
                target: Box::new(expr),
                dot_prefix,
                name: Identifier::new(name_prefix, segment.text.clone(), None),
                ty: None,
            }));
        }
        Ok(expr)
    }

    fn map_property(&mut self, id: NodeId) -> Result<Property> {
        let node_range = self.tree.node(id).range;
        let end = node_range.end();

        let (prefix, keyword) = match self.peek_kind(end) {
            Some(KtSyntaxKind::VarKw) => {
                (self.expect_token(KtSyntaxKind::VarKw)?, PropertyKeyword::Var)
            }
            _ => (self.expect_token(KtSyntaxKind::ValKw)?, PropertyKeyword::Val),
        };

        let name_prefix = self.expect_token(KtSyntaxKind::Identifier)?;
        let name_range = self.last_token_range;
        let name = Identifier::new(
            name_prefix,
            &self.tree.source()[name_range.start()..name_range.end()],
            None,
        );

        let type_clause = match self.peek_kind(end) {
            Some(KtSyntaxKind::Colon) => {
                let colon_prefix = self.expect_token(KtSyntaxKind::Colon)?;
                let type_node = self.child_starting_at_or_after(id, self.cursor, is_type_kind)?;
                Some(TypeClause {
                    colon_prefix,
                    tree: self.map_type_tree(type_node)?,
                })
            }
            _ => None,
        };

        let initializer = match self.peek_kind(end) {
            Some(KtSyntaxKind::Eq) => {
                let eq_prefix = self.expect_token(KtSyntaxKind::Eq)?;
                let expr_node =
                    self.child_starting_at_or_after(id, self.cursor, is_expression_kind)?;
                Some(Initializer {
                    eq_prefix,
                    expression: self.map_expression(expr_node)?,
                })
            }
            _ => None,
        };

        let variable = self.resolve_attributed(node_range, KtSyntaxKind::Property)?;
        Ok(Property {
            prefix,
            keyword,
            name,
            type_clause,
            initializer,
            variable,
        })
    }

    fn map_typealias(&mut self, id: NodeId) -> Result<TypeAlias> {
        let node_range = self.tree.node(id).range;
        let prefix = self.expect_token(KtSyntaxKind::TypealiasKw)?;

        let name_prefix = self.expect_token(KtSyntaxKind::Identifier)?;
        let name_range = self.last_token_range;
        let name = Identifier::new(
            name_prefix,
            &self.tree.source()[name_range.start()..name_range.end()],
            None,
        );

        let eq_prefix = self.expect_token(KtSyntaxKind::Eq)?;
        let type_node = self.child_starting_at_or_after(id, self.cursor, is_type_kind)?;
        let aliased = self.map_type_tree(type_node)?;
        let aliased_type = self.resolve_attributed(node_range, KtSyntaxKind::Typealias)?;
        Ok(TypeAlias {
            prefix,
            name,
            eq_prefix,
            aliased,
            aliased_type,
        })
    }

    fn map_class(&mut self, id: NodeId) -> Result<ClassDeclaration> {
        let node_range = self.tree.node(id).range;
        let end = node_range.end();

        let (prefix, keyword) = match self.peek_kind(end) {
            Some(KtSyntaxKind::InterfaceKw) => (
                self.expect_token(KtSyntaxKind::InterfaceKw)?,
                ClassKeyword::Interface,
            ),
            Some(KtSyntaxKind::ObjectKw) => (
                self.expect_token(KtSyntaxKind::ObjectKw)?,
                ClassKeyword::Object,
            ),
            _ => (self.expect_token(KtSyntaxKind::ClassKw)?, ClassKeyword::Class),
        };

        let name_prefix = self.expect_token(KtSyntaxKind::Identifier)?;
        let name_range = self.last_token_range;
        let ty = self.resolve_attributed(node_range, KtSyntaxKind::Class)?;
        let name = Identifier::new(
            name_prefix,
            &self.tree.source()[name_range.start()..name_range.end()],
            ty,
        );

        let body_node = self
            .non_trivia_children(id)
            .into_iter()
            .find(|&c| self.tree.node(c).kind == KtSyntaxKind::ClassBody);
        let body = match body_node {
            Some(body_id) => {
                let body_prefix = self.expect_token(KtSyntaxKind::LBrace)?;
                let mut statements = Vec::new();
                for child in self.non_trivia_children(body_id) {
                    let kind = self.tree.node(child).kind;
                    if matches!(kind, KtSyntaxKind::LBrace | KtSyntaxKind::RBrace) {
                        continue;
                    }
                    statements.push(self.map_statement(child)?);
                }
                let end_space = self.expect_token(KtSyntaxKind::RBrace)?;
                Some(ClassBody {
                    prefix: body_prefix,
                    statements,
                    end: end_space,
                })
            }
            None => None,
        };

        Ok(ClassDeclaration {
            prefix,
            keyword,
            name,
            body,
            ty,
        })
    }

    fn map_expression(&mut self, id: NodeId) -> Result<Expression> {
        let node = self.tree.node(id);
        let kind = node.kind;
        let range = node.range;
        match kind {
            KtSyntaxKind::IntegerConstant
            | KtSyntaxKind::FloatConstant
            | KtSyntaxKind::BooleanConstant
            | KtSyntaxKind::CharacterConstant
            | KtSyntaxKind::NullConstant
            | KtSyntaxKind::StringTemplate => Ok(Expression::Literal(self.map_literal(id)?)),
            KtSyntaxKind::ReferenceExpression => {
                Ok(Expression::Identifier(self.map_identifier(id)?))
            }
            KtSyntaxKind::BinaryExpression => self.map_binary(id),
            KtSyntaxKind::DotQualifiedExpression => self.map_dot_qualified(id),
            KtSyntaxKind::CallExpression => {
                let prefix = self.space_to(range.start());
                Ok(Expression::MethodInvocation(
                    self.map_call(id, None, prefix)?,
                ))
            }
            KtSyntaxKind::Parenthesized | KtSyntaxKind::Parenthesis => {
                let prefix = self.space_to(range.start());
                let _ = self.expect_token(KtSyntaxKind::LParen)?;
                let inner = self.child_starting_at_or_after(id, self.cursor, is_expression_kind)?;
                let tree = self.map_expression(inner)?;
                let end_prefix = self.expect_token(KtSyntaxKind::RParen)?;
                Ok(Expression::Parentheses(Box::new(Parentheses {
                    prefix,
                    tree: Box::new(tree),
                    end_prefix,
                })))
            }
            _ => Err(KataError::UnsupportedSyntax { kind, range }),
        }
    }

    fn map_binary(&mut self, id: NodeId) -> Result<Expression> {
        let range = self.tree.node(id).range;
        let prefix = self.space_to(range.start());
        let children = self.non_trivia_children(id);
        let [left_id, op_id, right_id] = children.as_slice() else {
            return Err(KataError::UnsupportedSyntax {
                kind: KtSyntaxKind::BinaryExpression,
                range,
            });
        };
        let op_node = self.tree.node(*op_id);
        if op_node.kind != KtSyntaxKind::OperationReference {
            return Err(KataError::UnexpectedToken {
                expected: KtSyntaxKind::OperationReference,
                found: op_node.kind,
                range: op_node.range,
            });
        }
        let op_range = op_node.range;

        let left = self.map_expression(*left_id)?;
        let op_prefix = self.space_to(op_range.start());
        let op_text = self.tree.source()[op_range.start()..op_range.end()].to_string();
        self.cursor = op_range.end();
        let operator =
            BinaryOp::from_symbol(&op_text).ok_or(KataError::UnsupportedSyntax {
                kind: KtSyntaxKind::OperationReference,
                range: op_range,
            })?;
        let method = self.resolve_attributed(op_range, KtSyntaxKind::OperationReference)?;
        let right = self.map_expression(*right_id)?;

        Ok(Expression::Binary(Binary {
            prefix,
            left: Box::new(left),
            op_prefix,
            operator,
            right: Box::new(right),
            method,
        }))
    }

    fn map_dot_qualified(&mut self, id: NodeId) -> Result<Expression> {
        let range = self.tree.node(id).range;
        let prefix = self.space_to(range.start());
        let children: Vec<NodeId> = self
            .non_trivia_children(id)
            .into_iter()
            .filter(|&c| self.tree.node(c).kind != KtSyntaxKind::Dot)
            .collect();
        let [receiver_id, selector_id] = children.as_slice() else {
            return Err(KataError::UnsupportedSyntax {
                kind: KtSyntaxKind::DotQualifiedExpression,
                range,
            });
        };

        let target = self.map_expression(*receiver_id)?;
        let dot_prefix = self.expect_token(KtSyntaxKind::Dot)?;
        let selector = Selector {
            target: Box::new(target),
            dot_prefix,
        };

        let selector_node = self.tree.node(*selector_id);
        match selector_node.kind {
            KtSyntaxKind::CallExpression => Ok(Expression::MethodInvocation(self.map_call(
                *selector_id,
                Some(selector),
                prefix,
            )?)),
            KtSyntaxKind::ReferenceExpression => {
                let ty = self.resolve_attributed(range, KtSyntaxKind::DotQualifiedExpression)?;
                let name = self.map_identifier(*selector_id)?;
                Ok(Expression::FieldAccess(Box::new(FieldAccess {
                    prefix,
                    target: selector.target,
                    dot_prefix: selector.dot_prefix,
                    name,
                    ty,
                })))
            }
            kind => Err(KataError::UnsupportedSyntax {
                kind,
                range: selector_node.range,
            }),
        }
    }

    fn map_call(
        &mut self,
        id: NodeId,
        select: Option<Selector>,
        prefix: Space,
    ) -> Result<MethodInvocation> {
        let node_range = self.tree.node(id).range;
        let children = self.non_trivia_children(id);
        let callee = children
            .iter()
            .copied()
            .find(|&c| self.tree.node(c).kind == KtSyntaxKind::ReferenceExpression)
            .ok_or(KataError::UnsupportedSyntax {
                kind: KtSyntaxKind::CallExpression,
                range: node_range,
            })?;
        let args_node = children
            .iter()
            .copied()
            .find(|&c| self.tree.node(c).kind == KtSyntaxKind::ValueArgumentList)
            .ok_or(KataError::UnsupportedSyntax {
                kind: KtSyntaxKind::CallExpression,
                range: node_range,
            })?;

        let method = self.resolve_attributed(node_range, KtSyntaxKind::CallExpression)?;
        let name = self.map_identifier(callee)?;
        let arguments = self.map_arguments(args_node)?;
        Ok(MethodInvocation {
            prefix,
            select,
            name,
            arguments,
            method,
        })
    }

    fn map_arguments(&mut self, id: NodeId) -> Result<Container<Expression>> {
        let end = self.tree.node(id).range.end();
        let before = self.expect_token(KtSyntaxKind::LParen)?;

        if self.peek_kind(end) == Some(KtSyntaxKind::RParen) {
            let end_space = self.expect_token(KtSyntaxKind::RParen)?;
            return Ok(Container {
                before,
                elements: Vec::new(),
                end: end_space,
            });
        }

        let mut elements = Vec::new();
        for child in self.non_trivia_children(id) {
            let node = self.tree.node(child);
            let expr_id = match node.kind {
                KtSyntaxKind::ValueArgument => self
                    .non_trivia_children(child)
                    .first()
                    .copied()
                    .ok_or(KataError::UnsupportedSyntax {
                        kind: KtSyntaxKind::ValueArgument,
                        range: node.range,
                    })?,
                KtSyntaxKind::LParen | KtSyntaxKind::RParen | KtSyntaxKind::Comma => continue,
                _ if is_expression_kind(node.kind) => child,
                kind => {
                    return Err(KataError::UnsupportedSyntax {
                        kind,
                        range: node.range,
                    });
                }
            };
            let expression = self.map_expression(expr_id)?;
            let next = self.next_meaningful_token(end).cloned();
            let after = match next {
                Some(t) if t.kind == KtSyntaxKind::Comma => {
                    let after = self.space_to(t.range.start());
                    self.cursor = t.range.end();
                    after
                }
                Some(t) if t.kind == KtSyntaxKind::RParen => {
                    let after = self.space_to(t.range.start());
                    self.cursor = t.range.end();
                    after
                }
                _ => {
                    return Err(KataError::UnexpectedToken {
                        expected: KtSyntaxKind::RParen,
                        found: KtSyntaxKind::Unknown,
                        range: SourceRange::new(self.cursor, self.cursor),
                    });
                }
            };
            elements.push(RightPadded::new(expression, after));
        }
        Ok(Container {
            before,
            elements,
            end: Space::empty(),
        })
    }

    fn map_type_tree(&mut self, id: NodeId) -> Result<TypeTree> {
        let node = self.tree.node(id);
        match node.kind {
            KtSyntaxKind::TypeReference => {
                let inner = self
                    .non_trivia_children(id)
                    .first()
                    .copied()
                    .ok_or(KataError::UnsupportedSyntax {
                        kind: KtSyntaxKind::TypeReference,
                        range: node.range,
                    })?;
                self.map_type_tree(inner)
            }
            KtSyntaxKind::UserType => {
                let range = node.range;
                let children = self.non_trivia_children(id);
                let name_node = children
                    .iter()
                    .copied()
                    .find(|&c| {
                        matches!(
                            self.tree.node(c).kind,
                            KtSyntaxKind::ReferenceExpression | KtSyntaxKind::Identifier
                        )
                    })
                    .ok_or(KataError::UnsupportedSyntax {
                        kind: KtSyntaxKind::UserType,
                        range,
                    })?;
                let args_node = children
                    .iter()
                    .copied()
                    .find(|&c| self.tree.node(c).kind == KtSyntaxKind::TypeArgumentList);

                let mut clazz = self.map_identifier(name_node)?;
                if clazz.ty.is_none() {
                    clazz.ty = self.resolve_attributed(range, KtSyntaxKind::UserType)?;
                }
                match args_node {
                    None => Ok(TypeTree::Identifier(clazz)),
                    Some(args_id) => {
                        let ty = clazz.ty;
                        let arguments = self.map_type_arguments(args_id)?;
                        Ok(TypeTree::Parameterized(ParameterizedTypeTree {
                            clazz,
                            arguments,
                            ty,
                        }))
                    }
                }
            }
            KtSyntaxKind::ReferenceExpression | KtSyntaxKind::Identifier => {
                Ok(TypeTree::Identifier(self.map_identifier(id)?))
            }
            kind => Err(KataError::UnsupportedSyntax {
                kind,
                range: node.range,
            }),
        }
    }

    fn map_type_arguments(&mut self, id: NodeId) -> Result<Container<TypeTree>> {
        let before = self.expect_token(KtSyntaxKind::Lt)?;
        let mut elements = Vec::new();
        let args: Vec<NodeId> = self
            .non_trivia_children(id)
            .into_iter()
            .filter(|&c| is_type_kind(self.tree.node(c).kind) || self.tree.node(c).kind == KtSyntaxKind::TypeProjection)
            .collect();
        let count = args.len();
        for (i, arg) in args.into_iter().enumerate() {
            let arg_id = if self.tree.node(arg).kind == KtSyntaxKind::TypeProjection {
                self.non_trivia_children(arg)
                    .first()
                    .copied()
                    .ok_or(KataError::UnsupportedSyntax {
                        kind: KtSyntaxKind::TypeProjection,
                        range: self.tree.node(arg).range,
                    })?
            } else {
                arg
            };
            let tree = self.map_type_tree(arg_id)?;
            let closer = if i + 1 < count {
                KtSyntaxKind::Comma
            } else {
                KtSyntaxKind::Gt
            };
            let after = self.expect_token(closer)?;
            elements.push(RightPadded::new(tree, after));
        }
        Ok(Container {
            before,
            elements,
            end: Space::empty(),
        })
    }

    fn map_identifier(&mut self, id: NodeId) -> Result<Identifier> {
        let node = self.tree.node(id);
        let node_range = node.range;
        let node_kind = node.kind;
        let leaf = self
            .non_trivia_children(id)
            .into_iter()
            .find(|&c| self.tree.node(c).kind == KtSyntaxKind::Identifier)
            .unwrap_or(id);
        let leaf_range = self.tree.node(leaf).range;

        let prefix = self.space_to(leaf_range.start());
        let text = self.tree.source()[leaf_range.start()..leaf_range.end()].to_string();
        self.cursor = leaf_range.end();

        let ty = match self.resolve_attributed(node_range, node_kind)? {
            Some(t) => Some(t),
            None => self.resolve_attributed(leaf_range, KtSyntaxKind::Identifier)?,
        };
        Ok(Identifier::new(prefix, text, ty))
    }

    fn map_literal(&mut self, id: NodeId) -> Result<Literal> {
        let node = self.tree.node(id);
        let kind = node.kind;
        let range = node.range;
        let prefix = self.space_to(range.start());
        let text = self.tree.source()[range.start()..range.end()].to_string();
        self.cursor = range.end();

        let ty = match self.attribution.get(range, kind) {
            Some(Attributed::Type(t)) => {
                let t = t.clone();
                self.types.primitive(&t)?
            }
            Some(Attributed::Symbol(_)) => {
                return Err(KataError::unsupported_descriptor(
                    "literal attributed to a declaration symbol",
                ));
            }
            None => self.default_literal_type(kind, &text)?,
        };
        let value = parse_literal_value(kind, &text);
        Ok(Literal {
            prefix,
            value,
            value_source: text,
            ty,
        })
    }

    fn default_literal_type(&mut self, kind: KtSyntaxKind, text: &str) -> Result<TypeId> {
        use crate::types::PrimitiveKind;
        let primitive = match kind {
            KtSyntaxKind::IntegerConstant => {
                if text.ends_with('L') {
                    PrimitiveKind::Long
                } else {
                    PrimitiveKind::Int
                }
            }
            KtSyntaxKind::FloatConstant => {
                if text.ends_with('f') || text.ends_with('F') {
                    PrimitiveKind::Float
                } else {
                    PrimitiveKind::Double
                }
            }
            KtSyntaxKind::BooleanConstant => PrimitiveKind::Boolean,
            KtSyntaxKind::CharacterConstant => PrimitiveKind::Char,
            KtSyntaxKind::StringTemplate => PrimitiveKind::String,
            KtSyntaxKind::NullConstant => PrimitiveKind::Null,
            other => {
                return Err(KataError::UnsupportedSyntax {
                    kind: other,
                    range: SourceRange::new(self.cursor, self.cursor),
                });
            }
        };
        Ok(self.types_store_primitive(primitive))
    }

    fn types_store_primitive(&mut self, kind: crate::types::PrimitiveKind) -> TypeId {
        // Primitives are pre-interned; route through the mapper's store
        self.types
            .primitive_from_fqn(builtin_fqn(kind))
            .expect("builtin fqn maps to its primitive")
    }

    fn resolve_attributed(
        &mut self,
        range: SourceRange,
        kind: KtSyntaxKind,
    ) -> Result<Option<TypeId>> {
        match self.attribution.get(range, kind) {
            None => Ok(None),
            Some(Attributed::Symbol(symbol)) => Ok(Some(self.types.type_of(*symbol)?)),
            Some(Attributed::Type(type_ref)) => {
                let type_ref = type_ref.clone();
                Ok(Some(self.types.type_ref(&type_ref)?))
            }
        }
    }

    // Cursor and token plumbing

    fn space_to(&mut self, offset: usize) -> Space {
        debug_assert!(self.cursor <= offset, "cursor moved backwards");
        let space = Space::new(&self.tree.source()[self.cursor..offset]);
        self.cursor = offset;
        space
    }

    /// Kind of the first non-trivia token at or after the cursor, strictly
    /// before `end`
    fn peek_kind(&self, end: usize) -> Option<KtSyntaxKind> {
        self.next_meaningful_token(end).map(|t| t.kind)
    }

    fn next_meaningful_token(&self, end: usize) -> Option<&Token> {
        let tokens = self.tree.tokens();
        let mut idx = tokens.partition_point(|t| t.range.start() < self.cursor);
        while idx < tokens.len() && tokens[idx].range.start() < end {
            if !tokens[idx].kind.is_trivia() {
                return Some(&tokens[idx]);
            }
            idx += 1;
        }
        None
    }

    /// Consume the next non-trivia token, which must have the given kind;
    /// returns the trivia before it and records its range
    fn expect_token(&mut self, kind: KtSyntaxKind) -> Result<Space> {
        let token = self
            .next_meaningful_token(usize::MAX)
            .ok_or(KataError::UnexpectedToken {
                expected: kind,
                found: KtSyntaxKind::Unknown,
                range: SourceRange::new(self.cursor, self.cursor),
            })?;
        if token.kind != kind {
            return Err(KataError::UnexpectedToken {
                expected: kind,
                found: token.kind,
                range: token.range,
            });
        }
        let range = token.range;
        let prefix = self.space_to(range.start());
        self.cursor = range.end();
        self.last_token_range = range;
        Ok(prefix)
    }

    fn non_trivia_children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .node(id)
            .children
            .iter()
            .copied()
            .filter(|&c| !self.tree.node(c).kind.is_trivia())
            .collect()
    }

    /// First non-trivia child at or after `offset` matching the predicate
    fn child_starting_at_or_after(
        &self,
        id: NodeId,
        offset: usize,
        pred: fn(KtSyntaxKind) -> bool,
    ) -> Result<NodeId> {
        self.non_trivia_children(id)
            .into_iter()
            .find(|&c| {
                let node = self.tree.node(c);
                node.range.start() >= offset && pred(node.kind)
            })
            .ok_or(KataError::UnsupportedSyntax {
                kind: self.tree.node(id).kind,
                range: self.tree.node(id).range,
            })
    }
}

fn is_expression_kind(kind: KtSyntaxKind) -> bool {
    matches!(
        kind,
        KtSyntaxKind::ReferenceExpression
            | KtSyntaxKind::DotQualifiedExpression
            | KtSyntaxKind::CallExpression
            | KtSyntaxKind::BinaryExpression
            | KtSyntaxKind::Parenthesized
            | KtSyntaxKind::Parenthesis
            | KtSyntaxKind::IntegerConstant
            | KtSyntaxKind::FloatConstant
            | KtSyntaxKind::BooleanConstant
            | KtSyntaxKind::CharacterConstant
            | KtSyntaxKind::NullConstant
            | KtSyntaxKind::StringTemplate
    )
}

fn is_type_kind(kind: KtSyntaxKind) -> bool {
    matches!(
        kind,
        KtSyntaxKind::TypeReference
            | KtSyntaxKind::UserType
            | KtSyntaxKind::ReferenceExpression
            | KtSyntaxKind::Identifier
    )
}

fn builtin_fqn(kind: crate::types::PrimitiveKind) -> &'static str {
    use crate::types::PrimitiveKind;
    match kind {
        PrimitiveKind::Byte => "kotlin.Byte",
        PrimitiveKind::Boolean => "kotlin.Boolean",
        PrimitiveKind::Char => "kotlin.Char",
        PrimitiveKind::Double => "kotlin.Double",
        PrimitiveKind::Float => "kotlin.Float",
        PrimitiveKind::Int => "kotlin.Int",
        PrimitiveKind::Long => "kotlin.Long",
        PrimitiveKind::Short => "kotlin.Short",
        PrimitiveKind::String => "kotlin.String",
        PrimitiveKind::Void => "kotlin.Unit",
        PrimitiveKind::Null => "kotlin.Nothing",
    }
}

fn parse_literal_value(kind: KtSyntaxKind, text: &str) -> LiteralValue {
    match kind {
        KtSyntaxKind::IntegerConstant => {
            let cleaned: String = text
                .trim_end_matches(['L', 'l'])
                .chars()
                .filter(|c| *c != '_')
                .collect();
            let parsed = if let Some(hex) = cleaned.strip_prefix("0x").or(cleaned.strip_prefix("0X"))
            {
                i64::from_str_radix(hex, 16)
            } else if let Some(bin) = cleaned.strip_prefix("0b").or(cleaned.strip_prefix("0B")) {
                i64::from_str_radix(bin, 2)
            } else {
                cleaned.parse()
            };
            LiteralValue::Integer(parsed.unwrap_or(0))
        }
        KtSyntaxKind::FloatConstant => {
            let cleaned: String = text
                .trim_end_matches(['f', 'F'])
                .chars()
                .filter(|c| *c != '_')
                .collect();
            LiteralValue::Floating(cleaned.parse().unwrap_or(0.0))
        }
        KtSyntaxKind::BooleanConstant => LiteralValue::Boolean(text == "true"),
        KtSyntaxKind::CharacterConstant => {
            let inner = text.trim_start_matches('\'').trim_end_matches('\'');
            LiteralValue::Character(unescape_char(inner))
        }
        KtSyntaxKind::NullConstant => LiteralValue::Null,
        _ => {
            // String templates keep their raw content between the quotes
            let inner = if text.starts_with("\"\"\"") && text.len() >= 6 {
                &text[3..text.len() - 3]
            } else if text.len() >= 2 {
                &text[1..text.len() - 1]
            } else {
                text
            };
            LiteralValue::Text(inner.to_string())
        }
    }
}

fn unescape_char(text: &str) -> char {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some('\\'), Some(escaped)) => match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{0008}',
            '0' => '\0',
            other => other,
        },
        (Some(c), _) => c,
        _ => '\0',
    }
}
