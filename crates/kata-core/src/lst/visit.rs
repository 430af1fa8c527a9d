//! Transforming visitor over the lossless tree
//!
//! Nodes are immutable values, so visiting is by value: each method receives
//! a node and returns the node to keep (the same one, or a rewritten copy).
//! Default methods recurse structurally via the `walk_*` functions; a rewrite
//! overrides only the node kinds it cares about. This is the seam the
//! higher-level recipe framework dispatches through.

use crate::lst::tree::{
    Binary, ClassBody, ClassDeclaration, CompilationUnit, Container, Expression, FieldAccess,
    ImportDirective, Initializer, MethodInvocation, PackageDirective, ParameterizedTypeTree,
    Parentheses, Property, RightPadded, Statement, TypeAlias, TypeClause, TypeTree,
};
use crate::lst::tree::Identifier;

pub trait LstVisitor: Sized {
    fn visit_compilation_unit(&mut self, cu: CompilationUnit) -> CompilationUnit {
        walk_compilation_unit(self, cu)
    }

    fn visit_package(&mut self, package: PackageDirective) -> PackageDirective {
        package
    }

    fn visit_import(&mut self, import: ImportDirective) -> ImportDirective {
        import
    }

    fn visit_statement(&mut self, statement: Statement) -> Statement {
        walk_statement(self, statement)
    }

    fn visit_property(&mut self, property: Property) -> Property {
        walk_property(self, property)
    }

    fn visit_type_alias(&mut self, alias: TypeAlias) -> TypeAlias {
        walk_type_alias(self, alias)
    }

    fn visit_class(&mut self, class: ClassDeclaration) -> ClassDeclaration {
        walk_class(self, class)
    }

    fn visit_expression(&mut self, expression: Expression) -> Expression {
        walk_expression(self, expression)
    }

    fn visit_identifier(&mut self, identifier: Identifier) -> Identifier {
        identifier
    }

    fn visit_type_tree(&mut self, tree: TypeTree) -> TypeTree {
        walk_type_tree(self, tree)
    }
}

pub fn walk_compilation_unit<V: LstVisitor>(v: &mut V, cu: CompilationUnit) -> CompilationUnit {
    CompilationUnit {
        package: cu.package.map(|p| v.visit_package(p)),
        imports: cu.imports.into_iter().map(|i| v.visit_import(i)).collect(),
        statements: cu
            .statements
            .into_iter()
            .map(|s| v.visit_statement(s))
            .collect(),
        eof: cu.eof,
    }
}

pub fn walk_statement<V: LstVisitor>(v: &mut V, statement: Statement) -> Statement {
    match statement {
        Statement::Property(p) => Statement::Property(v.visit_property(p)),
        Statement::TypeAlias(t) => Statement::TypeAlias(v.visit_type_alias(t)),
        Statement::Class(c) => Statement::Class(v.visit_class(c)),
        Statement::Expression(e) => Statement::Expression(v.visit_expression(e)),
    }
}

pub fn walk_property<V: LstVisitor>(v: &mut V, property: Property) -> Property {
    Property {
        name: v.visit_identifier(property.name),
        type_clause: property.type_clause.map(|c| TypeClause {
            colon_prefix: c.colon_prefix,
            tree: v.visit_type_tree(c.tree),
        }),
        initializer: property.initializer.map(|i| Initializer {
            eq_prefix: i.eq_prefix,
            expression: v.visit_expression(i.expression),
        }),
        ..property
    }
}

pub fn walk_type_alias<V: LstVisitor>(v: &mut V, alias: TypeAlias) -> TypeAlias {
    TypeAlias {
        name: v.visit_identifier(alias.name),
        aliased: v.visit_type_tree(alias.aliased),
        ..alias
    }
}

pub fn walk_class<V: LstVisitor>(v: &mut V, class: ClassDeclaration) -> ClassDeclaration {
    ClassDeclaration {
        name: v.visit_identifier(class.name),
        body: class.body.map(|b| ClassBody {
            prefix: b.prefix,
            statements: b.statements.into_iter().map(|s| v.visit_statement(s)).collect(),
            end: b.end,
        }),
        ..class
    }
}

pub fn walk_expression<V: LstVisitor>(v: &mut V, expression: Expression) -> Expression {
    match expression {
        Expression::Identifier(i) => Expression::Identifier(v.visit_identifier(i)),
        Expression::Literal(l) => Expression::Literal(l),
        Expression::Binary(b) => Expression::Binary(Binary {
            left: Box::new(v.visit_expression(*b.left)),
            right: Box::new(v.visit_expression(*b.right)),
            ..b
        }),
        Expression::MethodInvocation(m) => Expression::MethodInvocation(MethodInvocation {
            select: m.select.map(|s| crate::lst::tree::Selector {
                target: Box::new(v.visit_expression(*s.target)),
                dot_prefix: s.dot_prefix,
            }),
            name: v.visit_identifier(m.name),
            arguments: walk_container(m.arguments, |e| v.visit_expression(e)),
            ..m
        }),
        Expression::Parentheses(p) => Expression::Parentheses(Box::new(Parentheses {
            prefix: p.prefix,
            tree: Box::new(v.visit_expression(*p.tree)),
            end_prefix: p.end_prefix,
        })),
        Expression::FieldAccess(f) => {
            let f = *f;
            Expression::FieldAccess(Box::new(FieldAccess {
                target: Box::new(v.visit_expression(*f.target)),
                name: v.visit_identifier(f.name),
                ..f
            }))
        }
    }
}

pub fn walk_type_tree<V: LstVisitor>(v: &mut V, tree: TypeTree) -> TypeTree {
    match tree {
        TypeTree::Identifier(i) => TypeTree::Identifier(v.visit_identifier(i)),
        TypeTree::Parameterized(p) => TypeTree::Parameterized(ParameterizedTypeTree {
            clazz: v.visit_identifier(p.clazz),
            arguments: walk_container(p.arguments, |t| v.visit_type_tree(t)),
            ty: p.ty,
        }),
    }
}

fn walk_container<T>(container: Container<T>, mut f: impl FnMut(T) -> T) -> Container<T> {
    Container {
        before: container.before,
        elements: container
            .elements
            .into_iter()
            .map(|p| RightPadded {
                element: f(p.element),
                after: p.after,
            })
            .collect(),
        end: container.end,
    }
}
