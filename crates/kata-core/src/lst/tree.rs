//! Lossless syntax tree nodes
//!
//! Every node carries the exact leading trivia (whitespace and comments) it
//! had in the source as a [`Space`], so printing a tree reproduces the input
//! byte for byte. Nodes are plain immutable values; rewrites produce new
//! trees through the visitor in [`crate::lst::visit`].
//!
//! Type attribution hangs off the nodes as interned [`TypeId`]s from the
//! mapping run that produced the tree; identity comparison of those ids is
//! how rewrites decide that two nodes refer to the same type.

use crate::types::TypeId;

/// Leading trivia of a node: the raw whitespace and comment text preceding it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Space {
    pub whitespace: String,
}

impl Space {
    pub fn new(whitespace: impl Into<String>) -> Self {
        Self {
            whitespace: whitespace.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.whitespace.is_empty()
    }
}

/// An element followed by the trivia between it and the next delimiter
#[derive(Debug, Clone)]
pub struct RightPadded<T> {
    pub element: T,
    pub after: Space,
}

impl<T> RightPadded<T> {
    pub fn new(element: T, after: Space) -> Self {
        Self { element, after }
    }
}

/// A delimited, comma-separated list
///
/// `before` precedes the opening delimiter; each element's `after` holds the
/// trivia before its trailing comma or the closing delimiter. `end` is only
/// printed when the list is empty and holds whatever sat between the
/// delimiters.
#[derive(Debug, Clone)]
pub struct Container<T> {
    pub before: Space,
    pub elements: Vec<RightPadded<T>>,
    pub end: Space,
}

impl<T> Container<T> {
    pub fn empty() -> Self {
        Self {
            before: Space::empty(),
            elements: Vec::new(),
            end: Space::empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub prefix: Space,
    pub simple_name: String,
    pub ty: Option<TypeId>,
}

impl Identifier {
    pub fn new(prefix: Space, simple_name: impl Into<String>, ty: Option<TypeId>) -> Self {
        Self {
            prefix,
            simple_name: simple_name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Integer(i64),
    Floating(f64),
    Boolean(bool),
    Character(char),
    Text(String),
    Null,
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub prefix: Space,
    pub value: LiteralValue,
    /// The literal exactly as written, suffixes and underscores included
    pub value_source: String,
    pub ty: TypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Mul,
    Div,
    Rem,
    RangeTo,
    RangeUntil,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
    And,
    Or,
    In,
    NotIn,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::RangeTo => "..",
            BinaryOp::RangeUntil => "..<",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "!in",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<BinaryOp> {
        Some(match symbol {
            "+" => BinaryOp::Plus,
            "-" => BinaryOp::Minus,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            ".." => BinaryOp::RangeTo,
            "..<" => BinaryOp::RangeUntil,
            "==" => BinaryOp::Equal,
            "!=" => BinaryOp::NotEqual,
            "<" => BinaryOp::LessThan,
            ">" => BinaryOp::GreaterThan,
            "<=" => BinaryOp::LessOrEqual,
            ">=" => BinaryOp::GreaterOrEqual,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            "in" => BinaryOp::In,
            "!in" => BinaryOp::NotIn,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub prefix: Space,
    pub left: Box<Expression>,
    pub op_prefix: Space,
    pub operator: BinaryOp,
    pub right: Box<Expression>,
    /// The operator's resolved method, when the frontend attributed one
    pub method: Option<TypeId>,
}

/// Receiver of a qualified call or field access
#[derive(Debug, Clone)]
pub struct Selector {
    pub target: Box<Expression>,
    pub dot_prefix: Space,
}

#[derive(Debug, Clone)]
pub struct MethodInvocation {
    pub prefix: Space,
    pub select: Option<Selector>,
    pub name: Identifier,
    pub arguments: Container<Expression>,
    pub method: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct Parentheses {
    pub prefix: Space,
    pub tree: Box<Expression>,
    /// Trivia before the closing parenthesis
    pub end_prefix: Space,
}

#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub prefix: Space,
    pub target: Box<Expression>,
    pub dot_prefix: Space,
    pub name: Identifier,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub enum Expression {
    Identifier(Identifier),
    Literal(Literal),
    Binary(Binary),
    MethodInvocation(MethodInvocation),
    Parentheses(Box<Parentheses>),
    FieldAccess(Box<FieldAccess>),
}

impl Expression {
    pub fn prefix(&self) -> &Space {
        match self {
            Expression::Identifier(i) => &i.prefix,
            Expression::Literal(l) => &l.prefix,
            Expression::Binary(b) => &b.prefix,
            Expression::MethodInvocation(m) => &m.prefix,
            Expression::Parentheses(p) => &p.prefix,
            Expression::FieldAccess(f) => &f.prefix,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TypeTree {
    Identifier(Identifier),
    Parameterized(ParameterizedTypeTree),
}

#[derive(Debug, Clone)]
pub struct ParameterizedTypeTree {
    pub clazz: Identifier,
    pub arguments: Container<TypeTree>,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKeyword {
    Val,
    Var,
}

impl PropertyKeyword {
    pub fn text(&self) -> &'static str {
        match self {
            PropertyKeyword::Val => "val",
            PropertyKeyword::Var => "var",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeClause {
    pub colon_prefix: Space,
    pub tree: TypeTree,
}

#[derive(Debug, Clone)]
pub struct Initializer {
    pub eq_prefix: Space,
    pub expression: Expression,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub prefix: Space,
    pub keyword: PropertyKeyword,
    pub name: Identifier,
    pub type_clause: Option<TypeClause>,
    pub initializer: Option<Initializer>,
    /// The resolved variable type of this declaration
    pub variable: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct TypeAlias {
    pub prefix: Space,
    pub name: Identifier,
    pub eq_prefix: Space,
    pub aliased: TypeTree,
    /// The class the alias expands to
    pub aliased_type: Option<TypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKeyword {
    Class,
    Interface,
    Object,
}

impl ClassKeyword {
    pub fn text(&self) -> &'static str {
        match self {
            ClassKeyword::Class => "class",
            ClassKeyword::Interface => "interface",
            ClassKeyword::Object => "object",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassBody {
    /// Trivia before the opening brace
    pub prefix: Space,
    pub statements: Vec<Statement>,
    /// Trivia before the closing brace
    pub end: Space,
}

#[derive(Debug, Clone)]
pub struct ClassDeclaration {
    pub prefix: Space,
    pub keyword: ClassKeyword,
    pub name: Identifier,
    pub body: Option<ClassBody>,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct PackageDirective {
    pub prefix: Space,
    pub name: Expression,
}

#[derive(Debug, Clone)]
pub struct ImportAlias {
    pub as_prefix: Space,
    pub name: Identifier,
}

#[derive(Debug, Clone)]
pub struct ImportDirective {
    pub prefix: Space,
    pub name: Expression,
    pub alias: Option<ImportAlias>,
}

impl ImportDirective {
    /// Dotted name as written, without trivia
    pub fn qualified_name(&self) -> String {
        fn collect(expr: &Expression, out: &mut String) {
            match expr {
                Expression::Identifier(i) => out.push_str(&i.simple_name),
                Expression::FieldAccess(f) => {
                    collect(&f.target, out);
                    out.push('.');
                    out.push_str(&f.name.simple_name);
                }
                _ => {}
            }
        }
        let mut out = String::new();
        collect(&self.name, &mut out);
        out
    }
}

#[derive(Debug, Clone)]
pub enum Statement {
    Property(Property),
    TypeAlias(TypeAlias),
    Class(ClassDeclaration),
    Expression(Expression),
}

/// One mapped source file
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub package: Option<PackageDirective>,
    pub imports: Vec<ImportDirective>,
    pub statements: Vec<Statement>,
    /// Trailing trivia after the last statement
    pub eof: Space,
}

// Exact-print support. Concatenating prefixes and literal text in tree order
// reproduces the original source; this is the observable form of the
// losslessness guarantee and what the round-trip tests assert on.

impl CompilationUnit {
    pub fn print_source(&self) -> String {
        let mut out = String::new();
        if let Some(package) = &self.package {
            package.print_into(&mut out);
        }
        for import in &self.imports {
            import.print_into(&mut out);
        }
        for statement in &self.statements {
            statement.print_into(&mut out);
        }
        out.push_str(&self.eof.whitespace);
        out
    }
}

impl PackageDirective {
    fn print_into(&self, out: &mut String) {
        out.push_str(&self.prefix.whitespace);
        out.push_str("package");
        self.name.print_into(out);
    }
}

impl ImportDirective {
    fn print_into(&self, out: &mut String) {
        out.push_str(&self.prefix.whitespace);
        out.push_str("import");
        self.name.print_into(out);
        if let Some(alias) = &self.alias {
            out.push_str(&alias.as_prefix.whitespace);
            out.push_str("as");
            alias.name.print_into(out);
        }
    }
}

impl Statement {
    pub fn print_into(&self, out: &mut String) {
        match self {
            Statement::Property(p) => p.print_into(out),
            Statement::TypeAlias(t) => t.print_into(out),
            Statement::Class(c) => c.print_into(out),
            Statement::Expression(e) => e.print_into(out),
        }
    }
}

impl Property {
    fn print_into(&self, out: &mut String) {
        out.push_str(&self.prefix.whitespace);
        out.push_str(self.keyword.text());
        self.name.print_into(out);
        if let Some(clause) = &self.type_clause {
            out.push_str(&clause.colon_prefix.whitespace);
            out.push(':');
            clause.tree.print_into(out);
        }
        if let Some(init) = &self.initializer {
            out.push_str(&init.eq_prefix.whitespace);
            out.push('=');
            init.expression.print_into(out);
        }
    }
}

impl TypeAlias {
    fn print_into(&self, out: &mut String) {
        out.push_str(&self.prefix.whitespace);
        out.push_str("typealias");
        self.name.print_into(out);
        out.push_str(&self.eq_prefix.whitespace);
        out.push('=');
        self.aliased.print_into(out);
    }
}

impl ClassDeclaration {
    fn print_into(&self, out: &mut String) {
        out.push_str(&self.prefix.whitespace);
        out.push_str(self.keyword.text());
        self.name.print_into(out);
        if let Some(body) = &self.body {
            out.push_str(&body.prefix.whitespace);
            out.push('{');
            for statement in &body.statements {
                statement.print_into(out);
            }
            out.push_str(&body.end.whitespace);
            out.push('}');
        }
    }
}

impl Expression {
    pub fn print_into(&self, out: &mut String) {
        match self {
            Expression::Identifier(i) => i.print_into(out),
            Expression::Literal(l) => {
                out.push_str(&l.prefix.whitespace);
                out.push_str(&l.value_source);
            }
            Expression::Binary(b) => {
                out.push_str(&b.prefix.whitespace);
                b.left.print_into(out);
                out.push_str(&b.op_prefix.whitespace);
                out.push_str(b.operator.symbol());
                b.right.print_into(out);
            }
            Expression::MethodInvocation(m) => {
                out.push_str(&m.prefix.whitespace);
                if let Some(select) = &m.select {
                    select.target.print_into(out);
                    out.push_str(&select.dot_prefix.whitespace);
                    out.push('.');
                }
                m.name.print_into(out);
                print_container(&m.arguments, '(', ')', out, |e, out| e.print_into(out));
            }
            Expression::Parentheses(p) => {
                out.push_str(&p.prefix.whitespace);
                out.push('(');
                p.tree.print_into(out);
                out.push_str(&p.end_prefix.whitespace);
                out.push(')');
            }
            Expression::FieldAccess(f) => {
                out.push_str(&f.prefix.whitespace);
                f.target.print_into(out);
                out.push_str(&f.dot_prefix.whitespace);
                out.push('.');
                f.name.print_into(out);
            }
        }
    }
}

impl Identifier {
    pub fn print_into(&self, out: &mut String) {
        out.push_str(&self.prefix.whitespace);
        out.push_str(&self.simple_name);
    }
}

impl TypeTree {
    pub fn print_into(&self, out: &mut String) {
        match self {
            TypeTree::Identifier(i) => i.print_into(out),
            TypeTree::Parameterized(p) => {
                p.clazz.print_into(out);
                print_container(&p.arguments, '<', '>', out, |t, out| t.print_into(out));
            }
        }
    }
}

fn print_container<T>(
    container: &Container<T>,
    open: char,
    close: char,
    out: &mut String,
    print: impl Fn(&T, &mut String),
) {
    out.push_str(&container.before.whitespace);
    out.push(open);
    let last = container.elements.len().saturating_sub(1);
    for (i, padded) in container.elements.iter().enumerate() {
        print(&padded.element, out);
        out.push_str(&padded.after.whitespace);
        if i < last {
            out.push(',');
        }
    }
    if container.elements.is_empty() {
        out.push_str(&container.end.whitespace);
    }
    out.push(close);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_op_symbols_round_trip() {
        for op in [
            BinaryOp::Plus,
            BinaryOp::RangeTo,
            BinaryOp::RangeUntil,
            BinaryOp::NotIn,
            BinaryOp::Equal,
        ] {
            assert_eq!(BinaryOp::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(BinaryOp::from_symbol("=>"), None);
    }

    #[test]
    fn printing_reassembles_trivia_exactly() {
        let property = Property {
            prefix: Space::new("  "),
            keyword: PropertyKeyword::Val,
            name: Identifier::new(Space::new(" "), "a", None),
            type_clause: None,
            initializer: Some(Initializer {
                eq_prefix: Space::new("  "),
                expression: Expression::Literal(Literal {
                    prefix: Space::new(" "),
                    value: LiteralValue::Integer(1),
                    value_source: "1".into(),
                    ty: crate::types::TypeStore::new().unknown(),
                }),
            }),
            variable: None,
        };
        let cu = CompilationUnit {
            package: None,
            imports: vec![],
            statements: vec![Statement::Property(property)],
            eof: Space::new("\n"),
        };
        assert_eq!(cu.print_source(), "  val a  = 1\n");
    }

    #[test]
    fn import_qualified_name_flattens_field_accesses() {
        let import = ImportDirective {
            prefix: Space::empty(),
            name: Expression::FieldAccess(Box::new(FieldAccess {
                prefix: Space::empty(),
                target: Box::new(Expression::FieldAccess(Box::new(FieldAccess {
                    prefix: Space::empty(),
                    target: Box::new(Expression::Identifier(Identifier::new(
                        Space::new(" "),
                        "kotlin",
                        None,
                    ))),
                    dot_prefix: Space::empty(),
                    name: Identifier::new(Space::empty(), "collections", None),
                    ty: None,
                }))),
                dot_prefix: Space::empty(),
                name: Identifier::new(Space::empty(), "List", None),
                ty: None,
            })),
            alias: None,
        };
        assert_eq!(import.qualified_name(), "kotlin.collections.List");
        let mut out = String::new();
        import.print_into(&mut out);
        assert_eq!(out, "import kotlin.collections.List");
    }
}
