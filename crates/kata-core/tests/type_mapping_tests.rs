//! Type attribution through the full pipeline: signatures, the interned
//! store, and the LST mapper

mod common;

use common::{builtins, light, top_level_property};
use kata_core::lst::{Attributed, BinaryOp, Expression, LstMapper, Statement, TypeAttribution};
use kata_core::psi::{KtSyntaxKind, PsiTree, SourceRange};
use kata_core::types::{TypeMapper, TypeRef, TypeStore};

/// `val a = 2 !in 1 .. 10`: the range operator resolves to
/// `kotlin.Int.rangeTo(kotlin.Int): kotlin.ranges.IntRange`
#[test]
fn range_operator_resolves_to_range_to() {
    let source = "val a = 2 !in 1 .. 10";
    let mut tree = PsiTree::new(source);
    let file = light(0, 21, "FILE").with_children(vec![light(0, 21, "PROPERTY")]);
    tree.add_element(&file, 0).unwrap();
    let property = light(0, 21, "PROPERTY").with_children(vec![
        light(0, 3, "val"),
        light(4, 5, "IDENTIFIER"),
        light(6, 7, "EQ"),
        light(8, 21, "BINARY_EXPRESSION"),
    ]);
    tree.add_element(&property, 0).unwrap();
    let outer = light(8, 21, "BINARY_EXPRESSION").with_children(vec![
        light(8, 9, "INTEGER_CONSTANT"),
        light(10, 13, "OPERATION_REFERENCE"),
        light(14, 21, "BINARY_EXPRESSION"),
    ]);
    tree.add_element(&outer, 0).unwrap();
    let inner = light(14, 21, "BINARY_EXPRESSION").with_children(vec![
        light(14, 15, "INTEGER_CONSTANT"),
        light(16, 18, "OPERATION_REFERENCE"),
        light(19, 21, "INTEGER_CONSTANT"),
    ]);
    tree.add_element(&inner, 0).unwrap();

    let mut fixture = builtins("Main.kt");
    let file_sym = fixture.file;
    let int = fixture.int;
    let prop = top_level_property(&mut fixture.model, file_sym, "a", TypeRef::class(int));

    let mut attribution = TypeAttribution::new();
    attribution.insert(
        SourceRange::new(0, 21),
        KtSyntaxKind::Property,
        Attributed::Symbol(prop),
    );
    attribution.insert(
        SourceRange::new(10, 13),
        KtSyntaxKind::OperationReference,
        Attributed::Symbol(fixture.contains),
    );
    attribution.insert(
        SourceRange::new(16, 18),
        KtSyntaxKind::OperationReference,
        Attributed::Symbol(fixture.range_to),
    );

    let mut store = TypeStore::new();
    let mut mapper = LstMapper::new(&tree, &attribution, &fixture.model, &mut store);
    let cu = mapper.map_compilation_unit().unwrap();
    assert_eq!(cu.print_source(), source);

    let Statement::Property(property) = &cu.statements[0] else {
        panic!("expected a property");
    };
    let Expression::Binary(not_in) = &property.initializer.as_ref().unwrap().expression else {
        panic!("expected a binary initializer");
    };
    assert_eq!(not_in.operator, BinaryOp::NotIn);
    let contains = store.method(not_in.method.unwrap()).unwrap();
    assert_eq!(contains.name, "contains");

    let Expression::Binary(range) = not_in.right.as_ref() else {
        panic!("expected a range binary on the right");
    };
    assert_eq!(range.operator, BinaryOp::RangeTo);
    let range_to = store.method(range.method.unwrap()).unwrap();
    assert_eq!(range_to.name, "rangeTo");
    assert_eq!(store.as_class(range_to.declaring).unwrap().fqn, "kotlin.Int");
    assert_eq!(
        store.as_class(range_to.return_type).unwrap().fqn,
        "kotlin.ranges.IntRange"
    );
    assert_eq!(range_to.parameter_types.len(), 1);
    assert_eq!(
        store.as_class(range_to.parameter_types[0]).unwrap().fqn,
        "kotlin.Int"
    );
}

/// Equal signatures resolve to the identical interned id, across separate
/// mapping passes over the same store
#[test]
fn signature_identity_across_mappers() {
    let fixture = builtins("Main.kt");
    let mut store = TypeStore::new();

    let first = {
        let mut mapper = TypeMapper::new(&fixture.model, &mut store);
        mapper.type_of(fixture.range_to).unwrap()
    };
    let second = {
        let mut mapper = TypeMapper::new(&fixture.model, &mut store);
        mapper.type_of(fixture.range_to).unwrap()
    };
    assert_eq!(first, second);

    // The class reached through two different routes is also identical
    let via_method = store.method(first).unwrap().declaring;
    let mut mapper = TypeMapper::new(&fixture.model, &mut store);
    let via_class = mapper.type_of(fixture.int).unwrap();
    assert_eq!(via_method, via_class);
}

/// Literal attribution goes through the closed primitive set
#[test]
fn literals_attribute_as_primitives() {
    let source = "val a = 2 !in 1 .. 10";
    let mut tree = PsiTree::new(source);
    let file = light(0, 21, "FILE").with_children(vec![light(0, 21, "PROPERTY")]);
    tree.add_element(&file, 0).unwrap();
    let property = light(0, 21, "PROPERTY").with_children(vec![
        light(0, 3, "val"),
        light(4, 5, "IDENTIFIER"),
        light(6, 7, "EQ"),
        light(8, 21, "BINARY_EXPRESSION"),
    ]);
    tree.add_element(&property, 0).unwrap();
    let outer = light(8, 21, "BINARY_EXPRESSION").with_children(vec![
        light(8, 9, "INTEGER_CONSTANT"),
        light(10, 13, "OPERATION_REFERENCE"),
        light(14, 21, "BINARY_EXPRESSION"),
    ]);
    tree.add_element(&outer, 0).unwrap();
    let inner = light(14, 21, "BINARY_EXPRESSION").with_children(vec![
        light(14, 15, "INTEGER_CONSTANT"),
        light(16, 18, "OPERATION_REFERENCE"),
        light(19, 21, "INTEGER_CONSTANT"),
    ]);
    tree.add_element(&inner, 0).unwrap();

    let fixture = builtins("Main.kt");
    let attribution = TypeAttribution::new();
    let mut store = TypeStore::new();
    let mut mapper = LstMapper::new(&tree, &attribution, &fixture.model, &mut store);
    let cu = mapper.map_compilation_unit().unwrap();

    let Statement::Property(property) = &cu.statements[0] else {
        panic!("expected a property");
    };
    let Expression::Binary(not_in) = &property.initializer.as_ref().unwrap().expression else {
        panic!("expected a binary initializer");
    };
    let Expression::Literal(two) = not_in.left.as_ref() else {
        panic!("expected a literal on the left");
    };
    // All three literals intern to the same Int primitive
    let int = two.ty;
    let Expression::Binary(range) = not_in.right.as_ref() else {
        panic!("expected a range binary");
    };
    let Expression::Literal(one) = range.left.as_ref() else {
        panic!("expected a literal");
    };
    let Expression::Literal(ten) = range.right.as_ref() else {
        panic!("expected a literal");
    };
    assert_eq!(one.ty, int);
    assert_eq!(ten.ty, int);
    assert!(matches!(
        store.kind(int),
        kata_core::types::TypeKind::Primitive(kata_core::types::PrimitiveKind::Int)
    ));
}
