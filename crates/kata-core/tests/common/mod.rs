//! Shared fixtures: a builtin slice of the Kotlin semantic model and light
//! AST construction helpers

#![allow(dead_code)]

use kata_core::psi::LightNode;
use kata_core::types::{
    ClassDeclKind, ClassId, ClassSymbol, FileSymbol, FunctionSymbol, Modality, PropertySymbol,
    SemanticModel, Symbol, SymbolId, TypeRef, ValueParameter, Visibility,
};

pub fn light(start: usize, end: usize, label: &str) -> LightNode {
    LightNode::new(start, end, label)
}

pub fn class_symbol(package: &str, name: &str) -> ClassSymbol {
    ClassSymbol {
        id: ClassId::new(package, name),
        kind: ClassDeclKind::Class,
        visibility: Visibility::Public,
        modality: Modality::Final,
        type_parameters: vec![],
        super_types: vec![],
        members: vec![],
        annotations: vec![],
    }
}

pub fn member_function(
    name: &str,
    receiver: SymbolId,
    parameters: Vec<TypeRef>,
    return_type: TypeRef,
) -> FunctionSymbol {
    FunctionSymbol {
        name: name.into(),
        constructor: false,
        owner: Some(receiver),
        dispatch_receiver: Some(TypeRef::class(receiver)),
        extension_receiver: None,
        parameters: parameters
            .into_iter()
            .enumerate()
            .map(|(i, ty)| ValueParameter {
                name: format!("p{i}"),
                ty,
                is_vararg: false,
            })
            .collect(),
        return_type,
        thrown: vec![],
        visibility: Visibility::Public,
        annotations: vec![],
    }
}

pub fn constructor(class: SymbolId) -> FunctionSymbol {
    FunctionSymbol {
        name: "<init>".into(),
        constructor: true,
        owner: Some(class),
        dispatch_receiver: None,
        extension_receiver: None,
        parameters: vec![],
        return_type: TypeRef::class(class),
        thrown: vec![],
        visibility: Visibility::Public,
        annotations: vec![],
    }
}

/// The slice of kotlin builtins the mapping tests touch
pub struct Builtins {
    pub model: SemanticModel,
    pub file: SymbolId,
    pub int: SymbolId,
    pub boolean: SymbolId,
    pub int_range: SymbolId,
    pub plus: SymbolId,
    pub range_to: SymbolId,
    pub contains: SymbolId,
}

pub fn builtins(file_name: &str) -> Builtins {
    let mut model = SemanticModel::new();
    let file = model.push(Symbol::File(FileSymbol {
        package: String::new(),
        name: file_name.into(),
    }));
    let int = model.push(Symbol::Class(class_symbol("kotlin", "Int")));
    let boolean = model.push(Symbol::Class(class_symbol("kotlin", "Boolean")));
    let int_range = model.push(Symbol::Class(class_symbol("kotlin.ranges", "IntRange")));

    let plus = model.push(Symbol::Function(member_function(
        "plus",
        int,
        vec![TypeRef::class(int)],
        TypeRef::class(int),
    )));
    let range_to = model.push(Symbol::Function(member_function(
        "rangeTo",
        int,
        vec![TypeRef::class(int)],
        TypeRef::class(int_range),
    )));
    let contains = model.push(Symbol::Function(member_function(
        "contains",
        int_range,
        vec![TypeRef::class(int)],
        TypeRef::class(boolean),
    )));

    let Symbol::Class(c) = model.symbol_mut(int) else {
        unreachable!();
    };
    c.members = vec![plus, range_to];
    let Symbol::Class(c) = model.symbol_mut(int_range) else {
        unreachable!();
    };
    c.members = vec![contains];

    Builtins {
        model,
        file,
        int,
        boolean,
        int_range,
        plus,
        range_to,
        contains,
    }
}

pub fn top_level_property(
    model: &mut SemanticModel,
    file: SymbolId,
    name: &str,
    declared_type: TypeRef,
) -> SymbolId {
    model.push(Symbol::Property(PropertySymbol {
        name: name.into(),
        owner: Some(file),
        dispatch_receiver: None,
        declared_type,
        visibility: Visibility::Public,
        annotations: vec![],
    }))
}
