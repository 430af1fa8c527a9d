//! Canonical signatures for semantic descriptors
//!
//! A signature is the deterministic string key the type cache is built on:
//! equal descriptors always produce byte-identical strings, structurally
//! different descriptors produce different strings. Signing is total — an
//! unresolved descriptor signs as the `{undefined}` sentinel rather than
//! failing, so callers can still cache an unknown-type placeholder under it.
//!
//! Self-referential generic bounds (`T : Comparable<T>`) are guarded by a
//! per-computation name stack: hitting a type-variable name already being
//! signed short-circuits to `Generic{name}` with no bounds. The stack is
//! scoped to one top-level signing chain and unwinds as it returns.

use std::collections::HashSet;

use crate::types::semantic::{
    ClassSymbol, FileSymbol, FunctionSymbol, Projection, PropertySymbol, SemanticModel, Symbol,
    SymbolId, TypeRef,
};

/// Sentinel signature for unknown or unresolved descriptors
pub const UNDEFINED: &str = "{undefined}";

/// Builds cache-key signatures from semantic descriptors
pub struct SignatureBuilder<'a> {
    model: &'a SemanticModel,
    /// Fallback owner for declarations without a resolvable one
    containing_file: Option<SymbolId>,
    type_variable_stack: HashSet<String>,
}

impl<'a> SignatureBuilder<'a> {
    pub fn new(model: &'a SemanticModel) -> Self {
        Self {
            model,
            containing_file: None,
            type_variable_stack: HashSet::new(),
        }
    }

    pub fn with_file(model: &'a SemanticModel, file: SymbolId) -> Self {
        Self {
            model,
            containing_file: Some(file),
            type_variable_stack: HashSet::new(),
        }
    }

    /// Sign any symbol
    pub fn signature(&mut self, id: SymbolId) -> String {
        match self.model.symbol(id) {
            Symbol::File(f) => self.file_signature(f),
            Symbol::Class(c) => {
                if c.type_parameters.is_empty() {
                    self.class_signature(c)
                } else {
                    self.parameterized_declaration_signature(c)
                }
            }
            Symbol::Function(f) => self.method_signature(f),
            Symbol::Property(p) => self.variable_signature(p),
            Symbol::EnumEntry(e) => {
                let owner = self
                    .model
                    .class_flat_name(e.owner)
                    .unwrap_or_else(|| UNDEFINED.to_string());
                format!("{owner}{{name={},type={owner}}}", e.name)
            }
            Symbol::TypeParameter(_) => self.type_parameter_signature(id),
        }
    }

    /// Erasure signature of a class: fully-qualified name with nested-class
    /// separators flattened to `$`
    pub fn class_signature(&self, class: &ClassSymbol) -> String {
        class.id.flat_name()
    }

    /// Sign a type use-site
    pub fn type_ref_signature(&mut self, type_ref: &TypeRef) -> String {
        match type_ref {
            TypeRef::Error => UNDEFINED.to_string(),
            TypeRef::Parameter { symbol } => self.type_parameter_signature(*symbol),
            TypeRef::Class {
                symbol, arguments, ..
            } => {
                let base = match self.model.symbol(*symbol) {
                    Symbol::Class(c) => self.class_signature(c),
                    _ => UNDEFINED.to_string(),
                };
                if arguments.is_empty() {
                    base
                } else {
                    let args: Vec<String> = arguments
                        .iter()
                        .map(|p| self.projection_signature(p))
                        .collect();
                    format!("{base}<{}>", args.join(", "))
                }
            }
        }
    }

    pub fn projection_signature(&mut self, projection: &Projection) -> String {
        match projection {
            Projection::Argument(t) => self.type_ref_signature(t),
            Projection::Out(t) => format!("Generic{{? extends {}}}", self.type_ref_signature(t)),
            Projection::In(t) => format!("Generic{{? super {}}}", self.type_ref_signature(t)),
            Projection::Star => "Generic{*}".to_string(),
        }
    }

    /// `pkg.NameKt` for a file, the owner of its top-level declarations
    pub fn file_signature(&self, file: &FileSymbol) -> String {
        let base = file
            .name
            .replace(['/', '\\'], ".")
            .replace(".kt", "Kt");
        if file.package.is_empty() {
            base
        } else {
            format!("{}.{base}", file.package)
        }
    }

    fn parameterized_declaration_signature(&mut self, class: &ClassSymbol) -> String {
        let mut s = self.class_signature(class);
        let params: Vec<String> = class
            .type_parameters
            .iter()
            .map(|&tp| self.type_parameter_signature(tp))
            .collect();
        s.push('<');
        s.push_str(&params.join(", "));
        s.push('>');
        s
    }

    fn type_parameter_signature(&mut self, id: SymbolId) -> String {
        let Some(tp) = self.model.type_parameter(id) else {
            return UNDEFINED.to_string();
        };
        let name = tp.name.clone();
        if !self.type_variable_stack.insert(name.clone()) {
            // Already signing this variable: a recursive bound
            return format!("Generic{{{name}}}");
        }
        let model = self.model;
        let bounds: Vec<String> = tp
            .bounds
            .iter()
            .filter(|b| !model.is_implicit_any(b))
            .map(|b| self.type_ref_signature(b))
            .collect();
        self.type_variable_stack.remove(&name);
        if bounds.is_empty() {
            format!("Generic{{{name}}}")
        } else {
            format!("Generic{{{name}: {}}}", bounds.join(", "))
        }
    }

    /// `{owner}{name=...,return=...,parameters=[...]}`
    pub fn method_signature(&mut self, function: &FunctionSymbol) -> String {
        let owner = if function.constructor {
            strip_parameterization(&self.type_ref_signature(&function.return_type)).to_string()
        } else {
            self.owner_signature(function.dispatch_receiver.as_ref(), function.owner)
        };
        let name = if function.constructor {
            "<constructor>"
        } else {
            function.name.as_str()
        };
        let return_sig = self.type_ref_signature(&function.return_type);
        let mut params = Vec::new();
        if let Some(receiver) = &function.extension_receiver {
            params.push(self.type_ref_signature(receiver));
        }
        for p in &function.parameters {
            // Vararg parameters sign their element type; arrays are not
            // representable in this model
            params.push(self.type_ref_signature(&p.ty));
        }
        format!(
            "{owner}{{name={name},return={return_sig},parameters=[{}]}}",
            params.join(",")
        )
    }

    /// `{owner}{name=...,type=...}`
    pub fn variable_signature(&mut self, property: &PropertySymbol) -> String {
        let owner = self.owner_signature(property.dispatch_receiver.as_ref(), property.owner);
        let type_sig = self.type_ref_signature(&property.declared_type);
        format!("{owner}{{name={},type={type_sig}}}", property.name)
    }

    /// Owner portion of a member signature: the dispatch receiver wins, then
    /// the declaring symbol, then the containing file; parameterization is
    /// always stripped
    fn owner_signature(&mut self, dispatch_receiver: Option<&TypeRef>, owner: Option<SymbolId>) -> String {
        if let Some(receiver) = dispatch_receiver {
            let sig = self.type_ref_signature(receiver);
            return strip_parameterization(&sig).to_string();
        }
        if let Some(owner) = owner {
            let sig = match self.model.symbol(owner) {
                Symbol::Class(c) => self.class_signature(c),
                Symbol::File(f) => self.file_signature(f),
                Symbol::Function(f) => self.method_signature(f),
                _ => UNDEFINED.to_string(),
            };
            return strip_parameterization(&sig).to_string();
        }
        if let Some(file) = self.containing_file
            && let Some(f) = self.model.file(file)
        {
            return self.file_signature(f);
        }
        UNDEFINED.to_string()
    }
}

/// Truncate an owner signature at the first angle bracket
fn strip_parameterization(signature: &str) -> &str {
    match signature.find('<') {
        Some(idx) => &signature[..idx],
        None => signature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::model::Variance;
    use crate::types::semantic::{
        ClassDeclKind, ClassId, Modality, Projection, Symbol, TypeParameterSymbol, ValueParameter,
        Visibility,
    };

    fn class_symbol(id: ClassId) -> ClassSymbol {
        ClassSymbol {
            id,
            kind: ClassDeclKind::Class,
            visibility: Visibility::Public,
            modality: Modality::Final,
            type_parameters: vec![],
            super_types: vec![],
            members: vec![],
            annotations: vec![],
        }
    }

    #[test]
    fn class_signature_is_the_flat_fqn() {
        let mut model = SemanticModel::new();
        let nested = model.push(Symbol::Class(class_symbol(ClassId::new(
            "com.example",
            "Outer.Inner",
        ))));
        let mut sigs = SignatureBuilder::new(&model);
        assert_eq!(sigs.signature(nested), "com.example.Outer$Inner");
    }

    #[test]
    fn parameterized_use_site_signature() {
        let mut model = SemanticModel::new();
        let int = model.push(Symbol::Class(class_symbol(ClassId::new("kotlin", "Int"))));
        let list = model.push(Symbol::Class(class_symbol(ClassId::new(
            "kotlin.collections",
            "List",
        ))));
        let mut sigs = SignatureBuilder::new(&model);
        let use_site = TypeRef::parameterized(list, vec![Projection::Argument(TypeRef::class(int))]);
        assert_eq!(
            sigs.type_ref_signature(&use_site),
            "kotlin.collections.List<kotlin.Int>"
        );
    }

    #[test]
    fn projections_sign_as_wildcards() {
        let mut model = SemanticModel::new();
        let number = model.push(Symbol::Class(class_symbol(ClassId::new("kotlin", "Number"))));
        let list = model.push(Symbol::Class(class_symbol(ClassId::new(
            "kotlin.collections",
            "List",
        ))));
        let mut sigs = SignatureBuilder::new(&model);
        let out_site =
            TypeRef::parameterized(list, vec![Projection::Out(TypeRef::class(number))]);
        assert_eq!(
            sigs.type_ref_signature(&out_site),
            "kotlin.collections.List<Generic{? extends kotlin.Number}>"
        );
        let star_site = TypeRef::parameterized(list, vec![Projection::Star]);
        assert_eq!(
            sigs.type_ref_signature(&star_site),
            "kotlin.collections.List<Generic{*}>"
        );
    }

    #[test]
    fn recursive_bound_terminates() {
        let mut model = SemanticModel::new();
        let comparable = model.push(Symbol::Class(class_symbol(ClassId::new(
            "kotlin",
            "Comparable",
        ))));
        let t = model.push(Symbol::TypeParameter(TypeParameterSymbol {
            name: "T".into(),
            variance: Variance::Invariant,
            bounds: vec![],
        }));
        let bound = TypeRef::parameterized(
            comparable,
            vec![Projection::Argument(TypeRef::parameter(t))],
        );
        let Symbol::TypeParameter(tp) = model.symbol_mut(t) else {
            unreachable!();
        };
        tp.bounds.push(bound);

        let mut sigs = SignatureBuilder::new(&model);
        assert_eq!(
            sigs.signature(t),
            "Generic{T: kotlin.Comparable<Generic{T}>}"
        );
        // The stack unwound; signing again gives the same result
        assert_eq!(
            sigs.signature(t),
            "Generic{T: kotlin.Comparable<Generic{T}>}"
        );
    }

    #[test]
    fn implicit_any_bound_is_suppressed() {
        let mut model = SemanticModel::new();
        let any = model.push(Symbol::Class({
            let mut c = class_symbol(ClassId::new("kotlin", "Any"));
            c.modality = Modality::Open;
            c
        }));
        let t = model.push(Symbol::TypeParameter(TypeParameterSymbol {
            name: "T".into(),
            variance: Variance::Invariant,
            bounds: vec![TypeRef::nullable_class(any)],
        }));
        let mut sigs = SignatureBuilder::new(&model);
        assert_eq!(sigs.signature(t), "Generic{T}");
    }

    #[test]
    fn method_signature_shape() {
        let mut model = SemanticModel::new();
        let int = model.push(Symbol::Class(class_symbol(ClassId::new("kotlin", "Int"))));
        let range = model.push(Symbol::Class(class_symbol(ClassId::new(
            "kotlin.ranges",
            "IntRange",
        ))));
        let range_to = model.push(Symbol::Function(FunctionSymbol {
            name: "rangeTo".into(),
            constructor: false,
            owner: Some(int),
            dispatch_receiver: Some(TypeRef::class(int)),
            extension_receiver: None,
            parameters: vec![ValueParameter {
                name: "other".into(),
                ty: TypeRef::class(int),
                is_vararg: false,
            }],
            return_type: TypeRef::class(range),
            thrown: vec![],
            visibility: Visibility::Public,
            annotations: vec![],
        }));
        let mut sigs = SignatureBuilder::new(&model);
        assert_eq!(
            sigs.signature(range_to),
            "kotlin.Int{name=rangeTo,return=kotlin.ranges.IntRange,parameters=[kotlin.Int]}"
        );
    }

    #[test]
    fn constructor_signature_uses_the_constructor_marker() {
        let mut model = SemanticModel::new();
        let test = model.push(Symbol::Class(class_symbol(ClassId::new("", "Test"))));
        let ctor = model.push(Symbol::Function(FunctionSymbol {
            name: "Test".into(),
            constructor: true,
            owner: Some(test),
            dispatch_receiver: None,
            extension_receiver: None,
            parameters: vec![],
            return_type: TypeRef::class(test),
            thrown: vec![],
            visibility: Visibility::Public,
            annotations: vec![],
        }));
        let mut sigs = SignatureBuilder::new(&model);
        assert_eq!(
            sigs.signature(ctor),
            "Test{name=<constructor>,return=Test,parameters=[]}"
        );
    }

    #[test]
    fn variable_owner_strips_parameterization() {
        let mut model = SemanticModel::new();
        let int = model.push(Symbol::Class(class_symbol(ClassId::new("kotlin", "Int"))));
        let t = model.push(Symbol::TypeParameter(TypeParameterSymbol {
            name: "T".into(),
            variance: Variance::Invariant,
            bounds: vec![],
        }));
        let boxed = model.push(Symbol::Class({
            let mut c = class_symbol(ClassId::new("com.example", "Box"));
            c.type_parameters = vec![t];
            c
        }));
        let prop = model.push(Symbol::Property(PropertySymbol {
            name: "value".into(),
            owner: Some(boxed),
            dispatch_receiver: None,
            declared_type: TypeRef::class(int),
            visibility: Visibility::Public,
            annotations: vec![],
        }));
        let mut sigs = SignatureBuilder::new(&model);
        // The declaring class is generic, but the owner portion is its erasure
        assert_eq!(
            sigs.signature(prop),
            "com.example.Box{name=value,type=kotlin.Int}"
        );
    }

    #[test]
    fn top_level_property_owner_is_the_file() {
        let mut model = SemanticModel::new();
        let int = model.push(Symbol::Class(class_symbol(ClassId::new("kotlin", "Int"))));
        let file = model.push(Symbol::File(FileSymbol {
            package: "com.example".into(),
            name: "Foo.kt".into(),
        }));
        let prop = model.push(Symbol::Property(PropertySymbol {
            name: "a".into(),
            owner: Some(file),
            dispatch_receiver: None,
            declared_type: TypeRef::class(int),
            visibility: Visibility::Public,
            annotations: vec![],
        }));
        let mut sigs = SignatureBuilder::new(&model);
        assert_eq!(
            sigs.signature(prop),
            "com.example.FooKt{name=a,type=kotlin.Int}"
        );
    }

    #[test]
    fn unresolved_signs_as_the_sentinel() {
        let model = SemanticModel::new();
        let mut sigs = SignatureBuilder::new(&model);
        assert_eq!(sigs.type_ref_signature(&TypeRef::Error), UNDEFINED);
    }

    #[test]
    fn vararg_parameters_sign_element_wise() {
        let mut model = SemanticModel::new();
        let int = model.push(Symbol::Class(class_symbol(ClassId::new("kotlin", "Int"))));
        let unit = model.push(Symbol::Class(class_symbol(ClassId::new("kotlin", "Unit"))));
        let file = model.push(Symbol::File(FileSymbol {
            package: String::new(),
            name: "Main.kt".into(),
        }));
        let f = model.push(Symbol::Function(FunctionSymbol {
            name: "sum".into(),
            constructor: false,
            owner: Some(file),
            dispatch_receiver: None,
            extension_receiver: None,
            parameters: vec![ValueParameter {
                name: "xs".into(),
                ty: TypeRef::class(int),
                is_vararg: true,
            }],
            return_type: TypeRef::class(unit),
            thrown: vec![],
            visibility: Visibility::Public,
            annotations: vec![],
        }));
        let mut sigs = SignatureBuilder::new(&model);
        assert_eq!(
            sigs.signature(f),
            "MainKt{name=sum,return=kotlin.Unit,parameters=[kotlin.Int]}"
        );
    }
}
