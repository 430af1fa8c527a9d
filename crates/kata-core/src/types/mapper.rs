//! Mapping semantic descriptors into the interned type model
//!
//! `resolve` is idempotent and identity-preserving: the signature is computed
//! first and a cache hit returns the existing [`TypeId`] immediately — that
//! early return is also what breaks reference cycles. On a miss the mapper
//! interns a placeholder *before* recursing into supertypes and members, then
//! finalizes the arena slot, so a class whose supertype's type argument
//! refers back to the class itself resolves in finite steps.
//!
//! The mapper trusts its semantic model completely: a missing owner or an
//! unclassifiable supertype is a programming error surfaced as an immediate
//! fatal error, not a recoverable condition.

use tracing::debug;

use crate::error::KataError;
use crate::result::Result;
use crate::types::model::{
    ClassKind, ClassType, GenericType, MethodType, ParameterizedType, PrimitiveKind, TypeId,
    TypeKind, TypeStore, Variance, VariableType, flags,
};
use crate::types::semantic::{
    ClassDeclKind, ClassSymbol, Modality, Projection, SemanticModel, Symbol, SymbolId, TypeRef,
    Visibility,
};
use crate::types::signature::SignatureBuilder;

/// Resolves semantic symbols and type references to interned type ids
pub struct TypeMapper<'a> {
    model: &'a SemanticModel,
    store: &'a mut TypeStore,
    signatures: SignatureBuilder<'a>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(model: &'a SemanticModel, store: &'a mut TypeStore) -> Self {
        Self {
            model,
            store,
            signatures: SignatureBuilder::new(model),
        }
    }

    /// A mapper whose ownerless declarations fall back to `file`
    pub fn with_file(model: &'a SemanticModel, store: &'a mut TypeStore, file: SymbolId) -> Self {
        Self {
            model,
            store,
            signatures: SignatureBuilder::with_file(model, file),
        }
    }

    /// Resolve a declaration symbol
    pub fn type_of(&mut self, id: SymbolId) -> Result<TypeId> {
        match self.model.symbol(id) {
            Symbol::File(_) => self.file_type(id),
            Symbol::Class(_) => self.class_type(id),
            Symbol::Function(_) => self.method_type(id),
            Symbol::Property(_) => self.variable_type(id),
            Symbol::EnumEntry(_) => self.enum_entry_type(id),
            Symbol::TypeParameter(_) => self.generic_type(id),
        }
    }

    /// Resolve a type use-site
    pub fn type_ref(&mut self, type_ref: &TypeRef) -> Result<TypeId> {
        match type_ref {
            TypeRef::Error => Ok(self.store.unknown()),
            TypeRef::Parameter { symbol } => self.generic_type(*symbol),
            TypeRef::Class {
                symbol, arguments, ..
            } => {
                if arguments.is_empty() {
                    return self.class_erasure(*symbol);
                }
                let signature = self.signatures.type_ref_signature(type_ref);
                if let Some(existing) = self.store.get(&signature) {
                    return Ok(existing);
                }
                debug!(%signature, "mapping parameterized type");
                let erasure = self.class_erasure(*symbol)?;
                let id = self.store.intern(
                    signature,
                    TypeKind::Parameterized(ParameterizedType {
                        class: erasure,
                        type_arguments: Vec::new(),
                    }),
                );
                let mut args = Vec::with_capacity(arguments.len());
                for projection in arguments {
                    args.push(self.projection_type(projection)?);
                }
                self.store.complete_parameterized(id, args);
                Ok(id)
            }
        }
    }

    /// Resolve a literal's builtin value type; any non-builtin id reaching
    /// this path is fatal
    pub fn primitive(&mut self, type_ref: &TypeRef) -> Result<TypeId> {
        let TypeRef::Class { symbol, .. } = type_ref else {
            return Err(KataError::UnknownPrimitive {
                id: format!("{type_ref:?}"),
            });
        };
        let fqn = self
            .model
            .class_flat_name(*symbol)
            .ok_or_else(|| KataError::UnknownPrimitive {
                id: format!("{type_ref:?}"),
            })?;
        self.primitive_from_fqn(&fqn)
    }

    /// Builtin type id to primitive, by identity against the closed set
    pub fn primitive_from_fqn(&mut self, fqn: &str) -> Result<TypeId> {
        let kind = match fqn {
            "kotlin.Byte" => PrimitiveKind::Byte,
            "kotlin.Boolean" => PrimitiveKind::Boolean,
            "kotlin.Char" => PrimitiveKind::Char,
            "kotlin.Double" => PrimitiveKind::Double,
            "kotlin.Float" => PrimitiveKind::Float,
            "kotlin.Int" => PrimitiveKind::Int,
            "kotlin.Long" => PrimitiveKind::Long,
            "kotlin.Short" => PrimitiveKind::Short,
            "kotlin.String" => PrimitiveKind::String,
            "kotlin.Unit" => PrimitiveKind::Void,
            "kotlin.Nothing" => PrimitiveKind::Null,
            _ => {
                return Err(KataError::UnknownPrimitive {
                    id: fqn.to_string(),
                });
            }
        };
        Ok(self.store.primitive(kind))
    }

    fn file_type(&mut self, id: SymbolId) -> Result<TypeId> {
        let file = self.model.file(id).expect("checked by caller");
        let signature = self.signatures.file_signature(file);
        if let Some(existing) = self.store.get(&signature) {
            return Ok(existing);
        }
        let type_id = self.store.intern(
            signature.clone(),
            TypeKind::Class(ClassType {
                fqn: signature,
                kind: ClassKind::Class,
                flags: flags::PUBLIC | flags::FINAL,
                supertype: None,
                interfaces: vec![],
                annotations: vec![],
                fields: vec![],
                methods: vec![],
            }),
        );
        Ok(type_id)
    }

    /// Resolve a class declaration: the erasure class, plus a second cache
    /// entry for the parameterized form when the class is generic
    fn class_type(&mut self, id: SymbolId) -> Result<TypeId> {
        let class = self.model.class(id).expect("checked by caller");
        let full_signature = self.signatures.signature(id);
        if let Some(existing) = self.store.get(&full_signature) {
            return Ok(existing);
        }

        let erasure = self.class_erasure(id)?;
        if class.type_parameters.is_empty() {
            return Ok(erasure);
        }

        // Member resolution may have interned the parameterized form already
        if let Some(existing) = self.store.get(&full_signature) {
            return Ok(existing);
        }
        let id_pt = self.store.intern(
            full_signature,
            TypeKind::Parameterized(ParameterizedType {
                class: erasure,
                type_arguments: Vec::new(),
            }),
        );
        let mut args = Vec::with_capacity(class.type_parameters.len());
        for &tp in &class.type_parameters {
            args.push(self.generic_type(tp)?);
        }
        self.store.complete_parameterized(id_pt, args);
        Ok(id_pt)
    }

    /// Resolve (or return the cached) erasure class of a class symbol
    fn class_erasure(&mut self, id: SymbolId) -> Result<TypeId> {
        let class = self
            .model
            .class(id)
            .ok_or_else(|| KataError::unsupported_descriptor("class reference to non-class symbol"))?;
        let fqn = self.signatures.class_signature(class);
        if let Some(existing) = self.store.get(&fqn) {
            return Ok(existing);
        }
        debug!(signature = %fqn, "mapping class type");

        // Placeholder first: the cache entry must exist before supertypes
        // and members resolve, or recursive type graphs would not terminate
        let type_id = self.store.intern(
            fqn.clone(),
            TypeKind::Class(ClassType {
                fqn: fqn.clone(),
                kind: map_class_kind(class.kind),
                flags: class_flags(class),
                supertype: None,
                interfaces: vec![],
                annotations: vec![],
                fields: vec![],
                methods: vec![],
            }),
        );

        let mut supertype = None;
        let mut interfaces = Vec::new();
        for super_ref in &class.super_types {
            let TypeRef::Class { symbol, .. } = super_ref else {
                return Err(KataError::UnclassifiableSupertype { class: fqn.clone() });
            };
            let super_class = self
                .model
                .class(*symbol)
                .ok_or_else(|| KataError::UnclassifiableSupertype { class: fqn.clone() })?;
            match super_class.kind {
                ClassDeclKind::Class => supertype = Some(self.type_of(*symbol)?),
                ClassDeclKind::Interface => interfaces.push(self.type_of(*symbol)?),
                _ => return Err(KataError::UnclassifiableSupertype { class: fqn.clone() }),
            }
        }

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        for &member in &class.members {
            match self.model.symbol(member) {
                Symbol::Property(_) => fields.push(self.variable_type(member)?),
                Symbol::EnumEntry(_) => fields.push(self.enum_entry_type(member)?),
                Symbol::Function(_) => methods.push(self.method_type(member)?),
                Symbol::Class(_) => {
                    // Inner classes and companion objects are not modeled yet
                    return Err(KataError::unsupported("nested class declarations"));
                }
                other => {
                    return Err(KataError::unsupported_descriptor(format!(
                        "class member {other:?}"
                    )));
                }
            }
        }

        let annotations = self.annotation_types(&class.annotations)?;
        self.store
            .complete_class(type_id, supertype, interfaces, annotations, fields, methods);
        Ok(type_id)
    }

    /// Resolve a generic type variable; variance is read from the descriptor
    /// and the implicit top bound is suppressed
    fn generic_type(&mut self, id: SymbolId) -> Result<TypeId> {
        let tp = self
            .model
            .type_parameter(id)
            .ok_or_else(|| KataError::unsupported_descriptor("type reference to non-parameter symbol"))?;
        let signature = self.signatures.signature(id);
        if let Some(existing) = self.store.get(&signature) {
            return Ok(existing);
        }
        let type_id = self.store.intern(
            signature,
            TypeKind::Generic(GenericType {
                name: tp.name.clone(),
                variance: tp.variance,
                bounds: vec![],
            }),
        );
        let mut bounds = Vec::new();
        for bound in &tp.bounds {
            if self.model.is_implicit_any(bound) {
                continue;
            }
            bounds.push(self.type_ref(bound)?);
        }
        self.store.complete_generic(type_id, bounds);
        Ok(type_id)
    }

    fn projection_type(&mut self, projection: &Projection) -> Result<TypeId> {
        let (variance, bound) = match projection {
            Projection::Argument(t) => return self.type_ref(t),
            Projection::Out(t) => (Variance::Covariant, Some(t)),
            Projection::In(t) => (Variance::Contravariant, Some(t)),
            Projection::Star => (Variance::Invariant, None),
        };
        let signature = self.signatures.projection_signature(projection);
        if let Some(existing) = self.store.get(&signature) {
            return Ok(existing);
        }
        let type_id = self.store.intern(
            signature,
            TypeKind::Generic(GenericType {
                name: "?".into(),
                variance,
                bounds: vec![],
            }),
        );
        let bounds = match bound {
            Some(t) => vec![self.type_ref(t)?],
            None => vec![],
        };
        self.store.complete_generic(type_id, bounds);
        Ok(type_id)
    }

    fn method_type(&mut self, id: SymbolId) -> Result<TypeId> {
        let function = self.model.function(id).expect("checked by caller");
        let signature = self.signatures.signature(id);
        if let Some(existing) = self.store.get(&signature) {
            return Ok(existing);
        }
        debug!(%signature, "mapping method type");

        let parameter_names = function.parameters.iter().map(|p| p.name.clone()).collect();
        let type_id = self.store.intern(
            signature,
            TypeKind::Method(MethodType {
                declaring: self.store.unknown(),
                name: if function.constructor {
                    "<constructor>".into()
                } else {
                    function.name.clone()
                },
                flags: visibility_flags(function.visibility),
                return_type: self.store.unknown(),
                parameter_names,
                parameter_types: vec![],
                thrown: vec![],
                annotations: vec![],
            }),
        );

        let declaring = if let Some(receiver) = &function.dispatch_receiver {
            self.type_ref(receiver)?
        } else if let Some(owner) = function.owner {
            self.type_of(owner)?
        } else {
            return Err(KataError::MissingOwner {
                name: function.name.clone(),
            });
        };
        let return_type = if function.constructor {
            declaring
        } else {
            self.type_ref(&function.return_type)?
        };
        let mut parameter_types = Vec::with_capacity(function.parameters.len());
        for p in &function.parameters {
            // Vararg parameters map their element type
            parameter_types.push(self.type_ref(&p.ty)?);
        }
        let mut thrown = Vec::with_capacity(function.thrown.len());
        for t in &function.thrown {
            thrown.push(self.type_ref(t)?);
        }
        let annotations = self.annotation_types(&function.annotations)?;
        self.store
            .complete_method(type_id, declaring, return_type, parameter_types, thrown, annotations);
        Ok(type_id)
    }

    fn variable_type(&mut self, id: SymbolId) -> Result<TypeId> {
        let property = self.model.property(id).expect("checked by caller");
        let signature = self.signatures.signature(id);
        if let Some(existing) = self.store.get(&signature) {
            return Ok(existing);
        }
        debug!(%signature, "mapping variable type");

        let type_id = self.store.intern(
            signature,
            TypeKind::Variable(VariableType {
                owner: self.store.unknown(),
                name: property.name.clone(),
                flags: visibility_flags(property.visibility),
                declared_type: self.store.unknown(),
                annotations: vec![],
            }),
        );

        let owner = if let Some(receiver) = &property.dispatch_receiver {
            self.type_ref(receiver)?
        } else if let Some(owner) = property.owner {
            self.type_of(owner)?
        } else {
            return Err(KataError::MissingOwner {
                name: property.name.clone(),
            });
        };
        let declared_type = self.type_ref(&property.declared_type)?;
        let annotations = self.annotation_types(&property.annotations)?;
        self.store
            .complete_variable(type_id, owner, declared_type, annotations);
        Ok(type_id)
    }

    fn enum_entry_type(&mut self, id: SymbolId) -> Result<TypeId> {
        let Symbol::EnumEntry(entry) = self.model.symbol(id) else {
            unreachable!("checked by caller");
        };
        let signature = self.signatures.signature(id);
        if let Some(existing) = self.store.get(&signature) {
            return Ok(existing);
        }
        let type_id = self.store.intern(
            signature,
            TypeKind::Variable(VariableType {
                owner: self.store.unknown(),
                name: entry.name.clone(),
                flags: flags::PUBLIC | flags::FINAL,
                declared_type: self.store.unknown(),
                annotations: vec![],
            }),
        );
        let owner = self.type_of(entry.owner)?;
        self.store.complete_variable(type_id, owner, owner, vec![]);
        Ok(type_id)
    }

    fn annotation_types(&mut self, annotations: &[TypeRef]) -> Result<Vec<TypeId>> {
        let mut mapped = Vec::with_capacity(annotations.len());
        for annotation in annotations {
            mapped.push(self.type_ref(annotation)?);
        }
        Ok(mapped)
    }
}

fn map_class_kind(kind: ClassDeclKind) -> ClassKind {
    match kind {
        ClassDeclKind::Interface => ClassKind::Interface,
        ClassDeclKind::Enum => ClassKind::Enum,
        ClassDeclKind::Annotation => ClassKind::Annotation,
        ClassDeclKind::Class | ClassDeclKind::Object => ClassKind::Class,
    }
}

fn visibility_flags(visibility: Visibility) -> u64 {
    match visibility {
        Visibility::Public => flags::PUBLIC,
        Visibility::Private => flags::PRIVATE,
        Visibility::Protected => flags::PROTECTED,
        Visibility::Internal => 0,
    }
}

fn class_flags(class: &ClassSymbol) -> u64 {
    let modality = match class.modality {
        Modality::Final => flags::FINAL,
        Modality::Abstract => flags::ABSTRACT,
        Modality::Sealed => flags::SEALED,
        Modality::Open => 0,
    };
    visibility_flags(class.visibility) | modality
}
