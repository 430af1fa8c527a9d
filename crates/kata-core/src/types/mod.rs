//! Type attribution
//!
//! The external frontend resolves Kotlin semantics; this module turns its
//! descriptor graph into the crate's own stable type model. The pipeline is
//! signature-first: every descriptor signs to a deterministic string
//! ([`signature::SignatureBuilder`]), the string keys a per-run
//! [`model::TypeStore`], and [`mapper::TypeMapper`] guarantees that equal
//! signatures resolve to reference-identical type ids. Identity is load
//! bearing — rewrites compare attributed types by id to decide whether two
//! syntax nodes mean the same type.

pub mod mapper;
pub mod model;
pub mod semantic;
pub mod signature;

pub use mapper::TypeMapper;
pub use model::{
    ClassKind, ClassType, GenericType, MethodType, ParameterizedType, PrimitiveKind, TypeId,
    TypeKind, TypeStore, Variance, VariableType,
};
pub use semantic::{
    ClassDeclKind, ClassId, ClassSymbol, EnumEntrySymbol, FileSymbol, FunctionSymbol, Modality,
    Projection, PropertySymbol, SemanticModel, Symbol, SymbolId, TypeParameterSymbol, TypeRef,
    ValueParameter, Visibility,
};
pub use signature::{SignatureBuilder, UNDEFINED};
