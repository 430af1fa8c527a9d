//! Descriptors of the external semantic model
//!
//! The compiler frontend resolves names and types; this module is the shape
//! of what it hands us, nothing more. The core queries these descriptors and
//! maps them into its own type model — it never computes or mutates semantic
//! information. Descriptor kinds form a closed enum so that an unknown kind
//! is impossible by construction rather than a scattered string comparison.

use crate::types::model::Variance;

/// Arena id of a semantic symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A class id split into package and relative name
///
/// Nested classes keep their dot-separated relative name (`Outer.Inner`);
/// [`ClassId::flat_name`] rewrites the nesting separators to `$` the way
/// signatures spell them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassId {
    pub package: String,
    pub relative_name: String,
}

impl ClassId {
    pub fn new(package: impl Into<String>, relative_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            relative_name: relative_name.into(),
        }
    }

    /// Signature-form name: `pkg.Outer$Inner`
    pub fn flat_name(&self) -> String {
        let flat = self.relative_name.replace('.', "$");
        if self.package.is_empty() {
            flat
        } else {
            format!("{}.{}", self.package, flat)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Final,
    Open,
    Abstract,
    Sealed,
}

/// Declaration-site kind of a class-like symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassDeclKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Object,
}

/// A resolved type use-site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Reference to a class-like symbol, possibly parameterized
    Class {
        symbol: SymbolId,
        nullable: bool,
        arguments: Vec<Projection>,
    },
    /// Reference to a type parameter in scope
    Parameter { symbol: SymbolId },
    /// Unresolved or erroneous type
    Error,
}

impl TypeRef {
    pub fn class(symbol: SymbolId) -> Self {
        TypeRef::Class {
            symbol,
            nullable: false,
            arguments: Vec::new(),
        }
    }

    pub fn nullable_class(symbol: SymbolId) -> Self {
        TypeRef::Class {
            symbol,
            nullable: true,
            arguments: Vec::new(),
        }
    }

    pub fn parameterized(symbol: SymbolId, arguments: Vec<Projection>) -> Self {
        TypeRef::Class {
            symbol,
            nullable: false,
            arguments,
        }
    }

    pub fn parameter(symbol: SymbolId) -> Self {
        TypeRef::Parameter { symbol }
    }
}

/// A type argument position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Argument(TypeRef),
    In(TypeRef),
    Out(TypeRef),
    Star,
}

/// One semantic symbol
#[derive(Debug, Clone)]
pub enum Symbol {
    File(FileSymbol),
    Class(ClassSymbol),
    Function(FunctionSymbol),
    Property(PropertySymbol),
    EnumEntry(EnumEntrySymbol),
    TypeParameter(TypeParameterSymbol),
}

/// A source file, the owner of top-level declarations
#[derive(Debug, Clone)]
pub struct FileSymbol {
    pub package: String,
    /// File name including the `.kt` extension
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ClassSymbol {
    pub id: ClassId,
    pub kind: ClassDeclKind,
    pub visibility: Visibility,
    pub modality: Modality,
    pub type_parameters: Vec<SymbolId>,
    pub super_types: Vec<TypeRef>,
    pub members: Vec<SymbolId>,
    pub annotations: Vec<TypeRef>,
}

#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub name: String,
    pub constructor: bool,
    /// Declaring class or file
    pub owner: Option<SymbolId>,
    /// Receiver type for member dispatch, when present it wins over `owner`
    pub dispatch_receiver: Option<TypeRef>,
    /// Extension receiver, signed as a leading parameter
    pub extension_receiver: Option<TypeRef>,
    pub parameters: Vec<ValueParameter>,
    pub return_type: TypeRef,
    pub thrown: Vec<TypeRef>,
    pub visibility: Visibility,
    pub annotations: Vec<TypeRef>,
}

/// A declared value parameter
///
/// For vararg parameters `ty` is the element type: arrays are not separately
/// representable in this model, so varargs sign and map element-wise.
#[derive(Debug, Clone)]
pub struct ValueParameter {
    pub name: String,
    pub ty: TypeRef,
    pub is_vararg: bool,
}

#[derive(Debug, Clone)]
pub struct PropertySymbol {
    pub name: String,
    pub owner: Option<SymbolId>,
    pub dispatch_receiver: Option<TypeRef>,
    pub declared_type: TypeRef,
    pub visibility: Visibility,
    pub annotations: Vec<TypeRef>,
}

#[derive(Debug, Clone)]
pub struct EnumEntrySymbol {
    pub name: String,
    pub owner: SymbolId,
}

#[derive(Debug, Clone)]
pub struct TypeParameterSymbol {
    pub name: String,
    pub variance: Variance,
    pub bounds: Vec<TypeRef>,
}

/// The resolved symbol graph handed over by the frontend
///
/// Symbols live in an arena and reference each other by id, so recursive
/// shapes (a class whose supertype's type argument refers back to the class)
/// are directly representable.
#[derive(Debug, Default)]
pub struct SemanticModel {
    symbols: Vec<Symbol>,
}

impl SemanticModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// Mutable access for wiring up recursive fixtures; the model is frozen
    /// once mapping starts
    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn class(&self, id: SymbolId) -> Option<&ClassSymbol> {
        match self.symbol(id) {
            Symbol::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn function(&self, id: SymbolId) -> Option<&FunctionSymbol> {
        match self.symbol(id) {
            Symbol::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn property(&self, id: SymbolId) -> Option<&PropertySymbol> {
        match self.symbol(id) {
            Symbol::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn type_parameter(&self, id: SymbolId) -> Option<&TypeParameterSymbol> {
        match self.symbol(id) {
            Symbol::TypeParameter(t) => Some(t),
            _ => None,
        }
    }

    pub fn file(&self, id: SymbolId) -> Option<&FileSymbol> {
        match self.symbol(id) {
            Symbol::File(f) => Some(f),
            _ => None,
        }
    }

    /// Flat signature name of a class symbol, if `id` is one
    pub fn class_flat_name(&self, id: SymbolId) -> Option<String> {
        self.class(id).map(|c| c.id.flat_name())
    }

    /// The implicit universal bound (`kotlin.Any?`) carries no information
    /// and is suppressed from generic bounds
    pub fn is_implicit_any(&self, bound: &TypeRef) -> bool {
        match bound {
            TypeRef::Class {
                symbol,
                nullable: true,
                arguments,
            } if arguments.is_empty() => {
                self.class_flat_name(*symbol).as_deref() == Some("kotlin.Any")
            }
            _ => false,
        }
    }
}
