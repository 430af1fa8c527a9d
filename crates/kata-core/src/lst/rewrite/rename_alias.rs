//! Rename a type alias and every reference to it

use crate::lst::tree::{CompilationUnit, Identifier, TypeAlias};
use crate::lst::visit::{LstVisitor, walk_type_alias};
use crate::types::TypeId;

/// Renames a type alias declaration and all identifiers that refer to the
/// alias
///
/// An identifier is renamed only when its simple name matches *and* its
/// attributed type is identity-equal to the aliased class — textual
/// look-alikes of other types are left alone, and references to the aliased
/// class under its own name (including the right-hand side of the alias
/// declaration itself) are untouched.
#[derive(Debug, Clone)]
pub struct RenameTypeAlias {
    pub alias_name: String,
    pub new_name: String,
    /// Interned type of the class the alias expands to
    pub aliased_type: TypeId,
}

impl RenameTypeAlias {
    pub fn new(
        alias_name: impl Into<String>,
        new_name: impl Into<String>,
        aliased_type: TypeId,
    ) -> Self {
        Self {
            alias_name: alias_name.into(),
            new_name: new_name.into(),
            aliased_type,
        }
    }

    pub fn run(&self, cu: CompilationUnit) -> CompilationUnit {
        let mut visitor = RenameVisitor { rename: self };
        visitor.visit_compilation_unit(cu)
    }
}

struct RenameVisitor<'a> {
    rename: &'a RenameTypeAlias,
}

impl LstVisitor for RenameVisitor<'_> {
    fn visit_identifier(&mut self, identifier: Identifier) -> Identifier {
        if identifier.simple_name == self.rename.alias_name
            && identifier.ty == Some(self.rename.aliased_type)
        {
            Identifier {
                simple_name: self.rename.new_name.clone(),
                ..identifier
            }
        } else {
            identifier
        }
    }

    fn visit_type_alias(&mut self, alias: TypeAlias) -> TypeAlias {
        let alias = walk_type_alias(self, alias);
        // The declaration name carries no attribution of its own; it is
        // renamed when the alias expands to the target type
        if alias.name.simple_name == self.rename.alias_name
            && alias.aliased_type == Some(self.rename.aliased_type)
        {
            TypeAlias {
                name: Identifier {
                    simple_name: self.rename.new_name.clone(),
                    ..alias.name
                },
                ..alias
            }
        } else {
            alias
        }
    }
}
