//! Tree rewrites built on the visitor

mod add_import;
mod rename_alias;

pub use add_import::AddImport;
pub use rename_alias::RenameTypeAlias;
