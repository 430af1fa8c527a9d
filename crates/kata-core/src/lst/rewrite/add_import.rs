//! Insert an import directive, folding to a star import when the layout
//! style calls for it

use crate::lst::tree::{
    CompilationUnit, Expression, FieldAccess, Identifier, ImportDirective, Space,
};
use crate::style::ImportLayoutStyle;

/// Adds an import for a fully-qualified name if it is not already covered
///
/// Idempotent: an existing exact import or a star import of the same package
/// leaves the unit unchanged. Imports stay alphabetically ordered, and when
/// the number of single-name imports from one package reaches the style's
/// star-import threshold they fold into `package.*`.
#[derive(Debug, Clone)]
pub struct AddImport {
    pub qualified_name: String,
}

impl AddImport {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
        }
    }

    pub fn run(&self, mut cu: CompilationUnit, style: &ImportLayoutStyle) -> CompilationUnit {
        let package = self
            .qualified_name
            .rsplit_once('.')
            .map(|(p, _)| p.to_string());

        for import in &cu.imports {
            let existing = import.qualified_name();
            if existing == self.qualified_name {
                return cu;
            }
            if let Some(pkg) = &package
                && existing == format!("{pkg}.*")
            {
                return cu;
            }
        }

        if let Some(pkg) = &package {
            let same_package = cu
                .imports
                .iter()
                .filter(|i| is_single_name_from(&i.qualified_name(), pkg))
                .count();
            if same_package + 1 >= style.name_count_to_use_star_import {
                return fold_to_star(cu, pkg);
            }
        }

        let idx = cu
            .imports
            .partition_point(|i| i.qualified_name() < self.qualified_name);
        let prefix = if idx == 0 {
            if cu.package.is_some() {
                Space::new("\n\n")
            } else {
                Space::empty()
            }
        } else {
            Space::new("\n")
        };

        // The displaced former head drops to single-line separation
        if idx == 0
            && let Some(displaced) = cu.imports.first_mut()
            && displaced.prefix.whitespace.trim().is_empty()
        {
            displaced.prefix = Space::new("\n");
        }

        let was_empty = cu.imports.is_empty();
        cu.imports
            .insert(idx, build_import(&self.qualified_name, prefix));

        // A statement that used to lead the file needs a separator now
        if was_empty
            && let Some(first) = cu.statements.first_mut()
            && let Some(space) = statement_prefix_mut(first)
            && !space.whitespace.starts_with('\n')
            && space.whitespace.trim().is_empty()
        {
            *space = Space::new(format!("\n\n{}", space.whitespace));
        }
        cu
    }
}

fn is_single_name_from(qualified: &str, package: &str) -> bool {
    qualified
        .strip_prefix(package)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|name| !name.contains('.') && name != "*")
}

fn fold_to_star(mut cu: CompilationUnit, package: &str) -> CompilationUnit {
    let mut star_prefix = None;
    cu.imports.retain(|i| {
        if is_single_name_from(&i.qualified_name(), package) {
            if star_prefix.is_none() {
                star_prefix = Some(i.prefix.clone());
            }
            false
        } else {
            true
        }
    });
    let star = format!("{package}.*");
    let idx = cu.imports.partition_point(|i| i.qualified_name() < star);
    let prefix = star_prefix.unwrap_or_else(|| Space::new("\n"));
    cu.imports.insert(idx, build_import(&star, prefix));
    cu
}

fn build_import(qualified_name: &str, prefix: Space) -> ImportDirective {
    let mut segments = qualified_name.split('.');
    let first = segments.next().unwrap_or_default();
    let mut name = Expression::Identifier(Identifier::new(Space::new(" "), first, None));
    for segment in segments {
        name = Expression::FieldAccess(Box::new(FieldAccess {
            prefix: Space::empty(),
            target: Box::new(name),
            dot_prefix: Space::empty(),
            name: Identifier::new(Space::empty(), segment, None),
            ty: None,
        }));
    }
    ImportDirective {
        prefix,
        name,
        alias: None,
    }
}

fn statement_prefix_mut(statement: &mut crate::lst::tree::Statement) -> Option<&mut Space> {
    use crate::lst::tree::Statement;
    match statement {
        Statement::Property(p) => Some(&mut p.prefix),
        Statement::TypeAlias(t) => Some(&mut t.prefix),
        Statement::Class(c) => Some(&mut c.prefix),
        Statement::Expression(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_with_imports(names: &[&str]) -> CompilationUnit {
        let imports = names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                build_import(
                    n,
                    if i == 0 {
                        Space::empty()
                    } else {
                        Space::new("\n")
                    },
                )
            })
            .collect();
        CompilationUnit {
            package: None,
            imports,
            statements: vec![],
            eof: Space::new("\n"),
        }
    }

    #[test]
    fn inserts_in_alphabetical_order() {
        let cu = unit_with_imports(&["kotlin.collections.List", "kotlin.io.Closeable"]);
        let added = AddImport::new("kotlin.collections.Map")
            .run(cu, &ImportLayoutStyle::default());
        let names: Vec<String> = added.imports.iter().map(|i| i.qualified_name()).collect();
        assert_eq!(
            names,
            vec![
                "kotlin.collections.List",
                "kotlin.collections.Map",
                "kotlin.io.Closeable",
            ]
        );
        assert_eq!(
            added.print_source(),
            "import kotlin.collections.List\nimport kotlin.collections.Map\nimport kotlin.io.Closeable\n"
        );
    }

    #[test]
    fn adding_an_existing_import_is_a_no_op() {
        let cu = unit_with_imports(&["kotlin.collections.List"]);
        let before = cu.print_source();
        let added = AddImport::new("kotlin.collections.List")
            .run(cu, &ImportLayoutStyle::default());
        assert_eq!(added.print_source(), before);
    }

    #[test]
    fn star_import_covers_the_package() {
        let cu = unit_with_imports(&["kotlin.collections.*"]);
        let added = AddImport::new("kotlin.collections.Map")
            .run(cu, &ImportLayoutStyle::default());
        assert_eq!(added.imports.len(), 1);
    }

    #[test]
    fn folds_to_star_import_at_the_threshold() {
        let cu = unit_with_imports(&[
            "kotlin.collections.ArrayDeque",
            "kotlin.collections.List",
            "kotlin.collections.Map",
            "kotlin.collections.Set",
            "kotlin.io.Closeable",
        ]);
        let added = AddImport::new("kotlin.collections.MutableList")
            .run(cu, &ImportLayoutStyle::default());
        let names: Vec<String> = added.imports.iter().map(|i| i.qualified_name()).collect();
        assert_eq!(names, vec!["kotlin.collections.*", "kotlin.io.Closeable"]);
    }

    #[test]
    fn first_import_after_a_package_gets_a_blank_line() {
        let mut cu = unit_with_imports(&[]);
        cu.package = Some(crate::lst::tree::PackageDirective {
            prefix: Space::empty(),
            name: Expression::Identifier(Identifier::new(Space::new(" "), "demo", None)),
        });
        let added = AddImport::new("kotlin.io.Closeable")
            .run(cu, &ImportLayoutStyle::default());
        assert_eq!(
            added.print_source(),
            "package demo\n\nimport kotlin.io.Closeable\n"
        );
    }
}
