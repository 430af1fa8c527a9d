//! KATA core
//!
//! Lossless Kotlin syntax trees with resolved type attribution. The crate
//! turns raw source text plus the artifacts of an external compiler frontend
//! (a lightweight AST and a resolved symbol graph) into an immutable,
//! formatting-preserving tree whose nodes carry interned semantic types, and
//! provides the rewriting primitives built on that tree.
//!
//! The pipeline:
//!
//! - [`psi`] lexes the source into a gapless token stream and reconstructs a
//!   fully linked source tree from the external AST, repairing elided
//!   parenthesis nodes from raw tokens.
//! - [`types`] signs semantic descriptors into deterministic strings and
//!   interns a stable type model keyed by them, with reference identity for
//!   equal signatures.
//! - [`lst`] maps the reconstructed tree into the lossless syntax tree,
//!   attributing nodes through the type mapper, and hosts the visitor and
//!   rewrites.
//! - [`style`] carries the opaque style configuration the rewrites consult.

pub mod error;
pub mod lst;
pub mod psi;
pub mod result;
pub mod style;
pub mod types;

pub use error::{ErrorKind, KataError};
pub use lst::{CompilationUnit, LstMapper, LstVisitor, TypeAttribution};
pub use psi::{KtSyntaxKind, PsiTree, SourceRange};
pub use result::Result;
pub use types::{SemanticModel, TypeId, TypeMapper, TypeStore};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kata=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
