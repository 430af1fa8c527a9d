//! Error types for tree reconstruction and type mapping

use crate::psi::{KtSyntaxKind, SourceRange};
use thiserror::Error;

/// Main error type for KATA mapping operations
///
/// Every variant is fatal at this layer: the core is a library and the
/// calling framework decides whether to fail the parse, skip the file, or
/// surface a diagnostic. The variants split into two classes, precondition
/// violations (malformed external input) and not-yet-supported language
/// constructs; [`KataError::kind`] reports which class an error belongs to.
#[derive(Debug, Error)]
pub enum KataError {
    /// The first node handed to the reconstructor was not a FILE node
    #[error("the first node of the source tree is expected to be FILE, got {kind} at {range}")]
    RootNotFile { kind: KtSyntaxKind, range: SourceRange },

    /// No existing node contains the incoming node's range
    #[error("no anchor node found for {kind} at {range}")]
    AnchorNotFound { kind: KtSyntaxKind, range: SourceRange },

    /// A reconstruction gap contained a token other than an opening parenthesis
    #[error("unexpected {kind} token at {range} in reconstruction gap")]
    UnexpectedGapToken { kind: KtSyntaxKind, range: SourceRange },

    /// An opening parenthesis in a gap has no matching close within the gap
    #[error("no matching close parenthesis for the one at {open}")]
    UnmatchedParenthesis { open: SourceRange },

    /// An external AST node label did not map to any known syntax kind
    #[error("unknown syntax node kind label: {label}")]
    UnknownNodeKind { label: String },

    /// A builtin type id reached the primitive path without being a builtin
    #[error("unknown primitive type: {id}")]
    UnknownPrimitive { id: String },

    /// A descriptor was missing an owner the mapping requires
    #[error("missing owner resolving {name}")]
    MissingOwner { name: String },

    /// A supertype reference could not be classified as class or interface
    #[error("unclassifiable supertype of {class}")]
    UnclassifiableSupertype { class: String },

    /// A semantic descriptor shape the signature builder does not enumerate
    #[error("unsupported descriptor: {detail}")]
    UnsupportedDescriptor { detail: String },

    /// A syntax node kind the LST mapper does not implement yet
    #[error("unsupported syntax node {kind} at {range}")]
    UnsupportedSyntax { kind: KtSyntaxKind, range: SourceRange },

    /// The token stream disagreed with the node structure
    #[error("expected {expected} token, found {found} at {range}")]
    UnexpectedToken {
        expected: KtSyntaxKind,
        found: KtSyntaxKind,
        range: SourceRange,
    },

    /// A language construct the type mapper defers (nested classes,
    /// companion objects, synthetic members)
    #[error("unsupported language construct: {construct}")]
    Unsupported { construct: String },
}

/// Error class, mirroring the two failure classes of the mapping core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or unexpected external input
    Precondition,
    /// A construct the core is expected to grow support for
    NotYetSupported,
}

impl KataError {
    /// Get the error class for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            KataError::UnsupportedSyntax { .. }
            | KataError::Unsupported { .. } => ErrorKind::NotYetSupported,
            _ => ErrorKind::Precondition,
        }
    }

    /// Create an unsupported-construct error
    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self::Unsupported {
            construct: construct.into(),
        }
    }

    /// Create an unsupported-descriptor error
    pub fn unsupported_descriptor(detail: impl Into<String>) -> Self {
        Self::UnsupportedDescriptor {
            detail: detail.into(),
        }
    }
}
