//! Source tree reconstruction
//!
//! This module rebuilds a fully linked, whitespace-exact source tree from
//! two inputs: the raw Kotlin source text (lexed here into a gapless token
//! sequence) and the stream of lightweight nodes the external parser emits.
//! The external tree is lossy — most notably it elides parenthesized
//! expression wrappers — so reconstruction repairs those gaps from the raw
//! tokens. See [`tree::PsiTree`] for the algorithm.
//!
//! Everything here is synchronous and single-pass: the tree is built once,
//! then only read.

mod lexer;
mod source_range;
mod syntax_kind;

pub mod printer;
pub mod tree;

pub use lexer::{LexError, LexResult, Token, tokenize};
pub use printer::print_psi_tree;
pub use source_range::SourceRange;
pub use syntax_kind::KtSyntaxKind;
pub use tree::{LightNode, Node, NodeId, PsiTree};
