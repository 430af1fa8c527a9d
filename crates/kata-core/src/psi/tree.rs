//! Source tree reconstruction from an external lightweight AST
//!
//! The external parser emits lightweight nodes (offset range + kind label)
//! one at a time, ancestors before descendants, each with its direct children
//! attached. [`PsiTree`] rebuilds a fully linked tree from that stream and
//! repairs the one observed form of node elision: parenthesized-expression
//! wrappers dropped by the external AST are re-synthesized from raw tokens.
//!
//! Node ownership is strictly root-to-leaf through an arena; parent links are
//! plain arena ids, so the tree has no ownership cycles. A node's identity
//! for lookup purposes is its `(range, kind)` pair alone — the reconstruction
//! needs to recognize "this is the node I already have" before children are
//! attached, so children and parent deliberately do not participate.

use tracing::{debug, trace};

use crate::error::KataError;
use crate::psi::lexer::{LexError, Token, tokenize};
use crate::psi::{KtSyntaxKind, SourceRange};
use crate::result::Result;

/// Arena id of a reconstructed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A reconstructed tree node
///
/// Children stay sorted by `(start, end)`; sibling ranges never overlap by
/// construction.
#[derive(Debug)]
pub struct Node {
    pub range: SourceRange,
    pub kind: KtSyntaxKind,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

/// A lightweight node of the external AST, in the external tree's own
/// coordinate space
///
/// Offsets are translated to absolute source offsets on ingestion:
/// `child_absolute = child.start - subtree.start + subtree_absolute_start`.
#[derive(Debug, Clone)]
pub struct LightNode {
    pub start: usize,
    pub end: usize,
    pub kind_label: String,
    pub children: Vec<LightNode>,
}

impl LightNode {
    pub fn new(start: usize, end: usize, kind_label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            kind_label: kind_label.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<LightNode>) -> Self {
        self.children = children;
        self
    }
}

/// The reconstructed source tree: source text, token sequence, node arena
#[derive(Debug)]
pub struct PsiTree {
    source: String,
    tokens: Vec<Token>,
    lex_errors: Vec<LexError>,
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl PsiTree {
    /// Lex `source` and prepare an empty tree
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let (tokens, lex_errors) = tokenize(&source);
        Self {
            source,
            tokens,
            lex_errors,
            nodes: Vec::new(),
            root: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn lex_errors(&self) -> &[LexError] {
        &self.lex_errors
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Slice of the source covered by a node
    pub fn text_of(&self, id: NodeId) -> &str {
        let range = self.nodes[id.index()].range;
        &self.source[range.start()..range.end()]
    }

    /// Index of the token covering `offset`
    pub fn token_at(&self, offset: usize) -> Option<usize> {
        let idx = self.tokens.partition_point(|t| t.range.start() <= offset);
        if idx == 0 {
            return None;
        }
        let candidate = idx - 1;
        self.tokens[candidate].range.covers(offset).then_some(candidate)
    }

    /// Ingest one external AST node together with its direct children
    ///
    /// `absolute_start` is the subtree's absolute position in the source; the
    /// node's own offsets are in the external tree's coordinate space and are
    /// corrected against it. Returns the id of the node now holding this
    /// range and kind (a pre-existing node in the merge case).
    pub fn add_element(&mut self, element: &LightNode, absolute_start: usize) -> Result<NodeId> {
        let base = element.start;
        let range = SourceRange::new(
            element.start - base + absolute_start,
            element.end - base + absolute_start,
        );
        let kind = resolve_kind(&element.kind_label)?;
        debug!(%range, %kind, "adding source element");

        let target = self.add_node(range, kind)?;
        for child in &element.children {
            let child_range = SourceRange::new(
                child.start - base + absolute_start,
                child.end - base + absolute_start,
            );
            let child_kind = resolve_kind(&child.kind_label)?;
            self.attach_child(target, child_range, child_kind);
        }
        self.sort_children(target);
        Ok(target)
    }

    /// Insert a single `(range, kind)` node, reconciling it against the
    /// existing tree
    fn add_node(&mut self, range: SourceRange, kind: KtSyntaxKind) -> Result<NodeId> {
        let Some(root) = self.root else {
            // The first node is the root and must be a FILE node
            if kind != KtSyntaxKind::File {
                return Err(KataError::RootNotFile { kind, range });
            }
            let id = self.alloc(range, kind, None);
            self.root = Some(id);
            return Ok(id);
        };

        let anchor = self
            .find_anchor(range, kind, root)
            .ok_or(KataError::AnchorNotFound { kind, range })?;
        let anchor_node = &self.nodes[anchor.index()];

        if anchor_node.range == range && anchor_node.kind == kind {
            // Same (range, kind): merge instead of inserting a duplicate
            trace!(%range, %kind, "merging into existing node");
            return Ok(anchor);
        }

        let parent = self.repair_gaps(anchor, range)?;
        let id = self.alloc(range, kind, Some(parent));
        self.nodes[parent.index()].children.push(id);
        self.sort_children(parent);
        Ok(id)
    }

    /// Deepest existing node whose range contains (or equals) the incoming
    /// range, preferring a child that still contains it over the current
    /// candidate
    fn find_anchor(
        &self,
        range: SourceRange,
        kind: KtSyntaxKind,
        current: NodeId,
    ) -> Option<NodeId> {
        let node = &self.nodes[current.index()];
        if node.range == range && node.kind == kind {
            return Some(current);
        }
        if node.range == range || node.range.include_range(&range) {
            for &child in &node.children {
                if let Some(found) = self.find_anchor(range, kind, child) {
                    return Some(found);
                }
            }
            return Some(current);
        }
        None
    }

    /// Re-synthesize parenthesis wrappers elided between `anchor` and the
    /// incoming range
    ///
    /// Scans the left gap (anchor start to range start) left to right. Every
    /// non-whitespace token there must be an opening parenthesis and must
    /// pair with a close parenthesis found scanning the right gap (range end
    /// to anchor end) right to left; the right scan never descends below the
    /// right gap's first token. Each pair becomes a PARENTHESIS node holding
    /// the two paren tokens as leaf children and replaces the anchor for
    /// whatever is inserted next, so nested layers stack naturally. Anything
    /// else in a gap means the external AST elided something this repair does
    /// not understand, which is fatal.
    fn repair_gaps(&mut self, anchor: NodeId, range: SourceRange) -> Result<NodeId> {
        let anchor_range = self.nodes[anchor.index()].range;

        // Gap boundaries clamp to the nearest already-reconstructed siblings;
        // with no siblings they are exactly the anchor's own bounds.
        let mut left_boundary = anchor_range.start();
        let mut right_boundary = anchor_range.end();
        for &child in &self.nodes[anchor.index()].children {
            let r = self.nodes[child.index()].range;
            if r.end() <= range.start() {
                left_boundary = left_boundary.max(r.end());
            }
            if r.start() >= range.end() {
                right_boundary = right_boundary.min(r.start());
            }
        }

        let mut left = self
            .tokens
            .partition_point(|t| t.range.start() < left_boundary);
        // First token of the right gap; the close-paren scan stops here
        let right_gap_start =
            self.tokens.partition_point(|t| t.range.start() < range.end()) as isize;
        let mut right =
            self.tokens.partition_point(|t| t.range.end() <= right_boundary) as isize - 1;

        let mut current = anchor;
        while left < self.tokens.len() && self.tokens[left].range.start() < range.start() {
            let open = &self.tokens[left];
            if open.kind.is_whitespace() {
                left += 1;
                continue;
            }
            if open.kind != KtSyntaxKind::LParen {
                return Err(KataError::UnexpectedGapToken {
                    kind: open.kind,
                    range: open.range,
                });
            }
            let open_range = open.range;

            let close_range = loop {
                if right < right_gap_start {
                    return Err(KataError::UnmatchedParenthesis { open: open_range });
                }
                let close = &self.tokens[right as usize];
                if close.kind.is_whitespace() {
                    right -= 1;
                    continue;
                }
                if close.kind != KtSyntaxKind::RParen {
                    return Err(KataError::UnexpectedGapToken {
                        kind: close.kind,
                        range: close.range,
                    });
                }
                break close.range;
            };

            trace!(open = %open_range, close = %close_range, "synthesizing parenthesis node");
            let paren_range = SourceRange::new(open_range.start(), close_range.end());
            let paren = self.alloc(paren_range, KtSyntaxKind::Parenthesis, Some(current));
            let lpar = self.alloc(open_range, KtSyntaxKind::LParen, Some(paren));
            let rpar = self.alloc(close_range, KtSyntaxKind::RParen, Some(paren));
            self.nodes[paren.index()].children.push(lpar);
            self.nodes[paren.index()].children.push(rpar);
            self.nodes[current.index()].children.push(paren);
            self.sort_children(current);

            current = paren;
            left += 1;
            right -= 1;
        }
        Ok(current)
    }

    /// Attach a direct child, merging when an identical `(range, kind)` child
    /// already exists
    fn attach_child(&mut self, parent: NodeId, range: SourceRange, kind: KtSyntaxKind) {
        let exists = self.nodes[parent.index()]
            .children
            .iter()
            .any(|&c| self.nodes[c.index()].range == range && self.nodes[c.index()].kind == kind);
        if exists {
            return;
        }
        let id = self.alloc(range, kind, Some(parent));
        self.nodes[parent.index()].children.push(id);
    }

    fn sort_children(&mut self, parent: NodeId) {
        let mut children = std::mem::take(&mut self.nodes[parent.index()].children);
        children.sort_by_key(|&id| {
            let r = self.nodes[id.index()].range;
            (r.start(), r.end())
        });
        self.nodes[parent.index()].children = children;
    }

    fn alloc(&mut self, range: SourceRange, kind: KtSyntaxKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            range,
            kind,
            children: Vec::new(),
            parent,
        });
        id
    }

    /// Leaf nodes in source order
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.collect_leaves(root, &mut out);
        }
        out
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let node = &self.nodes[id.index()];
        if node.children.is_empty() {
            out.push(id);
            return;
        }
        for &child in &node.children {
            self.collect_leaves(child, out);
        }
    }
}

fn resolve_kind(label: &str) -> Result<KtSyntaxKind> {
    KtSyntaxKind::from_label(label).ok_or_else(|| KataError::UnknownNodeKind {
        label: label.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(start: usize, end: usize, label: &str) -> LightNode {
        LightNode::new(start, end, label)
    }

    #[test]
    fn first_node_must_be_file() {
        let mut tree = PsiTree::new("val a = 1");
        let err = tree.add_element(&light(0, 9, "PROPERTY"), 0).unwrap_err();
        assert!(matches!(err, KataError::RootNotFile { .. }));
    }

    #[test]
    fn unknown_kind_label_is_a_single_error_path() {
        let mut tree = PsiTree::new("val a = 1");
        tree.add_element(&light(0, 9, "FILE"), 0).unwrap();
        let err = tree
            .add_element(&light(0, 9, "SCRIPT_INITIALIZER"), 0)
            .unwrap_err();
        assert!(matches!(err, KataError::UnknownNodeKind { .. }));
    }

    #[test]
    fn children_arrive_with_offset_correction() {
        let source = "val a = 1";
        let mut tree = PsiTree::new(source);
        tree.add_element(&light(0, 9, "FILE"), 0).unwrap();

        // The external subtree for the property uses its own coordinate
        // space starting at 100
        let property = light(100, 109, "PROPERTY").with_children(vec![
            light(100, 103, "val"),
            light(104, 105, "IDENTIFIER"),
            light(106, 107, "EQ"),
            light(108, 109, "INTEGER_CONSTANT"),
        ]);
        let id = tree.add_element(&property, 0).unwrap();

        let node = tree.node(id);
        assert_eq!(node.range, SourceRange::new(0, 9));
        assert_eq!(node.kind, KtSyntaxKind::Property);
        let texts: Vec<_> = node
            .children
            .iter()
            .map(|&c| tree.text_of(c))
            .collect();
        assert_eq!(texts, vec!["val", "a", "=", "1"]);
    }

    #[test]
    fn identical_node_merges_instead_of_duplicating() {
        let source = "val a = 1";
        let mut tree = PsiTree::new(source);
        let file = light(0, 9, "FILE").with_children(vec![light(0, 9, "PROPERTY")]);
        tree.add_element(&file, 0).unwrap();

        let property = light(0, 9, "PROPERTY").with_children(vec![
            light(0, 3, "val"),
            light(4, 5, "IDENTIFIER"),
            light(6, 7, "EQ"),
            light(8, 9, "INTEGER_CONSTANT"),
        ]);
        tree.add_element(&property, 0).unwrap();

        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).children.len(), 1);
        let prop = tree.node(root).children[0];
        assert_eq!(tree.node(prop).children.len(), 4);
    }

    #[test]
    fn reconstruction_round_trip_covers_the_source() {
        let source = "val a = 1";
        let mut tree = PsiTree::new(source);
        let file = light(0, 9, "FILE").with_children(vec![light(0, 9, "PROPERTY")]);
        tree.add_element(&file, 0).unwrap();
        let property = light(0, 9, "PROPERTY").with_children(vec![
            light(0, 3, "val"),
            light(3, 4, "WHITE_SPACE"),
            light(4, 5, "IDENTIFIER"),
            light(5, 6, "WHITE_SPACE"),
            light(6, 7, "EQ"),
            light(7, 8, "WHITE_SPACE"),
            light(8, 9, "INTEGER_CONSTANT"),
        ]);
        tree.add_element(&property, 0).unwrap();

        let rebuilt: String = tree
            .leaves()
            .iter()
            .map(|&leaf| tree.text_of(leaf))
            .collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn parenthesis_gap_repair_synthesizes_a_wrapper() {
        let source = "( 1.plus(2)+2 )";
        let mut tree = PsiTree::new(source);
        tree.add_element(&light(0, 15, "FILE"), 0).unwrap();

        // The external AST elided the parenthesized wrapper: the binary
        // expression's range excludes the surrounding parens.
        let inner = light(2, 13, "BINARY_EXPRESSION").with_children(vec![
            light(2, 11, "DOT_QUALIFIED_EXPRESSION"),
            light(11, 12, "OPERATION_REFERENCE"),
            light(12, 13, "INTEGER_CONSTANT"),
        ]);
        let inner_id = tree.add_element(&inner, 0).unwrap();

        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).children.len(), 1);
        let paren = tree.node(root).children[0];
        assert_eq!(tree.node(paren).kind, KtSyntaxKind::Parenthesis);
        assert_eq!(tree.node(paren).range, SourceRange::new(0, 15));
        assert_eq!(tree.node(inner_id).parent, Some(paren));

        // Children of the synthesized node: `(`, inner expression, `)`
        let kinds: Vec<_> = tree
            .node(paren)
            .children
            .iter()
            .map(|&c| tree.node(c).kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                KtSyntaxKind::LParen,
                KtSyntaxKind::BinaryExpression,
                KtSyntaxKind::RParen,
            ]
        );
    }

    #[test]
    fn nested_parenthesis_layers_stack() {
        let source = "((1))";
        let mut tree = PsiTree::new(source);
        tree.add_element(&light(0, 5, "FILE"), 0).unwrap();
        let inner_id = tree.add_element(&light(2, 3, "INTEGER_CONSTANT"), 0).unwrap();

        let root = tree.root().unwrap();
        let outer = tree.node(root).children[0];
        assert_eq!(tree.node(outer).kind, KtSyntaxKind::Parenthesis);
        assert_eq!(tree.node(outer).range, SourceRange::new(0, 5));

        let inner_paren = tree
            .node(outer)
            .children
            .iter()
            .copied()
            .find(|&c| tree.node(c).kind == KtSyntaxKind::Parenthesis)
            .unwrap();
        assert_eq!(tree.node(inner_paren).range, SourceRange::new(1, 4));
        assert_eq!(tree.node(inner_id).parent, Some(inner_paren));
    }

    #[test]
    fn non_parenthesis_gap_token_is_fatal() {
        let source = "[ 1 ]";
        let mut tree = PsiTree::new(source);
        tree.add_element(&light(0, 5, "FILE"), 0).unwrap();
        let err = tree
            .add_element(&light(2, 3, "INTEGER_CONSTANT"), 0)
            .unwrap_err();
        assert!(matches!(err, KataError::UnexpectedGapToken { .. }));
    }

    #[test]
    fn unmatched_open_parenthesis_is_fatal() {
        let source = "( 1";
        let mut tree = PsiTree::new(source);
        tree.add_element(&light(0, 3, "FILE"), 0).unwrap();
        let err = tree
            .add_element(&light(2, 3, "INTEGER_CONSTANT"), 0)
            .unwrap_err();
        assert!(matches!(err, KataError::UnmatchedParenthesis { .. }));
    }

    #[test]
    fn children_stay_sorted_by_range() {
        let source = "val a = 1\nval b = 2";
        let mut tree = PsiTree::new(source);
        // Children deliberately listed out of source order
        let file = light(0, 19, "FILE").with_children(vec![
            light(10, 19, "PROPERTY"),
            light(9, 10, "WHITE_SPACE"),
            light(0, 9, "PROPERTY"),
        ]);
        tree.add_element(&file, 0).unwrap();

        let root = tree.root().unwrap();
        let starts: Vec<_> = tree
            .node(root)
            .children
            .iter()
            .map(|&c| tree.node(c).range.start())
            .collect();
        assert_eq!(starts, vec![0, 9, 10]);
    }
}
