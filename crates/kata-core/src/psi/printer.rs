//! Diagnostic renderer for reconstructed source trees
//!
//! Produces a human-readable dump used in tests and debugging, never on a
//! production path: the source text with an offset ruler, the token listing,
//! and an indented tree with connector lines between siblings.

use crate::psi::tree::{NodeId, PsiTree};

const TAB: &str = "    ";
const ELEMENT_PREFIX: &str = "\\----";
const BRANCH_CONTINUE_CHAR: char = '|';
const BRANCH_END_CHAR: char = '\\';
const CONTENT_MAX_LENGTH: usize = 200;

/// Render the full diagnostic dump of a tree
pub fn print_psi_tree(tree: &PsiTree) -> String {
    let mut out = String::new();

    out.push_str("------------\n");
    out.push_str("Source code\n");
    out.push_str(&print_indexed_source(tree.source()));
    out.push('\n');

    out.push_str("------------\n");
    out.push_str("Tokens\n");
    for (i, token) in tree.tokens().iter().enumerate() {
        out.push_str(&format!("{i}: {token}\n"));
    }

    out.push_str("------------\n");
    out.push_str("Source tree\n");
    let mut printer = TreePrinter {
        tree,
        lines: Vec::new(),
    };
    if let Some(root) = tree.root() {
        printer.print_node(root, 1);
    }
    let rendered: Vec<String> = printer.lines.iter().map(|l| l.iter().collect()).collect();
    out.push_str(&rendered.join("\n"));
    out
}

/// Source text with a column ruler: beneath every 10th character the digit
/// `(count / 10) % 10` marks the running offset
fn print_indexed_source(source: &str) -> String {
    let mut count = 0usize;
    let mut result = String::new();
    for line in source.split('\n') {
        let mut ruler = String::new();
        for _ in line.chars() {
            count += 1;
            if count % 10 == 0 {
                ruler.push(char::from_digit(((count / 10) % 10) as u32, 10).unwrap());
            } else {
                ruler.push(' ');
            }
        }
        result.push_str(line);
        result.push('\n');
        result.push_str(&ruler);
        result.push('\n');
    }
    result
}

struct TreePrinter<'a> {
    tree: &'a PsiTree,
    lines: Vec<Vec<char>>,
}

impl TreePrinter<'_> {
    fn print_node(&mut self, id: NodeId, depth: usize) {
        let node = self.tree.node(id);
        let mut line = left_padding(depth);
        line.push_str(&format!(
            " {} | Type: {} | Text: \"{}\"",
            node.range,
            node.kind,
            truncate(self.tree.text_of(id)).replace('\n', "\\n")
        ));
        self.connect_to_latest_sibling(depth);
        self.lines.push(line.chars().collect());
        let children = node.children.clone();
        for child in children {
            self.print_node(child, depth + 1);
        }
    }

    /// Draw a vertical line connecting the current element to its preceding
    /// sibling at the same depth
    fn connect_to_latest_sibling(&mut self, depth: usize) {
        if depth <= 1 {
            return;
        }
        let pos = (depth - 1) * TAB.len();
        for i in (1..self.lines.len()).rev() {
            let line = &mut self.lines[i];
            if pos >= line.len() {
                break;
            }
            if line[pos] != ' ' {
                if line[pos] == BRANCH_END_CHAR {
                    line[pos] = BRANCH_CONTINUE_CHAR;
                }
                break;
            }
            line[pos] = BRANCH_CONTINUE_CHAR;
        }
    }
}

fn left_padding(depth: usize) -> String {
    let mut s = String::new();
    if depth > 1 {
        s.push_str(&TAB.repeat(depth - 1));
    }
    if depth > 0 {
        s.push_str(ELEMENT_PREFIX);
    }
    s
}

fn truncate(content: &str) -> String {
    if content.chars().count() > CONTENT_MAX_LENGTH {
        let cut: String = content.chars().take(CONTENT_MAX_LENGTH - 3).collect();
        format!("{cut}...")
    } else {
        content.to_string()
    }
}
