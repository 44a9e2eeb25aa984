//! Tree -> Markdown projection.
//!
//! Leaves are visited in document order while the scanner tracks the open
//! style tags, the open link and whether a math run is open. Markup is only
//! emitted at run boundaries, so adjacent leaves with equal attributes share
//! one pair of delimiters.

use crate::models::{Link, NodeId, NodeKind, NodeTree, Tag, TagSet};

const MATH_OPEN: &str = "$`";
const MATH_CLOSE: &str = "`$";

pub fn scan(tree: &NodeTree, title: &str) -> String {
    let mut scanner = MarkdownScanner::new(title);
    let last = tree.last_leaf(tree.root());
    for leaf in tree.leaves() {
        // The final end-of-line marker is implicit.
        if leaf == last && tree.kind(leaf) == Some(&NodeKind::Eol) {
            continue;
        }
        scanner.visit(tree, leaf);
    }
    scanner.finish()
}

struct MarkdownScanner {
    out: String,
    tags: TagSet,
    link: Option<Link>,
    in_math: bool,
}

impl MarkdownScanner {
    fn new(title: &str) -> Self {
        let mut out = String::with_capacity(title.len() + 64);
        out.push_str("# ");
        out.push_str(title);
        out.push('\n');
        Self {
            out,
            tags: TagSet::new(),
            link: None,
            in_math: false,
        }
    }

    fn visit(&mut self, tree: &NodeTree, leaf: NodeId) {
        let Some(node) = tree.get(leaf) else {
            return;
        };

        let math = tree.is_math(leaf);
        if math != self.in_math {
            self.close_tags();
            self.close_link();
            self.out.push_str(if math { MATH_OPEN } else { MATH_CLOSE });
            self.in_math = math;
        }

        // Math runs are emitted verbatim, without style or link markup.
        if !math {
            if node.link() != self.link.as_ref() {
                self.close_tags();
                self.close_link();
                if let Some(link) = node.link() {
                    self.out.push('[');
                    self.link = Some(link.clone());
                }
            }
            if node.tags() != &self.tags {
                self.close_tags();
                self.open_tags(node.tags().clone());
            }
        }

        match node.kind() {
            NodeKind::Char(c) => self.out.push(*c),
            NodeKind::MathSymbol(content) => {
                if content.chars().count() > 1 {
                    self.out.push('\\');
                }
                self.out.push_str(content);
            }
            NodeKind::Eol => self.out.push('\n'),
            NodeKind::Placeholder | NodeKind::Root | NodeKind::Line | NodeKind::MathList => {}
        }
    }

    fn open_tags(&mut self, tags: TagSet) {
        for tag in &tags {
            self.out.push_str(tag.marker());
        }
        self.tags = tags;
    }

    fn close_tags(&mut self) {
        let tags = std::mem::take(&mut self.tags);
        for tag in tags.iter().rev() {
            self.out.push_str(Tag::marker(*tag));
        }
    }

    fn close_link(&mut self) {
        if let Some(link) = self.link.take() {
            self.out.push_str("](");
            self.out.push_str(link.target());
            self.out.push(')');
        }
    }

    fn finish(mut self) -> String {
        self.close_tags();
        self.close_link();
        if self.in_math {
            self.out.push_str(MATH_CLOSE);
        }
        self.out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/markdown.rs"]
mod tests;
