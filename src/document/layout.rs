//! Greedy word-wrap layout.
//!
//! Produces a box tree `Vertical -> Horizontal (one per display line) ->
//! glyph boxes`. Words are never broken: a word that does not fit on the
//! current display line starts a new one, and a word wider than the whole
//! line sits alone on its own display line.

use crate::config::EditorConfig;
use crate::models::symbols;
use crate::models::{NodeId, NodeKind, NodeTree};

use super::metrics::{GlyphExtents, GlyphMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum BoxKind {
    Vertical,
    Horizontal,
    Glyph(char),
    /// Zero-size box for end-of-line markers and placeholders.
    Empty,
    /// Fixed-height insert marker placed before the cursor leaf's box.
    Caret,
}

#[derive(Debug, Clone)]
pub struct LayoutBox {
    pub kind: BoxKind,
    /// Offset from the parent box.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub left: f32,
    pub top: f32,
    pub node: Option<NodeId>,
    parent: Option<BoxId>,
    children: Vec<BoxId>,
}

impl LayoutBox {
    fn new(kind: BoxKind, extents: GlyphExtents, node: Option<NodeId>) -> Self {
        Self {
            kind,
            x: 0.0,
            y: 0.0,
            width: extents.width,
            height: extents.height,
            left: extents.left,
            top: extents.top,
            node,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<BoxId> {
        self.parent
    }

    pub fn children(&self) -> &[BoxId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    boxes: Vec<LayoutBox>,
    caret: Option<BoxId>,
}

impl Layout {
    const ROOT: BoxId = BoxId(0);

    fn new() -> Self {
        Self {
            boxes: vec![LayoutBox::new(BoxKind::Vertical, GlyphExtents::default(), None)],
            caret: None,
        }
    }

    pub fn root(&self) -> BoxId {
        Self::ROOT
    }

    pub fn get(&self, id: BoxId) -> Option<&LayoutBox> {
        self.boxes.get(id.0)
    }

    pub fn children(&self, id: BoxId) -> &[BoxId] {
        self.get(id).map(|b| b.children()).unwrap_or(&[])
    }

    pub fn width(&self) -> f32 {
        self.boxes[Self::ROOT.0].width
    }

    pub fn height(&self) -> f32 {
        self.boxes[Self::ROOT.0].height
    }

    pub fn caret(&self) -> Option<BoxId> {
        self.caret
    }

    pub fn display_lines(&self) -> &[BoxId] {
        self.children(Self::ROOT)
    }

    /// Boxes that stand for a tree leaf, in document order.
    pub fn node_boxes(&self) -> impl Iterator<Item = (NodeId, BoxId)> + '_ {
        self.boxes
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.node.map(|node| (node, BoxId(i))))
    }

    /// Display-line text, mostly useful for inspection.
    pub fn line_text(&self, line: BoxId) -> String {
        self.children(line)
            .iter()
            .filter_map(|&b| match self.get(b)?.kind {
                BoxKind::Glyph(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, parent: BoxId, mut layout_box: LayoutBox) -> BoxId {
        let id = BoxId(self.boxes.len());
        layout_box.parent = Some(parent);
        self.boxes.push(layout_box);
        self.boxes[parent.0].children.push(id);
        id
    }

    /// Position of `id` relative to the root box.
    pub fn xy_of(&self, id: BoxId) -> (f32, f32) {
        let (mut x, mut y) = (0.0, 0.0);
        let mut current = self.get(id);
        while let Some(b) = current {
            if b.parent.is_none() {
                break;
            }
            x += b.x;
            y += b.y;
            current = b.parent.and_then(|p| self.get(p));
        }
        (x, y)
    }

    pub fn display_line_of(&self, id: BoxId) -> Option<usize> {
        let mut current = id;
        loop {
            let parent = self.get(current)?.parent?;
            if parent == Self::ROOT {
                return self.display_lines().iter().position(|&l| l == current);
            }
            current = parent;
        }
    }

    /// Leaf node under the point, clamping the point into the layout.
    pub fn node_at_xy(&self, x: f32, y: f32) -> Option<NodeId> {
        let (mut x, mut y) = (x.clamp(0.0, self.width()), y.max(0.0));
        if y > self.height() {
            (x, y) = (self.width(), self.height());
        }

        let lines = self.display_lines();
        let line = lines
            .iter()
            .copied()
            .find(|&l| self.get(l).is_some_and(|b| y < b.y + b.height))
            .or_else(|| lines.last().copied())?;
        self.node_in_line_at_x(line, x)
    }

    /// The leaf whose gap is nearest to `x`: a point on the right half of a
    /// glyph resolves to the leaf after it.
    pub fn node_in_line_at_x(&self, line: BoxId, x: f32) -> Option<NodeId> {
        let mut last = None;
        for &child in self.children(line) {
            let Some(b) = self.get(child) else { continue };
            let Some(node) = b.node else { continue };
            if x < b.x + b.width / 2.0 {
                return Some(node);
            }
            last = Some(node);
        }
        last
    }
}

pub struct Layouter<'a> {
    config: &'a EditorConfig,
    metrics: &'a dyn GlyphMetrics,
    cursor: Option<NodeId>,
    layout: Layout,
    current_line: BoxId,
    word: Vec<(NodeId, char)>,
}

impl<'a> Layouter<'a> {
    pub fn new(config: &'a EditorConfig, metrics: &'a dyn GlyphMetrics) -> Self {
        Self {
            config,
            metrics,
            cursor: None,
            layout: Layout::new(),
            current_line: Layout::ROOT,
            word: Vec::new(),
        }
    }

    pub fn with_cursor(mut self, cursor: NodeId) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn layout(mut self, tree: &NodeTree) -> Layout {
        for &line in tree.children(tree.root()) {
            self.start_new_display_line();
            for leaf in tree.descendants(line).filter(|&id| tree.is_leaf(id)) {
                self.visit_leaf(tree, leaf);
            }
            self.flush_word();
        }
        self.finish()
    }

    fn visit_leaf(&mut self, tree: &NodeTree, leaf: NodeId) {
        let Some(kind) = tree.kind(leaf) else {
            return;
        };
        match kind {
            NodeKind::Char(c) if c.is_whitespace() => {
                self.flush_word();
                let extents = self.metrics.char_extents(*c);
                self.add_box(LayoutBox::new(BoxKind::Glyph(*c), extents, Some(leaf)));
            }
            NodeKind::Char(c) => self.word.push((leaf, *c)),
            NodeKind::MathSymbol(content) => {
                let glyph = symbols::glyph_for_content(content)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                self.word.push((leaf, glyph));
            }
            NodeKind::Eol | NodeKind::Placeholder => {
                self.flush_word();
                self.add_box(LayoutBox::new(
                    BoxKind::Empty,
                    GlyphExtents::default(),
                    Some(leaf),
                ));
            }
            NodeKind::Root | NodeKind::Line | NodeKind::MathList => {}
        }
    }

    fn flush_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let word = std::mem::take(&mut self.word);
        let text: String = word.iter().map(|(_, c)| *c).collect();
        let extents = self.metrics.text_extents(&text);
        let total_width: f32 = extents.iter().map(|e| e.width).sum();

        if self.line_has_content()
            && self.line_width() + total_width > self.config.max_line_width
        {
            self.start_new_display_line();
        }

        for ((node, c), extents) in word.into_iter().zip(extents) {
            self.add_box(LayoutBox::new(BoxKind::Glyph(c), extents, Some(node)));
        }
    }

    fn start_new_display_line(&mut self) {
        let line = LayoutBox::new(BoxKind::Horizontal, GlyphExtents::default(), None);
        self.current_line = self.layout.push(Layout::ROOT, line);
    }

    fn line_width(&self) -> f32 {
        self.layout.boxes[self.current_line.0].width
    }

    fn line_has_content(&self) -> bool {
        self.layout
            .children(self.current_line)
            .iter()
            .any(|&b| self.layout.get(b).is_some_and(|b| b.node.is_some()))
    }

    fn add_box(&mut self, layout_box: LayoutBox) {
        if layout_box.node.is_some() && layout_box.node == self.cursor {
            let caret = LayoutBox::new(
                BoxKind::Caret,
                GlyphExtents {
                    width: 0.0,
                    height: self.config.caret_height,
                    left: 0.0,
                    top: self.config.caret_top,
                },
                None,
            );
            self.layout.caret = Some(self.append_to_line(caret));
        }
        self.append_to_line(layout_box);
    }

    fn append_to_line(&mut self, mut layout_box: LayoutBox) -> BoxId {
        let line = self.current_line;
        let line_box = &mut self.layout.boxes[line.0];
        layout_box.x = line_box.width;
        line_box.width += layout_box.width;
        line_box.height = line_box.height.max(layout_box.height);
        self.layout.push(line, layout_box)
    }

    fn finish(mut self) -> Layout {
        let min_height = self.config.min_line_height;
        let mut y = 0.0f32;
        let mut width = self.config.max_line_width;
        let lines = self.layout.display_lines().to_vec();
        for line in lines {
            let line_box = &mut self.layout.boxes[line.0];
            line_box.height = line_box.height.max(min_height);
            line_box.y = y;
            y += line_box.height;
            width = width.max(line_box.width);
        }
        let root = &mut self.layout.boxes[Layout::ROOT.0];
        root.width = width;
        root.height = y;
        self.layout
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/layout.rs"]
mod tests;
