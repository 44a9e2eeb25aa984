use super::*;
use crate::models::LeafData;

struct Builder {
    tree: NodeTree,
    line: NodeId,
}

impl Builder {
    fn new() -> Self {
        let tree = NodeTree::new();
        let line = tree.get_child(tree.root(), 0).unwrap();
        Self { tree, line }
    }

    fn push(&mut self, c: char, tags: &[Tag], link: Option<&str>) -> &mut Self {
        let data = LeafData {
            kind: NodeKind::Char(c),
            tags: tags.iter().copied().collect(),
            link: link.map(|target| Link::new(target, target)),
        };
        let leaf = self.tree.create_leaf(data);
        let index = self.tree.child_count(self.line) - 1;
        self.tree.insert(self.line, index, leaf).unwrap();
        self
    }

    fn text(&mut self, text: &str) -> &mut Self {
        for c in text.chars() {
            self.push(c, &[], None);
        }
        self
    }

    fn math(&mut self, symbols: &[&str]) -> &mut Self {
        let list = self.tree.create_math_list();
        let index = self.tree.child_count(self.line) - 1;
        self.tree.insert(self.line, index, list).unwrap();
        for (i, symbol) in symbols.iter().enumerate() {
            let leaf = self.tree.create(NodeKind::MathSymbol((*symbol).into()));
            self.tree.insert(list, i, leaf).unwrap();
        }
        self
    }

    fn new_line(&mut self) -> &mut Self {
        let line = self.tree.create_line();
        self.tree.append(self.tree.root(), line).unwrap();
        self.line = line;
        self
    }

    fn markdown(&self, title: &str) -> String {
        scan(&self.tree, title)
    }
}

#[test]
fn test_empty_document_is_just_the_title() {
    assert_eq!(Builder::new().markdown("t"), "# t\n");
}

#[test]
fn test_plain_text_has_no_markup() {
    let mut b = Builder::new();
    b.text("abc");
    assert_eq!(b.markdown("t"), "# t\nabc");
}

#[test]
fn test_only_the_final_eol_is_dropped() {
    let mut b = Builder::new();
    b.text("a").new_line().text("b").new_line();
    assert_eq!(b.markdown(""), "# \na\nb\n");
}

#[test]
fn test_style_runs_share_delimiters() {
    let mut b = Builder::new();
    b.text("a")
        .push('b', &[Tag::Bold], None)
        .push('c', &[Tag::Bold], None)
        .text("d");
    assert_eq!(b.markdown(""), "# \na**bc**d");
}

#[test]
fn test_style_change_closes_then_reopens() {
    let mut b = Builder::new();
    b.push('x', &[Tag::Bold, Tag::Italic], None)
        .push('y', &[Tag::Italic], None);
    assert_eq!(b.markdown(""), "# \n***x****y*");
}

#[test]
fn test_links_wrap_their_run() {
    let mut b = Builder::new();
    b.text("a")
        .push('l', &[], Some("t1"))
        .push('m', &[], Some("t1"))
        .text("b");
    assert_eq!(b.markdown(""), "# \na[lm](t1)b");
}

#[test]
fn test_adjacent_links_are_separate() {
    let mut b = Builder::new();
    b.push('x', &[], Some("A")).push('y', &[], Some("B"));
    assert_eq!(b.markdown(""), "# \n[x](A)[y](B)");
}

#[test]
fn test_styles_close_inside_the_link() {
    let mut b = Builder::new();
    b.push('x', &[Tag::Bold], Some("A")).text("y");
    assert_eq!(b.markdown(""), "# \n[**x**](A)y");
}

#[test]
fn test_math_run_is_delimited() {
    let mut b = Builder::new();
    b.text("a").math(&["alpha", "x"]).text("b");
    assert_eq!(b.markdown(""), "# \na$`\\alphax`$b");
}

#[test]
fn test_math_at_document_end_is_closed() {
    let mut b = Builder::new();
    b.math(&["β"]);
    assert_eq!(b.markdown(""), "# \n$`β`$");
}
