use super::*;
use crate::models::NodeKind;

#[test]
fn test_collect_dedupes_in_document_order() {
    let mut tree = NodeTree::new();
    let line = tree.get_child(tree.root(), 0).unwrap();
    let targets = ["b", "a", "b", "c", "a"];
    for (i, target) in targets.iter().enumerate() {
        let leaf = tree.create(NodeKind::Char('x'));
        tree.set_link(leaf, Some(Link::new(*target, *target)));
        tree.insert(line, i, leaf).unwrap();
    }
    let plain = tree.create(NodeKind::Char('y'));
    tree.insert(line, 0, plain).unwrap();

    let targets: Vec<_> = collect(&tree).iter().map(|l| l.target().to_string()).collect();
    assert_eq!(targets, ["b", "a", "c"]);
}
