use pretty_assertions::assert_eq;
use proptest::prelude::*;
use scoped_env::keys::builtins::MyDataKey;
use scoped_env::{MyData, NodeId, Tree};

// Tree shape as parent indices: node i + 1 hangs under parents[i] % (i + 1).
fn build(parents: &[usize], sets: &[Option<i64>]) -> (Tree, Vec<NodeId>) {
    let mut tree = Tree::new("n0");
    let mut ids = vec![tree.root()];
    for (i, p) in parents.iter().enumerate() {
        let parent = ids[p % (i + 1)];
        ids.push(tree.add_child(parent, format!("n{}", i + 1)));
    }
    for (id, set) in ids.iter().zip(sets) {
        if let Some(age) = set {
            tree.set::<MyDataKey>(*id, MyData::new(format!("n{age}"), *age));
        }
    }
    (tree, ids)
}

// Nearest strict ancestor with a value, computed without the store.
fn expected(tree: &Tree, node: NodeId, ids: &[NodeId], sets: &[Option<i64>]) -> MyData {
    tree.ancestors(node)
        .skip(1)
        .find_map(|a| {
            let idx = ids.iter().position(|id| *id == a)?;
            sets.get(idx).copied().flatten()
        })
        .map(|age| MyData::new(format!("n{age}"), age))
        .unwrap_or_else(MyData::guest)
}

proptest! {
    #[test]
    fn resolve_is_nearest_strict_ancestor(
        parents in prop::collection::vec(0usize..64, 0..24),
        sets in prop::collection::vec(prop::option::of(0i64..100), 25),
    ) {
        let (tree, ids) = build(&parents, &sets);
        for id in &ids {
            prop_assert_eq!(tree.resolve::<MyDataKey>(*id), expected(&tree, *id, &ids, &sets));
            prop_assert_eq!(tree.environment(*id).get::<MyDataKey>(), tree.resolve::<MyDataKey>(*id));
        }
    }

    #[test]
    fn setting_never_changes_own_view(
        parents in prop::collection::vec(0usize..64, 1..16),
        pick in any::<prop::sample::Index>(),
        age in 0i64..100,
    ) {
        let (mut tree, ids) = build(&parents, &[]);
        let node = ids[pick.index(ids.len())];
        let before = tree.resolve::<MyDataKey>(node);
        tree.set::<MyDataKey>(node, MyData::new("late", age));
        prop_assert_eq!(tree.resolve::<MyDataKey>(node), before);
        for child in tree.children(node).to_vec() {
            prop_assert_eq!(tree.resolve::<MyDataKey>(child), MyData::new("late", age));
        }
    }
}

#[test]
fn alice_bob_guest_example() {
    let mut tree = Tree::new("root");
    let root = tree.root();
    let child = tree.add_child(root, "child");
    let grandchild = tree.add_child(child, "grandchild");
    let overrider = tree.add_child(root, "overrider");
    let other_grandchild = tree.add_child(overrider, "grandchild");
    tree.set::<MyDataKey>(root, MyData::new("Alice", 30));
    tree.set::<MyDataKey>(overrider, MyData::new("Bob", 35));

    let orphan_tree = Tree::new("alone");

    assert_eq!(tree.resolve::<MyDataKey>(child), MyData::new("Alice", 30));
    assert_eq!(tree.resolve::<MyDataKey>(grandchild), MyData::new("Alice", 30));
    assert_eq!(tree.resolve::<MyDataKey>(other_grandchild), MyData::new("Bob", 35));
    assert_eq!(tree.resolve::<MyDataKey>(overrider), MyData::new("Alice", 30));
    assert_eq!(orphan_tree.resolve::<MyDataKey>(orphan_tree.root()), MyData::new("Guest", 0));
}
