use arena_avl::AvlTree;

fn print_keys(tree: &AvlTree<u32, &str>) {
    println!("{:?}", tree.keys().collect::<Vec<_>>());
}

fn main() {
    // Set RUST_LOG=trace to see every rotation.
    env_logger::init();

    let mut tree = AvlTree::new();

    for (key, value) in [(2, "two"), (0, "zero"), (3, "three"), (4, "four"), (5, "five")] {
        tree.insert(key, value);
        tree.assert_invariants();
        print_keys(&tree);
    }

    tree.insert(1, "one");
    tree.insert(6, "six");
    tree.assert_invariants();
    print_keys(&tree);

    let zero = tree.pop_first().map(|(key, _)| key);
    assert_eq!(zero, Some(0));
    tree.assert_invariants();

    tree.remove(&3);
    tree.assert_invariants();
    println!("{tree:?}");

    let mut graph = String::new();
    match tree.dotgraph("demo", &mut graph) {
        Ok(()) => println!("{graph}"),
        Err(err) => eprintln!("failed to render tree: {err}"),
    }
}
