use super::*;
use crate::morton::node;

// =========================================================================
// Batch 1: Storage Contract Tests
// =========================================================================

/// try_init reports insertion exactly once per code and layer.
#[test]
fn test_try_init_reports_insertion_once() {
  let mut octree = Octree::new(8);
  let code = node::encode(512, 0, 0);

  let (_, inserted) = octree.try_init(code, 1);
  assert!(inserted, "First init must insert");

  let (node, inserted) = octree.try_init(code, 1);
  assert!(!inserted, "Second init must find the existing node");
  node.set_child_active(3);

  assert!(octree.find(code, 1).is_some_and(|n| n.is_child_active(3)));
}

/// The same code on different layers names different nodes.
#[test]
fn test_layers_are_independent() {
  let mut octree = Octree::new(8);
  octree.try_init(0, 0);
  assert!(octree.find(0, 0).is_some());
  assert!(octree.find(0, 1).is_none());
  assert!(octree.find(0, 9).is_none(), "Layers below depth hold no nodes");
}

#[test]
fn test_erase_depth_node_drops_leaf() {
  let mut octree = Octree::new(8);
  let code = node::encode(4, 4, 4);
  octree.try_init(code, 8);
  let mut leaf = LeafMask::EMPTY;
  leaf.set(1, 1);
  octree.set_leaf(code, leaf);
  assert_eq!(octree.find(code, 8).map(Node::children), Some(0b10));

  assert!(octree.erase(code, 8).is_some());
  assert!(octree.leaf(code).is_empty());
  assert!(octree.is_empty());
}

#[test]
fn test_node_count_and_iter_order() {
  let mut octree = Octree::new(4);
  octree.try_init(node::encode(512, 512, 512), 1);
  octree.try_init(0, 0);
  octree.try_init(0, 1);

  assert_eq!(octree.node_count(), 3);
  let layers: Vec<_> = octree.iter().map(|(layer, _, _)| layer).collect();
  assert_eq!(layers, vec![0, 1, 1], "Coarsest layer first");

  octree.clear();
  assert!(octree.is_empty());
  assert!(octree.root().is_none());
}
