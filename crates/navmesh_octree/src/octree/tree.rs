//! One sparse octree: a morton-keyed map per layer plus packed leaves.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::leaf::LeafMask;
use super::node::Node;
use crate::constants::Layer;
use crate::morton::NodeMorton;

/// Sparse octree with node records on layers `0..=depth`.
///
/// Every node on the depth layer owns a [`LeafMask`] holding the next two
/// layers. The depth is the only resolution parameter, so the static and
/// dynamic octrees of a chunk are the same type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Octree {
	depth: Layer,
	layers: Vec<BTreeMap<NodeMorton, Node>>,
	leaves: BTreeMap<NodeMorton, LeafMask>,
}

impl Octree {
	pub fn new(depth: Layer) -> Self {
		Self {
			depth,
			layers: vec![BTreeMap::new(); depth as usize + 1],
			leaves: BTreeMap::new(),
		}
	}

	/// Layer holding the leaf masks.
	#[inline]
	pub fn depth(&self) -> Layer {
		self.depth
	}

	#[inline]
	pub fn find(&self, code: NodeMorton, layer: Layer) -> Option<&Node> {
		self.layers.get(layer as usize)?.get(&code)
	}

	#[inline]
	pub fn find_mut(&mut self, code: NodeMorton, layer: Layer) -> Option<&mut Node> {
		self.layers.get_mut(layer as usize)?.get_mut(&code)
	}

	#[inline]
	pub fn contains(&self, code: NodeMorton, layer: Layer) -> bool {
		self.find(code, layer).is_some()
	}

	/// Existing node or a new empty one, plus whether it was inserted.
	///
	/// # Panics
	/// Debug-asserts that `layer <= depth`.
	pub fn try_init(&mut self, code: NodeMorton, layer: Layer) -> (&mut Node, bool) {
		debug_assert!(layer <= self.depth, "Layer {} below depth {}", layer, self.depth);
		let map = &mut self.layers[layer as usize];
		match map.entry(code) {
			Entry::Occupied(entry) => (entry.into_mut(), false),
			Entry::Vacant(entry) => (entry.insert(Node::new()), true),
		}
	}

	/// Remove a node. Removing a depth node drops its leaf mask too.
	pub fn erase(&mut self, code: NodeMorton, layer: Layer) -> Option<Node> {
		if layer == self.depth {
			self.leaves.remove(&code);
		}
		self.layers.get_mut(layer as usize)?.remove(&code)
	}

	/// Leaf mask of a depth node, empty when absent.
	#[inline]
	pub fn leaf(&self, code: NodeMorton) -> LeafMask {
		self.leaves.get(&code).copied().unwrap_or_default()
	}

	#[inline]
	pub fn leaf_mut(&mut self, code: NodeMorton) -> &mut LeafMask {
		self.leaves.entry(code).or_default()
	}

	/// Store a leaf mask and sync the depth node's children mask to it.
	pub fn set_leaf(&mut self, code: NodeMorton, leaf: LeafMask) {
		let depth = self.depth;
		if let Some(node) = self.find_mut(code, depth) {
			node.set_children(leaf.group_mask());
		}
		if leaf.is_empty() {
			self.leaves.remove(&code);
		} else {
			self.leaves.insert(code, leaf);
		}
	}

	#[inline]
	pub fn root(&self) -> Option<&Node> {
		self.find(0, 0)
	}

	/// All nodes of one layer, ascending by code.
	pub fn layer(&self, layer: Layer) -> Option<&BTreeMap<NodeMorton, Node>> {
		self.layers.get(layer as usize)
	}

	pub fn leaves(&self) -> &BTreeMap<NodeMorton, LeafMask> {
		&self.leaves
	}

	/// Every node as `(layer, code, node)`, coarsest layer first.
	pub fn iter(&self) -> impl Iterator<Item = (Layer, NodeMorton, &Node)> {
		self.layers
			.iter()
			.enumerate()
			.flat_map(|(layer, map)| map.iter().map(move |(code, node)| (layer as Layer, *code, node)))
	}

	pub fn node_count(&self) -> usize {
		self.layers.iter().map(BTreeMap::len).sum()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.layers.iter().all(BTreeMap::is_empty)
	}

	pub fn clear(&mut self) {
		for map in &mut self.layers {
			map.clear();
		}
		self.leaves.clear();
	}
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
