//! Rasterization - turning oracle answers into octree nodes and leaves.
//!
//! # Walk
//!
//! ```text
//! bounds ──round──► starting layer grid ──for_each_node──► node cubes
//!                                                            │
//!                     oracle(node ∩ region)? ◄───────────────┘
//!                            │ yes
//!                            ▼
//!             init_node_and_parents (ALL relations)
//!                            │
//!           layer < depth ───┴─── layer == depth
//!                 │                     │
//!          rasterize_node         rasterize_leaf
//!       (children ∩ region)    (groups, then leaves)
//! ```
//!
//! Every oracle query is clipped to the region being rasterized, so a node
//! is only created when some of its children will be too. Depth nodes
//! therefore always end up with a non-empty leaf mask.

use std::collections::BTreeSet;
use std::ops::AddAssign;

use glam::IVec3;

use super::resolver::RelationResolver;
use crate::constants::{direction_mask, node_size, Layer};
use crate::morton::{node, ChunkMorton, NodeMorton};
use crate::navmesh::Navmesh;
use crate::octree::OctreeKind;
use crate::oracle::OccupancyOracle;
use crate::spatial::{child_offset, Bounds};

/// Counters accumulated over one or more rasterizer calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterStats {
	/// Queries issued to the oracle.
	pub oracle_queries: usize,
	/// Node records inserted by the walk (ancestors excluded).
	pub nodes_created: usize,
	/// Node records erased by pruning.
	pub nodes_removed: usize,
	pub leaves_set: usize,
	pub leaves_cleared: usize,
}

impl RasterStats {
	/// Whether anything in the octree changed.
	#[inline]
	pub fn changed(&self) -> bool {
		self.nodes_created + self.nodes_removed + self.leaves_set + self.leaves_cleared > 0
	}
}

impl AddAssign for RasterStats {
	fn add_assign(&mut self, other: Self) {
		self.oracle_queries += other.oracle_queries;
		self.nodes_created += other.nodes_created;
		self.nodes_removed += other.nodes_removed;
		self.leaves_set += other.leaves_set;
		self.leaves_cleared += other.leaves_cleared;
	}
}

/// First layer whose nodes fit the bounds' largest side at least once.
///
/// Layers finer than `depth` are never chosen; bounds smaller than a depth
/// node start at the depth layer.
pub fn calculate_optimal_starting_layer(bounds: &Bounds, depth: Layer) -> Layer {
	let largest = bounds.largest_side();
	(0..depth)
		.find(|&layer| largest / node_size(layer) >= 1)
		.unwrap_or(depth)
}

/// Rasterizes regions of one octree kind against an oracle.
pub struct Rasterizer<'a, O: OccupancyOracle + ?Sized> {
	pub(super) resolver: RelationResolver<'a>,
	pub(super) oracle: &'a O,
	pub(super) depth: Layer,
	pub(super) stats: RasterStats,
}

impl<'a, O: OccupancyOracle + ?Sized> Rasterizer<'a, O> {
	pub fn new(navmesh: &'a mut Navmesh, oracle: &'a O, kind: OctreeKind) -> Self {
		let depth = navmesh.config().depth(kind);
		Self {
			resolver: RelationResolver::new(navmesh, kind),
			oracle,
			depth,
			stats: RasterStats::default(),
		}
	}

	#[inline]
	pub fn stats(&self) -> RasterStats {
		self.stats
	}

	#[inline]
	pub fn navmesh(&self) -> &Navmesh {
		self.resolver.navmesh()
	}

	#[inline]
	pub fn navmesh_mut(&mut self) -> &mut Navmesh {
		self.resolver.navmesh_mut()
	}

	#[inline]
	pub fn kind(&self) -> OctreeKind {
		self.resolver.kind()
	}

	/// Whether geometry occupies the node cube inside `region`.
	pub(super) fn query(&mut self, location: IVec3, layer: Layer, region: &Bounds) -> bool {
		let node_box = Bounds::from_node(location, layer);
		if region.contains(&node_box) {
			self.stats.oracle_queries += 1;
			return self.oracle.overlaps(location, layer);
		}
		let clipped = node_box.clamp(region);
		if !clipped.is_valid() {
			return false;
		}
		self.stats.oracle_queries += 1;
		self.oracle.overlaps_any(&clipped)
	}

	/// Rasterize all occupied volume inside `bounds`.
	///
	/// Returns the chunks that hold occlusion from this region.
	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "generator::rasterize"))]
	pub fn rasterize(&mut self, bounds: &Bounds) -> BTreeSet<ChunkMorton> {
		let mut touched = BTreeSet::new();
		if !bounds.is_valid() {
			return touched;
		}
		let layer = calculate_optimal_starting_layer(bounds, self.depth);

		bounds.for_each_node(layer, |chunk_mc, node_mc, location| {
			if !self.query(location, layer, bounds) {
				return;
			}
			touched.insert(chunk_mc);
			if self.resolver.init_node_and_parents(chunk_mc, node_mc, layer, direction_mask::ALL) {
				self.stats.nodes_created += 1;
			}
			if layer < self.depth {
				self.rasterize_node(chunk_mc, node_mc, location, layer, bounds);
			} else {
				self.rasterize_leaf(chunk_mc, node_mc, location, bounds);
			}
		});
		touched
	}

	/// Create every occupied child of an existing node, down to depth.
	pub fn rasterize_node(&mut self, chunk_mc: ChunkMorton, code: NodeMorton, location: IVec3, layer: Layer, region: &Bounds) {
		let child_layer = layer + 1;
		for child_idx in 0..8u8 {
			let child_location = location + child_offset(child_idx, child_layer);
			if !self.query(child_location, child_layer, region) {
				continue;
			}
			let child_code = node::child(code, child_layer, child_idx);

			let octree = self.resolver.octree_mut(chunk_mc);
			let (_, inserted) = octree.try_init(child_code, child_layer);
			if inserted {
				if let Some(parent) = octree.find_mut(code, layer) {
					parent.set_child_active(child_idx);
				}
				self.stats.nodes_created += 1;
				self.resolver
					.set_node_relations(chunk_mc, child_code, child_layer, direction_mask::ALL);
			}

			if child_layer < self.depth {
				self.rasterize_node(chunk_mc, child_code, child_location, child_layer, region);
			} else {
				self.rasterize_leaf(chunk_mc, child_code, child_location, region);
			}
		}
	}

	/// Fill the leaf mask of a depth node, group by group.
	pub fn rasterize_leaf(&mut self, chunk_mc: ChunkMorton, code: NodeMorton, location: IVec3, region: &Bounds) {
		let group_layer = self.depth + 1;
		let leaf_layer = self.depth + 2;
		let mut leaf = self.resolver.octree_mut(chunk_mc).leaf(code);
		let before = leaf;

		for group in 0..8u8 {
			let group_location = location + child_offset(group, group_layer);
			if leaf.group(group) == 0xff || !self.query(group_location, group_layer, region) {
				continue;
			}
			for idx in 0..8u8 {
				if leaf.is_set(group, idx) {
					continue;
				}
				let leaf_location = group_location + child_offset(idx, leaf_layer);
				if self.query(leaf_location, leaf_layer, region) {
					leaf.set(group, idx);
					self.stats.leaves_set += 1;
				}
			}
		}

		if leaf != before {
			self.resolver.octree_mut(chunk_mc).set_leaf(code, leaf);
		}
	}
}

#[cfg(test)]
#[path = "rasterize_test.rs"]
mod rasterize_test;
