//! Pruning - removing occlusion that the oracle no longer reports.
//!
//! The inverse of rasterization for a region: every node overlapping the
//! region is re-tested as a whole cube. Unoccupied nodes lose their
//! subtree, occupied ones are descended, and at depth stale leaf bits are
//! cleared. Childless nodes collapse upward. Once a chunk is pruned, the
//! neighbours of every removed node are repointed.

use std::collections::BTreeSet;

use glam::IVec3;

use super::rasterize::Rasterizer;
use crate::constants::Layer;
use crate::morton::{chunk, node, ChunkMorton, NodeMorton};
use crate::oracle::OccupancyOracle;
use crate::spatial::{child_offset, Bounds};

impl<'a, O: OccupancyOracle + ?Sized> Rasterizer<'a, O> {
	/// Remove stale occlusion inside `region`.
	///
	/// Returns the chunks whose octree changed. Chunks left with no nodes in
	/// either octree are erased.
	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "generator::prune"))]
	pub fn prune(&mut self, region: &Bounds) -> BTreeSet<ChunkMorton> {
		let mut changed = BTreeSet::new();
		if !region.is_valid() {
			return changed;
		}
		let kind = self.kind();

		for chunk_mc in region.chunks() {
			let has_root = self
				.navmesh()
				.find_chunk(chunk_mc)
				.is_some_and(|c| c.octree(kind).root().is_some());
			if !has_root {
				continue;
			}

			let before = self.stats;
			let mut removed = Vec::new();
			self.prune_node(chunk_mc, 0, 0, chunk::decode(chunk_mc), region, &mut removed);

			for &(code, layer) in &removed {
				self.resolver.repoint_after_removal(chunk_mc, code, layer);
			}
			if self.stats.leaves_cleared != before.leaves_cleared || !removed.is_empty() {
				changed.insert(chunk_mc);
			}
			if self.navmesh().find_chunk(chunk_mc).is_some_and(|c| c.is_empty()) {
				self.navmesh_mut().erase_chunk(chunk_mc);
			}
		}
		changed
	}

	/// Prune one node. Returns whether it still exists.
	fn prune_node(
		&mut self,
		chunk_mc: ChunkMorton,
		code: NodeMorton,
		layer: Layer,
		location: IVec3,
		region: &Bounds,
		removed: &mut Vec<(NodeMorton, Layer)>,
	) -> bool {
		let kind = self.kind();
		let Some(children) = self
			.navmesh()
			.find_chunk(chunk_mc)
			.and_then(|c| c.octree(kind).find(code, layer))
			.map(|n| n.children())
		else {
			return false;
		};
		if !region.overlaps(&Bounds::from_node(location, layer)) {
			return true;
		}

		self.stats.oracle_queries += 1;
		if !self.oracle.overlaps(location, layer) {
			self.remove_subtree(chunk_mc, code, layer, removed);
			return false;
		}

		if layer == self.depth {
			return self.prune_leaf(chunk_mc, code, location, region, removed);
		}

		let child_layer = layer + 1;
		let mut remaining = children;
		for child_idx in 0..8u8 {
			if children & (1 << child_idx) == 0 {
				continue;
			}
			let child_code = node::child(code, child_layer, child_idx);
			let child_location = location + child_offset(child_idx, child_layer);
			if !self.prune_node(chunk_mc, child_code, child_layer, child_location, region, removed) {
				remaining &= !(1 << child_idx);
			}
		}

		let octree = self.resolver.octree_mut(chunk_mc);
		if remaining == 0 {
			octree.erase(code, layer);
			removed.push((code, layer));
			self.stats.nodes_removed += 1;
			return false;
		}
		if let Some(current) = octree.find_mut(code, layer) {
			current.set_children(remaining);
		}
		true
	}

	/// Clear stale leaves of a depth node that the oracle still reports.
	fn prune_leaf(
		&mut self,
		chunk_mc: ChunkMorton,
		code: NodeMorton,
		location: IVec3,
		region: &Bounds,
		removed: &mut Vec<(NodeMorton, Layer)>,
	) -> bool {
		let group_layer = self.depth + 1;
		let leaf_layer = self.depth + 2;
		let mut leaf = self.resolver.octree_mut(chunk_mc).leaf(code);
		let before = leaf;

		for group in 0..8u8 {
			let bits = leaf.group(group);
			if bits == 0 {
				continue;
			}
			let group_location = location + child_offset(group, group_layer);
			if !region.overlaps(&Bounds::from_node(group_location, group_layer)) {
				continue;
			}
			self.stats.oracle_queries += 1;
			if !self.oracle.overlaps(group_location, group_layer) {
				leaf.set_group(group, 0);
				self.stats.leaves_cleared += bits.count_ones() as usize;
				continue;
			}
			for idx in 0..8u8 {
				if !leaf.is_set(group, idx) {
					continue;
				}
				let leaf_location = group_location + child_offset(idx, leaf_layer);
				if !region.overlaps(&Bounds::from_node(leaf_location, leaf_layer)) {
					continue;
				}
				self.stats.oracle_queries += 1;
				if !self.oracle.overlaps(leaf_location, leaf_layer) {
					leaf.clear(group, idx);
					self.stats.leaves_cleared += 1;
				}
			}
		}

		let depth = self.depth;
		let octree = self.resolver.octree_mut(chunk_mc);
		if leaf.is_empty() {
			octree.erase(code, depth);
			removed.push((code, depth));
			self.stats.nodes_removed += 1;
			return false;
		}
		if leaf != before {
			octree.set_leaf(code, leaf);
		}
		true
	}

	/// Erase a node and all its descendants.
	fn remove_subtree(&mut self, chunk_mc: ChunkMorton, code: NodeMorton, layer: Layer, removed: &mut Vec<(NodeMorton, Layer)>) {
		let depth = self.depth;
		let octree = self.resolver.octree_mut(chunk_mc);
		let mut stack = vec![(code, layer)];
		while let Some((current, current_layer)) = stack.pop() {
			if current_layer == depth {
				self.stats.leaves_cleared += octree.leaf(current).count() as usize;
			}
			let Some(erased) = octree.erase(current, current_layer) else {
				continue;
			};
			removed.push((current, current_layer));
			self.stats.nodes_removed += 1;
			if current_layer < depth {
				for child_idx in erased.active_children() {
					stack.push((node::child(current, current_layer + 1, child_idx), current_layer + 1));
				}
			}
		}
	}
}

#[cfg(test)]
#[path = "prune_test.rs"]
mod prune_test;
