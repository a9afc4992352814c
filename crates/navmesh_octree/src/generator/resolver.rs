//! Relation resolver - links each node to its six nearest neighbours.
//!
//! # Search
//!
//! ```text
//! 1. move the code one node along the direction
//!    left the chunk and no chunk there      -> EMPTY
//! 2. look for a node at the moved code on our own layer
//!    found                                  -> Layer(layer)
//! 3. step the moved code up one layer
//!    same parent as ours (same chunk)       -> PARENT
//!    otherwise look again, one layer coarser
//!    crossed chunk and no root              -> EMPTY
//! ```
//!
//! Relations are kept canonical: every stored value equals what the search
//! would return against the current node set. Creating a node pushes its
//! layer onto the neighbours that now see it; removing one re-resolves the
//! neighbours that named it.

use crate::constants::{direction_mask, Direction, DirectionMask, Layer};
use crate::morton::{chunk, node, ChunkMorton, NodeMorton};
use crate::navmesh::Navmesh;
use crate::octree::{Octree, OctreeKind, Relation};

/// Code and chunk one node along `direction`, plus whether the chunk changed.
#[inline]
pub fn step(chunk_mc: ChunkMorton, code: NodeMorton, layer: Layer, direction: Direction) -> (ChunkMorton, NodeMorton, bool) {
	let moved = node::move_code(code, layer, direction);
	if node::crossed_chunk(code, moved, direction) {
		(chunk::move_code(chunk_mc, direction), moved, true)
	} else {
		(chunk_mc, moved, false)
	}
}

/// Nearest existing neighbour of a node along `direction`.
pub fn resolve_relation(
	navmesh: &Navmesh,
	kind: OctreeKind,
	chunk_mc: ChunkMorton,
	code: NodeMorton,
	layer: Layer,
	direction: Direction,
) -> Relation {
	let (neighbour_mc, moved, crossed) = step(chunk_mc, code, layer, direction);
	let Some(neighbour_chunk) = navmesh.find_chunk(neighbour_mc) else {
		return Relation::Empty;
	};
	let octree = neighbour_chunk.octree(kind);

	let mut search = moved;
	let mut search_layer = layer;
	loop {
		if octree.contains(search, search_layer) {
			return Relation::Layer(search_layer);
		}
		if search_layer == 0 {
			return Relation::Empty;
		}
		search_layer -= 1;
		search = node::parent(search, search_layer);
		if !crossed && search == node::parent(code, search_layer) {
			return Relation::Parent;
		}
	}
}

/// Mutating relation operations on one octree kind of a navmesh.
pub struct RelationResolver<'a> {
	navmesh: &'a mut Navmesh,
	kind: OctreeKind,
}

impl<'a> RelationResolver<'a> {
	pub fn new(navmesh: &'a mut Navmesh, kind: OctreeKind) -> Self {
		Self { navmesh, kind }
	}

	#[inline]
	pub fn kind(&self) -> OctreeKind {
		self.kind
	}

	#[inline]
	pub fn navmesh(&self) -> &Navmesh {
		self.navmesh
	}

	#[inline]
	pub fn navmesh_mut(&mut self) -> &mut Navmesh {
		self.navmesh
	}

	/// Octree of the target kind in `chunk_mc`, creating the chunk if needed.
	#[inline]
	pub fn octree_mut(&mut self, chunk_mc: ChunkMorton) -> &mut Octree {
		let kind = self.kind;
		self.navmesh.try_init_chunk(chunk_mc).octree_mut(kind)
	}

	#[inline]
	pub fn resolve(&self, chunk_mc: ChunkMorton, code: NodeMorton, layer: Layer, direction: Direction) -> Relation {
		resolve_relation(self.navmesh, self.kind, chunk_mc, code, layer, direction)
	}

	/// Resolve and store one relation of an existing node.
	///
	/// When the neighbour sits on the same layer the link is made symmetric,
	/// and the neighbour's descendants on the shared face learn about this
	/// node as well.
	pub fn set_node_relation(&mut self, chunk_mc: ChunkMorton, code: NodeMorton, layer: Layer, direction: Direction) -> Relation {
		let relation = self.resolve(chunk_mc, code, layer, direction);
		let kind = self.kind;
		if let Some(node) = self
			.navmesh
			.find_chunk_mut(chunk_mc)
			.and_then(|chunk| chunk.octree_mut(kind).find_mut(code, layer))
		{
			node.set_relation(direction, relation);
		}

		if relation == Relation::Layer(layer) {
			let (neighbour_mc, neighbour_code, _) = step(chunk_mc, code, layer, direction);
			self.announce(neighbour_mc, neighbour_code, layer, direction.opposite());
		}
		relation
	}

	pub fn set_node_relations(&mut self, chunk_mc: ChunkMorton, code: NodeMorton, layer: Layer, mask: DirectionMask) {
		for direction in Direction::iter_mask(mask) {
			self.set_node_relation(chunk_mc, code, layer, direction);
		}
	}

	/// Point the node at `code` and its descendants on `face` at `layer`.
	///
	/// Only relations that `layer` improves on are overwritten, so finer
	/// links already in place survive.
	fn announce(&mut self, chunk_mc: ChunkMorton, code: NodeMorton, layer: Layer, face: Direction) {
		let kind = self.kind;
		let Some(octree) = self.navmesh.find_chunk_mut(chunk_mc).map(|chunk| chunk.octree_mut(kind)) else {
			return;
		};
		let depth = octree.depth();

		let mut stack = vec![(code, layer)];
		while let Some((current, current_layer)) = stack.pop() {
			let Some(node) = octree.find_mut(current, current_layer) else {
				continue;
			};
			if node.relation(face).is_superseded_by(layer) {
				node.set_relation(face, Relation::Layer(layer));
			}
			if current_layer < depth {
				let children = node.children();
				for idx in face.face_children() {
					if children & (1 << idx) != 0 {
						stack.push((node::child(current, current_layer + 1, idx), current_layer + 1));
					}
				}
			}
		}
	}

	/// Create missing ancestors of a node and mark the child bits on the way up.
	///
	/// Every new ancestor gets all six relations.
	pub fn init_parents_of_node(&mut self, chunk_mc: ChunkMorton, code: NodeMorton, layer: Layer) {
		if layer == 0 {
			return;
		}
		let parent_layer = layer - 1;
		let parent_code = node::parent(code, parent_layer);

		let (_, inserted) = self.octree_mut(chunk_mc).try_init(parent_code, parent_layer);
		if inserted {
			self.set_node_relations(chunk_mc, parent_code, parent_layer, direction_mask::ALL);
			self.init_parents_of_node(chunk_mc, parent_code, parent_layer);
		}

		let child_idx = node::child_index(code, layer);
		if let Some(parent) = self.octree_mut(chunk_mc).find_mut(parent_code, parent_layer) {
			parent.set_child_active(child_idx);
		}
	}

	/// Get or create a node. A new node gets relations for `mask` and its
	/// missing ancestors. Returns whether it was inserted.
	pub fn init_node_and_parents(&mut self, chunk_mc: ChunkMorton, code: NodeMorton, layer: Layer, mask: DirectionMask) -> bool {
		let (_, inserted) = self.octree_mut(chunk_mc).try_init(code, layer);
		if inserted {
			self.set_node_relations(chunk_mc, code, layer, mask);
			self.init_parents_of_node(chunk_mc, code, layer);
		}
		inserted
	}

	/// Re-resolve neighbours that named a node which has just been removed.
	///
	/// Candidates are the same-layer neighbour on each side and its
	/// descendants on the shared face whose relation still names `layer`.
	pub fn repoint_after_removal(&mut self, chunk_mc: ChunkMorton, code: NodeMorton, layer: Layer) {
		let kind = self.kind;
		for direction in Direction::ALL {
			let (neighbour_mc, neighbour_code, _) = step(chunk_mc, code, layer, direction);
			let face = direction.opposite();

			let mut stale = Vec::new();
			if let Some(octree) = self.navmesh.find_chunk(neighbour_mc).map(|chunk| chunk.octree(kind)) {
				let depth = octree.depth();
				let mut stack = vec![(neighbour_code, layer)];
				while let Some((current, current_layer)) = stack.pop() {
					let Some(node) = octree.find(current, current_layer) else {
						continue;
					};
					if node.relation(face) == Relation::Layer(layer) {
						stale.push((current, current_layer));
					}
					if current_layer < depth {
						for idx in face.face_children() {
							if node.is_child_active(idx) {
								stack.push((node::child(current, current_layer + 1, idx), current_layer + 1));
							}
						}
					}
				}
			}

			for (stale_code, stale_layer) in stale {
				let relation = self.resolve(neighbour_mc, stale_code, stale_layer, face);
				if let Some(node) = self
					.navmesh
					.find_chunk_mut(neighbour_mc)
					.and_then(|chunk| chunk.octree_mut(kind).find_mut(stale_code, stale_layer))
				{
					node.set_relation(face, relation);
				}
			}
		}
	}

	/// Recompute every relation of one chunk from scratch.
	pub fn relink_chunk(&mut self, chunk_mc: ChunkMorton) {
		let kind = self.kind;
		let Some(nodes) = self.navmesh.find_chunk(chunk_mc).map(|chunk| {
			chunk
				.octree(kind)
				.iter()
				.map(|(layer, code, _)| (layer, code))
				.collect::<Vec<_>>()
		}) else {
			return;
		};

		for (layer, code) in nodes {
			let mut resolved = [Relation::Empty; 6];
			for direction in Direction::ALL {
				resolved[direction.index()] = self.resolve(chunk_mc, code, layer, direction);
			}
			if let Some(node) = self
				.navmesh
				.find_chunk_mut(chunk_mc)
				.and_then(|chunk| chunk.octree_mut(kind).find_mut(code, layer))
			{
				for direction in Direction::ALL {
					node.set_relation(direction, resolved[direction.index()]);
				}
			}
		}
	}

	/// Relink every chunk.
	pub fn relink_all(&mut self) {
		let codes: Vec<ChunkMorton> = self.navmesh.chunks().keys().copied().collect();
		for chunk_mc in codes {
			self.relink_chunk(chunk_mc);
		}
	}
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_test;
