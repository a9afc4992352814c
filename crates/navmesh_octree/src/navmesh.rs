//! Navmesh - ordered map from chunk morton code to chunk.
//!
//! The navmesh is the unit of generation, update and serialization. Chunks
//! are created lazily when rasterization first finds occlusion inside them.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::chunk::Chunk;
use crate::config::NavmeshConfig;
use crate::constants::{Direction, Layer};
use crate::error::ConfigError;
use crate::morton::{chunk, node, ChunkMorton, NodeMorton};
use crate::octree::{Node, OctreeKind, Relation};

/// Navmesh shared between the owner and the background updater.
pub type SharedNavmesh = Arc<RwLock<Navmesh>>;

/// Address of a node: chunk, local code and layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef {
	pub chunk_mc: ChunkMorton,
	pub code: NodeMorton,
	pub layer: Layer,
}

impl NodeRef {
	pub const fn new(chunk_mc: ChunkMorton, code: NodeMorton, layer: Layer) -> Self {
		Self { chunk_mc, code, layer }
	}

	/// Address of the ancestor one layer up, `None` for a root.
	pub fn parent(&self) -> Option<NodeRef> {
		let layer = self.layer.checked_sub(1)?;
		Some(NodeRef::new(self.chunk_mc, node::parent(self.code, layer), layer))
	}
}

/// All chunks of one world, ordered for deterministic iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navmesh {
	config: NavmeshConfig,
	chunks: BTreeMap<ChunkMorton, Chunk>,
}

impl Default for Navmesh {
	fn default() -> Self {
		Self {
			config: NavmeshConfig::default(),
			chunks: BTreeMap::new(),
		}
	}
}

impl Navmesh {
	pub fn new(config: NavmeshConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self {
			config,
			chunks: BTreeMap::new(),
		})
	}

	/// Wrap into the shared handle used by the updater.
	pub fn into_shared(self) -> SharedNavmesh {
		Arc::new(RwLock::new(self))
	}

	#[inline]
	pub fn config(&self) -> &NavmeshConfig {
		&self.config
	}

	#[inline]
	pub fn find_chunk(&self, chunk_mc: ChunkMorton) -> Option<&Chunk> {
		self.chunks.get(&chunk_mc)
	}

	#[inline]
	pub fn find_chunk_mut(&mut self, chunk_mc: ChunkMorton) -> Option<&mut Chunk> {
		self.chunks.get_mut(&chunk_mc)
	}

	/// Existing chunk or a new empty one.
	pub fn try_init_chunk(&mut self, chunk_mc: ChunkMorton) -> &mut Chunk {
		let config = self.config;
		self.chunks.entry(chunk_mc).or_insert_with(|| Chunk::new(&config))
	}

	pub fn insert_chunk(&mut self, chunk_mc: ChunkMorton, chunk: Chunk) -> Option<Chunk> {
		self.chunks.insert(chunk_mc, chunk)
	}

	pub fn erase_chunk(&mut self, chunk_mc: ChunkMorton) -> Option<Chunk> {
		self.chunks.remove(&chunk_mc)
	}

	#[inline]
	pub fn chunks(&self) -> &BTreeMap<ChunkMorton, Chunk> {
		&self.chunks
	}

	pub fn chunks_mut(&mut self) -> impl Iterator<Item = &mut Chunk> {
		self.chunks.values_mut()
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.chunks.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.chunks.is_empty()
	}

	pub fn clear(&mut self) {
		self.chunks.clear();
	}

	/// Clear one octree kind everywhere, dropping chunks left with no nodes.
	pub fn clear_octrees(&mut self, kind: OctreeKind) {
		for chunk in self.chunks.values_mut() {
			chunk.octree_mut(kind).clear();
		}
		self.chunks.retain(|_, chunk| !chunk.is_empty());
	}

	#[inline]
	pub fn find_node(&self, kind: OctreeKind, at: NodeRef) -> Option<&Node> {
		self.chunks.get(&at.chunk_mc)?.octree(kind).find(at.code, at.layer)
	}

	/// Nearest existing node beside `at` along `direction`.
	///
	/// A layer relation is followed directly. PARENT asks the ancestor chain,
	/// EMPTY and unknown nodes yield `None`.
	pub fn neighbour(&self, kind: OctreeKind, at: NodeRef, direction: Direction) -> Option<NodeRef> {
		let relation = self.find_node(kind, at)?.relation(direction);
		match relation {
			Relation::Layer(layer) => {
				let moved = node::move_code(at.code, at.layer, direction);
				let chunk_mc = if node::crossed_chunk(at.code, moved, direction) {
					chunk::move_code(at.chunk_mc, direction)
				} else {
					at.chunk_mc
				};
				Some(NodeRef::new(chunk_mc, node::parent(moved, layer), layer))
			}
			Relation::Parent => self.neighbour(kind, at.parent()?, direction),
			Relation::Empty => None,
		}
	}

	/// Total node records of one kind.
	pub fn node_count(&self, kind: OctreeKind) -> usize {
		self.chunks.values().map(|chunk| chunk.octree(kind).node_count()).sum()
	}
}
