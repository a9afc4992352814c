//! World and chunk-local vectors.
//!
//! World positions are plain [`IVec3`] values in world units. A
//! [`LocalVector`] is the position relative to the owning chunk's origin and
//! can be morton-encoded directly.

use glam::IVec3;

use crate::constants::{node_size, ChildIdx, Layer, CHUNK_LOCAL_MASK, CHUNK_SIZE};
use crate::morton::{chunk, node, ChunkMorton, NodeMorton};

/// Chunk code of the chunk containing `world`.
#[inline]
pub fn to_chunk_morton(world: IVec3) -> ChunkMorton {
	chunk::encode(world)
}

/// Minimum corner of the chunk containing `world`.
#[inline]
pub fn chunk_origin(world: IVec3) -> IVec3 {
	IVec3::new(
		world.x.div_euclid(CHUNK_SIZE) * CHUNK_SIZE,
		world.y.div_euclid(CHUNK_SIZE) * CHUNK_SIZE,
		world.z.div_euclid(CHUNK_SIZE) * CHUNK_SIZE,
	)
}

/// World position of a node given its chunk and local code.
#[inline]
pub fn node_location(chunk_mc: ChunkMorton, node_mc: NodeMorton) -> IVec3 {
	chunk::decode(chunk_mc) + LocalVector::from_morton(node_mc).as_ivec3()
}

/// Offset of child `child_idx` from its parent's minimum corner.
#[inline]
pub fn child_offset(child_idx: ChildIdx, child_layer: Layer) -> IVec3 {
	let size = node_size(child_layer);
	IVec3::new(
		(child_idx & 1) as i32 * size,
		((child_idx >> 1) & 1) as i32 * size,
		((child_idx >> 2) & 1) as i32 * size,
	)
}

/// Position inside a chunk, 10 bits per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocalVector {
	pub x: u16,
	pub y: u16,
	pub z: u16,
}

impl LocalVector {
	pub const fn new(x: u16, y: u16, z: u16) -> Self {
		Self { x, y, z }
	}

	/// Local part of a world position. Negative positions wrap into their chunk.
	#[inline]
	pub fn from_world(world: IVec3) -> Self {
		Self {
			x: (world.x & CHUNK_LOCAL_MASK) as u16,
			y: (world.y & CHUNK_LOCAL_MASK) as u16,
			z: (world.z & CHUNK_LOCAL_MASK) as u16,
		}
	}

	#[inline]
	pub fn from_morton(code: NodeMorton) -> Self {
		let (x, y, z) = node::decode(code);
		Self { x, y, z }
	}

	#[inline]
	pub fn to_morton(self) -> NodeMorton {
		node::encode(self.x, self.y, self.z)
	}

	/// Floor each axis to the node grid of `layer`.
	#[inline]
	pub fn round_to_layer(self, layer: Layer) -> Self {
		let mask = !(node_size(layer) as u16 - 1);
		Self {
			x: self.x & mask,
			y: self.y & mask,
			z: self.z & mask,
		}
	}

	#[inline]
	pub fn as_ivec3(self) -> IVec3 {
		IVec3::new(self.x as i32, self.y as i32, self.z as i32)
	}

	/// World position of this vector inside the given chunk.
	#[inline]
	pub fn to_world(self, chunk_mc: ChunkMorton) -> IVec3 {
		chunk::decode(chunk_mc) + self.as_ivec3()
	}
}
