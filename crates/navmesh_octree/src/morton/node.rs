//! Chunk-local node morton codes.
//!
//! A node code addresses the minimum corner of a node inside its chunk. Codes
//! of coarser layers have their finer triplets zeroed, so the same integer can
//! name a node on several layers; the layer always travels alongside the code.

use super::NodeMorton;
use crate::constants::{ChildIdx, Direction, Layer, CHUNK_SIZE_BITS, MAX_LAYER};

/// X bits of every triplet.
pub const MASK_X: NodeMorton = 0x0924_9249;
/// Y bits of every triplet.
pub const MASK_Y: NodeMorton = MASK_X << 1;
/// Z bits of every triplet.
pub const MASK_Z: NodeMorton = MASK_X << 2;
/// All 30 code bits.
pub const MASK_XYZ: NodeMorton = MASK_X | MASK_Y | MASK_Z;

pub const MASK_YZ: NodeMorton = MASK_Y | MASK_Z;
pub const MASK_XZ: NodeMorton = MASK_X | MASK_Z;
pub const MASK_XY: NodeMorton = MASK_X | MASK_Y;

/// Spread the low 10 bits of `v` into every third bit.
#[inline]
fn spread(v: u32) -> u32 {
	let mut x = v & 0x3ff;
	x = (x | (x << 16)) & 0x0300_00ff;
	x = (x | (x << 8)) & 0x0300_f00f;
	x = (x | (x << 4)) & 0x030c_30c3;
	x = (x | (x << 2)) & 0x0924_9249;
	x
}

/// Inverse of [`spread`].
#[inline]
fn compact(v: u32) -> u32 {
	let mut x = v & 0x0924_9249;
	x = (x | (x >> 2)) & 0x030c_30c3;
	x = (x | (x >> 4)) & 0x0300_f00f;
	x = (x | (x >> 8)) & 0x0300_00ff;
	x = (x | (x >> 16)) & 0x0000_03ff;
	x
}

/// Interleave three 10-bit local coordinates.
#[inline]
pub fn encode(x: u16, y: u16, z: u16) -> NodeMorton {
	spread(x as u32) | (spread(y as u32) << 1) | (spread(z as u32) << 2)
}

/// Exact inverse of [`encode`].
#[inline]
pub fn decode(code: NodeMorton) -> (u16, u16, u16) {
	(
		compact(code) as u16,
		compact(code >> 1) as u16,
		compact(code >> 2) as u16,
	)
}

/// Bit shift of the triplet belonging to `layer`.
#[inline]
const fn layer_shift(layer: Layer) -> u32 {
	3 * (CHUNK_SIZE_BITS - layer as u32)
}

/// Code offset of one X step at `layer`. Shift by 1 or 2 for Y or Z.
#[inline]
pub const fn layer_offset(layer: Layer) -> NodeMorton {
	1 << layer_shift(layer)
}

/// Mask keeping only the bits that are significant at `layer`.
#[inline]
pub const fn parent_mask(layer: Layer) -> NodeMorton {
	!(layer_offset(layer) - 1) & MASK_XYZ
}

/// Code of the ancestor on `parent_layer`.
#[inline]
pub fn parent(code: NodeMorton, parent_layer: Layer) -> NodeMorton {
	code & parent_mask(parent_layer)
}

/// Octant of a node on `layer` within its parent.
#[inline]
pub fn child_index(code: NodeMorton, layer: Layer) -> ChildIdx {
	debug_assert!(layer > 0 && layer <= MAX_LAYER);
	((code >> layer_shift(layer)) & 0b111) as ChildIdx
}

/// Code of child `child_idx` on `child_layer`.
#[inline]
pub fn child(code: NodeMorton, child_layer: Layer, child_idx: ChildIdx) -> NodeMorton {
	let mut out = code;
	if child_idx & 0b001 != 0 {
		out = add_x(out, child_layer);
	}
	if child_idx & 0b010 != 0 {
		out = add_y(out, child_layer);
	}
	if child_idx & 0b100 != 0 {
		out = add_z(out, child_layer);
	}
	out
}

#[inline]
pub fn add_x(code: NodeMorton, layer: Layer) -> NodeMorton {
	let sum = (code | MASK_YZ).wrapping_add(layer_offset(layer)) & MASK_X;
	sum | (code & MASK_YZ)
}

#[inline]
pub fn add_y(code: NodeMorton, layer: Layer) -> NodeMorton {
	let sum = (code | MASK_XZ).wrapping_add(layer_offset(layer) << 1) & MASK_Y;
	sum | (code & MASK_XZ)
}

#[inline]
pub fn add_z(code: NodeMorton, layer: Layer) -> NodeMorton {
	let sum = (code | MASK_XY).wrapping_add(layer_offset(layer) << 2) & MASK_Z;
	sum | (code & MASK_XY)
}

#[inline]
pub fn sub_x(code: NodeMorton, layer: Layer) -> NodeMorton {
	let diff = (code & MASK_X).wrapping_sub(layer_offset(layer)) & MASK_X;
	diff | (code & MASK_YZ)
}

#[inline]
pub fn sub_y(code: NodeMorton, layer: Layer) -> NodeMorton {
	let diff = (code & MASK_Y).wrapping_sub(layer_offset(layer) << 1) & MASK_Y;
	diff | (code & MASK_XZ)
}

#[inline]
pub fn sub_z(code: NodeMorton, layer: Layer) -> NodeMorton {
	let diff = (code & MASK_Z).wrapping_sub(layer_offset(layer) << 2) & MASK_Z;
	diff | (code & MASK_XY)
}

/// Move one node size along `direction`, wrapping within the chunk.
///
/// Use [`crossed_chunk`] to detect the wrap.
#[inline]
pub fn move_code(code: NodeMorton, layer: Layer, direction: Direction) -> NodeMorton {
	match direction {
		Direction::XNegative => sub_x(code, layer),
		Direction::YNegative => sub_y(code, layer),
		Direction::ZNegative => sub_z(code, layer),
		Direction::XPositive => add_x(code, layer),
		Direction::YPositive => add_y(code, layer),
		Direction::ZPositive => add_z(code, layer),
	}
}

/// Whether the move `previous -> next` along `direction` left the chunk.
///
/// A negative move leaves when the axis was already zero, a positive move
/// leaves when the axis wrapped around to zero.
#[inline]
pub fn crossed_chunk(previous: NodeMorton, next: NodeMorton, direction: Direction) -> bool {
	let mask = axis_mask(direction);
	if direction.is_positive() {
		next & mask == 0
	} else {
		previous & mask == 0
	}
}

#[inline]
fn axis_mask(direction: Direction) -> NodeMorton {
	match direction.axis() {
		crate::constants::Axis::X => MASK_X,
		crate::constants::Axis::Y => MASK_Y,
		crate::constants::Axis::Z => MASK_Z,
	}
}

#[inline]
pub fn x_equals_zero(code: NodeMorton) -> bool {
	code & MASK_X == 0
}

#[inline]
pub fn y_equals_zero(code: NodeMorton) -> bool {
	code & MASK_Y == 0
}

#[inline]
pub fn z_equals_zero(code: NodeMorton) -> bool {
	code & MASK_Z == 0
}

/// Replace the X bits of `code` with those of `src`.
#[inline]
pub fn copy_x(code: NodeMorton, src: NodeMorton) -> NodeMorton {
	(code & MASK_YZ) | (src & MASK_X)
}

#[inline]
pub fn copy_y(code: NodeMorton, src: NodeMorton) -> NodeMorton {
	(code & MASK_XZ) | (src & MASK_Y)
}

#[inline]
pub fn copy_z(code: NodeMorton, src: NodeMorton) -> NodeMorton {
	(code & MASK_XY) | (src & MASK_Z)
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
