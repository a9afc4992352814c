//! Chunk morton codes.
//!
//! World coordinates are offset by [`SIGN_OFFSET`] and shifted down by the
//! chunk size bits, giving 21 non-negative bits per axis.

use glam::IVec3;

use super::ChunkMorton;
use crate::constants::{Direction, CHUNK_SIZE_BITS, SIGN_OFFSET};

pub const MASK_X: ChunkMorton = 0x1249_2492_4924_9249;
pub const MASK_Y: ChunkMorton = MASK_X << 1;
pub const MASK_Z: ChunkMorton = MASK_X << 2;

pub const MASK_YZ: ChunkMorton = MASK_Y | MASK_Z;
pub const MASK_XZ: ChunkMorton = MASK_X | MASK_Z;
pub const MASK_XY: ChunkMorton = MASK_X | MASK_Y;

#[inline]
fn spread(v: u64) -> u64 {
	let mut x = v & 0x1f_ffff;
	x = (x | (x << 32)) & 0x001f_0000_0000_ffff;
	x = (x | (x << 16)) & 0x001f_0000_ff00_00ff;
	x = (x | (x << 8)) & 0x100f_00f0_0f00_f00f;
	x = (x | (x << 4)) & 0x10c3_0c30_c30c_30c3;
	x = (x | (x << 2)) & 0x1249_2492_4924_9249;
	x
}

#[inline]
fn compact(v: u64) -> u64 {
	let mut x = v & 0x1249_2492_4924_9249;
	x = (x ^ (x >> 2)) & 0x10c3_0c30_c30c_30c3;
	x = (x ^ (x >> 4)) & 0x100f_00f0_0f00_f00f;
	x = (x ^ (x >> 8)) & 0x001f_0000_ff00_00ff;
	x = (x ^ (x >> 16)) & 0x001f_0000_0000_ffff;
	x = (x ^ (x >> 32)) & 0x1f_ffff;
	x
}

/// Chunk coordinate (non-negative) of a world coordinate.
#[inline]
fn to_chunk_axis(v: i32) -> u64 {
	((v as i64 + SIGN_OFFSET) >> CHUNK_SIZE_BITS) as u64
}

#[inline]
fn from_chunk_axis(v: u64) -> i32 {
	(((v as i64) << CHUNK_SIZE_BITS) - SIGN_OFFSET) as i32
}

/// Code of the chunk containing the world position.
#[inline]
pub fn encode(world: IVec3) -> ChunkMorton {
	spread(to_chunk_axis(world.x)) | (spread(to_chunk_axis(world.y)) << 1) | (spread(to_chunk_axis(world.z)) << 2)
}

/// World position of the chunk's minimum corner.
#[inline]
pub fn decode(code: ChunkMorton) -> IVec3 {
	IVec3::new(
		from_chunk_axis(compact(code)),
		from_chunk_axis(compact(code >> 1)),
		from_chunk_axis(compact(code >> 2)),
	)
}

#[inline]
pub fn increment_x(code: ChunkMorton) -> ChunkMorton {
	(((code | MASK_YZ).wrapping_add(1)) & MASK_X) | (code & MASK_YZ)
}

#[inline]
pub fn increment_y(code: ChunkMorton) -> ChunkMorton {
	(((code | MASK_XZ).wrapping_add(1 << 1)) & MASK_Y) | (code & MASK_XZ)
}

#[inline]
pub fn increment_z(code: ChunkMorton) -> ChunkMorton {
	(((code | MASK_XY).wrapping_add(1 << 2)) & MASK_Z) | (code & MASK_XY)
}

#[inline]
pub fn decrement_x(code: ChunkMorton) -> ChunkMorton {
	((code & MASK_X).wrapping_sub(1) & MASK_X) | (code & MASK_YZ)
}

#[inline]
pub fn decrement_y(code: ChunkMorton) -> ChunkMorton {
	((code & MASK_Y).wrapping_sub(1 << 1) & MASK_Y) | (code & MASK_XZ)
}

#[inline]
pub fn decrement_z(code: ChunkMorton) -> ChunkMorton {
	((code & MASK_Z).wrapping_sub(1 << 2) & MASK_Z) | (code & MASK_XY)
}

/// Neighbouring chunk along `direction`.
#[inline]
pub fn move_code(code: ChunkMorton, direction: Direction) -> ChunkMorton {
	match direction {
		Direction::XNegative => decrement_x(code),
		Direction::YNegative => decrement_y(code),
		Direction::ZNegative => decrement_z(code),
		Direction::XPositive => increment_x(code),
		Direction::YPositive => increment_y(code),
		Direction::ZPositive => increment_z(code),
	}
}

#[inline]
pub fn copy_x(code: ChunkMorton, src: ChunkMorton) -> ChunkMorton {
	(code & MASK_YZ) | (src & MASK_X)
}

#[inline]
pub fn copy_y(code: ChunkMorton, src: ChunkMorton) -> ChunkMorton {
	(code & MASK_XZ) | (src & MASK_Y)
}

#[inline]
pub fn copy_z(code: ChunkMorton, src: ChunkMorton) -> ChunkMorton {
	(code & MASK_XY) | (src & MASK_Z)
}

#[cfg(test)]
#[path = "chunk_test.rs"]
mod chunk_test;
