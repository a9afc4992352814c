//! Chunk, layer and direction constants for the navmesh octree.
//!
//! # Layer Convention
//!
//! Layer 0 = one node spanning the whole chunk, higher layer = finer.
//!
//! ```text
//! Node Size = CHUNK_SIZE >> layer
//!
//! layer:   0     1    2    3    4   5   6   7  8  9  10
//! size:  1024  512  256  128   64  32  16   8  4  2   1
//!                                               ^  ^   ^
//!                                   static depth  group leaf
//! ```
//!
//! Node records exist on layers `0..=depth`. The finest two layers are
//! packed into a 64-bit leaf mask owned by each node on the depth layer.

/// Layer index (0 = chunk root).
pub type Layer = u8;

/// Child/octant index within a parent, 0..8.
///
/// Bit 0 = X, bit 1 = Y, bit 2 = Z.
pub type ChildIdx = u8;

/// Actor identifier supplied by the host.
pub type ActorKey = u32;

/// Bits per axis in a node-local coordinate.
pub const CHUNK_SIZE_BITS: u32 = 10;

/// Chunk edge length in world units.
pub const CHUNK_SIZE: i32 = 1 << CHUNK_SIZE_BITS;

/// Mask selecting the local part of a world coordinate.
pub const CHUNK_LOCAL_MASK: i32 = CHUNK_SIZE - 1;

/// Finest layer (single world unit).
pub const MAX_LAYER: Layer = CHUNK_SIZE_BITS as Layer;

/// Default layer holding the leaf masks.
pub const DEFAULT_STATIC_DEPTH: Layer = 8;

/// Deepest allowed static depth. The two packed leaf layers must fit below it.
pub const MAX_STATIC_DEPTH: Layer = MAX_LAYER - 2;

/// Offset converting signed world coordinates into the encodable chunk domain.
pub const SIGN_OFFSET: i64 = ((1i64 << 20) - 1) << CHUNK_SIZE_BITS;

/// Relation sentinel: resolve through the ancestor chain.
pub const RELATION_PARENT: u8 = 14;

/// Relation sentinel: no neighbouring chunk.
pub const RELATION_EMPTY: u8 = 15;

/// Node edge length at the given layer.
#[inline]
pub const fn node_size(layer: Layer) -> i32 {
	CHUNK_SIZE >> layer
}

// =============================================================================
// Directions
// =============================================================================

/// Bit-set of directions, one bit per face.
pub type DirectionMask = u8;

/// Directions as 6-bit masks: `[-X, -Y, -Z, +X, +Y, +Z]` from high to low bit.
pub mod direction_mask {
	use super::DirectionMask;

	pub const X_NEGATIVE: DirectionMask = 0b100000;
	pub const Y_NEGATIVE: DirectionMask = 0b010000;
	pub const Z_NEGATIVE: DirectionMask = 0b001000;
	pub const X_POSITIVE: DirectionMask = 0b000100;
	pub const Y_POSITIVE: DirectionMask = 0b000010;
	pub const Z_POSITIVE: DirectionMask = 0b000001;

	pub const NEGATIVE: DirectionMask = 0b111000;
	pub const POSITIVE: DirectionMask = 0b000111;
	pub const ALL: DirectionMask = 0b111111;
	pub const NONE: DirectionMask = 0;
}

/// Axis a direction moves along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
	X,
	Y,
	Z,
}

impl Axis {
	/// Bit this axis occupies in a child index.
	#[inline]
	pub const fn child_bit(self) -> ChildIdx {
		match self {
			Axis::X => 0b001,
			Axis::Y => 0b010,
			Axis::Z => 0b100,
		}
	}
}

/// One of the six face directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
	XNegative,
	YNegative,
	ZNegative,
	XPositive,
	YPositive,
	ZPositive,
}

impl Direction {
	/// Canonical order, matching relation storage.
	pub const ALL: [Direction; 6] = [
		Direction::XNegative,
		Direction::YNegative,
		Direction::ZNegative,
		Direction::XPositive,
		Direction::YPositive,
		Direction::ZPositive,
	];

	/// Index into relation storage.
	#[inline]
	pub const fn index(self) -> usize {
		self as usize
	}

	#[inline]
	pub const fn mask(self) -> DirectionMask {
		match self {
			Direction::XNegative => direction_mask::X_NEGATIVE,
			Direction::YNegative => direction_mask::Y_NEGATIVE,
			Direction::ZNegative => direction_mask::Z_NEGATIVE,
			Direction::XPositive => direction_mask::X_POSITIVE,
			Direction::YPositive => direction_mask::Y_POSITIVE,
			Direction::ZPositive => direction_mask::Z_POSITIVE,
		}
	}

	#[inline]
	pub const fn opposite(self) -> Direction {
		match self {
			Direction::XNegative => Direction::XPositive,
			Direction::YNegative => Direction::YPositive,
			Direction::ZNegative => Direction::ZPositive,
			Direction::XPositive => Direction::XNegative,
			Direction::YPositive => Direction::YNegative,
			Direction::ZPositive => Direction::ZNegative,
		}
	}

	#[inline]
	pub const fn axis(self) -> Axis {
		match self {
			Direction::XNegative | Direction::XPositive => Axis::X,
			Direction::YNegative | Direction::YPositive => Axis::Y,
			Direction::ZNegative | Direction::ZPositive => Axis::Z,
		}
	}

	#[inline]
	pub const fn is_positive(self) -> bool {
		matches!(self, Direction::XPositive | Direction::YPositive | Direction::ZPositive)
	}

	/// Directions contained in `mask`, in canonical order.
	pub fn iter_mask(mask: DirectionMask) -> impl Iterator<Item = Direction> {
		Direction::ALL.into_iter().filter(move |dir| mask & dir.mask() != 0)
	}

	/// The four child indices touching the face in this direction.
	///
	/// For `XPositive` these are the children with the X bit set.
	pub fn face_children(self) -> [ChildIdx; 4] {
		let bit = self.axis().child_bit();
		let mut out = [0; 4];
		let mut n = 0;
		for idx in 0..8u8 {
			if (idx & bit != 0) == self.is_positive() {
				out[n] = idx;
				n += 1;
			}
		}
		out
	}
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
