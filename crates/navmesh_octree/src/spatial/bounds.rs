//! Integer axis-aligned bounds in world units.

use glam::IVec3;
use smallvec::SmallVec;

use super::vectors::LocalVector;
use crate::constants::{node_size, Layer, CHUNK_SIZE};
use crate::morton::{chunk, node, ChunkMorton, NodeMorton};

/// How one bounds relates to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intersection {
	/// No shared volume.
	None,
	/// Partial overlap.
	Intersects,
	/// The other bounds lies fully inside this one.
	Contains,
}

/// Half-open integer box `[min, max)`.
///
/// Two bounds that only touch on a face share no volume and do not overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
	/// Minimum corner (inclusive).
	pub min: IVec3,
	/// Maximum corner (exclusive).
	pub max: IVec3,
}

impl Default for Bounds {
	fn default() -> Self {
		Self::EMPTY
	}
}

impl Bounds {
	/// Bounds with no volume, used for "no current bounds".
	pub const EMPTY: Bounds = Bounds {
		min: IVec3::ZERO,
		max: IVec3::ZERO,
	};

	#[inline]
	pub const fn new(min: IVec3, max: IVec3) -> Self {
		Self { min, max }
	}

	/// Bounds from a minimum corner and its extent.
	#[inline]
	pub fn from_min_size(min: IVec3, size: IVec3) -> Self {
		Self { min, max: min + size }
	}

	/// Cube of a node on `layer` with its minimum corner at `location`.
	#[inline]
	pub fn from_node(location: IVec3, layer: Layer) -> Self {
		Self {
			min: location,
			max: location + IVec3::splat(node_size(layer)),
		}
	}

	/// Full extent of a chunk.
	#[inline]
	pub fn from_chunk(chunk_mc: ChunkMorton) -> Self {
		Self::from_node(chunk::decode(chunk_mc), 0)
	}

	/// Whether the box has volume on every axis.
	#[inline]
	pub fn is_valid(&self) -> bool {
		self.min.cmplt(self.max).all()
	}

	#[inline]
	pub fn lengths(&self) -> IVec3 {
		self.max - self.min
	}

	#[inline]
	pub fn largest_side(&self) -> i32 {
		self.lengths().max_element()
	}

	/// Floor the minimum and ceil the maximum to the node grid of `layer`.
	///
	/// A maximum that would ceil past `i32::MAX` saturates to it, so the
	/// last grid cell of the axis is still covered.
	pub fn round_to_layer(&self, layer: Layer) -> Self {
		let size = node_size(layer) as i64;
		let floor = |v: i32| ((v as i64).div_euclid(size) * size) as i32;
		let ceil = |v: i32| (-(-(v as i64)).div_euclid(size) * size).min(i32::MAX as i64) as i32;
		Self {
			min: IVec3::new(floor(self.min.x), floor(self.min.y), floor(self.min.z)),
			max: IVec3::new(ceil(self.max.x), ceil(self.max.y), ceil(self.max.z)),
		}
	}

	/// Round outward to whole chunks.
	#[inline]
	pub fn round_to_chunk(&self) -> Self {
		self.round_to_layer(0)
	}

	/// Intersection with `other`. Invalid when there is no overlap.
	#[inline]
	pub fn clamp(&self, other: &Bounds) -> Self {
		Self {
			min: self.min.max(other.min),
			max: self.max.min(other.max),
		}
	}

	/// Smallest box covering both.
	#[inline]
	pub fn union(&self, other: &Bounds) -> Self {
		if !self.is_valid() {
			return *other;
		}
		if !other.is_valid() {
			return *self;
		}
		Self {
			min: self.min.min(other.min),
			max: self.max.max(other.max),
		}
	}

	/// Whether both boxes share volume.
	#[inline]
	pub fn overlaps(&self, other: &Bounds) -> bool {
		self.min.cmplt(other.max).all() && self.max.cmpgt(other.min).all()
	}

	/// Whether `other` lies fully inside this box.
	#[inline]
	pub fn contains(&self, other: &Bounds) -> bool {
		self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
	}

	#[inline]
	pub fn contains_point(&self, point: IVec3) -> bool {
		self.min.cmple(point).all() && self.max.cmpgt(point).all()
	}

	pub fn intersection_kind(&self, other: &Bounds) -> Intersection {
		if !self.overlaps(other) {
			Intersection::None
		} else if self.contains(other) {
			Intersection::Contains
		} else {
			Intersection::Intersects
		}
	}

	/// Parts of this box not covered by `cutter`.
	///
	/// Returns up to six disjoint boxes, sliced off in the order
	/// +X, -X, +Y, -Y, +Z, -Z. Without overlap the result is `[self]`; a fully
	/// covered box yields nothing.
	pub fn subtract(&self, cutter: &Bounds) -> SmallVec<[Bounds; 6]> {
		let mut out = SmallVec::new();
		if !self.is_valid() {
			return out;
		}
		if !self.overlaps(cutter) {
			out.push(*self);
			return out;
		}

		let mut rest = *self;
		for axis in 0..3 {
			if cutter.max[axis] < rest.max[axis] {
				let mut slab = rest;
				slab.min[axis] = cutter.max[axis];
				out.push(slab);
				rest.max[axis] = cutter.max[axis];
			}
			if cutter.min[axis] > rest.min[axis] {
				let mut slab = rest;
				slab.max[axis] = cutter.min[axis];
				out.push(slab);
				rest.min[axis] = cutter.min[axis];
			}
		}
		out
	}

	/// Codes of all chunks this box intersects, ascending.
	pub fn chunks(&self) -> Vec<ChunkMorton> {
		if !self.is_valid() {
			return Vec::new();
		}
		let rounded = self.round_to_chunk();
		let mut out = Vec::new();
		for z in grid_axis(rounded.min.z, rounded.max.z, CHUNK_SIZE) {
			for y in grid_axis(rounded.min.y, rounded.max.y, CHUNK_SIZE) {
				for x in grid_axis(rounded.min.x, rounded.max.x, CHUNK_SIZE) {
					out.push(chunk::encode(IVec3::new(x, y, z)));
				}
			}
		}
		out.sort_unstable();
		out
	}

	/// Visit every node position of `layer` inside the layer-rounded box.
	///
	/// X runs fastest, then Y, then Z. This is a raster order, so codes are
	/// not ascending even inside one 2x2x2 block.
	///
	/// Node and chunk codes are advanced with single-axis adds: a node axis
	/// wrapping to zero steps the chunk code, and the end of each row or
	/// plane resets the axis from the start code.
	pub fn for_each_node<F>(&self, layer: Layer, mut callback: F)
	where
		F: FnMut(ChunkMorton, NodeMorton, IVec3),
	{
		if !self.is_valid() {
			return;
		}
		let rounded = self.round_to_layer(layer);
		let size = node_size(layer);

		let start_node = LocalVector::from_world(rounded.min).to_morton();
		let start_chunk = chunk::encode(rounded.min);
		let mut node_mc = start_node;
		let mut chunk_mc = start_chunk;

		for z in grid_axis(rounded.min.z, rounded.max.z, size) {
			for y in grid_axis(rounded.min.y, rounded.max.y, size) {
				for x in grid_axis(rounded.min.x, rounded.max.x, size) {
					callback(chunk_mc, node_mc, IVec3::new(x, y, z));

					node_mc = node::add_x(node_mc, layer);
					if node::x_equals_zero(node_mc) {
						chunk_mc = chunk::increment_x(chunk_mc);
					}
				}
				node_mc = node::copy_x(node_mc, start_node);
				chunk_mc = chunk::copy_x(chunk_mc, start_chunk);

				node_mc = node::add_y(node_mc, layer);
				if node::y_equals_zero(node_mc) {
					chunk_mc = chunk::increment_y(chunk_mc);
				}
			}
			node_mc = node::copy_y(node_mc, start_node);
			chunk_mc = chunk::copy_y(chunk_mc, start_chunk);

			node_mc = node::add_z(node_mc, layer);
			if node::z_equals_zero(node_mc) {
				chunk_mc = chunk::increment_z(chunk_mc);
			}
		}
	}
}

/// Grid steps from `min` up to `max`, stepped in i64 so the last one
/// cannot overflow.
#[inline]
fn grid_axis(min: i32, max: i32, step: i32) -> impl Iterator<Item = i32> {
	(min as i64..max as i64).step_by(step as usize).map(|v| v as i32)
}

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;
