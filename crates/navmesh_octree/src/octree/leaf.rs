//! Packed leaf occupancy for the two finest layers.
//!
//! ```text
//! bit = 8 * group + leaf
//!
//! group: octant of the depth node   (layer depth + 1)
//! leaf:  octant within the group    (layer depth + 2)
//! ```

use crate::constants::ChildIdx;

/// 64-bit occupancy of one depth node: 8 groups of 8 leaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LeafMask(pub u64);

impl LeafMask {
	pub const EMPTY: LeafMask = LeafMask(0);

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.0 == 0
	}

	/// Leaf bits of one group.
	#[inline]
	pub fn group(&self, group: ChildIdx) -> u8 {
		(self.0 >> (8 * group as u32)) as u8
	}

	#[inline]
	pub fn set_group(&mut self, group: ChildIdx, leaves: u8) {
		let shift = 8 * group as u32;
		self.0 = (self.0 & !(0xff << shift)) | ((leaves as u64) << shift);
	}

	#[inline]
	pub fn is_set(&self, group: ChildIdx, leaf: ChildIdx) -> bool {
		self.0 & (1 << (8 * group + leaf)) != 0
	}

	#[inline]
	pub fn set(&mut self, group: ChildIdx, leaf: ChildIdx) {
		self.0 |= 1 << (8 * group + leaf);
	}

	#[inline]
	pub fn clear(&mut self, group: ChildIdx, leaf: ChildIdx) {
		self.0 &= !(1 << (8 * group + leaf));
	}

	/// One bit per non-empty group. Equals the depth node's children mask.
	pub fn group_mask(&self) -> u8 {
		(0..8u8).fold(0, |mask, group| {
			if self.group(group) != 0 {
				mask | (1 << group)
			} else {
				mask
			}
		})
	}

	/// Number of occupied leaves.
	#[inline]
	pub fn count(&self) -> u32 {
		self.0.count_ones()
	}
}
