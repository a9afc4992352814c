//! Sparse node record.

use super::relations::{Relation, Relations};
use crate::constants::{ChildIdx, Direction};

/// A node present in the sparse octree.
///
/// A node exists only while it, or one of its descendants, is occluded. It
/// knows which of its eight children exist and one relation per face; its
/// position is the map key, never stored in the record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Node {
	children: u8,
	relations: Relations,
}

impl Node {
	pub fn new() -> Self {
		Self::default()
	}

	/// Children-active mask, bit `i` for octant `i`.
	#[inline]
	pub fn children(&self) -> u8 {
		self.children
	}

	#[inline]
	pub fn has_children(&self) -> bool {
		self.children != 0
	}

	#[inline]
	pub fn is_child_active(&self, child_idx: ChildIdx) -> bool {
		self.children & (1 << child_idx) != 0
	}

	#[inline]
	pub fn set_child_active(&mut self, child_idx: ChildIdx) {
		self.children |= 1 << child_idx;
	}

	#[inline]
	pub fn clear_child_active(&mut self, child_idx: ChildIdx) {
		self.children &= !(1 << child_idx);
	}

	#[inline]
	pub fn set_children(&mut self, mask: u8) {
		self.children = mask;
	}

	/// Active octants, ascending.
	pub fn active_children(&self) -> impl Iterator<Item = ChildIdx> {
		let mask = self.children;
		(0..8u8).filter(move |idx| mask & (1 << idx) != 0)
	}

	#[inline]
	pub fn relation(&self, direction: Direction) -> Relation {
		self.relations.get(direction)
	}

	#[inline]
	pub fn set_relation(&mut self, direction: Direction, relation: Relation) {
		self.relations.set(direction, relation);
	}

	#[inline]
	pub fn relations(&self) -> &Relations {
		&self.relations
	}
}
