//! Per-node neighbour relations.
//!
//! Each node stores one byte per face. A byte names the layer of the nearest
//! existing neighbour on that side, or one of two sentinels:
//!
//! ```text
//! 0..=10  neighbour exists on this layer (same or coarser than the node)
//! 14      PARENT: neighbouring space shares our parent and is unoccluded
//! 15      EMPTY:  no neighbouring chunk
//! ```
//!
//! Relations never hold pointers. The neighbour's code is recomputed from
//! morton arithmetic, so relations stay valid across regeneration and
//! serialization.

use crate::constants::{Direction, Layer, MAX_LAYER, RELATION_EMPTY, RELATION_PARENT};

/// Decoded relation value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
	/// Nearest existing neighbour lives on this layer.
	Layer(Layer),
	/// Resolve through the ancestor chain.
	Parent,
	/// No neighbouring chunk.
	Empty,
}

impl Relation {
	#[inline]
	pub const fn from_raw(raw: u8) -> Self {
		match raw {
			RELATION_PARENT => Relation::Parent,
			l if l <= MAX_LAYER => Relation::Layer(l),
			_ => Relation::Empty,
		}
	}

	#[inline]
	pub const fn to_raw(self) -> u8 {
		match self {
			Relation::Layer(l) => l,
			Relation::Parent => RELATION_PARENT,
			Relation::Empty => RELATION_EMPTY,
		}
	}

	#[inline]
	pub const fn layer(self) -> Option<Layer> {
		match self {
			Relation::Layer(l) => Some(l),
			_ => None,
		}
	}

	/// Whether a neighbour found on `layer` is a better (finer) answer than this.
	#[inline]
	pub const fn is_superseded_by(self, layer: Layer) -> bool {
		match self {
			Relation::Layer(l) => l < layer,
			Relation::Parent | Relation::Empty => true,
		}
	}
}

/// Six relations stored as raw bytes, indexed by [`Direction::index`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Relations([u8; 6]);

impl Default for Relations {
	fn default() -> Self {
		Self([RELATION_EMPTY; 6])
	}
}

impl Relations {
	#[inline]
	pub fn get(&self, direction: Direction) -> Relation {
		Relation::from_raw(self.0[direction.index()])
	}

	#[inline]
	pub fn set(&mut self, direction: Direction, relation: Relation) {
		self.0[direction.index()] = relation.to_raw();
	}

	#[inline]
	pub fn raw(&self) -> [u8; 6] {
		self.0
	}
}
