//! Sparse octree storage.
//!
//! # Module Structure
//!
//! - [`node`]: `Node` - children mask plus six relations
//! - [`relations`]: `Relation` / `Relations` - per-face neighbour layers
//! - [`leaf`]: `LeafMask` - packed occupancy of the two finest layers
//! - [`tree`]: `Octree` - morton-keyed map per layer

pub mod leaf;
pub mod node;
pub mod relations;
pub mod tree;

// Re-exports
pub use leaf::LeafMask;
pub use node::Node;
pub use relations::{Relation, Relations};
pub use tree::Octree;

/// Which of a chunk's two octrees an operation targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OctreeKind {
	/// Rasterized from level geometry and persisted.
	#[default]
	Static,
	/// Runtime-only objects, never serialized.
	Dynamic,
}
