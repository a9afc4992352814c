//! Spatial types: world/local vectors and integer bounds.
//!
//! - [`vectors`]: world `IVec3` helpers and chunk-local [`LocalVector`]
//! - [`bounds`]: half-open [`Bounds`] with layer/chunk rounding,
//!   subtraction, and morton-ordered node iteration

pub mod bounds;
pub mod vectors;

pub use bounds::{Bounds, Intersection};
pub use vectors::{child_offset, chunk_origin, node_location, to_chunk_morton, LocalVector};
