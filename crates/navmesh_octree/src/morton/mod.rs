//! Morton (Z-order) codes for nodes and chunks.
//!
//! Two codecs share the same interleave layout, X in the lowest bit of each
//! triplet:
//!
//! ```text
//! bit:   ... 5  4  3  2  1  0
//! axis:  ... z1 y1 x1 z0 y0 x0
//! ```
//!
//! - [`node`]: 30-bit chunk-local codes (10 bits per axis), stored as `u32`
//! - [`chunk`]: 63-bit chunk codes (21 bits per axis), stored as `u64`
//!
//! Both support O(1) single-axis moves directly on the packed code. The two
//! other axes are masked to all-ones before the add, so the carry can only
//! ripple through the target axis bits.

pub mod chunk;
pub mod node;

/// Chunk-local node morton code.
pub type NodeMorton = u32;

/// Chunk morton code, keyed by the chunk's minimum corner.
pub type ChunkMorton = u64;
