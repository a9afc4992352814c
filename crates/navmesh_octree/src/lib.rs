//! navmesh_octree - Engine independent sparse voxel navmesh
//!
//! A chunked, multi-resolution octree over a world's solid geometry, used as
//! the spatial substrate for navigation and adjacency queries. Geometry is
//! never inspected directly; every occlusion test goes through an
//! [`OccupancyOracle`] supplied by the host.
//!
//! # Features
//!
//! - **Morton Arithmetic**: O(1) single-axis moves on packed node and chunk
//!   codes
//! - **Sparse Octrees**: per-layer node maps with packed 64-bit leaves below
//!   the depth layer
//! - **Canonical Relations**: six neighbour links per node, kept equal to an
//!   exhaustive search across chunks and layers
//! - **Incremental Updates**: per-actor staging, prune then rasterize, one
//!   background pass at a time
//! - **Compact Records**: pre-order chunk encoding with a versioned manifest
//!
//! # Example
//!
//! ```ignore
//! use navmesh_octree::{generate, ActorGeometry, BoxOracle, Navmesh, OctreeKind};
//!
//! let solid = Bounds::from_min_size(IVec3::splat(1000), IVec3::splat(200));
//! let oracle = BoxOracle::new(vec![solid]);
//! let mut navmesh = Navmesh::default();
//!
//! let report = generate(&mut navmesh, &oracle, &[ActorGeometry::new(1, vec![solid])], OctreeKind::Static);
//! println!("{} chunks, {} queries", report.chunks.len(), report.stats.oracle_queries);
//! ```

pub mod config;
pub mod constants;
pub mod error;

// Spatial arithmetic
pub mod morton;
pub mod spatial;

// Storage
pub mod chunk;
pub mod navmesh;
pub mod octree;

// Occupancy boundary and world change feed
pub mod events;
pub mod oracle;

// Rasterization, relations and incremental updates
pub mod generator;
pub mod updater;

// Records and files
pub mod persistence;
pub mod serialize;

pub mod metrics;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used items
pub use chunk::{Chunk, VersionId};
pub use config::NavmeshConfig;
pub use constants::{node_size, ActorKey, Direction, Layer, CHUNK_SIZE};
pub use error::{ConfigError, DecodeError, PersistError, PersistResult};
pub use events::{event_channel, WorldEvent};
pub use generator::{generate, regenerate_chunks, ActorGeometry, GenerationReport, RasterStats};
pub use morton::{ChunkMorton, NodeMorton};
pub use navmesh::{Navmesh, NodeRef, SharedNavmesh};
pub use octree::{LeafMask, Node, Octree, OctreeKind, Relation};
pub use oracle::{BoxOracle, CountingOracle, OccupancyOracle};
pub use serialize::{deserialize, serialize, LoadResult, Manifest, SerializedNavmesh};
pub use spatial::Bounds;
pub use updater::{ChangedBounds, PassKind, UpdateReport, Updater};
