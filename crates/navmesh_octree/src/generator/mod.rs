//! Generator - builds octrees from actor geometry.
//!
//! - [`resolver`] keeps neighbour relations canonical
//! - [`rasterize`] creates nodes and leaves where the oracle reports geometry
//! - [`prune`] removes what the oracle no longer reports
//! - [`generate`] drives full and per-chunk passes over a set of actors

pub mod generate;
pub mod prune;
pub mod rasterize;
pub mod resolver;

pub use generate::{generate, generate_until, regenerate_chunks, ActorGeometry, GenerationReport};
pub use rasterize::{calculate_optimal_starting_layer, RasterStats, Rasterizer};
pub use resolver::{resolve_relation, RelationResolver};
