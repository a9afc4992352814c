//! Full and per-chunk generation passes.
//!
//! # Full Pass
//!
//! ```text
//! clear target octree ─► for actor: for component: rasterize
//!                                        │
//!                          touched chunks per actor
//!                                        │
//!                     stamp fresh VersionId into each ledger
//! ```
//!
//! Ledgers describe the static octree only; dynamic passes leave them alone.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use web_time::Instant;

use super::rasterize::{RasterStats, Rasterizer};
use crate::chunk::VersionId;
use crate::constants::ActorKey;
use crate::morton::ChunkMorton;
use crate::navmesh::Navmesh;
use crate::octree::OctreeKind;
use crate::oracle::OccupancyOracle;
use crate::spatial::Bounds;

/// Collision-bearing geometry of one actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorGeometry {
	pub key: ActorKey,
	/// World bounds of each collision-enabled component.
	pub components: Vec<Bounds>,
}

impl ActorGeometry {
	pub fn new(key: ActorKey, components: Vec<Bounds>) -> Self {
		Self { key, components }
	}

	/// Union of all component bounds.
	pub fn bounds(&self) -> Bounds {
		self.components.iter().fold(Bounds::EMPTY, |acc, b| acc.union(b))
	}
}

/// Outcome of a generation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
	pub actors: usize,
	pub chunks: BTreeSet<ChunkMorton>,
	pub stats: RasterStats,
	pub duration_us: u64,
	/// Stopped before every actor was rasterized.
	pub cancelled: bool,
}

/// Stamp `touched` chunks with a fresh version of `actor`.
pub(crate) fn stamp_ledger(navmesh: &mut Navmesh, actor: ActorKey, touched: &BTreeSet<ChunkMorton>) {
	let version = VersionId::random();
	for &chunk_mc in touched {
		if let Some(chunk) = navmesh.find_chunk_mut(chunk_mc) {
			chunk.update_actor_entry(actor, version);
		}
	}
}

/// Rebuild one octree kind from scratch.
pub fn generate<O: OccupancyOracle + ?Sized>(
	navmesh: &mut Navmesh,
	oracle: &O,
	actors: &[ActorGeometry],
	kind: OctreeKind,
) -> GenerationReport {
	generate_until(navmesh, oracle, actors, kind, &AtomicBool::new(false))
}

/// [`generate`] that checks `stop` between actors.
///
/// A stopped pass keeps what it rasterized so far, and only those actors
/// are stamped into the ledgers.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "generator::generate"))]
pub fn generate_until<O: OccupancyOracle + ?Sized>(
	navmesh: &mut Navmesh,
	oracle: &O,
	actors: &[ActorGeometry],
	kind: OctreeKind,
	stop: &AtomicBool,
) -> GenerationReport {
	let start = Instant::now();
	let mut cancelled = false;

	{
		#[cfg(feature = "tracing")]
		let _span = tracing::info_span!("clear").entered();
		navmesh.clear_octrees(kind);
		if kind == OctreeKind::Static {
			for chunk in navmesh.chunks_mut() {
				chunk.actors.clear();
			}
		}
	}

	let mut per_actor = Vec::with_capacity(actors.len());
	let stats = {
		#[cfg(feature = "tracing")]
		let _span = tracing::info_span!("rasterize_actors").entered();
		let mut rasterizer = Rasterizer::new(navmesh, oracle, kind);
		for actor in actors {
			if stop.load(Ordering::Relaxed) {
				cancelled = true;
				break;
			}
			let mut touched = BTreeSet::new();
			for component in &actor.components {
				touched.extend(rasterizer.rasterize(component));
			}
			per_actor.push((actor.key, touched));
		}
		rasterizer.stats()
	};

	let rasterized = per_actor.len();
	let mut chunks = BTreeSet::new();
	for (key, touched) in per_actor {
		if kind == OctreeKind::Static {
			stamp_ledger(navmesh, key, &touched);
		}
		chunks.extend(touched);
	}

	let duration_us = start.elapsed().as_micros() as u64;
	if cancelled {
		log::warn!("Generation stopped after {} of {} actors", rasterized, actors.len());
	}
	log::info!(
		"Generated {:?} octrees for {} actors: {} chunks, {} nodes, {} leaves in {}us",
		kind,
		rasterized,
		chunks.len(),
		stats.nodes_created,
		stats.leaves_set,
		duration_us
	);

	GenerationReport {
		actors: rasterized,
		chunks,
		stats,
		duration_us,
		cancelled,
	}
}

/// Rebuild the static octree of the listed chunks only.
///
/// Nodes of each chunk are removed with their neighbours repointed, then
/// every actor is re-rasterized clipped to the chunk.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "generator::regenerate_chunks"))]
pub fn regenerate_chunks<O: OccupancyOracle + ?Sized>(
	navmesh: &mut Navmesh,
	oracle: &O,
	actors: &[ActorGeometry],
	chunk_list: &[ChunkMorton],
) -> GenerationReport {
	let start = Instant::now();
	let mut chunks = BTreeSet::new();
	let mut contributions: Vec<(ActorKey, BTreeSet<ChunkMorton>)> = Vec::new();

	let stats = {
		let mut rasterizer = Rasterizer::new(navmesh, oracle, OctreeKind::Static);
		for &chunk_mc in chunk_list {
			rasterizer.clear_chunk(chunk_mc);
			let chunk_bounds = Bounds::from_chunk(chunk_mc);
			for actor in actors {
				let mut touched = BTreeSet::new();
				for component in &actor.components {
					let clipped = component.clamp(&chunk_bounds);
					if clipped.is_valid() {
						touched.extend(rasterizer.rasterize(&clipped));
					}
				}
				if !touched.is_empty() {
					contributions.push((actor.key, touched));
				}
			}
			chunks.insert(chunk_mc);
		}
		rasterizer.stats()
	};

	for (key, touched) in &contributions {
		stamp_ledger(navmesh, *key, touched);
	}

	let duration_us = start.elapsed().as_micros() as u64;
	log::info!("Regenerated {} chunks in {}us", chunks.len(), duration_us);

	GenerationReport {
		actors: actors.len(),
		chunks,
		stats,
		duration_us,
		cancelled: false,
	}
}

impl<'a, O: OccupancyOracle + ?Sized> Rasterizer<'a, O> {
	/// Remove every node of this rasterizer's kind from a chunk.
	///
	/// Clearing the static octree also forgets the chunk's ledger.
	pub fn clear_chunk(&mut self, chunk_mc: ChunkMorton) {
		let kind = self.kind();
		let Some(chunk) = self.navmesh_mut().find_chunk_mut(chunk_mc) else {
			return;
		};
		let removed: Vec<_> = chunk.octree(kind).iter().map(|(layer, code, _)| (code, layer)).collect();
		chunk.octree_mut(kind).clear();
		if kind == OctreeKind::Static {
			chunk.actors.clear();
		}
		self.stats.nodes_removed += removed.len();

		for (code, layer) in removed {
			self.resolver.repoint_after_removal(chunk_mc, code, layer);
		}
		if self.navmesh().find_chunk(chunk_mc).is_some_and(|c| c.is_empty()) {
			self.navmesh_mut().erase_chunk(chunk_mc);
		}
	}
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod generate_test;
