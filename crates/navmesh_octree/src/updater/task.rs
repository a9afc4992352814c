//! Pass body - runs on the rayon pool while the updater keeps staging.
//!
//! # Update Pass
//!
//! ```text
//! for staged actor (ascending key):
//!     stop requested? ─► hand back the rest
//!     regions = previous - current, plus current
//!     ┌ write lock ───────────────────────────┐
//!     │ prune every region                    │
//!     │ rasterize every region                │
//!     │ ledger: stamp current, drop previous  │
//!     └───────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLockWriteGuard};

use web_time::Instant;

use super::{PassKind, StagedBounds, UpdateReport};
use crate::constants::ActorKey;
use crate::generator::generate::stamp_ledger;
use crate::generator::{generate_until, ActorGeometry, RasterStats, Rasterizer};
use crate::morton::ChunkMorton;
use crate::navmesh::{Navmesh, SharedNavmesh};
use crate::octree::OctreeKind;
use crate::oracle::OccupancyOracle;

/// Work carried by one background pass.
#[derive(Clone, Debug)]
pub enum PassJob {
	/// Rebuild the static octree from these actors.
	Generate(Vec<ActorGeometry>),
	/// Apply staged bounds changes.
	Update(BTreeMap<ActorKey, StagedBounds>),
}

impl PassJob {
	pub fn kind(&self) -> PassKind {
		match self {
			PassJob::Generate(_) => PassKind::Generate,
			PassJob::Update(_) => PassKind::Update,
		}
	}
}

/// Everything a pass needs, moved onto the worker.
pub(crate) struct PassRequest {
	pub navmesh: SharedNavmesh,
	pub oracle: Arc<dyn OccupancyOracle>,
	pub job: PassJob,
	pub stop: Arc<AtomicBool>,
}

/// Report plus the staged actors a stopped pass did not finish.
pub(crate) struct PassOutcome {
	pub report: UpdateReport,
	pub remaining: BTreeMap<ActorKey, StagedBounds>,
}

/// Result of applying one actor's staged bounds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActorUpdate {
	/// Chunks whose octree changed or still hold occlusion in the regions.
	pub chunks: BTreeSet<ChunkMorton>,
	pub stats: RasterStats,
	/// False when stopped between regions.
	pub completed: bool,
}

fn write_navmesh(navmesh: &SharedNavmesh) -> RwLockWriteGuard<'_, Navmesh> {
	navmesh.write().unwrap_or_else(PoisonError::into_inner)
}

/// Apply one actor's staged bounds to the static octree.
///
/// Prunes every region before rasterizing any, so stale occlusion from
/// earlier positions is gone before the current position is filled. The
/// ledger is only touched for a completed actor.
pub fn apply_staged<O: OccupancyOracle + ?Sized>(
	navmesh: &mut Navmesh,
	oracle: &O,
	key: ActorKey,
	staged: &StagedBounds,
	stop: &AtomicBool,
) -> ActorUpdate {
	let regions = staged.regions();
	let mut chunks = BTreeSet::new();
	let mut current_chunks = BTreeSet::new();
	let mut completed = true;

	let stats = {
		let mut rasterizer = Rasterizer::new(navmesh, oracle, OctreeKind::Static);
		for region in &regions {
			if stop.load(Ordering::Relaxed) {
				completed = false;
				break;
			}
			chunks.extend(rasterizer.prune(region));
		}
		if completed {
			for region in &regions {
				if stop.load(Ordering::Relaxed) {
					completed = false;
					break;
				}
				let touched = rasterizer.rasterize(region);
				if *region == staged.current {
					current_chunks.extend(touched.iter().copied());
				}
				chunks.extend(touched);
			}
		}
		rasterizer.stats()
	};

	if completed {
		stamp_ledger(navmesh, key, &current_chunks);
		for previous in &staged.previous {
			for chunk_mc in previous.chunks() {
				if current_chunks.contains(&chunk_mc) {
					continue;
				}
				if let Some(chunk) = navmesh.find_chunk_mut(chunk_mc) {
					chunk.remove_actor_entry(key);
				}
			}
		}
	}

	ActorUpdate { chunks, stats, completed }
}

/// Run one pass to completion or until stopped.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "updater::run_pass"))]
pub(crate) fn run_pass(request: PassRequest) -> PassOutcome {
	let PassRequest {
		navmesh,
		oracle,
		job,
		stop,
	} = request;
	let start = Instant::now();
	let kind = job.kind();
	log::debug!("Starting {:?} pass", kind);

	let (report, remaining) = match job {
		PassJob::Generate(actors) => {
			#[cfg(feature = "tracing")]
			let _span = tracing::info_span!("generate_pass").entered();
			let mut guard = write_navmesh(&navmesh);
			let generated = generate_until(&mut guard, &*oracle, &actors, OctreeKind::Static, &stop);
			let report = UpdateReport {
				kind,
				actors: generated.actors,
				chunks_touched: generated.chunks,
				stats: generated.stats,
				duration_us: 0,
				cancelled: generated.cancelled,
			};
			(report, BTreeMap::new())
		}
		PassJob::Update(staged) => {
			#[cfg(feature = "tracing")]
			let _span = tracing::info_span!("update_pass").entered();
			run_update(&navmesh, &*oracle, staged, &stop)
		}
	};

	let report = UpdateReport {
		duration_us: start.elapsed().as_micros() as u64,
		..report
	};
	PassOutcome { report, remaining }
}

fn run_update(
	navmesh: &SharedNavmesh,
	oracle: &dyn OccupancyOracle,
	staged: BTreeMap<ActorKey, StagedBounds>,
	stop: &AtomicBool,
) -> (UpdateReport, BTreeMap<ActorKey, StagedBounds>) {
	let mut report = UpdateReport {
		kind: PassKind::Update,
		actors: 0,
		chunks_touched: BTreeSet::new(),
		stats: RasterStats::default(),
		duration_us: 0,
		cancelled: false,
	};
	let mut remaining = BTreeMap::new();

	for (key, bounds) in staged {
		if report.cancelled || stop.load(Ordering::Relaxed) {
			report.cancelled = true;
			remaining.insert(key, bounds);
			continue;
		}

		let update = {
			let mut guard = write_navmesh(navmesh);
			apply_staged(&mut guard, oracle, key, &bounds, stop)
		};
		report.stats += update.stats;
		report.chunks_touched.extend(update.chunks);
		if update.completed {
			report.actors += 1;
		} else {
			report.cancelled = true;
			remaining.insert(key, bounds);
		}
	}

	if report.cancelled {
		log::warn!("Update pass stopped with {} actors left", remaining.len());
	}
	(report, remaining)
}
