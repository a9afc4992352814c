//! Updater - stages world changes and runs one background pass at a time.
//!
//! # Flow
//!
//! ```text
//! Host                              Async (rayon)
//! ┌──────────────────┐
//! │ handle_event /   │
//! │ stage_data       │  accumulate per actor
//! └────────┬─────────┘
//!          │ tick()
//!          ▼
//! ┌──────────────────┐  swap out   ┌────────────────┐
//! │ idle? launch     │────────────►│ run_pass       │
//! │ (generate first, │             │ write lock per │
//! │  else staged)    │             │ actor          │
//! └──────────────────┘             └───────┬────────┘
//!                                          │ bounded(1)
//! ┌──────────────────┐                     │
//! │ tick() polls     │◄────────────────────┘
//! │ notify observers │
//! └──────────────────┘
//! ```
//!
//! An actor staged again while a pass runs keeps every previous bounds it
//! had, so the next pass prunes all positions it passed through. Only the
//! latest current bounds are rasterized.
//!
//! # Usage
//!
//! ```ignore
//! let mut updater = Updater::new(navmesh.clone(), oracle);
//! updater.on_complete(|report| log::info!("{:?}", report.kind));
//!
//! // Each frame
//! updater.drain_events(&receiver);
//! if let Some(report) = updater.tick() {
//!     // navmesh reflects every change staged before this pass
//! }
//! ```

pub mod task;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{self as channel, Receiver, TryRecvError};

use crate::constants::ActorKey;
use crate::events::WorldEvent;
use crate::generator::{ActorGeometry, RasterStats};
use crate::metrics::NavmeshMetrics;
use crate::morton::ChunkMorton;
use crate::navmesh::SharedNavmesh;
use crate::oracle::OccupancyOracle;
use crate::spatial::Bounds;

pub use task::{apply_staged, ActorUpdate, PassJob};
use task::{run_pass, PassOutcome, PassRequest};

/// One actor's bounds change as reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChangedBounds {
	pub previous: Bounds,
	pub current: Bounds,
}

impl ChangedBounds {
	pub const fn new(previous: Bounds, current: Bounds) -> Self {
		Self { previous, current }
	}
}

/// Accumulated bounds of one actor since the last pass picked it up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StagedBounds {
	/// Every earlier position; pruned by the next pass.
	pub previous: Vec<Bounds>,
	/// Latest position; [`Bounds::EMPTY`] for a removed actor.
	pub current: Bounds,
}

impl StagedBounds {
	/// Regions a pass must visit: what each previous position leaves
	/// behind, plus the current position.
	pub fn regions(&self) -> Vec<Bounds> {
		let mut regions: Vec<Bounds> = Vec::new();
		for previous in &self.previous {
			for part in previous.subtract(&self.current) {
				if part.is_valid() && !regions.contains(&part) {
					regions.push(part);
				}
			}
		}
		if self.current.is_valid() {
			regions.push(self.current);
		}
		regions
	}

	/// Fold a newer staging of the same actor into this one.
	fn absorb(&mut self, newer: StagedBounds) {
		if self.current.is_valid() && self.current != newer.current {
			self.previous.push(self.current);
		}
		self.previous.extend(newer.previous);
		self.current = newer.current;
	}
}

impl From<ChangedBounds> for StagedBounds {
	fn from(changed: ChangedBounds) -> Self {
		Self {
			previous: vec![changed.previous],
			current: changed.current,
		}
	}
}

/// What a pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
	Generate,
	Update,
}

/// Completion report delivered to observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateReport {
	pub kind: PassKind,
	/// Actors fully processed.
	pub actors: usize,
	pub chunks_touched: BTreeSet<ChunkMorton>,
	pub stats: RasterStats,
	pub duration_us: u64,
	/// Stopped early; unfinished actors were staged again.
	pub cancelled: bool,
}

/// Callback run once per completed pass.
pub type PassObserver = Box<dyn FnMut(&UpdateReport) + Send>;

/// Stages bounds changes and drives background passes.
pub struct Updater {
	navmesh: SharedNavmesh,
	oracle: Arc<dyn OccupancyOracle>,
	staged: BTreeMap<ActorKey, StagedBounds>,
	pending_generate: Option<Vec<ActorGeometry>>,
	/// Receiver for the in-flight pass.
	receiver: Option<Receiver<PassOutcome>>,
	stop: Arc<AtomicBool>,
	observers: Vec<PassObserver>,
	metrics: NavmeshMetrics,
}

impl Updater {
	pub fn new(navmesh: SharedNavmesh, oracle: Arc<dyn OccupancyOracle>) -> Self {
		Self {
			navmesh,
			oracle,
			staged: BTreeMap::new(),
			pending_generate: None,
			receiver: None,
			stop: Arc::new(AtomicBool::new(false)),
			observers: Vec::new(),
			metrics: NavmeshMetrics::new(),
		}
	}

	#[inline]
	pub fn navmesh(&self) -> &SharedNavmesh {
		&self.navmesh
	}

	#[inline]
	pub fn metrics(&self) -> &NavmeshMetrics {
		&self.metrics
	}

	/// Actors waiting for the next update pass.
	#[inline]
	pub fn staged(&self) -> &BTreeMap<ActorKey, StagedBounds> {
		&self.staged
	}

	/// Append every valid previous bounds and overwrite the current one.
	///
	/// Takes a single [`ChangedBounds`] or a batched [`StagedBounds`].
	pub fn stage_data(&mut self, key: ActorKey, changed: impl Into<StagedBounds>) {
		let StagedBounds { previous, current } = changed.into();
		let entry = self.staged.entry(key).or_default();
		entry.previous.extend(previous.into_iter().filter(Bounds::is_valid));
		entry.current = current;
	}

	/// Stage current bounds only, keeping any previous bounds already staged.
	pub fn stage_current<I>(&mut self, bounds: I)
	where
		I: IntoIterator<Item = (ActorKey, Bounds)>,
	{
		for (key, current) in bounds {
			self.staged.entry(key).or_default().current = current;
		}
	}

	pub fn handle_event(&mut self, event: WorldEvent) {
		match event {
			WorldEvent::ActorAdded { key, bounds } => self.stage_current([(key, bounds)]),
			WorldEvent::ActorRemoved { key, bounds } => self.stage_data(key, ChangedBounds::new(bounds, Bounds::EMPTY)),
			WorldEvent::ActorMoved { key, previous, current } => self.stage_data(key, ChangedBounds::new(previous, current)),
		}
	}

	/// Apply every queued event; returns how many were handled.
	pub fn drain_events(&mut self, receiver: &Receiver<WorldEvent>) -> usize {
		let mut handled = 0;
		for event in receiver.try_iter() {
			self.handle_event(event);
			handled += 1;
		}
		handled
	}

	/// Queue a full static generation; it runs before any staged update.
	pub fn request_generate(&mut self, actors: Vec<ActorGeometry>) {
		self.pending_generate = Some(actors);
	}

	pub fn on_complete<F>(&mut self, observer: F)
	where
		F: FnMut(&UpdateReport) + Send + 'static,
	{
		self.observers.push(Box::new(observer));
	}

	/// Whether a pass is in flight.
	#[inline]
	pub fn is_busy(&self) -> bool {
		self.receiver.is_some()
	}

	/// Whether a launch would find work.
	pub fn has_pending_work(&self) -> bool {
		self.pending_generate.is_some() || !self.staged.is_empty()
	}

	/// Collect a finished pass, then launch the next one if idle.
	pub fn tick(&mut self) -> Option<UpdateReport> {
		let report = self.poll();
		if !self.is_busy() {
			self.launch();
		}
		report
	}

	/// Start a pass on the rayon pool.
	///
	/// Returns `false` when busy or when there is nothing to do.
	pub fn launch(&mut self) -> bool {
		if self.is_busy() {
			return false;
		}
		let job = if let Some(actors) = self.pending_generate.take() {
			// Staged moves stay for the next pass; generation only covers the
			// bounds captured at request time.
			PassJob::Generate(actors)
		} else if !self.staged.is_empty() {
			PassJob::Update(std::mem::take(&mut self.staged))
		} else {
			return false;
		};

		let stop = Arc::new(AtomicBool::new(false));
		self.stop = Arc::clone(&stop);
		let request = PassRequest {
			navmesh: Arc::clone(&self.navmesh),
			oracle: Arc::clone(&self.oracle),
			job,
			stop,
		};

		let (sender, receiver) = channel::bounded(1);
		self.receiver = Some(receiver);

		rayon::spawn(move || {
			let outcome = run_pass(request);
			// Ignore send error (receiver dropped = abandoned)
			let _ = sender.send(outcome);
		});

		true
	}

	/// Non-blocking check for the in-flight pass.
	pub fn poll(&mut self) -> Option<UpdateReport> {
		let receiver = self.receiver.as_ref()?;

		match receiver.try_recv() {
			Ok(outcome) => {
				self.receiver = None;
				Some(self.finish(outcome))
			}
			Err(TryRecvError::Empty) => None,
			Err(TryRecvError::Disconnected) => {
				self.receiver = None;
				log::error!("Navmesh pass ended without a report");
				None
			}
		}
	}

	/// Ask the in-flight pass to stop at its next check.
	pub fn request_stop(&self) {
		self.stop.store(true, Ordering::Relaxed);
	}

	/// Block until the in-flight pass completes.
	pub fn wait(&mut self) -> Option<UpdateReport> {
		let receiver = self.receiver.take()?;
		match receiver.recv() {
			Ok(outcome) => Some(self.finish(outcome)),
			Err(_) => {
				log::error!("Navmesh pass ended without a report");
				None
			}
		}
	}

	/// Stop the in-flight pass and wait for it.
	pub fn shutdown(&mut self) -> Option<UpdateReport> {
		self.request_stop();
		self.wait()
	}

	fn finish(&mut self, outcome: PassOutcome) -> UpdateReport {
		let PassOutcome { report, remaining } = outcome;

		for (key, mut older) in remaining {
			if let Some(newer) = self.staged.remove(&key) {
				older.absorb(newer);
			}
			self.staged.insert(key, older);
		}

		log::info!(
			"Navmesh {:?} pass finished: {} actors, {} chunks in {}us{}",
			report.kind,
			report.actors,
			report.chunks_touched.len(),
			report.duration_us,
			if report.cancelled { " (stopped)" } else { "" }
		);
		self.metrics.record_pass(&report);
		for observer in &mut self.observers {
			observer(&report);
		}
		report
	}
}
