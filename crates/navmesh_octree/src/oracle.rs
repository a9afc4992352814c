//! Occupancy oracle - the boundary to the host's collision geometry.
//!
//! The core never inspects geometry itself. Every occlusion test during
//! rasterization is a query against an [`OccupancyOracle`], issued from the
//! background worker while the host may be mutating its scene, so
//! implementations must synchronize internally.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use glam::IVec3;

use crate::constants::Layer;
use crate::spatial::Bounds;

/// Answers whether solid geometry occupies a region.
pub trait OccupancyOracle: Send + Sync {
	/// Whether any solid geometry shares volume with `bounds`.
	fn overlaps_any(&self, bounds: &Bounds) -> bool;

	/// Whether solid geometry overlaps the node cube of `layer` at `location`.
	fn overlaps(&self, location: IVec3, layer: Layer) -> bool {
		self.overlaps_any(&Bounds::from_node(location, layer))
	}
}

impl<T: OccupancyOracle + ?Sized> OccupancyOracle for Arc<T> {
	fn overlaps_any(&self, bounds: &Bounds) -> bool {
		(**self).overlaps_any(bounds)
	}

	fn overlaps(&self, location: IVec3, layer: Layer) -> bool {
		(**self).overlaps(location, layer)
	}
}

impl OccupancyOracle for Box<dyn OccupancyOracle> {
	fn overlaps_any(&self, bounds: &Bounds) -> bool {
		(**self).overlaps_any(bounds)
	}

	fn overlaps(&self, location: IVec3, layer: Layer) -> bool {
		(**self).overlaps(location, layer)
	}
}

// =============================================================================
// BoxOracle - solid axis-aligned boxes
// =============================================================================

/// Scene made of solid boxes, guarded by a read-write lock.
///
/// Queries take the read lock for their duration, so the scene can be edited
/// from another thread while a pass is running.
#[derive(Debug, Default)]
pub struct BoxOracle {
	boxes: RwLock<Vec<Bounds>>,
}

impl BoxOracle {
	pub fn new(boxes: Vec<Bounds>) -> Self {
		Self {
			boxes: RwLock::new(boxes),
		}
	}

	/// Replace the scene.
	pub fn set_boxes(&self, boxes: Vec<Bounds>) {
		let mut guard = self.boxes.write().unwrap_or_else(|poisoned| poisoned.into_inner());
		*guard = boxes;
	}

	/// Replace box `index`, returning the previous bounds.
	pub fn replace(&self, index: usize, bounds: Bounds) -> Option<Bounds> {
		let mut guard = self.boxes.write().unwrap_or_else(|poisoned| poisoned.into_inner());
		let slot = guard.get_mut(index)?;
		Some(std::mem::replace(slot, bounds))
	}

	pub fn push(&self, bounds: Bounds) {
		let mut guard = self.boxes.write().unwrap_or_else(|poisoned| poisoned.into_inner());
		guard.push(bounds);
	}

	/// Snapshot of the current boxes.
	pub fn boxes(&self) -> Vec<Bounds> {
		self.boxes.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
	}
}

impl OccupancyOracle for BoxOracle {
	fn overlaps_any(&self, bounds: &Bounds) -> bool {
		let guard = self.boxes.read().unwrap_or_else(|poisoned| poisoned.into_inner());
		guard.iter().any(|solid| solid.overlaps(bounds))
	}
}

// =============================================================================
// CountingOracle - query statistics
// =============================================================================

/// Wraps an oracle and counts the queries that reach it.
#[derive(Debug, Default)]
pub struct CountingOracle<O> {
	inner: O,
	queries: AtomicUsize,
}

impl<O: OccupancyOracle> CountingOracle<O> {
	pub fn new(inner: O) -> Self {
		Self {
			inner,
			queries: AtomicUsize::new(0),
		}
	}

	pub fn queries(&self) -> usize {
		self.queries.load(Ordering::Relaxed)
	}

	pub fn reset(&self) {
		self.queries.store(0, Ordering::Relaxed);
	}

	pub fn inner(&self) -> &O {
		&self.inner
	}
}

impl<O: OccupancyOracle> OccupancyOracle for CountingOracle<O> {
	fn overlaps_any(&self, bounds: &Bounds) -> bool {
		self.queries.fetch_add(1, Ordering::Relaxed);
		self.inner.overlaps_any(bounds)
	}
}
