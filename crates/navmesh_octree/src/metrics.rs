//! Metrics collection for navmesh passes and octree occupancy.
//!
//! Feature-gated and runtime-toggled so a build without `metrics` pays
//! nothing.
//!
//! # Usage
//!
//! ```ignore
//! use navmesh_octree::metrics::{NavmeshMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // After each completed pass:
//! metrics.record_pass(&report);
//!
//! // Occupancy snapshot:
//! metrics.update_from_navmesh(&navmesh, OctreeKind::Static);
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::constants::MAX_LAYER;
use crate::navmesh::Navmesh;
use crate::octree::OctreeKind;
use crate::updater::{PassKind, UpdateReport};

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Whether metrics are collected (compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Fixed-capacity window of recent values.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a value, evicting the oldest at capacity.
    pub fn push(&mut self, value: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }
}

impl<T: Copy + Default + std::ops::Add<Output = T>> RollingWindow<T> {
    pub fn sum(&self) -> T {
        self.buffer.iter().copied().fold(T::default(), |acc, x| acc + x)
    }
}

impl RollingWindow<u64> {
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.sum() as f64 / self.buffer.len() as f64
        }
    }

    pub fn min_max(&self) -> Option<(u64, u64)> {
        let min = *self.buffer.iter().min()?;
        let max = *self.buffer.iter().max()?;
        Some((min, max))
    }
}

impl Default for RollingWindow<u64> {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Pass timings and octree occupancy of one world.
#[derive(Debug, Clone, Default)]
pub struct NavmeshMetrics {
    // Occupancy
    /// Node records per layer (index = layer).
    pub nodes_per_layer: [u64; MAX_LAYER as usize + 1],
    pub chunk_count: u64,
    pub leaf_count: u64,

    // Timing
    /// Generation pass durations in microseconds.
    pub generate_timings: RollingWindow<u64>,
    /// Update pass durations in microseconds.
    pub update_timings: RollingWindow<u64>,
    /// Oracle queries per pass.
    pub oracle_queries: RollingWindow<u64>,

    pub last_pass_us: u64,
    /// Passes completed this session, cancelled ones included.
    pub total_passes: u64,
    pub total_chunks_touched: u64,
}

impl NavmeshMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed pass.
    pub fn record_pass(&mut self, report: &UpdateReport) {
        if !is_enabled() {
            return;
        }
        match report.kind {
            PassKind::Generate => self.generate_timings.push(report.duration_us),
            PassKind::Update => self.update_timings.push(report.duration_us),
        }
        self.oracle_queries.push(report.stats.oracle_queries as u64);
        self.last_pass_us = report.duration_us;
        self.total_passes += 1;
        self.total_chunks_touched += report.chunks_touched.len() as u64;
    }

    /// Recount occupancy of one octree kind.
    pub fn update_from_navmesh(&mut self, navmesh: &Navmesh, kind: OctreeKind) {
        if !is_enabled() {
            return;
        }
        self.nodes_per_layer.fill(0);
        self.leaf_count = 0;
        self.chunk_count = navmesh.len() as u64;
        for chunk in navmesh.chunks().values() {
            let octree = chunk.octree(kind);
            for (layer, _, _) in octree.iter() {
                self.nodes_per_layer[layer as usize] += 1;
            }
            self.leaf_count += octree.leaves().values().map(|leaf| leaf.count() as u64).sum::<u64>();
        }
    }

    pub fn total_nodes(&self) -> u64 {
        self.nodes_per_layer.iter().sum()
    }

    pub fn avg_update_timing_us(&self) -> f64 {
        self.update_timings.average()
    }

    pub fn avg_generate_timing_us(&self) -> f64 {
        self.generate_timings.average()
    }

    /// Clear timings and occupancy; session totals are kept.
    pub fn reset(&mut self) {
        self.nodes_per_layer.fill(0);
        self.chunk_count = 0;
        self.leaf_count = 0;
        self.generate_timings.clear();
        self.update_timings.clear();
        self.oracle_queries.clear();
        self.last_pass_us = 0;
    }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
    use super::*;
    use crate::generator::RasterStats;
    use std::collections::BTreeSet;

    fn report(kind: PassKind, duration_us: u64, chunks: &[u64]) -> UpdateReport {
        UpdateReport {
            kind,
            actors: 1,
            chunks_touched: chunks.iter().copied().collect::<BTreeSet<_>>(),
            stats: RasterStats {
                oracle_queries: 10,
                ..Default::default()
            },
            duration_us,
            cancelled: false,
        }
    }

    #[test]
    fn test_rolling_window() {
        let mut window = RollingWindow::new(3);
        assert!(window.is_empty());
        assert_eq!(window.min_max(), None);

        window.push(10u64);
        window.push(20);
        window.push(30);
        assert_eq!(window.sum(), 60);
        assert_eq!(window.average(), 20.0);

        window.push(40);
        assert_eq!(window.len(), 3);
        assert_eq!(window.min_max(), Some((20, 40)));
        assert_eq!(window.last(), Some(&40));
    }

    #[test]
    fn test_record_pass() {
        let mut metrics = NavmeshMetrics::new();
        metrics.record_pass(&report(PassKind::Generate, 500, &[1, 2]));
        metrics.record_pass(&report(PassKind::Update, 100, &[3]));
        metrics.record_pass(&report(PassKind::Update, 300, &[]));

        assert_eq!(metrics.generate_timings.len(), 1);
        assert_eq!(metrics.avg_update_timing_us(), 200.0);
        assert_eq!(metrics.total_passes, 3);
        assert_eq!(metrics.total_chunks_touched, 3);
        assert_eq!(metrics.oracle_queries.sum(), 30);

        metrics.reset();
        assert!(metrics.update_timings.is_empty());
        assert_eq!(metrics.total_passes, 3);
    }

    #[test]
    fn test_update_from_navmesh() {
        let mut navmesh = Navmesh::default();
        let octree = &mut navmesh.try_init_chunk(0).static_octree;
        octree.try_init(0, 0);
        octree.try_init(0, 1);

        let mut metrics = NavmeshMetrics::new();
        metrics.update_from_navmesh(&navmesh, OctreeKind::Static);
        assert_eq!(metrics.chunk_count, 1);
        assert_eq!(metrics.nodes_per_layer[0], 1);
        assert_eq!(metrics.total_nodes(), 2);
    }
}
