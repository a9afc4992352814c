//! Test utilities shared by the generator, updater and serializer tests.
//!
//! Provides scene fixtures and whole-navmesh invariant checks.

use std::collections::BTreeMap;

use glam::IVec3;

use crate::constants::Direction;
use crate::generator::resolver::resolve_relation;
use crate::morton::{node, ChunkMorton};
use crate::navmesh::Navmesh;
use crate::octree::{Octree, OctreeKind};
use crate::spatial::Bounds;

// =============================================================================
// Fixtures
// =============================================================================

/// Axis-aligned cube from its minimum corner.
pub fn cube(min: IVec3, size: i32) -> Bounds {
  Bounds::from_min_size(min, IVec3::splat(size))
}

/// The 200-unit cube at (1000, 1000, 1000), straddling eight chunks.
pub fn straddling_cube() -> Bounds {
  cube(IVec3::splat(1000), 200)
}

// =============================================================================
// Inspection
// =============================================================================

/// Octrees of one kind keyed by chunk, ignoring ledgers.
pub fn octree_snapshot(navmesh: &Navmesh, kind: OctreeKind) -> BTreeMap<ChunkMorton, Octree> {
  navmesh
    .chunks()
    .iter()
    .filter(|(_, chunk)| !chunk.octree(kind).is_empty())
    .map(|(mc, chunk)| (*mc, chunk.octree(kind).clone()))
    .collect()
}

/// Number of occupied leaves of one kind.
pub fn leaf_total(navmesh: &Navmesh, kind: OctreeKind) -> u64 {
  navmesh
    .chunks()
    .values()
    .flat_map(|chunk| chunk.octree(kind).leaves().values())
    .map(|leaf| leaf.count() as u64)
    .sum()
}

// =============================================================================
// Invariants
// =============================================================================

/// Every stored relation equals a fresh search.
pub fn assert_canonical(navmesh: &Navmesh, kind: OctreeKind) {
  for (&chunk_mc, chunk) in navmesh.chunks() {
    for (layer, code, node) in chunk.octree(kind).iter() {
      for direction in Direction::ALL {
        let expected = resolve_relation(navmesh, kind, chunk_mc, code, layer, direction);
        assert_eq!(
          node.relation(direction),
          expected,
          "chunk {chunk_mc:#x} code {code:#x} layer {layer} {direction:?}"
        );
      }
    }
  }
}

/// Parent links, child bits and leaf masks agree.
pub fn assert_structure(navmesh: &Navmesh, kind: OctreeKind) {
  for (&chunk_mc, chunk) in navmesh.chunks() {
    let octree = chunk.octree(kind);
    let depth = octree.depth();
    for (layer, code, current) in octree.iter() {
      if layer > 0 {
        let parent_layer = layer - 1;
        let parent = octree.find(node::parent(code, parent_layer), parent_layer);
        assert!(
          parent.is_some_and(|p| p.is_child_active(node::child_index(code, layer))),
          "chunk {chunk_mc:#x} code {code:#x} layer {layer} has no parent bit"
        );
      }
      assert!(current.has_children(), "chunk {chunk_mc:#x} code {code:#x} layer {layer} is childless");
      if layer == depth {
        assert_eq!(current.children(), octree.leaf(code).group_mask());
      } else {
        for idx in current.active_children() {
          assert!(octree.contains(node::child(code, layer + 1, idx), layer + 1));
        }
      }
    }
  }
}
