use super::*;
use std::sync::atomic::AtomicBool;

use glam::IVec3;
use tempfile::TempDir;

use crate::generator::{generate, ActorGeometry};
use crate::morton::chunk;
use crate::octree::OctreeKind;
use crate::oracle::BoxOracle;
use crate::spatial::Bounds;
use crate::test_utils::*;
use crate::updater::{apply_staged, StagedBounds};

fn block() -> Bounds {
  Bounds::from_min_size(IVec3::new(1000, 0, 0), IVec3::new(48, 16, 16))
}

fn scene(oracle: &BoxOracle) -> Navmesh {
  let actors: Vec<ActorGeometry> = oracle
    .boxes()
    .into_iter()
    .enumerate()
    .map(|(key, bounds)| ActorGeometry::new(key as u32, vec![bounds]))
    .collect();
  let mut navmesh = Navmesh::default();
  generate(&mut navmesh, oracle, &actors, OctreeKind::Static);
  navmesh
}

// =========================================================================
// Batch 1: Layout Tests
// =========================================================================

/// Chunks are bucketed by their code shifted right by six.
#[test]
fn test_chunk_path_layout() {
  let root = Path::new("/navmesh");
  assert_eq!(
    chunk_path(root, 0x1234_5678),
    PathBuf::from("/navmesh/000000000048d159/56.chunk")
  );
  assert_eq!(chunk_path(root, 63), PathBuf::from("/navmesh/0000000000000000/63.chunk"));
  assert_eq!(manifest_path(root), PathBuf::from("/navmesh/manifest.bin"));
}

// =========================================================================
// Batch 2: Save / Load Tests
// =========================================================================

/// A full save loads back identically.
#[test]
fn test_save_all_then_load() {
  let dir = TempDir::new().unwrap();
  let oracle = BoxOracle::new(vec![block(), straddling_cube()]);
  let navmesh = scene(&oracle);

  let manifest = save_all(dir.path(), &navmesh).unwrap();
  assert_eq!(manifest.len(), navmesh.len());
  for chunk_mc in navmesh.chunks().keys() {
    assert!(chunk_path(dir.path(), *chunk_mc).is_file());
  }

  let loaded = load(dir.path(), NavmeshConfig::default()).unwrap();
  assert!(loaded.regenerate.is_empty());
  assert_eq!(loaded.navmesh, navmesh);
}

/// Without a manifest there is nothing to check records against.
#[test]
fn test_missing_manifest() {
  let dir = TempDir::new().unwrap();
  let err = load(dir.path(), NavmeshConfig::default()).unwrap_err();
  assert!(matches!(err, PersistError::MissingManifest(path) if path == manifest_path(dir.path())));
}

/// A corrupt manifest fails the load.
#[test]
fn test_corrupt_manifest() {
  let dir = TempDir::new().unwrap();
  fs::write(manifest_path(dir.path()), [1, 0, 0, 0, 9]).unwrap();
  assert!(matches!(
    load(dir.path(), NavmeshConfig::default()),
    Err(PersistError::Manifest(_))
  ));
}

/// Deleted or damaged chunk files are listed for regeneration.
#[test]
fn test_damaged_files_regenerate() {
  let dir = TempDir::new().unwrap();
  let oracle = BoxOracle::new(vec![straddling_cube()]);
  let navmesh = scene(&oracle);
  save_all(dir.path(), &navmesh).unwrap();

  let codes: Vec<ChunkMorton> = navmesh.chunks().keys().copied().collect();
  fs::remove_file(chunk_path(dir.path(), codes[1])).unwrap();
  fs::write(chunk_path(dir.path(), codes[6]), [0u8; 4]).unwrap();

  let loaded = load(dir.path(), NavmeshConfig::default()).unwrap();
  assert_eq!(loaded.regenerate, vec![codes[1], codes[6]]);
  assert_eq!(loaded.navmesh.len(), 6);
}

// =========================================================================
// Batch 3: Incremental Save Tests
// =========================================================================

/// Only touched chunks are rewritten and emptied ones are removed.
#[test]
fn test_save_incremental_after_updates() {
  let dir = TempDir::new().unwrap();
  let mover = cube(IVec3::splat(100), 8);
  let moved = cube(IVec3::new(2100, 100, 100), 8);
  let oracle = BoxOracle::new(vec![block(), mover]);
  let mut navmesh = scene(&oracle);
  let mut manifest = save_all(dir.path(), &navmesh).unwrap();
  let untouched = chunk::encode(IVec3::new(1024, 0, 0));
  let untouched_version = manifest.versions[&untouched];

  oracle.replace(1, moved);
  let staged = StagedBounds {
    previous: vec![mover],
    current: moved,
  };
  let update = apply_staged(&mut navmesh, &oracle, 1, &staged, &AtomicBool::new(false));
  let updated: Vec<ChunkMorton> = update.chunks.into_iter().collect();
  save_incremental(dir.path(), &navmesh, &mut manifest, &updated, &[]).unwrap();

  assert_eq!(manifest.versions[&untouched], untouched_version);
  let loaded = load(dir.path(), NavmeshConfig::default()).unwrap();
  assert!(loaded.regenerate.is_empty());
  assert_eq!(loaded.navmesh, navmesh);

  oracle.set_boxes(vec![block()]);
  let staged = StagedBounds {
    previous: vec![moved],
    current: Bounds::EMPTY,
  };
  let update = apply_staged(&mut navmesh, &oracle, 1, &staged, &AtomicBool::new(false));
  let far = chunk::encode(moved.min);
  assert!(navmesh.find_chunk(far).is_none());
  let updated: Vec<ChunkMorton> = update.chunks.into_iter().collect();
  save_incremental(dir.path(), &navmesh, &mut manifest, &updated, &[]).unwrap();

  assert!(!manifest.versions.contains_key(&far));
  assert!(!chunk_path(dir.path(), far).exists());
  let loaded = load(dir.path(), NavmeshConfig::default()).unwrap();
  assert_eq!(loaded.navmesh, navmesh);
}

/// Explicit deletions drop the record and its manifest entry.
#[test]
fn test_save_incremental_deletes() {
  let dir = TempDir::new().unwrap();
  let oracle = BoxOracle::new(vec![straddling_cube()]);
  let navmesh = scene(&oracle);
  let mut manifest = save_all(dir.path(), &navmesh).unwrap();
  let dropped = *navmesh.chunks().keys().next().unwrap();

  save_incremental(dir.path(), &navmesh, &mut manifest, &[], &[dropped, u64::MAX]).unwrap();
  assert_eq!(manifest.len(), 7);
  assert!(!chunk_path(dir.path(), dropped).exists());

  let loaded = load(dir.path(), NavmeshConfig::default()).unwrap();
  assert!(loaded.regenerate.is_empty());
  assert_eq!(loaded.navmesh.len(), 7);
}
