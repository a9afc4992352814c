use super::*;
use crate::generator::{generate, regenerate_chunks, ActorGeometry};
use crate::morton::chunk;
use crate::oracle::BoxOracle;
use crate::test_utils::*;
use glam::IVec3;

fn straddling_scene() -> (Navmesh, Vec<ActorGeometry>, BoxOracle) {
  let actors = vec![ActorGeometry::new(1, vec![straddling_cube()])];
  let oracle = BoxOracle::new(vec![straddling_cube()]);
  let mut navmesh = Navmesh::default();
  generate(&mut navmesh, &oracle, &actors, OctreeKind::Static);
  (navmesh, actors, oracle)
}

/// One occupied unit at the chunk origin.
fn unit_octree() -> Octree {
  let oracle = BoxOracle::new(vec![cube(IVec3::ZERO, 1)]);
  let mut navmesh = Navmesh::default();
  generate(&mut navmesh, &oracle, &[ActorGeometry::new(1, vec![cube(IVec3::ZERO, 1)])], OctreeKind::Static);
  navmesh.find_chunk(chunk::encode(IVec3::ZERO)).unwrap().static_octree.clone()
}

// =========================================================================
// Batch 1: Pre-order Codec Tests
// =========================================================================

/// Empty octrees encode to nothing and decode back.
#[test]
fn test_empty_octree() {
  assert!(encode_octree(&Octree::new(8)).is_empty());
  assert_eq!(decode_octree(&[], 8), Ok(Octree::new(8)));
}

/// A single leaf is one children byte per layer plus one leaf byte.
#[test]
fn test_unit_encoding() {
  let octree = unit_octree();
  let bytes = encode_octree(&octree);
  assert_eq!(bytes, vec![1u8; 10]);

  let decoded = decode_octree(&bytes, 8).unwrap();
  assert_eq!(decoded.node_count(), 9);
  assert_eq!(decoded.leaf(0), LeafMask(1));
  assert_eq!(encode_octree(&decoded), bytes);
}

/// Malformed walks are rejected with the failing offset.
#[test]
fn test_decode_errors() {
  let bytes = encode_octree(&unit_octree());

  assert_eq!(
    decode_octree(&bytes[..9], 8),
    Err(DecodeError::UnexpectedEof { offset: 9, needed: 1 })
  );

  let mut empty_group = bytes.clone();
  empty_group[9] = 0;
  assert_eq!(decode_octree(&empty_group, 8), Err(DecodeError::EmptyGroup { offset: 9 }));

  let mut trailing = bytes.clone();
  trailing.push(0);
  assert_eq!(decode_octree(&trailing, 8), Err(DecodeError::TrailingBytes { count: 1 }));

  assert_eq!(decode_octree(&[0], 8), Err(DecodeError::EmptyNode { offset: 0 }));
  assert_eq!(decode_octree(&[1, 0], 8), Err(DecodeError::EmptyNode { offset: 1 }));
  let mut empty_depth_node = bytes.clone();
  empty_depth_node[8] = 0;
  assert_eq!(decode_octree(&empty_depth_node, 8), Err(DecodeError::EmptyNode { offset: 8 }));
}

// =========================================================================
// Batch 2: Record Tests
// =========================================================================

/// The chunk record carries its version and ledger ahead of the walk.
#[test]
fn test_chunk_record_layout() {
  let config = NavmeshConfig::default();
  let mut chunk = Chunk::new(&config);
  chunk.static_octree = unit_octree();
  chunk.update_actor_entry(7, VersionId(0xabcd));

  let bytes = encode_chunk(&chunk, VersionId(42));
  assert_eq!(bytes.len(), 8 + 4 + 12 + 10);
  assert_eq!(&bytes[..8], &42u64.to_le_bytes());
  assert_eq!(&bytes[8..12], &1u32.to_le_bytes());
  assert_eq!(&bytes[12..16], &7u32.to_le_bytes());

  let (version, decoded) = decode_chunk(&bytes, &config).unwrap();
  assert_eq!(version, VersionId(42));
  assert_eq!(decoded.actor_version(7), Some(VersionId(0xabcd)));
  assert_eq!(encode_octree(&decoded.static_octree), encode_octree(&chunk.static_octree));

  assert_eq!(
    decode_chunk(&bytes[..bytes.len() - 1], &config).map(|_| ()),
    Err(DecodeError::UnexpectedEof { offset: 33, needed: 1 }),
    "Offsets count from the record start"
  );
}

/// Manifest decoding rejects truncated and padded input.
#[test]
fn test_manifest_decode() {
  let mut manifest = Manifest::default();
  manifest.versions.insert(3, VersionId(9));
  manifest.versions.insert(1 << 40, VersionId(u64::MAX));
  let bytes = manifest.encode();
  assert_eq!(bytes.len(), 4 + 2 * 16);
  assert_eq!(Manifest::decode(&bytes).as_ref(), Ok(&manifest));

  assert!(matches!(
    Manifest::decode(&bytes[..20]),
    Err(DecodeError::UnexpectedEof { .. })
  ));
  let mut padded = bytes.clone();
  padded.extend_from_slice(&[0, 0]);
  assert_eq!(Manifest::decode(&padded), Err(DecodeError::TrailingBytes { count: 2 }));
}

// =========================================================================
// Batch 3: Navmesh Round-trip Tests
// =========================================================================

/// The 200-unit cube survives a round trip, relations included.
#[test]
fn test_navmesh_round_trip() {
  let (navmesh, _, _) = straddling_scene();
  let mut manifest = Manifest::default();
  let serialized = serialize(&navmesh, &mut manifest);

  assert_eq!(manifest.len(), 8);
  assert_eq!(serialized.records.len(), 8);
  assert_eq!(serialized.manifest, manifest);

  let loaded = deserialize(&serialized, NavmeshConfig::default()).unwrap();
  assert!(loaded.regenerate.is_empty());
  assert_eq!(loaded.navmesh, navmesh);
  assert_canonical(&loaded.navmesh, OctreeKind::Static);
}

/// Each save stamps fresh versions and forgets chunks that are gone.
#[test]
fn test_serialize_rewrites_manifest() {
  let (navmesh, _, _) = straddling_scene();
  let mut manifest = Manifest::default();
  manifest.versions.insert(u64::MAX, VersionId(1));

  serialize(&navmesh, &mut manifest);
  let first = manifest.clone();
  assert!(!first.versions.contains_key(&u64::MAX));

  serialize(&navmesh, &mut manifest);
  assert_eq!(manifest.versions.keys().collect::<Vec<_>>(), first.versions.keys().collect::<Vec<_>>());
  assert_ne!(manifest, first, "Versions are random per save");
}

/// Dynamic octrees are never written.
#[test]
fn test_dynamic_only_chunk_is_skipped() {
  let solid = cube(IVec3::splat(64), 8);
  let oracle = BoxOracle::new(vec![solid]);
  let mut navmesh = Navmesh::default();
  generate(&mut navmesh, &oracle, &[ActorGeometry::new(1, vec![solid])], OctreeKind::Dynamic);
  assert_eq!(navmesh.len(), 1);

  let mut manifest = Manifest::default();
  let serialized = serialize(&navmesh, &mut manifest);
  assert!(serialized.records.is_empty());
  assert!(manifest.is_empty());
}

// =========================================================================
// Batch 4: Regeneration Tests
// =========================================================================

/// A version mismatch sends the chunk to regeneration, which restores it.
#[test]
fn test_manifest_mismatch_regenerates() {
  let (navmesh, actors, oracle) = straddling_scene();
  let mut manifest = Manifest::default();
  let mut serialized = serialize(&navmesh, &mut manifest);

  let stale = *serialized.records.keys().nth(3).unwrap();
  let version = serialized.manifest.versions[&stale];
  serialized.manifest.versions.insert(stale, VersionId(version.raw() ^ 1));

  let mut loaded = deserialize(&serialized, NavmeshConfig::default()).unwrap();
  assert_eq!(loaded.regenerate, vec![stale]);
  assert!(loaded.navmesh.find_chunk(stale).is_none());
  assert_eq!(loaded.navmesh.len(), 7);

  regenerate_chunks(&mut loaded.navmesh, &oracle, &actors, &loaded.regenerate);
  assert_eq!(
    octree_snapshot(&loaded.navmesh, OctreeKind::Static),
    octree_snapshot(&navmesh, OctreeKind::Static)
  );
}

/// Truncated and missing records regenerate without failing the load.
#[test]
fn test_corrupt_records_regenerate() {
  let (navmesh, _, _) = straddling_scene();
  let mut manifest = Manifest::default();
  let mut serialized = serialize(&navmesh, &mut manifest);
  let codes: Vec<ChunkMorton> = serialized.records.keys().copied().collect();

  serialized.records.get_mut(&codes[0]).unwrap().pop();
  serialized.records.remove(&codes[5]);
  serialized.records.insert(u64::MAX, vec![0xff; 3]);

  let loaded = deserialize(&serialized, NavmeshConfig::default()).unwrap();
  assert_eq!(loaded.regenerate, vec![codes[0], codes[5]]);
  assert_eq!(loaded.navmesh.len(), 6);
  assert_canonical(&loaded.navmesh, OctreeKind::Static);
}

/// An invalid config is the only hard failure.
#[test]
fn test_deserialize_invalid_config() {
  let config = NavmeshConfig {
    static_depth: 0,
    ..Default::default()
  };
  assert!(matches!(
    deserialize(&SerializedNavmesh::default(), config),
    Err(ConfigError::InvalidDepth { depth: 0, .. })
  ));
}
