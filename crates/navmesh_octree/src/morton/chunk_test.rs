use glam::IVec3;

use super::*;
use crate::constants::{Direction, CHUNK_SIZE};

// =========================================================================
// Batch 1: Chunk Codec Tests
// =========================================================================

/// Encoding any position inside a chunk decodes to that chunk's origin.
#[test]
fn test_encode_floors_to_chunk_origin() {
  let cases = [
    (IVec3::new(0, 0, 0), IVec3::new(0, 0, 0)),
    (IVec3::new(1023, 5, 1000), IVec3::new(0, 0, 0)),
    (IVec3::new(1024, 2048, 3072), IVec3::new(1024, 2048, 3072)),
    (IVec3::new(-1, -1024, -1025), IVec3::new(-1024, -1024, -2048)),
    (IVec3::new(1000, 1000, 1000), IVec3::new(0, 0, 0)),
    (IVec3::new(1200, 1200, 1200), IVec3::new(1024, 1024, 1024)),
  ];
  for (world, origin) in cases {
    assert_eq!(decode(encode(world)), origin, "World {:?}", world);
  }
}

/// Chunk origins survive a round trip across the supported range.
#[test]
fn test_chunk_origin_roundtrip() {
  for i in -64..64 {
    let origin = IVec3::new(i * CHUNK_SIZE, -i * 3 * CHUNK_SIZE, (i * 7) * CHUNK_SIZE);
    assert_eq!(decode(encode(origin)), origin);
  }
  let far = IVec3::new(1 << 29, -(1 << 29), 1 << 30);
  assert_eq!(decode(encode(far)), far);
}

/// Axis steps move by exactly one chunk.
#[test]
fn test_increment_decrement() {
  let code = encode(IVec3::new(-2048, 0, 4096));
  assert_eq!(decode(increment_x(code)), IVec3::new(-1024, 0, 4096));
  assert_eq!(decode(increment_y(code)), IVec3::new(-2048, 1024, 4096));
  assert_eq!(decode(increment_z(code)), IVec3::new(-2048, 0, 5120));
  assert_eq!(decode(decrement_x(code)), IVec3::new(-3072, 0, 4096));
  assert_eq!(decode(decrement_y(code)), IVec3::new(-2048, -1024, 4096));
  assert_eq!(decode(decrement_z(code)), IVec3::new(-2048, 0, 3072));
}

/// Moves across zero keep the other axes intact.
#[test]
fn test_move_inverse_across_origin() {
  for origin in [IVec3::ZERO, IVec3::splat(-1024), IVec3::new(1024, -1024, 0)] {
    let code = encode(origin);
    for dir in Direction::ALL {
      assert_eq!(move_code(move_code(code, dir), dir.opposite()), code, "{:?}", dir);
    }
  }
}

/// Copying an axis resets row iteration.
#[test]
fn test_copy_axis() {
  let start = encode(IVec3::new(0, 0, 0));
  let current = encode(IVec3::new(4096, 2048, 1024));
  assert_eq!(decode(copy_x(current, start)), IVec3::new(0, 2048, 1024));
  assert_eq!(decode(copy_y(current, start)), IVec3::new(4096, 0, 1024));
  assert_eq!(decode(copy_z(current, start)), IVec3::new(4096, 2048, 0));
}

/// Codes of chunks along one axis increase monotonically.
#[test]
fn test_codes_ordered_along_axis() {
  let mut previous = encode(IVec3::new(-8 * CHUNK_SIZE, 0, 0));
  for i in -7..8 {
    let code = encode(IVec3::new(i * CHUNK_SIZE, 0, 0));
    assert!(code > previous);
    previous = code;
  }
}
