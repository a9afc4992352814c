//! Generation, update and serialization benchmarks.
//!
//! Scenes:
//! - **cube**: the 200-unit cube straddling eight chunks
//! - **scattered**: small boxes spread over a 4x4 chunk floor
//!
//! The update benchmark moves one small actor by a few units, the case the
//! incremental path is built for.

use std::sync::atomic::AtomicBool;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::IVec3;
use navmesh_octree::{
  deserialize, generate, serialize,
  updater::{apply_staged, StagedBounds},
  ActorGeometry, Bounds, BoxOracle, Manifest, Navmesh, NavmeshConfig, OctreeKind,
};

// =============================================================================
// Scenes
// =============================================================================

fn cube_scene() -> Vec<Bounds> {
  vec![Bounds::from_min_size(IVec3::splat(1000), IVec3::splat(200))]
}

/// Deterministic grid of 8-unit boxes on a 4096² floor.
fn scattered_scene() -> Vec<Bounds> {
  let mut boxes = Vec::new();
  for x in 0..16 {
    for z in 0..16 {
      let height = 8 + ((x * 7 + z * 13) % 5) * 8;
      boxes.push(Bounds::from_min_size(
        IVec3::new(x * 256 + 20, 0, z * 256 + 20),
        IVec3::new(8, height, 8),
      ));
    }
  }
  boxes
}

fn actors(boxes: &[Bounds]) -> Vec<ActorGeometry> {
  boxes
    .iter()
    .enumerate()
    .map(|(key, bounds)| ActorGeometry::new(key as u32, vec![*bounds]))
    .collect()
}

fn generated(boxes: &[Bounds]) -> Navmesh {
  let oracle = BoxOracle::new(boxes.to_vec());
  let mut navmesh = Navmesh::default();
  generate(&mut navmesh, &oracle, &actors(boxes), OctreeKind::Static);
  navmesh
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_generate(c: &mut Criterion) {
  let mut group = c.benchmark_group("generate");
  group.sample_size(10);

  for (name, boxes) in [("cube", cube_scene()), ("scattered", scattered_scene())] {
    let oracle = BoxOracle::new(boxes.clone());
    let actors = actors(&boxes);
    group.bench_with_input(BenchmarkId::from_parameter(name), &actors, |b, actors| {
      b.iter(|| {
        let mut navmesh = Navmesh::default();
        black_box(generate(&mut navmesh, &oracle, actors, OctreeKind::Static))
      });
    });
  }

  group.finish();
}

fn bench_update(c: &mut Criterion) {
  let boxes = scattered_scene();
  let base = generated(&boxes);
  let from = boxes[0];
  let to = Bounds::new(from.min + IVec3::X * 4, from.max + IVec3::X * 4);
  let mut moved = boxes.clone();
  moved[0] = to;
  let oracle = BoxOracle::new(moved);
  let staged = StagedBounds {
    previous: vec![from],
    current: to,
  };
  let stop = AtomicBool::new(false);

  c.bench_function("update/small_move", |b| {
    b.iter_batched(
      || base.clone(),
      |mut navmesh| black_box(apply_staged(&mut navmesh, &oracle, 0, &staged, &stop)),
      criterion::BatchSize::LargeInput,
    );
  });
}

fn bench_serialize(c: &mut Criterion) {
  let navmesh = generated(&cube_scene());
  let mut manifest = Manifest::default();
  let serialized = serialize(&navmesh, &mut manifest);

  c.bench_function("serialize/cube", |b| {
    b.iter(|| {
      let mut manifest = Manifest::default();
      black_box(serialize(&navmesh, &mut manifest))
    });
  });

  c.bench_function("deserialize/cube", |b| {
    b.iter(|| black_box(deserialize(&serialized, NavmeshConfig::default())));
  });
}

criterion_group!(benches, bench_generate, bench_update, bench_serialize);
criterion_main!(benches);
