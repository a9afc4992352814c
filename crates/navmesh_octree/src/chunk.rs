//! Chunk - fixed-size cube bundling a static and a dynamic octree with the
//! ledger of actors that last contributed occlusion to it.

use std::collections::BTreeMap;

use crate::config::NavmeshConfig;
use crate::constants::ActorKey;
use crate::octree::{Octree, OctreeKind};

/// Random identifier stamped on every generation or save.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionId(pub u64);

impl VersionId {
	/// Fresh random id.
	pub fn random() -> Self {
		Self(rand::random::<u64>())
	}

	#[inline]
	pub fn raw(&self) -> u64 {
		self.0
	}
}

/// One chunk of the navmesh, keyed externally by its morton code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
	/// Rasterized from level geometry; the only octree that is serialized.
	pub static_octree: Octree,
	/// Runtime-only occluders.
	pub dynamic_octree: Octree,
	/// Version of each actor's latest contribution to this chunk.
	pub actors: BTreeMap<ActorKey, VersionId>,
}

impl Chunk {
	pub fn new(config: &NavmeshConfig) -> Self {
		Self {
			static_octree: Octree::new(config.static_depth),
			dynamic_octree: Octree::new(config.dynamic_depth),
			actors: BTreeMap::new(),
		}
	}

	#[inline]
	pub fn octree(&self, kind: OctreeKind) -> &Octree {
		match kind {
			OctreeKind::Static => &self.static_octree,
			OctreeKind::Dynamic => &self.dynamic_octree,
		}
	}

	#[inline]
	pub fn octree_mut(&mut self, kind: OctreeKind) -> &mut Octree {
		match kind {
			OctreeKind::Static => &mut self.static_octree,
			OctreeKind::Dynamic => &mut self.dynamic_octree,
		}
	}

	/// Record that `actor` contributed to this chunk in `version`.
	pub fn update_actor_entry(&mut self, actor: ActorKey, version: VersionId) {
		self.actors.insert(actor, version);
	}

	pub fn remove_actor_entry(&mut self, actor: ActorKey) -> Option<VersionId> {
		self.actors.remove(&actor)
	}

	#[inline]
	pub fn actor_version(&self, actor: ActorKey) -> Option<VersionId> {
		self.actors.get(&actor).copied()
	}

	/// Whether neither octree holds any node.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.static_octree.is_empty() && self.dynamic_octree.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new_chunk_is_empty() {
		let chunk = Chunk::new(&NavmeshConfig::default());
		assert!(chunk.is_empty());
		assert!(chunk.actors.is_empty());
	}

	#[test]
	fn test_octrees_are_independent() {
		let config = NavmeshConfig {
			static_depth: 8,
			dynamic_depth: 4,
		};
		let mut chunk = Chunk::new(&config);
		chunk.octree_mut(OctreeKind::Dynamic).try_init(0, 0);

		assert!(chunk.static_octree.is_empty());
		assert_eq!(chunk.dynamic_octree.node_count(), 1);
		assert_eq!(chunk.octree(OctreeKind::Dynamic).depth(), 4);
		assert!(!chunk.is_empty());
	}

	#[test]
	fn test_actor_ledger() {
		let mut chunk = Chunk::new(&NavmeshConfig::default());
		chunk.update_actor_entry(7, VersionId(1));
		chunk.update_actor_entry(7, VersionId(2));
		assert_eq!(chunk.actor_version(7), Some(VersionId(2)));
		assert_eq!(chunk.remove_actor_entry(7), Some(VersionId(2)));
		assert_eq!(chunk.actor_version(7), None);
	}

	#[test]
	fn test_random_versions_differ() {
		assert_ne!(VersionId::random(), VersionId::random());
	}
}
