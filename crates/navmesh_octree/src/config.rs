//! NavmeshConfig - resolution settings shared by every chunk of a navmesh.

use crate::constants::{Layer, DEFAULT_STATIC_DEPTH, MAX_STATIC_DEPTH};
use crate::error::ConfigError;
use crate::octree::OctreeKind;

/// Resolution settings for a navmesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavmeshConfig {
	/// Layer holding the leaf masks of the static octree.
	/// Leaf size = CHUNK_SIZE >> (static_depth + 2)
	pub static_depth: Layer,

	/// Same for the dynamic octree. May be coarser than the static one.
	pub dynamic_depth: Layer,
}

impl NavmeshConfig {
	/// Check both depths leave room for the two packed leaf layers.
	pub fn validate(&self) -> Result<(), ConfigError> {
		for (octree, depth) in [("static", self.static_depth), ("dynamic", self.dynamic_depth)] {
			if depth == 0 || depth > MAX_STATIC_DEPTH {
				return Err(ConfigError::InvalidDepth {
					octree,
					depth,
					max: MAX_STATIC_DEPTH,
				});
			}
		}
		Ok(())
	}

	#[inline]
	pub fn depth(&self, kind: OctreeKind) -> Layer {
		match kind {
			OctreeKind::Static => self.static_depth,
			OctreeKind::Dynamic => self.dynamic_depth,
		}
	}
}

impl Default for NavmeshConfig {
	fn default() -> Self {
		Self {
			static_depth: DEFAULT_STATIC_DEPTH,
			dynamic_depth: DEFAULT_STATIC_DEPTH,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_is_valid() {
		assert_eq!(NavmeshConfig::default().validate(), Ok(()));
	}

	#[test]
	fn test_rejects_depth_without_leaf_room() {
		let config = NavmeshConfig {
			static_depth: 9,
			..Default::default()
		};
		assert_eq!(
			config.validate(),
			Err(ConfigError::InvalidDepth {
				octree: "static",
				depth: 9,
				max: MAX_STATIC_DEPTH
			})
		);
	}

	#[test]
	fn test_rejects_zero_dynamic_depth() {
		let config = NavmeshConfig {
			dynamic_depth: 0,
			..Default::default()
		};
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_depth_per_kind() {
		let config = NavmeshConfig {
			static_depth: 8,
			dynamic_depth: 5,
		};
		assert_eq!(config.depth(OctreeKind::Static), 8);
		assert_eq!(config.depth(OctreeKind::Dynamic), 5);
	}
}
