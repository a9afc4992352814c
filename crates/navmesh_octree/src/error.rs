//! Error types.
//!
//! Absence is never an error here: a missing node is the empty signal, a
//! missing neighbour chunk is the EMPTY relation, and a busy updater simply
//! declines to launch.

use std::path::PathBuf;

use crate::constants::Layer;

/// Invalid [`NavmeshConfig`](crate::config::NavmeshConfig).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
	#[error("{octree} depth {depth} is outside 1..={max}")]
	InvalidDepth {
		octree: &'static str,
		depth: Layer,
		max: Layer,
	},
}

/// Failure decoding a serialized record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
	#[error("unexpected end of data at byte {offset}, needed {needed} more")]
	UnexpectedEof { offset: usize, needed: usize },

	#[error("node without children at byte {offset}")]
	EmptyNode { offset: usize },

	#[error("empty leaf group at byte {offset}")]
	EmptyGroup { offset: usize },

	#[error("{count} trailing bytes after octree")]
	TrailingBytes { count: usize },
}

/// Failure reading or writing persisted navmesh files.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
	#[error("io error on {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("no manifest at {0}")]
	MissingManifest(PathBuf),

	#[error("corrupt manifest: {0}")]
	Manifest(#[from] DecodeError),

	#[error(transparent)]
	Config(#[from] ConfigError),
}

impl PersistError {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source,
		}
	}
}

pub type PersistResult<T> = Result<T, PersistError>;
