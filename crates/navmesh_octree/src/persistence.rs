//! Persistence - chunk records and the manifest on disk.
//!
//! # Layout
//!
//! ```text
//! <root>/
//! ├── manifest.bin
//! ├── 0000000000012345/        chunk_mc >> 6, 16 hex digits
//! │   ├── 0.chunk              chunk_mc & 63
//! │   └── 17.chunk
//! └── ...
//! ```
//!
//! Files are written to a sibling `.tmp` path and renamed into place. Only
//! chunks listed in the manifest are read back; stray files are ignored.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::NavmeshConfig;
use crate::error::{PersistError, PersistResult};
use crate::morton::ChunkMorton;
use crate::navmesh::Navmesh;
use crate::serialize::{deserialize, serialize, serialize_chunks, LoadResult, Manifest, SerializedNavmesh};

pub const MANIFEST_FILE: &str = "manifest.bin";
pub const CHUNK_EXTENSION: &str = "chunk";

/// Chunks sharing a directory: 2^6.
const BUCKET_BITS: u32 = 6;

/// Record path of one chunk under `root`.
pub fn chunk_path(root: &Path, chunk_mc: ChunkMorton) -> PathBuf {
	let bucket = chunk_mc >> BUCKET_BITS;
	let slot = chunk_mc & ((1 << BUCKET_BITS) - 1);
	root.join(format!("{:016x}", bucket)).join(format!("{}.{}", slot, CHUNK_EXTENSION))
}

pub fn manifest_path(root: &Path) -> PathBuf {
	root.join(MANIFEST_FILE)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> PersistResult<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
	}
	let tmp = path.with_extension("tmp");
	fs::write(&tmp, bytes).map_err(|e| PersistError::io(&tmp, e))?;
	fs::rename(&tmp, path).map_err(|e| PersistError::io(path, e))
}

fn remove_record(root: &Path, chunk_mc: ChunkMorton) -> PersistResult<()> {
	let path = chunk_path(root, chunk_mc);
	match fs::remove_file(&path) {
		Ok(()) => Ok(()),
		Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
		Err(e) => Err(PersistError::io(path, e)),
	}
}

/// Write every chunk and a fresh manifest. Returns the manifest written.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "persistence::save_all"))]
pub fn save_all(root: &Path, navmesh: &Navmesh) -> PersistResult<Manifest> {
	let mut manifest = Manifest::default();
	let serialized = serialize(navmesh, &mut manifest);
	for (chunk_mc, bytes) in &serialized.records {
		write_atomic(&chunk_path(root, *chunk_mc), bytes)?;
	}
	write_atomic(&manifest_path(root), &manifest.encode())?;
	log::info!("Saved {} chunks to {}", serialized.records.len(), root.display());
	Ok(manifest)
}

/// Rewrite `updated` chunks, drop `deleted` ones and store the manifest.
///
/// An updated chunk that no longer holds static nodes is deleted as well.
pub fn save_incremental(
	root: &Path,
	navmesh: &Navmesh,
	manifest: &mut Manifest,
	updated: &[ChunkMorton],
	deleted: &[ChunkMorton],
) -> PersistResult<()> {
	let records = serialize_chunks(navmesh, manifest, updated);
	for (chunk_mc, bytes) in &records {
		write_atomic(&chunk_path(root, *chunk_mc), bytes)?;
	}

	let mut removed = 0;
	for &chunk_mc in updated.iter().filter(|mc| !records.contains_key(*mc)).chain(deleted) {
		manifest.versions.remove(&chunk_mc);
		remove_record(root, chunk_mc)?;
		removed += 1;
	}

	write_atomic(&manifest_path(root), &manifest.encode())?;
	log::debug!("Saved {} chunks, removed {}", records.len(), removed);
	Ok(())
}

/// Load the navmesh saved under `root`.
///
/// Fails only when the manifest is missing or unreadable, or on an invalid
/// `config`. Unreadable chunk files are listed in
/// [`LoadResult::regenerate`].
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "persistence::load"))]
pub fn load(root: &Path, config: NavmeshConfig) -> PersistResult<LoadResult> {
	let path = manifest_path(root);
	let bytes = match fs::read(&path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == ErrorKind::NotFound => return Err(PersistError::MissingManifest(path)),
		Err(e) => return Err(PersistError::io(path, e)),
	};
	let manifest = Manifest::decode(&bytes)?;

	let mut serialized = SerializedNavmesh {
		manifest,
		..Default::default()
	};
	for &chunk_mc in serialized.manifest.versions.keys() {
		let path = chunk_path(root, chunk_mc);
		match fs::read(&path) {
			Ok(record) => {
				serialized.records.insert(chunk_mc, record);
			}
			Err(e) => log::warn!("Cannot read {}: {}", path.display(), e),
		}
	}

	Ok(deserialize(&serialized, config)?)
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;
