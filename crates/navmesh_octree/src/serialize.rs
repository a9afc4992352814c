//! Serializer - compact binary records for the static octree.
//!
//! # Chunk Record
//!
//! ```text
//! [version u64][ledger count u32][(actor u32, version u64) * n][pre-order]
//! ```
//!
//! All integers are little-endian. The pre-order part walks from the root:
//!
//! ```text
//! node (layer < depth):  [children u8] then each set child, ascending
//! node (layer = depth):  [children u8] then [leaf bits u8] per set group
//! ```
//!
//! Positions are never stored; each child's code follows from its parent
//! code and child index. An empty octree encodes to zero bytes.
//!
//! # Manifest
//!
//! ```text
//! [count u32][(chunk u64, version u64) * n]
//! ```
//!
//! Maps each saved chunk to the version its record was written with. On
//! load, a chunk whose record is missing, unreadable or stamped with
//! another version goes to the regeneration list instead of failing the
//! load. Relations are not stored; they are relinked after decoding.

use std::collections::BTreeMap;

use rayon::prelude::*;
use web_time::Instant;

use crate::chunk::{Chunk, VersionId};
use crate::config::NavmeshConfig;
use crate::constants::{ActorKey, Layer};
use crate::error::{ConfigError, DecodeError};
use crate::generator::RelationResolver;
use crate::morton::{node, ChunkMorton, NodeMorton};
use crate::navmesh::Navmesh;
use crate::octree::{LeafMask, Octree, OctreeKind};

// =============================================================================
// Pre-order octree codec
// =============================================================================

/// Encode an octree as a pre-order walk from its root.
pub fn encode_octree(octree: &Octree) -> Vec<u8> {
	let mut out = Vec::with_capacity(octree.node_count() + octree.leaves().len() * 8);
	if octree.root().is_some() {
		encode_node(octree, 0, 0, &mut out);
	}
	out
}

fn encode_node(octree: &Octree, code: NodeMorton, layer: Layer, out: &mut Vec<u8>) {
	let children = octree.find(code, layer).map_or(0, |n| n.children());
	out.push(children);

	if layer == octree.depth() {
		let leaf = octree.leaf(code);
		for group in 0..8u8 {
			if children & (1 << group) != 0 {
				out.push(leaf.group(group));
			}
		}
		return;
	}

	let child_layer = layer + 1;
	for child_idx in 0..8u8 {
		if children & (1 << child_idx) != 0 {
			encode_node(octree, node::child(code, child_layer, child_idx), child_layer, out);
		}
	}
}

/// Decode a pre-order walk into an octree of `depth`.
///
/// Relations are left EMPTY.
pub fn decode_octree(bytes: &[u8], depth: Layer) -> Result<Octree, DecodeError> {
	let mut octree = Octree::new(depth);
	if bytes.is_empty() {
		return Ok(octree);
	}
	let mut reader = ByteReader::new(bytes);
	decode_node(&mut reader, &mut octree, 0, 0)?;
	reader.finish()?;
	Ok(octree)
}

fn decode_node(reader: &mut ByteReader<'_>, octree: &mut Octree, code: NodeMorton, layer: Layer) -> Result<(), DecodeError> {
	let offset = reader.offset();
	let children = reader.u8()?;
	if children == 0 {
		return Err(DecodeError::EmptyNode { offset });
	}
	octree.try_init(code, layer).0.set_children(children);

	if layer == octree.depth() {
		let mut leaf = LeafMask::EMPTY;
		for group in 0..8u8 {
			if children & (1 << group) == 0 {
				continue;
			}
			let offset = reader.offset();
			let bits = reader.u8()?;
			if bits == 0 {
				return Err(DecodeError::EmptyGroup { offset });
			}
			leaf.set_group(group, bits);
		}
		octree.set_leaf(code, leaf);
		return Ok(());
	}

	let child_layer = layer + 1;
	for child_idx in 0..8u8 {
		if children & (1 << child_idx) != 0 {
			decode_node(reader, octree, node::child(code, child_layer, child_idx), child_layer)?;
		}
	}
	Ok(())
}

/// Cursor over a byte slice with offset-tagged errors.
struct ByteReader<'a> {
	bytes: &'a [u8],
	offset: usize,
}

impl<'a> ByteReader<'a> {
	fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, offset: 0 }
	}

	#[inline]
	fn offset(&self) -> usize {
		self.offset
	}

	fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
		let remaining = self.bytes.len() - self.offset;
		if remaining < N {
			return Err(DecodeError::UnexpectedEof {
				offset: self.offset,
				needed: N - remaining,
			});
		}
		let mut out = [0u8; N];
		out.copy_from_slice(&self.bytes[self.offset..self.offset + N]);
		self.offset += N;
		Ok(out)
	}

	fn u8(&mut self) -> Result<u8, DecodeError> {
		Ok(self.take::<1>()?[0])
	}

	fn u32(&mut self) -> Result<u32, DecodeError> {
		Ok(u32::from_le_bytes(self.take()?))
	}

	fn u64(&mut self) -> Result<u64, DecodeError> {
		Ok(u64::from_le_bytes(self.take()?))
	}

	fn rest(&mut self) -> &'a [u8] {
		let rest = &self.bytes[self.offset..];
		self.offset = self.bytes.len();
		rest
	}

	fn finish(&self) -> Result<(), DecodeError> {
		match self.bytes.len() - self.offset {
			0 => Ok(()),
			count => Err(DecodeError::TrailingBytes { count }),
		}
	}
}

// =============================================================================
// Chunk record
// =============================================================================

/// Encode a chunk's ledger and static octree, stamped with `version`.
pub fn encode_chunk(chunk: &Chunk, version: VersionId) -> Vec<u8> {
	let octree = encode_octree(&chunk.static_octree);
	let mut out = Vec::with_capacity(12 + chunk.actors.len() * 12 + octree.len());
	out.extend_from_slice(&version.raw().to_le_bytes());
	out.extend_from_slice(&(chunk.actors.len() as u32).to_le_bytes());
	for (actor, actor_version) in &chunk.actors {
		out.extend_from_slice(&actor.to_le_bytes());
		out.extend_from_slice(&actor_version.raw().to_le_bytes());
	}
	out.extend_from_slice(&octree);
	out
}

/// Decode a chunk record into its version and chunk.
///
/// The dynamic octree of the result is empty and relations are EMPTY.
pub fn decode_chunk(bytes: &[u8], config: &NavmeshConfig) -> Result<(VersionId, Chunk), DecodeError> {
	let mut reader = ByteReader::new(bytes);
	let version = VersionId(reader.u64()?);
	let count = reader.u32()?;

	let mut chunk = Chunk::new(config);
	for _ in 0..count {
		let actor: ActorKey = reader.u32()?;
		let actor_version = VersionId(reader.u64()?);
		chunk.update_actor_entry(actor, actor_version);
	}

	let octree_start = reader.offset();
	chunk.static_octree = decode_octree(reader.rest(), config.static_depth).map_err(|err| shift(err, octree_start))?;
	Ok((version, chunk))
}

/// Rebase an octree error offset onto the whole record.
fn shift(err: DecodeError, by: usize) -> DecodeError {
	match err {
		DecodeError::UnexpectedEof { offset, needed } => DecodeError::UnexpectedEof {
			offset: offset + by,
			needed,
		},
		DecodeError::EmptyGroup { offset } => DecodeError::EmptyGroup { offset: offset + by },
		DecodeError::EmptyNode { offset } => DecodeError::EmptyNode { offset: offset + by },
		other => other,
	}
}

// =============================================================================
// Manifest
// =============================================================================

/// Expected record version per saved chunk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
	pub versions: BTreeMap<ChunkMorton, VersionId>,
}

impl Manifest {
	pub fn encode(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(4 + self.versions.len() * 16);
		out.extend_from_slice(&(self.versions.len() as u32).to_le_bytes());
		for (chunk_mc, version) in &self.versions {
			out.extend_from_slice(&chunk_mc.to_le_bytes());
			out.extend_from_slice(&version.raw().to_le_bytes());
		}
		out
	}

	pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
		let mut reader = ByteReader::new(bytes);
		let count = reader.u32()?;
		let mut versions = BTreeMap::new();
		for _ in 0..count {
			let chunk_mc = reader.u64()?;
			let version = VersionId(reader.u64()?);
			versions.insert(chunk_mc, version);
		}
		reader.finish()?;
		Ok(Self { versions })
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.versions.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.versions.is_empty()
	}
}

// =============================================================================
// Navmesh
// =============================================================================

/// Encoded records plus the manifest they were written against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SerializedNavmesh {
	pub manifest: Manifest,
	pub records: BTreeMap<ChunkMorton, Vec<u8>>,
}

/// Navmesh restored from records, plus the chunks that must be rebuilt.
#[derive(Clone, Debug)]
pub struct LoadResult {
	pub navmesh: Navmesh,
	/// Chunks whose record was missing, corrupt or out of date, ascending.
	pub regenerate: Vec<ChunkMorton>,
}

/// Serialize every chunk holding static nodes.
///
/// `manifest` is rewritten to list exactly the serialized chunks, each with
/// a fresh version.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "serialize::serialize"))]
pub fn serialize(navmesh: &Navmesh, manifest: &mut Manifest) -> SerializedNavmesh {
	let codes: Vec<ChunkMorton> = navmesh.chunks().keys().copied().collect();
	manifest.versions.clear();
	let records = serialize_chunks(navmesh, manifest, &codes);
	SerializedNavmesh {
		manifest: manifest.clone(),
		records,
	}
}

/// Encode the listed chunks with fresh versions and record them in `manifest`.
///
/// Listed chunks that are gone or hold no static nodes are dropped from the
/// manifest and produce no record.
pub fn serialize_chunks(navmesh: &Navmesh, manifest: &mut Manifest, chunks: &[ChunkMorton]) -> BTreeMap<ChunkMorton, Vec<u8>> {
	let start = Instant::now();
	let encoded: Vec<(ChunkMorton, Option<(VersionId, Vec<u8>)>)> = chunks
		.par_iter()
		.map(|&chunk_mc| {
			let record = navmesh
				.find_chunk(chunk_mc)
				.filter(|chunk| !chunk.static_octree.is_empty())
				.map(|chunk| {
					let version = VersionId::random();
					(version, encode_chunk(chunk, version))
				});
			(chunk_mc, record)
		})
		.collect();

	let mut records = BTreeMap::new();
	for (chunk_mc, record) in encoded {
		match record {
			Some((version, bytes)) => {
				manifest.versions.insert(chunk_mc, version);
				records.insert(chunk_mc, bytes);
			}
			None => {
				manifest.versions.remove(&chunk_mc);
			}
		}
	}

	log::debug!(
		"Serialized {} of {} chunks in {}us",
		records.len(),
		chunks.len(),
		start.elapsed().as_micros()
	);
	records
}

/// Rebuild a navmesh from records checked against their manifest.
///
/// Fails only on an invalid `config`. Relations of every restored chunk
/// are relinked.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "serialize::deserialize"))]
pub fn deserialize(serialized: &SerializedNavmesh, config: NavmeshConfig) -> Result<LoadResult, ConfigError> {
	let start = Instant::now();
	let mut navmesh = Navmesh::new(config)?;

	let decoded: Vec<(ChunkMorton, Option<Chunk>)> = serialized
		.manifest
		.versions
		.par_iter()
		.map(|(&chunk_mc, &expected)| {
			let Some(bytes) = serialized.records.get(&chunk_mc) else {
				log::warn!("Chunk {:#x} has no record", chunk_mc);
				return (chunk_mc, None);
			};
			match decode_chunk(bytes, &config) {
				Ok((version, chunk)) if version == expected => (chunk_mc, Some(chunk)),
				Ok((version, _)) => {
					log::warn!(
						"Chunk {:#x} version {:#x} does not match manifest {:#x}",
						chunk_mc,
						version.raw(),
						expected.raw()
					);
					(chunk_mc, None)
				}
				Err(err) => {
					log::warn!("Chunk {:#x} failed to decode: {}", chunk_mc, err);
					(chunk_mc, None)
				}
			}
		})
		.collect();

	let mut regenerate = Vec::new();
	for (chunk_mc, chunk) in decoded {
		match chunk {
			Some(chunk) => {
				navmesh.insert_chunk(chunk_mc, chunk);
			}
			None => regenerate.push(chunk_mc),
		}
	}

	{
		#[cfg(feature = "tracing")]
		let _span = tracing::info_span!("relink").entered();
		RelationResolver::new(&mut navmesh, OctreeKind::Static).relink_all();
	}

	log::info!(
		"Loaded {} chunks in {}us, {} need regeneration",
		navmesh.len(),
		start.elapsed().as_micros(),
		regenerate.len()
	);
	if !regenerate.is_empty() {
		log::debug!("Regenerate: {:x?}", regenerate);
	}
	Ok(LoadResult { navmesh, regenerate })
}

#[cfg(test)]
#[path = "serialize_test.rs"]
mod serialize_test;
