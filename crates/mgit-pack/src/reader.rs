//! Sequential pack ingestion into the loose store.

use std::collections::HashMap;
use std::io::Read;

use flate2::bufread::ZlibDecoder;
use mgit_hash::{Hasher, ObjectId};
use mgit_loose::LooseStore;
use mgit_object::ObjectType;

use crate::delta::apply_delta;
use crate::entry::{parse_entry_header, EntryKind};
use crate::{PackError, PACK_HEADER_SIZE, PACK_SIGNATURE, PACK_TRAILER_SIZE};

/// Objects produced earlier in this pack, so later ref-deltas can resolve
/// before the store round-trips. Lives only for the duration of one ingest.
type SessionCache = HashMap<ObjectId, (ObjectType, Vec<u8>)>;

/// Ingest a complete v2 packfile into the store.
///
/// Verifies the magic, version and trailing SHA-1 before anything is
/// stored, then walks the entries in file order; each entry is fully
/// resolved before the next begins, because a ref-delta may name an object
/// produced earlier in the same pack. Returns the identifiers of all
/// ingested objects in pack order.
pub fn ingest(data: &[u8], store: &LooseStore) -> Result<Vec<ObjectId>, PackError> {
    let count = verify_header(data)?;
    verify_trailer(data)?;

    let body_end = data.len() - PACK_TRAILER_SIZE;
    let mut cache = SessionCache::new();
    let mut ingested = Vec::with_capacity(count as usize);
    let mut pos = PACK_HEADER_SIZE;

    for _ in 0..count {
        if pos >= body_end {
            return Err(PackError::CorruptEntry(pos as u64));
        }
        pos = read_entry(data, pos, body_end, store, &mut cache, &mut ingested)?;
    }

    if pos != body_end {
        return Err(PackError::InvalidHeader(format!(
            "{} trailing bytes after last entry",
            body_end - pos
        )));
    }

    Ok(ingested)
}

/// Check the 12-byte header; returns the declared object count.
fn verify_header(data: &[u8]) -> Result<u32, PackError> {
    if data.len() < PACK_HEADER_SIZE + PACK_TRAILER_SIZE {
        return Err(PackError::InvalidHeader("pack too small".into()));
    }
    if &data[0..4] != PACK_SIGNATURE {
        return Err(PackError::InvalidHeader("bad PACK signature".into()));
    }
    let version = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    if version < 2 {
        return Err(PackError::UnsupportedVersion(version));
    }
    Ok(u32::from_be_bytes([data[8], data[9], data[10], data[11]]))
}

/// Check that the trailing SHA-1 matches the digest of all preceding bytes.
fn verify_trailer(data: &[u8]) -> Result<(), PackError> {
    let body_end = data.len() - PACK_TRAILER_SIZE;
    let expected = ObjectId::from_bytes(&data[body_end..])?;
    let actual = Hasher::digest(&data[..body_end]);
    if actual != expected {
        return Err(PackError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}

/// Read, resolve and store one entry starting at `pos`. Returns the offset
/// of the next entry.
fn read_entry(
    data: &[u8],
    pos: usize,
    body_end: usize,
    store: &LooseStore,
    cache: &mut SessionCache,
    ingested: &mut Vec<ObjectId>,
) -> Result<usize, PackError> {
    let entry_offset = pos as u64;
    let header = parse_entry_header(&data[pos..body_end], entry_offset)?;
    let data_start = pos + header.header_len;

    let (obj_type, body, consumed) = match header.kind {
        EntryKind::Commit | EntryKind::Tree | EntryKind::Blob => {
            let obj_type = header.kind.to_object_type().expect("plain entry kind");
            let (inflated, consumed) = inflate(&data[data_start..body_end], entry_offset)?;
            if inflated.len() != header.size {
                return Err(PackError::CorruptEntry(entry_offset));
            }
            (obj_type, inflated, consumed)
        }
        EntryKind::RefDelta { base } => {
            // The declared size counts the inflated delta stream, not the
            // reconstructed object.
            let (delta, consumed) = inflate(&data[data_start..body_end], entry_offset)?;
            if delta.len() != header.size {
                return Err(PackError::CorruptEntry(entry_offset));
            }
            let (base_type, base_body) = resolve_base(&base, cache, store)?;
            let body = apply_delta(&base_body, &delta)?;
            (base_type, body, consumed)
        }
        EntryKind::OfsDelta => return Err(PackError::Unsupported("ofs-delta entries")),
        EntryKind::Tag => return Err(PackError::Unsupported("tag objects")),
    };

    let oid = store.write_raw(obj_type, &body)?;
    cache.insert(oid, (obj_type, body));
    ingested.push(oid);

    Ok(data_start + consumed)
}

/// Resolve a ref-delta base: objects from earlier in this pack first, then
/// anything already in the store.
fn resolve_base(
    base: &ObjectId,
    cache: &SessionCache,
    store: &LooseStore,
) -> Result<(ObjectType, Vec<u8>), PackError> {
    if let Some((obj_type, body)) = cache.get(base) {
        return Ok((*obj_type, body.clone()));
    }
    match store.read(base)? {
        Some(obj) => Ok((obj.object_type(), obj.serialize_body())),
        None => Err(PackError::MissingBase(*base)),
    }
}

/// Inflate one zlib stream. Returns the inflated bytes and the number of
/// compressed bytes consumed, which advances the sequential cursor.
fn inflate(compressed: &[u8], entry_offset: u64) -> Result<(Vec<u8>, usize), PackError> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|_| PackError::CorruptEntry(entry_offset))?;
    Ok((out, decoder.total_in() as usize))
}
