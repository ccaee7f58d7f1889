//! Packfile reading: the v2 transport container holding many objects,
//! some expressed as deltas against others.
//!
//! The reader consumes a complete in-memory pack (as produced by a fetch),
//! verifies its trailing checksum, walks the entries sequentially and
//! ingests every reconstructed object into the loose store.

pub mod delta;
pub mod entry;
mod reader;

pub use reader::ingest;

use mgit_hash::ObjectId;

/// Errors that can occur while reading a pack.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("invalid pack header: {0}")]
    InvalidHeader(String),

    #[error("unsupported pack version: {0}")]
    UnsupportedVersion(u32),

    #[error("pack checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: ObjectId, actual: ObjectId },

    #[error("corrupt pack entry at offset {0}")]
    CorruptEntry(u64),

    #[error("invalid delta at offset {offset}: {reason}")]
    InvalidDelta { offset: u64, reason: String },

    #[error("delta base not found: {0}")]
    MissingBase(ObjectId),

    #[error("unsupported pack feature: {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Object(#[from] mgit_object::ObjectError),

    #[error(transparent)]
    Hash(#[from] mgit_hash::HashError),

    #[error(transparent)]
    Store(#[from] mgit_loose::LooseError),
}

/// Pack format constants.
pub const PACK_SIGNATURE: &[u8; 4] = b"PACK";
pub const PACK_VERSION: u32 = 2;
pub const PACK_HEADER_SIZE: usize = 12;
pub const PACK_TRAILER_SIZE: usize = 20;
