//! Object identity for the mgit object store.
//!
//! Provides the core `ObjectId` type (a 20-byte SHA-1 digest), hex
//! encoding/decoding, and the streaming `Hasher` used to compute
//! identifiers over framed object bytes.

mod error;
pub mod hasher;
pub mod hex;
mod oid;

pub use error::HashError;
pub use hasher::Hasher;
pub use oid::ObjectId;
