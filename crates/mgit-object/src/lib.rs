//! Object model: blob, tree and commit parsing and serialization.
//!
//! Provides Rust types for the three object kinds, their parsing from
//! framed bytes, serialization to canonical format, and supporting types
//! like `ObjectType`, `FileMode` and `Signature`.

mod blob;
mod commit;
pub mod header;
mod signature;
mod tree;

pub use blob::Blob;
pub use commit::Commit;
pub use signature::Signature;
pub use tree::{FileMode, Tree, TreeEntry};

use bstr::BString;
use mgit_hash::{HashError, Hasher, ObjectId};

/// Errors produced by object operations.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("invalid object type: {0}")]
    InvalidType(BString),

    #[error("invalid object header: {0}")]
    InvalidHeader(String),

    #[error("object size mismatch: header declares {declared} bytes, body has {actual}")]
    SizeMismatch { declared: usize, actual: usize },

    #[error("invalid tree entry at offset {offset}: {reason}")]
    InvalidTreeEntry { offset: usize, reason: String },

    #[error("invalid commit: missing '{field}' header")]
    MissingCommitField { field: &'static str },

    #[error("invalid file mode: {0}")]
    InvalidFileMode(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// The three object kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    /// Parse from the type string in object headers.
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        match s {
            b"blob" => Ok(Self::Blob),
            b"tree" => Ok(Self::Tree),
            b"commit" => Ok(Self::Commit),
            _ => Err(ObjectError::InvalidType(BString::from(s))),
        }
    }

    /// The canonical byte representation.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Blob => b"blob",
            Self::Tree => b"tree",
            Self::Commit => b"commit",
        }
    }

    /// The canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectType {
    type Err = ObjectError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

/// A parsed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    /// Parse from framed bytes (`"<type> <size>\0"` + body).
    ///
    /// The declared size must match the body length exactly.
    pub fn parse(data: &[u8]) -> Result<Self, ObjectError> {
        let (obj_type, declared, header_len) = header::parse_header(data)?;
        let body = &data[header_len..];
        if body.len() != declared {
            return Err(ObjectError::SizeMismatch {
                declared,
                actual: body.len(),
            });
        }
        Self::parse_body(obj_type, body)
    }

    /// Parse body bytes with a known type (no header).
    pub fn parse_body(obj_type: ObjectType, body: &[u8]) -> Result<Self, ObjectError> {
        match obj_type {
            ObjectType::Blob => Ok(Self::Blob(Blob::new(body))),
            ObjectType::Tree => Ok(Self::Tree(Tree::parse(body)?)),
            ObjectType::Commit => Ok(Self::Commit(Commit::parse(body)?)),
        }
    }

    /// Serialize to canonical framed format (header + body).
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let hdr = header::write_header(self.object_type(), body.len());
        let mut out = Vec::with_capacity(hdr.len() + body.len());
        out.extend_from_slice(&hdr);
        out.extend_from_slice(&body);
        out
    }

    /// Serialize just the body (no header).
    pub fn serialize_body(&self) -> Vec<u8> {
        match self {
            Self::Blob(b) => b.data.to_vec(),
            Self::Tree(t) => t.serialize_body(),
            Self::Commit(c) => c.serialize_body(),
        }
    }

    /// The object type.
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Blob(_) => ObjectType::Blob,
            Self::Tree(_) => ObjectType::Tree,
            Self::Commit(_) => ObjectType::Commit,
        }
    }

    /// Compute the identifier by hashing the framed form.
    pub fn compute_oid(&self) -> ObjectId {
        Hasher::hash_object(self.object_type().as_str(), &self.serialize_body())
    }
}
