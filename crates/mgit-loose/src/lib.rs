//! Loose object storage: zlib-compressed framed objects on disk.
//!
//! Each object lives at `objects/XX/YYYY...` where `XX` is the first byte
//! of its identifier in hex and `YYYY...` is the rest. The file content is
//! zlib-compressed `"<type> <size>\0<body>"`.

mod read;
mod write;

use std::path::{Path, PathBuf};

use mgit_hash::ObjectId;

/// Interface to a loose object directory (`.git/objects/`).
pub struct LooseStore {
    objects_dir: PathBuf,
    compression: flate2::Compression,
}

impl LooseStore {
    /// Open the store rooted at the given objects directory.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
            compression: flate2::Compression::default(),
        }
    }

    /// The objects directory this store writes under.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// The file path for a given identifier.
    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.objects_dir.join(oid.loose_path())
    }
}

/// Errors from loose object operations.
#[derive(Debug, thiserror::Error)]
pub enum LooseError {
    #[error("corrupt loose object {oid}: {reason}")]
    Corrupt { oid: String, reason: String },

    #[error("decompression error for {oid}: {source}")]
    Decompress {
        oid: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Object(#[from] mgit_object::ObjectError),
}
