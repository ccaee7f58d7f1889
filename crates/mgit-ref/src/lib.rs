//! Loose reference storage: `HEAD` and branch files under `refs/heads/`.
//!
//! A direct ref file contains one 40-hex identifier (trailing newline
//! permitted); `HEAD` is normally a symbolic ref of the form
//! `ref: refs/heads/<branch>`. Writes are full-file replacement via a temp
//! file and atomic rename.

use std::fs;
use std::path::{Path, PathBuf};

use mgit_hash::{HashError, ObjectId};

/// The symbolic target HEAD points at after `init`.
pub const DEFAULT_HEAD_TARGET: &str = "refs/heads/master";

/// Errors from reference operations.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    #[error("malformed ref '{name}': {reason}")]
    Malformed { name: String, reason: String },

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The resolved content of `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// Symbolic: `ref: <target>`.
    Symbolic(String),
    /// Detached: a direct identifier.
    Detached(ObjectId),
}

/// Interface to the reference files under a repository's git directory.
pub struct RefStore {
    git_dir: PathBuf,
}

impl RefStore {
    pub fn open(git_dir: impl AsRef<Path>) -> Self {
        Self {
            git_dir: git_dir.as_ref().to_path_buf(),
        }
    }

    /// Write the default `HEAD`: `ref: refs/heads/master\n`.
    pub fn init_head(&self) -> Result<(), RefError> {
        self.write_file("HEAD", format!("ref: {}\n", DEFAULT_HEAD_TARGET).as_bytes())
    }

    /// Create-or-replace `refs/heads/<name>` with the given identifier.
    pub fn write_branch(&self, name: &str, oid: &ObjectId) -> Result<(), RefError> {
        self.write_file(
            &format!("refs/heads/{name}"),
            format!("{}\n", oid.to_hex()).as_bytes(),
        )
    }

    /// Read a direct ref by repository-relative name (e.g. `refs/heads/master`).
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn read_ref(&self, name: &str) -> Result<Option<ObjectId>, RefError> {
        let contents = match fs::read(self.git_dir.join(name)) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RefError::Io(e)),
        };
        parse_direct_ref(name, &contents).map(Some)
    }

    /// Read `HEAD` without following indirection.
    ///
    /// Returns `Ok(None)` if `HEAD` does not exist.
    pub fn read_head(&self) -> Result<Option<Head>, RefError> {
        let contents = match fs::read(self.git_dir.join("HEAD")) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RefError::Io(e)),
        };

        if let Some(target) = contents.strip_prefix(b"ref: ") {
            let target = trim_trailing_newline(target);
            let target = std::str::from_utf8(target).map_err(|_| RefError::Malformed {
                name: "HEAD".into(),
                reason: "non-UTF-8 symbolic target".into(),
            })?;
            return Ok(Some(Head::Symbolic(target.to_string())));
        }
        parse_direct_ref("HEAD", &contents).map(|oid| Some(Head::Detached(oid)))
    }

    /// Resolve `HEAD` to an identifier, following one symbolic indirection.
    ///
    /// Returns `Ok(None)` if `HEAD` or its target branch does not exist yet.
    pub fn resolve_head(&self) -> Result<Option<ObjectId>, RefError> {
        match self.read_head()? {
            Some(Head::Detached(oid)) => Ok(Some(oid)),
            Some(Head::Symbolic(target)) => self.read_ref(&target),
            None => Ok(None),
        }
    }

    /// Replace a ref file atomically (temp + rename), creating parent
    /// directories on demand.
    fn write_file(&self, name: &str, contents: &[u8]) -> Result<(), RefError> {
        let path = self.git_dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("lock");
        fs::write(&tmp, contents)?;
        match fs::rename(&tmp, &path) {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                Err(RefError::Io(e))
            }
        }
    }
}

/// Validate and parse a direct ref: exactly one 40-hex identifier,
/// optionally newline-terminated.
fn parse_direct_ref(name: &str, contents: &[u8]) -> Result<ObjectId, RefError> {
    let trimmed = trim_trailing_newline(contents);
    let hex = std::str::from_utf8(trimmed).map_err(|_| RefError::Malformed {
        name: name.into(),
        reason: "non-UTF-8 content".into(),
    })?;
    ObjectId::from_hex(hex).map_err(|e| RefError::Malformed {
        name: name.into(),
        reason: e.to_string(),
    })
}

fn trim_trailing_newline(bytes: &[u8]) -> &[u8] {
    match bytes {
        [rest @ .., b'\n'] => rest,
        _ => bytes,
    }
}
