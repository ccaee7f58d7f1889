//! Repository initialization, opening, and working-tree operations.

pub mod worktree;

use std::fs;
use std::path::{Path, PathBuf};

use mgit_hash::ObjectId;
use mgit_loose::LooseStore;
use mgit_ref::RefStore;

/// Errors from repository-level operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not a repository: {0}")]
    NotARepository(PathBuf),

    #[error("object not found: {0}")]
    NotFound(ObjectId),

    #[error("expected a {expected} object at {oid}")]
    WrongType { oid: ObjectId, expected: &'static str },

    #[error("unsafe tree entry name: {0:?}")]
    UnsafePath(String),

    #[error(transparent)]
    Store(#[from] mgit_loose::LooseError),

    #[error(transparent)]
    Object(#[from] mgit_object::ObjectError),

    #[error(transparent)]
    Ref(#[from] mgit_ref::RefError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A repository: a working directory with a `.git` control directory.
#[derive(Debug)]
pub struct Repository {
    work_dir: PathBuf,
    git_dir: PathBuf,
}

impl Repository {
    /// Initialize a repository at `work_dir`: create `.git/objects` and
    /// `.git/refs`, and write the default `HEAD`.
    ///
    /// Idempotent; an existing control directory is left as-is apart from
    /// `HEAD`, which is rewritten.
    pub fn init(work_dir: impl AsRef<Path>) -> Result<Self, RepoError> {
        let work_dir = work_dir.as_ref().to_path_buf();
        let git_dir = work_dir.join(".git");

        fs::create_dir_all(git_dir.join("objects"))?;
        fs::create_dir_all(git_dir.join("refs"))?;
        RefStore::open(&git_dir).init_head()?;

        Ok(Self { work_dir, git_dir })
    }

    /// Open an existing repository at `work_dir`.
    pub fn open(work_dir: impl AsRef<Path>) -> Result<Self, RepoError> {
        let work_dir = work_dir.as_ref().to_path_buf();
        let git_dir = work_dir.join(".git");
        if !git_dir.is_dir() {
            return Err(RepoError::NotARepository(work_dir));
        }
        Ok(Self { work_dir, git_dir })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The loose object store under `.git/objects`.
    pub fn objects(&self) -> LooseStore {
        LooseStore::open(self.git_dir.join("objects"))
    }

    /// The reference store under `.git`.
    pub fn refs(&self) -> RefStore {
        RefStore::open(&self.git_dir)
    }
}
