//! Working-tree <-> object store conversion: the recursive tree writer and
//! the materialiser that recreates a file tree from a commit.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use bstr::BString;
use mgit_hash::ObjectId;
use mgit_loose::LooseStore;
use mgit_object::{FileMode, Object, ObjectType, Tree, TreeEntry};

use crate::RepoError;

/// Recursively hash a directory into the store and return the root tree id.
///
/// Children are stored depth-first, before their parent tree is sealed.
/// The `.git` control directory is skipped; entries are sorted canonically
/// during encoding, so the result is independent of enumeration order.
pub fn write_tree(store: &LooseStore, dir: &Path) -> Result<ObjectId, RepoError> {
    let mut entries = Vec::new();

    for dirent in fs::read_dir(dir)? {
        let dirent = dirent?;
        let name = dirent.file_name();
        if name == ".git" {
            continue;
        }

        let path = dirent.path();
        let file_type = dirent.file_type()?;

        let (mode, oid) = if file_type.is_symlink() {
            let target = fs::read_link(&path)?;
            let oid = store.write_raw(ObjectType::Blob, os_bytes(target.as_os_str()))?;
            (FileMode::Symlink, oid)
        } else if file_type.is_dir() {
            (FileMode::Tree, write_tree(store, &path)?)
        } else if file_type.is_file() {
            let data = fs::read(&path)?;
            let oid = store.write_raw(ObjectType::Blob, &data)?;
            let mode = if is_executable(&dirent)? {
                FileMode::Executable
            } else {
                FileMode::Regular
            };
            (mode, oid)
        } else {
            // Sockets, fifos and the like have no object representation.
            continue;
        };

        entries.push(TreeEntry {
            mode,
            name: BString::from(os_bytes(&name)),
            oid,
        });
    }

    Ok(store.write(&Object::Tree(Tree { entries }))?)
}

/// Recreate the file tree of a commit under `dest`.
pub fn materialize_commit(
    store: &LooseStore,
    commit_id: &ObjectId,
    dest: &Path,
) -> Result<(), RepoError> {
    let obj = store
        .read(commit_id)?
        .ok_or(RepoError::NotFound(*commit_id))?;
    let commit = match obj {
        Object::Commit(c) => c,
        _ => {
            return Err(RepoError::WrongType {
                oid: *commit_id,
                expected: "commit",
            })
        }
    };
    materialize_tree(store, &commit.tree, dest)
}

/// Recursively recreate a tree under `dest`.
pub fn materialize_tree(
    store: &LooseStore,
    tree_id: &ObjectId,
    dest: &Path,
) -> Result<(), RepoError> {
    let tree = match store.read(tree_id)?.ok_or(RepoError::NotFound(*tree_id))? {
        Object::Tree(t) => t,
        _ => {
            return Err(RepoError::WrongType {
                oid: *tree_id,
                expected: "tree",
            })
        }
    };

    create_dir(dest)?;

    for entry in tree.iter() {
        check_entry_name(&entry.name)?;
        let path = dest.join(name_component(&entry.name)?);

        if entry.mode.is_tree() {
            materialize_tree(store, &entry.oid, &path)?;
        } else {
            let blob = match store.read(&entry.oid)?.ok_or(RepoError::NotFound(entry.oid))? {
                Object::Blob(b) => b,
                _ => {
                    return Err(RepoError::WrongType {
                        oid: entry.oid,
                        expected: "blob",
                    })
                }
            };

            if entry.mode.is_symlink() {
                write_symlink(&blob.data, &path)?;
            } else {
                fs::write(&path, &blob.data)?;
                set_permissions(&path, entry.mode.permissions())?;
            }
        }
    }

    Ok(())
}

/// Reject entry names that could escape the destination directory.
fn check_entry_name(name: &[u8]) -> Result<(), RepoError> {
    let unsafe_name = name.is_empty()
        || name == b"."
        || name == b".."
        || name.iter().any(|&b| b == b'/' || b == 0);
    if unsafe_name {
        return Err(RepoError::UnsafePath(
            String::from_utf8_lossy(name).into_owned(),
        ));
    }
    Ok(())
}

#[cfg(unix)]
fn name_component(name: &[u8]) -> Result<&OsStr, RepoError> {
    use std::os::unix::ffi::OsStrExt;
    Ok(OsStr::from_bytes(name))
}

#[cfg(not(unix))]
fn name_component(name: &[u8]) -> Result<&OsStr, RepoError> {
    std::str::from_utf8(name)
        .map(OsStr::new)
        .map_err(|_| RepoError::UnsafePath(String::from_utf8_lossy(name).into_owned()))
}

#[cfg(unix)]
fn os_bytes(s: &OsStr) -> &[u8] {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes()
}

#[cfg(not(unix))]
fn os_bytes(s: &OsStr) -> &[u8] {
    s.to_str().expect("non-UTF-8 file name").as_bytes()
}

#[cfg(unix)]
fn is_executable(dirent: &fs::DirEntry) -> Result<bool, RepoError> {
    use std::os::unix::fs::PermissionsExt;
    Ok(dirent.metadata()?.permissions().mode() & 0o100 != 0)
}

#[cfg(not(unix))]
fn is_executable(_dirent: &fs::DirEntry) -> Result<bool, RepoError> {
    Ok(false)
}

#[cfg(unix)]
fn create_dir(path: &Path) -> Result<(), RepoError> {
    use std::os::unix::fs::DirBuilderExt;
    match fs::DirBuilder::new().recursive(true).mode(0o750).create(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(RepoError::Io(e)),
    }
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> Result<(), RepoError> {
    fs::create_dir_all(path)?;
    Ok(())
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> Result<(), RepoError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) -> Result<(), RepoError> {
    Ok(())
}

#[cfg(unix)]
fn write_symlink(target: &[u8], path: &Path) -> Result<(), RepoError> {
    use std::os::unix::ffi::OsStrExt;
    // Replace any existing entry; symlink creation refuses to overwrite.
    let _ = fs::remove_file(path);
    std::os::unix::fs::symlink(OsStr::from_bytes(target), path)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_symlink(target: &[u8], path: &Path) -> Result<(), RepoError> {
    // No symlinks off unix; the target bytes land in a plain file.
    fs::write(path, target)?;
    Ok(())
}
