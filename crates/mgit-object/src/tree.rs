use std::cmp::Ordering;

use bstr::{BStr, BString, ByteSlice};
use mgit_hash::ObjectId;

use crate::ObjectError;

/// File mode for tree entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// Regular file (100644)
    Regular,
    /// Executable file (100755)
    Executable,
    /// Symbolic link (120000)
    Symlink,
    /// Subdirectory (40000)
    Tree,
    /// Regular file with non-canonical permission bits, preserved verbatim.
    Blob(u32),
}

impl FileMode {
    /// Parse from octal ASCII bytes (e.g. `b"100644"`).
    ///
    /// A leading `100` marks a blob; the remaining digits are octal POSIX
    /// permission bits. `40000` (optionally `040000`) marks a tree. Other
    /// leading triplets are unsupported.
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        let raw = parse_octal(s)
            .ok_or_else(|| ObjectError::InvalidFileMode(String::from_utf8_lossy(s).into()))?;
        match raw {
            0o100644 => Ok(Self::Regular),
            0o100755 => Ok(Self::Executable),
            0o120000 => Ok(Self::Symlink),
            0o040000 => Ok(Self::Tree),
            v if v & !0o777 == 0o100000 => Ok(Self::Blob(v)),
            _ => Err(ObjectError::InvalidFileMode(
                String::from_utf8_lossy(s).into(),
            )),
        }
    }

    /// The raw numeric value.
    pub fn raw(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Tree => 0o40000,
            Self::Blob(v) => *v,
        }
    }

    /// Serialize to octal ASCII bytes (no leading zero, matching the wire).
    pub fn as_bytes(&self) -> BString {
        BString::from(format!("{:o}", self.raw()))
    }

    /// POSIX permission bits for materialised files.
    pub fn permissions(&self) -> u32 {
        self.raw() & 0o777
    }

    /// Is this a tree (directory) entry?
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree)
    }

    /// Is this a blob (file) entry?
    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Regular | Self::Executable | Self::Blob(_))
    }

    /// Is this a symlink?
    pub fn is_symlink(&self) -> bool {
        matches!(self, Self::Symlink)
    }
}

/// Parse an octal ASCII string to u32.
fn parse_octal(s: &[u8]) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut val: u32 = 0;
    for &b in s {
        if !(b'0'..=b'7').contains(&b) {
            return None;
        }
        val = val.checked_mul(8)?.checked_add(u32::from(b - b'0'))?;
    }
    Some(val)
}

/// A single entry in a tree object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: BString,
    pub oid: ObjectId,
}

impl TreeEntry {
    /// Compare entries using the canonical tree ordering.
    ///
    /// Directories compare as if their name had a trailing '/', so "sub"
    /// (tree) sorts after "sub.c" but before "sub0".
    pub fn cmp_entries(a: &TreeEntry, b: &TreeEntry) -> Ordering {
        let a_name: &[u8] = a.name.as_ref();
        let b_name: &[u8] = b.name.as_ref();
        let common = a_name.len().min(b_name.len());
        match a_name[..common].cmp(&b_name[..common]) {
            Ordering::Equal => {}
            other => return other,
        }
        // One name is a prefix of the other; the shorter one contributes
        // '/' if it names a directory, NUL otherwise.
        let next = |name: &[u8], is_tree: bool| -> u8 {
            match name.get(common) {
                Some(&c) => c,
                None if is_tree => b'/',
                None => 0,
            }
        };
        next(a_name, a.mode.is_tree()).cmp(&next(b_name, b.mode.is_tree()))
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        Self::cmp_entries(self, other)
    }
}

/// A tree object — an ordered directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tree body: a run of `<mode> <name>\0<raw-oid>` entries to
    /// the end of the buffer.
    pub fn parse(body: &[u8]) -> Result<Self, ObjectError> {
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < body.len() {
            let space_pos = body[pos..]
                .iter()
                .position(|&b| b == b' ')
                .map(|p| p + pos)
                .ok_or_else(|| ObjectError::InvalidTreeEntry {
                    offset: pos,
                    reason: "missing space after mode".into(),
                })?;

            let mode =
                FileMode::from_bytes(&body[pos..space_pos]).map_err(|_| {
                    ObjectError::InvalidTreeEntry {
                        offset: pos,
                        reason: "invalid mode".into(),
                    }
                })?;

            let name_start = space_pos + 1;
            let null_pos = body[name_start..]
                .iter()
                .position(|&b| b == 0)
                .map(|p| p + name_start)
                .ok_or_else(|| ObjectError::InvalidTreeEntry {
                    offset: name_start,
                    reason: "missing null after name".into(),
                })?;

            let name = BString::from(&body[name_start..null_pos]);

            let oid_start = null_pos + 1;
            let oid_end = oid_start + 20;
            if oid_end > body.len() {
                return Err(ObjectError::InvalidTreeEntry {
                    offset: oid_start,
                    reason: "truncated object id".into(),
                });
            }
            let oid = ObjectId::from_bytes(&body[oid_start..oid_end])?;

            entries.push(TreeEntry { mode, name, oid });
            pos = oid_end;
        }

        Ok(Self { entries })
    }

    /// Serialize the tree body, emitting entries in canonical sort order.
    pub fn serialize_body(&self) -> Vec<u8> {
        let mut sorted = self.entries.clone();
        sorted.sort();

        let mut out = Vec::new();
        for entry in &sorted {
            out.extend_from_slice(&entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.oid.as_bytes());
        }
        out
    }

    /// Lookup an entry by name.
    pub fn find(&self, name: &BStr) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name.as_bstr() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
