use bstr::{BStr, BString};
use mgit_hash::ObjectId;

use crate::{ObjectError, Signature};

/// A commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Identifier of the root tree.
    pub tree: ObjectId,
    /// Parent commit identifiers (empty for a root commit).
    pub parents: Vec<ObjectId>,
    /// Author identity and timestamp.
    pub author: Signature,
    /// Committer identity and timestamp.
    pub committer: Signature,
    /// Commit message (everything after the blank separator line).
    pub message: BString,
}

impl Commit {
    /// Parse a commit body (no framing header).
    ///
    /// Headers are `key SP value` lines; parsing stops at the first blank
    /// line and the remainder is the message. Unrecognised headers are
    /// skipped.
    pub fn parse(body: &[u8]) -> Result<Self, ObjectError> {
        let mut tree: Option<ObjectId> = None;
        let mut parents = Vec::new();
        let mut author: Option<Signature> = None;
        let mut committer: Option<Signature> = None;

        let mut pos = 0;
        while pos < body.len() {
            if body[pos] == b'\n' {
                pos += 1;
                break;
            }

            let line_end = body[pos..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|p| p + pos)
                .unwrap_or(body.len());
            let line = &body[pos..line_end];

            if let Some(space_pos) = line.iter().position(|&b| b == b' ') {
                let key = &line[..space_pos];
                let value = &line[space_pos + 1..];
                match key {
                    b"tree" => tree = Some(parse_oid_value(value, "tree")?),
                    b"parent" => parents.push(parse_oid_value(value, "parent")?),
                    b"author" => author = Some(Signature::parse(BStr::new(value))?),
                    b"committer" => committer = Some(Signature::parse(BStr::new(value))?),
                    _ => {}
                }
            }

            pos = line_end + 1;
        }

        let tree = tree.ok_or(ObjectError::MissingCommitField { field: "tree" })?;
        let author = author.ok_or(ObjectError::MissingCommitField { field: "author" })?;
        let committer =
            committer.ok_or(ObjectError::MissingCommitField { field: "committer" })?;

        Ok(Self {
            tree,
            parents,
            author,
            committer,
            message: BString::from(&body[pos.min(body.len())..]),
        })
    }

    /// Serialize the commit body (no framing header).
    pub fn serialize_body(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"tree ");
        out.extend_from_slice(self.tree.to_hex().as_bytes());
        out.push(b'\n');

        for parent in &self.parents {
            out.extend_from_slice(b"parent ");
            out.extend_from_slice(parent.to_hex().as_bytes());
            out.push(b'\n');
        }

        out.extend_from_slice(b"author ");
        out.extend_from_slice(&self.author.to_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"committer ");
        out.extend_from_slice(&self.committer.to_bytes());
        out.push(b'\n');

        out.push(b'\n');
        out.extend_from_slice(&self.message);

        out
    }

    /// Is this a root commit (no parents)?
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

fn parse_oid_value(value: &[u8], field: &'static str) -> Result<ObjectId, ObjectError> {
    let hex = std::str::from_utf8(value)
        .map_err(|_| ObjectError::InvalidHeader(format!("non-UTF-8 {field} id")))?;
    Ok(ObjectId::from_hex(hex)?)
}
