use std::fs;
use std::io::Read;

use flate2::read::ZlibDecoder;
use mgit_hash::ObjectId;
use mgit_object::{header, Object, ObjectType};

use crate::{LooseError, LooseStore};

impl LooseStore {
    /// Check whether an object exists.
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).is_file()
    }

    /// Read an object by identifier.
    ///
    /// Returns `Ok(None)` if the object does not exist, `Err` if it exists
    /// but is corrupt.
    pub fn read(&self, oid: &ObjectId) -> Result<Option<Object>, LooseError> {
        let compressed = match fs::read(self.object_path(oid)) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LooseError::Io(e)),
        };

        let framed = decompress_all(&compressed, oid)?;
        Ok(Some(Object::parse(&framed)?))
    }

    /// Read just the header (type + size) without inflating the body.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    pub fn read_header(&self, oid: &ObjectId) -> Result<Option<(ObjectType, usize)>, LooseError> {
        let compressed = match fs::read(self.object_path(oid)) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LooseError::Io(e)),
        };

        // Inflate only the header prefix. Headers are well under 64 bytes.
        let mut decoder = ZlibDecoder::new(&compressed[..]);
        let mut buf = [0u8; 64];
        let mut filled = 0;
        loop {
            if filled >= buf.len() {
                return Err(LooseError::Corrupt {
                    oid: oid.to_hex(),
                    reason: "header exceeds 64 bytes".into(),
                });
            }
            let n = decoder
                .read(&mut buf[filled..])
                .map_err(|e| LooseError::Decompress {
                    oid: oid.to_hex(),
                    source: e,
                })?;
            if n == 0 {
                return Err(LooseError::Corrupt {
                    oid: oid.to_hex(),
                    reason: "unexpected EOF before header terminator".into(),
                });
            }
            filled += n;
            if buf[..filled].contains(&0) {
                break;
            }
        }

        let (obj_type, size, _header_len) = header::parse_header(&buf[..filled])?;
        Ok(Some((obj_type, size)))
    }
}

/// Zlib-decompress the full contents of a loose object file.
///
/// The compressed stream must span the whole file; trailing bytes mean the
/// file is not a single object.
fn decompress_all(compressed: &[u8], oid: &ObjectId) -> Result<Vec<u8>, LooseError> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| LooseError::Decompress {
            oid: oid.to_hex(),
            source: e,
        })?;
    if (decoder.total_in() as usize) != compressed.len() {
        return Err(LooseError::Corrupt {
            oid: oid.to_hex(),
            reason: "trailing data after compressed stream".into(),
        });
    }
    Ok(out)
}
