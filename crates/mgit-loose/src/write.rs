use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use mgit_hash::{Hasher, ObjectId};
use mgit_object::{header, Object, ObjectType};

use crate::{LooseError, LooseStore};

impl LooseStore {
    /// Write an object to the store. Returns its identifier.
    ///
    /// Idempotent: writing an already-present object is a no-op.
    pub fn write(&self, obj: &Object) -> Result<ObjectId, LooseError> {
        self.write_raw(obj.object_type(), &obj.serialize_body())
    }

    /// Write raw body bytes with a known type. Returns the identifier.
    ///
    /// The file is written atomically (temp file + rename); losing a rename
    /// race to another writer of the same object is treated as success.
    pub fn write_raw(&self, obj_type: ObjectType, body: &[u8]) -> Result<ObjectId, LooseError> {
        let hdr = header::write_header(obj_type, body.len());

        let oid = {
            let mut hasher = Hasher::new();
            hasher.update(&hdr);
            hasher.update(body);
            hasher.finalize()
        };

        if self.contains(&oid) {
            return Ok(oid);
        }

        let final_path = self.object_path(&oid);
        if let Some(parent) = final_path.parent() {
            // Racing creators of the fan-out directory both succeed.
            fs::create_dir_all(parent)?;
        }

        let tmp_path = write_to_temp(self.objects_dir(), &hdr, body, self.compression)?;
        finalize_object(&tmp_path, &final_path)?;
        Ok(oid)
    }
}

/// Compress header + body into a temp file under `objects_dir`.
///
/// The temp file must live on the same filesystem as the final path so the
/// rename is atomic. On any write error the temp file is removed.
fn write_to_temp(
    objects_dir: &Path,
    hdr: &[u8],
    body: &[u8],
    level: flate2::Compression,
) -> Result<PathBuf, LooseError> {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    let tmp_path = objects_dir.join(format!("tmp_obj_{}_{}", std::process::id(), nanos));

    let result = (|| {
        let file = fs::File::create(&tmp_path)?;
        let mut encoder = ZlibEncoder::new(file, level);
        encoder.write_all(hdr)?;
        encoder.write_all(body)?;
        encoder.finish()?;
        Ok(())
    })();

    match result {
        Ok(()) => Ok(tmp_path),
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(LooseError::Io(e))
        }
    }
}

/// Atomically move a temp file to its final destination.
///
/// If the destination already exists (another writer won the race), the
/// temp file is removed and the write counts as successful.
fn finalize_object(tmp: &Path, final_path: &Path) -> Result<(), LooseError> {
    match fs::rename(tmp, final_path) {
        Ok(()) => Ok(()),
        Err(_) if final_path.exists() => {
            let _ = fs::remove_file(tmp);
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(tmp);
            Err(LooseError::Io(e))
        }
    }
}
