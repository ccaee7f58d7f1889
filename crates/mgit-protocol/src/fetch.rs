//! The upload-pack v1 exchange: reference discovery, then the want/done
//! request whose response carries the packfile.

use std::io::{Cursor, Read};

use mgit_hash::ObjectId;
use mgit_transport::SmartTransport;

use crate::pktline::{PktLine, PktLineReader, PktLineWriter};
use crate::ProtocolError;

/// Discover the remote HEAD commit.
///
/// Parses the advertisement returned by `info/refs`: the
/// `# service=git-upload-pack` banner, a flush, then the first ref line,
/// which carries the HEAD identifier followed by `HEAD\0<capabilities>`.
pub fn discover_head(transport: &dyn SmartTransport) -> Result<ObjectId, ProtocolError> {
    let body = transport.info_refs()?;
    let mut reader = PktLineReader::new(Cursor::new(body));

    let banner = reader
        .read_line()?
        .ok_or_else(|| ProtocolError::Protocol("missing service banner".into()))?;
    if !banner.starts_with(b"# service=git-upload-pack") {
        return Err(ProtocolError::Protocol(format!(
            "unexpected service banner: {}",
            String::from_utf8_lossy(&banner).trim_end()
        )));
    }

    match reader.read_pkt()? {
        PktLine::Flush => {}
        PktLine::Data(_) => {
            return Err(ProtocolError::Protocol(
                "expected flush after service banner".into(),
            ))
        }
    }

    let head_line = reader
        .read_line()?
        .ok_or_else(|| ProtocolError::Protocol("remote advertised no refs".into()))?;
    parse_head_line(&head_line)
}

/// Extract the 40-hex identifier leading a ref advertisement line.
fn parse_head_line(line: &[u8]) -> Result<ObjectId, ProtocolError> {
    if line.len() < 40 {
        return Err(ProtocolError::Protocol(
            "ref advertisement line too short".into(),
        ));
    }
    let hex = std::str::from_utf8(&line[..40])
        .map_err(|_| ProtocolError::Protocol("non-UTF-8 ref advertisement".into()))?;
    Ok(ObjectId::from_hex(hex)?)
}

/// Fetch the packfile for `want`.
///
/// Sends `want <hex> no-progress\n`, a flush, then `done\n`; the server
/// answers with ACK/NAK pkt-lines (everything up to and including the `NAK`
/// is consumed) followed by the raw packfile bytes, which are returned.
pub fn fetch_pack(
    transport: &dyn SmartTransport,
    want: &ObjectId,
) -> Result<Vec<u8>, ProtocolError> {
    let mut request = Vec::new();
    {
        let mut writer = PktLineWriter::new(&mut request);
        writer.write_text(&format!("want {} no-progress", want.to_hex()))?;
        writer.write_flush()?;
        writer.write_text("done")?;
    }

    let response = transport.upload_pack(&request)?;
    let mut reader = PktLineReader::new(Cursor::new(response));

    loop {
        match reader.read_pkt()? {
            PktLine::Data(line) => {
                if line.starts_with(b"NAK") {
                    break;
                }
                if line.starts_with(b"ACK ") {
                    continue;
                }
                return Err(ProtocolError::Protocol(format!(
                    "unexpected upload-pack response line: {}",
                    String::from_utf8_lossy(&line).trim_end()
                )));
            }
            PktLine::Flush => {
                return Err(ProtocolError::Protocol(
                    "upload-pack response ended before NAK".into(),
                ))
            }
        }
    }

    let mut cursor = reader.into_inner();
    let mut pack = Vec::new();
    cursor.read_to_end(&mut pack)?;
    if pack.is_empty() {
        return Err(ProtocolError::Protocol(
            "upload-pack response carried no packfile".into(),
        ));
    }
    Ok(pack)
}
