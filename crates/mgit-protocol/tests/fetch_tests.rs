//! Upload-pack exchange against an in-memory transport double.

use std::cell::RefCell;

use mgit_hash::ObjectId;
use mgit_protocol::pktline::PktLineWriter;
use mgit_protocol::{discover_head, fetch_pack, ProtocolError};
use mgit_transport::{SmartTransport, TransportError};

/// Canned responses plus a record of the upload-pack request body.
struct MockTransport {
    advertisement: Vec<u8>,
    response: Vec<u8>,
    seen_request: RefCell<Option<Vec<u8>>>,
}

impl MockTransport {
    fn new(advertisement: Vec<u8>, response: Vec<u8>) -> Self {
        Self {
            advertisement,
            response,
            seen_request: RefCell::new(None),
        }
    }
}

impl SmartTransport for MockTransport {
    fn info_refs(&self) -> Result<Vec<u8>, TransportError> {
        Ok(self.advertisement.clone())
    }

    fn upload_pack(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        *self.seen_request.borrow_mut() = Some(request.to_vec());
        Ok(self.response.clone())
    }
}

const HEAD_HEX: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

fn advertisement_for(head_hex: &str) -> Vec<u8> {
    let mut body = Vec::new();
    let mut writer = PktLineWriter::new(&mut body);
    writer.write_text("# service=git-upload-pack").unwrap();
    writer.write_flush().unwrap();
    let mut head_line = Vec::new();
    head_line.extend_from_slice(head_hex.as_bytes());
    head_line.extend_from_slice(b" HEAD\0multi_ack no-progress symref=HEAD:refs/heads/master\n");
    writer.write_line(&head_line).unwrap();
    writer
        .write_text(&format!("{head_hex} refs/heads/master"))
        .unwrap();
    writer.write_flush().unwrap();
    body
}

fn nak_then(pack: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    PktLineWriter::new(&mut body).write_text("NAK").unwrap();
    body.extend_from_slice(pack);
    body
}

#[test]
fn discover_head_parses_advertisement() {
    let transport = MockTransport::new(advertisement_for(HEAD_HEX), Vec::new());
    let head = discover_head(&transport).unwrap();
    assert_eq!(head.to_hex(), HEAD_HEX);
}

#[test]
fn discover_head_rejects_wrong_banner() {
    let mut body = Vec::new();
    let mut writer = PktLineWriter::new(&mut body);
    writer.write_text("# service=git-receive-pack").unwrap();
    writer.write_flush().unwrap();
    drop(writer);

    let transport = MockTransport::new(body, Vec::new());
    assert!(matches!(
        discover_head(&transport),
        Err(ProtocolError::Protocol(_))
    ));
}

#[test]
fn discover_head_rejects_empty_advertisement() {
    let mut body = Vec::new();
    let mut writer = PktLineWriter::new(&mut body);
    writer.write_text("# service=git-upload-pack").unwrap();
    writer.write_flush().unwrap();
    writer.write_flush().unwrap();
    drop(writer);

    let transport = MockTransport::new(body, Vec::new());
    assert!(matches!(
        discover_head(&transport),
        Err(ProtocolError::Protocol(_))
    ));
}

#[test]
fn fetch_pack_strips_nak_and_returns_payload() {
    let pack = b"PACK....pretend-pack-bytes";
    let transport = MockTransport::new(Vec::new(), nak_then(pack));
    let want: ObjectId = HEAD_HEX.parse().unwrap();

    let fetched = fetch_pack(&transport, &want).unwrap();
    assert_eq!(fetched, pack);
}

#[test]
fn fetch_pack_request_has_want_flush_done() {
    let transport = MockTransport::new(Vec::new(), nak_then(b"PACK"));
    let want: ObjectId = HEAD_HEX.parse().unwrap();
    fetch_pack(&transport, &want).unwrap();

    let request = transport.seen_request.borrow().clone().unwrap();
    let expected_want = format!("want {HEAD_HEX} no-progress\n");
    let mut expected = Vec::new();
    let mut writer = PktLineWriter::new(&mut expected);
    writer.write_line(expected_want.as_bytes()).unwrap();
    writer.write_flush().unwrap();
    writer.write_line(b"done\n").unwrap();
    drop(writer);

    assert_eq!(request, expected);
}

#[test]
fn fetch_pack_skips_acks_before_nak() {
    let pack = b"PACKdata";
    let mut body = Vec::new();
    {
        let mut writer = PktLineWriter::new(&mut body);
        writer
            .write_text(&format!("ACK {HEAD_HEX} continue"))
            .unwrap();
        writer.write_text("NAK").unwrap();
    }
    body.extend_from_slice(pack);

    let transport = MockTransport::new(Vec::new(), body);
    let want: ObjectId = HEAD_HEX.parse().unwrap();
    assert_eq!(fetch_pack(&transport, &want).unwrap(), pack);
}

#[test]
fn fetch_pack_rejects_missing_pack() {
    let transport = MockTransport::new(Vec::new(), nak_then(b""));
    let want: ObjectId = HEAD_HEX.parse().unwrap();
    assert!(matches!(
        fetch_pack(&transport, &want),
        Err(ProtocolError::Protocol(_))
    ));
}

#[test]
fn fetch_pack_rejects_error_line() {
    let mut body = Vec::new();
    PktLineWriter::new(&mut body)
        .write_text("ERR access denied")
        .unwrap();

    let transport = MockTransport::new(Vec::new(), body);
    let want: ObjectId = HEAD_HEX.parse().unwrap();
    assert!(fetch_pack(&transport, &want).is_err());
}
