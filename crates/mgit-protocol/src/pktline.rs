//! Pkt-line framing.
//!
//! Each packet is prefixed with a 4-hex-digit length that includes the 4
//! bytes of the length field itself; `0000` is a flush packet with no
//! payload. Protocol v1 uses nothing else, so lengths 1-3 are invalid.

use std::io::{Read, Write};

use crate::ProtocolError;

/// Maximum data per packet (65520 - 4).
pub const MAX_PKT_DATA_LEN: usize = 65516;

/// One packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PktLine {
    /// Normal data line.
    Data(Vec<u8>),
    /// Flush packet (`0000`) — end of section.
    Flush,
}

/// Pkt-line reader over any byte stream.
pub struct PktLineReader<R> {
    reader: R,
}

impl<R: Read> PktLineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read one pkt-line.
    pub fn read_pkt(&mut self) -> Result<PktLine, ProtocolError> {
        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ProtocolError::Protocol("unexpected EOF reading pkt-line length".into())
            } else {
                ProtocolError::Io(e)
            }
        })?;

        let len_str = std::str::from_utf8(&len_buf)
            .map_err(|_| ProtocolError::InvalidPktLine(format!("length bytes {len_buf:?}")))?;
        let len = usize::from_str_radix(len_str, 16)
            .map_err(|_| ProtocolError::InvalidPktLine(format!("length {len_str:?}")))?;

        match len {
            0 => Ok(PktLine::Flush),
            1..=3 => Err(ProtocolError::InvalidPktLine(format!(
                "length {len} is reserved"
            ))),
            _ => {
                let data_len = len - 4;
                if data_len > MAX_PKT_DATA_LEN {
                    return Err(ProtocolError::InvalidPktLine(format!(
                        "packet of {data_len} bytes exceeds the maximum"
                    )));
                }
                let mut data = vec![0u8; data_len];
                self.reader.read_exact(&mut data).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::UnexpectedEof {
                        ProtocolError::Protocol("truncated pkt-line payload".into())
                    } else {
                        ProtocolError::Io(e)
                    }
                })?;
                Ok(PktLine::Data(data))
            }
        }
    }

    /// Read one data line; `None` for a flush packet.
    pub fn read_line(&mut self) -> Result<Option<Vec<u8>>, ProtocolError> {
        match self.read_pkt()? {
            PktLine::Data(data) => Ok(Some(data)),
            PktLine::Flush => Ok(None),
        }
    }
}

/// Pkt-line writer over any byte sink.
pub struct PktLineWriter<W> {
    writer: W,
}

impl<W: Write> PktLineWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write a data packet.
    pub fn write_line(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        if data.len() > MAX_PKT_DATA_LEN {
            return Err(ProtocolError::InvalidPktLine(format!(
                "{} bytes do not fit one packet (max {MAX_PKT_DATA_LEN})",
                data.len()
            )));
        }
        write!(self.writer, "{:04x}", data.len() + 4)?;
        self.writer.write_all(data)?;
        Ok(())
    }

    /// Write a text line, appending `\n` if absent.
    pub fn write_text(&mut self, text: &str) -> Result<(), ProtocolError> {
        if text.ends_with('\n') {
            self.write_line(text.as_bytes())
        } else {
            let mut data = Vec::with_capacity(text.len() + 1);
            data.extend_from_slice(text.as_bytes());
            data.push(b'\n');
            self.write_line(&data)
        }
    }

    /// Write a flush packet (`0000`).
    pub fn write_flush(&mut self) -> Result<(), ProtocolError> {
        self.writer.write_all(b"0000")?;
        Ok(())
    }
}
