//! The upload-pack v1 wire protocol: pkt-line framing plus the two-step
//! discovery + fetch exchange that yields a packfile.

pub mod fetch;
pub mod pktline;

pub use fetch::{discover_head, fetch_pack};

use mgit_transport::TransportError;

/// Errors that can occur during protocol operations.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid pkt-line: {0}")]
    InvalidPktLine(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Hash(#[from] mgit_hash::HashError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
