//! Physical transport for the smart-HTTP upload-pack exchange.
//!
//! The protocol layer talks to a [`SmartTransport`], which performs the two
//! stateless HTTP round trips of a fetch: reference discovery and the
//! upload-pack POST. The production implementation drives `curl` as a
//! subprocess; tests substitute an in-memory double.

mod http;

pub use http::HttpTransport;

/// Errors that can occur during transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The two round trips of a smart-HTTP fetch.
pub trait SmartTransport {
    /// GET `{base}/info/refs?service=git-upload-pack`; returns the raw
    /// pkt-line advertisement body.
    fn info_refs(&self) -> Result<Vec<u8>, TransportError>;

    /// POST `request` to `{base}/git-upload-pack`; returns the raw response
    /// body (NAK preamble + packfile).
    fn upload_pack(&self, request: &[u8]) -> Result<Vec<u8>, TransportError>;
}
