//! Smart-HTTP transport backed by a `curl` subprocess.
//!
//! Each round trip is one blocking request; there is no connection state to
//! keep between them.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::{SmartTransport, TransportError};

const UPLOAD_PACK_SERVICE: &str = "git-upload-pack";

/// Smart-HTTP connection to a remote repository.
pub struct HttpTransport {
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the repository at `url` (scheme + host + path,
    /// without the service suffix). A trailing `/` is tolerated.
    pub fn new(url: &str) -> Self {
        Self {
            base_url: url.trim_end_matches('/').to_string(),
        }
    }
}

impl SmartTransport for HttpTransport {
    fn info_refs(&self) -> Result<Vec<u8>, TransportError> {
        http_get(&format!(
            "{}/info/refs?service={}",
            self.base_url, UPLOAD_PACK_SERVICE
        ))
    }

    fn upload_pack(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        http_post(
            &format!("{}/{}", self.base_url, UPLOAD_PACK_SERVICE),
            &format!("application/x-{}-request", UPLOAD_PACK_SERVICE),
            &format!("application/x-{}-result", UPLOAD_PACK_SERVICE),
            request,
        )
    }
}

/// Blocking HTTP GET via `curl`; `-f` turns HTTP errors into failures.
fn http_get(url: &str) -> Result<Vec<u8>, TransportError> {
    let output = Command::new("curl")
        .args(["-sfL", url])
        .output()
        .map_err(|e| TransportError::ConnectionFailed(format!("curl not found: {e}")))?;

    if !output.status.success() {
        return Err(TransportError::Http(format!(
            "GET {url} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(output.stdout)
}

/// Blocking HTTP POST via `curl`, streaming the body over stdin.
fn http_post(
    url: &str,
    content_type: &str,
    accept: &str,
    body: &[u8],
) -> Result<Vec<u8>, TransportError> {
    let mut child = Command::new("curl")
        .args([
            "-sf",
            "-X",
            "POST",
            "-H",
            &format!("Content-Type: {content_type}"),
            "-H",
            &format!("Accept: {accept}"),
            "--data-binary",
            "@-",
            url,
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| TransportError::ConnectionFailed(format!("curl not found: {e}")))?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin.write_all(body)?;
    }
    drop(child.stdin.take());

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(TransportError::Http(format!(
            "POST {url} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(output.stdout)
}
