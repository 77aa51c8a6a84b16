//! HTTP transport seam.
//!
//! [`Transport`] is the port the [`crate::RemoteClient`] speaks through, so
//! retry and error-mapping logic can be exercised against scripted fakes.
//! [`UreqTransport`] is the production implementation. Non-2xx responses are
//! returned as [`HttpResponse`] values, not errors; [`TransportError`] is
//! reserved for failures where no response arrived at all.

use std::io::Read;

use thiserror::Error;

/// Status code plus body text, regardless of success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Network-level failure: the request never produced an HTTP response.
#[derive(Debug, Error)]
#[error("transport failure for {url}: {message}")]
pub struct TransportError {
    pub url: String,
    pub message: String,
}

/// Minimal HTTP surface the remote client needs.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    fn post_json(&self, url: &str, body: &serde_json::Value)
        -> Result<HttpResponse, TransportError>;

    /// Multipart form upload with a single file field named `file`.
    fn post_multipart(
        &self,
        url: &str,
        file_name: &str,
        content: &[u8],
    ) -> Result<HttpResponse, TransportError>;
}

// ---------------------------------------------------------------------------
// ureq implementation
// ---------------------------------------------------------------------------

const MULTIPART_BOUNDARY: &str = "curator-upload-2f8c41d7e0";

/// Blocking production transport over a shared [`ureq::Agent`].
pub struct UreqTransport {
    agent: ureq::Agent,
    auth_token: Option<String>,
}

impl UreqTransport {
    pub fn new(auth_token: Option<String>) -> Self {
        UreqTransport {
            agent: ureq::AgentBuilder::new().build(),
            auth_token,
        }
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let mut request = self.agent.request(method, url);
        if let Some(token) = &self.auth_token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        request
    }

    fn finish(
        url: &str,
        outcome: Result<ureq::Response, ureq::Error>,
    ) -> Result<HttpResponse, TransportError> {
        let response = match outcome {
            Ok(response) => response,
            // Non-2xx still carries a response; only transport-level
            // failures become errors.
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(TransportError {
                    url: url.to_string(),
                    message: err.to_string(),
                });
            }
        };
        let status = response.status();
        let mut body = String::new();
        response
            .into_reader()
            .read_to_string(&mut body)
            .map_err(|err| TransportError {
                url: url.to_string(),
                message: format!("failed to read response body: {err}"),
            })?;
        Ok(HttpResponse { status, body })
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        Self::finish(url, self.request("GET", url).call())
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        let payload = body.to_string();
        Self::finish(
            url,
            self.request("POST", url)
                .set("Content-Type", "application/json")
                .send_string(&payload),
        )
    }

    fn post_multipart(
        &self,
        url: &str,
        file_name: &str,
        content: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        let body = multipart_body(MULTIPART_BOUNDARY, file_name, content);
        Self::finish(
            url,
            self.request("POST", url)
                .set(
                    "Content-Type",
                    &format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
                )
                .send_bytes(&body),
        )
    }
}

/// Assemble a single-file `multipart/form-data` body.
pub(crate) fn multipart_body(boundary: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/plain; charset=utf-8\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
