//! Event protocol between the capture helper and the engine.
//!
//! The helper emits one JSON object per stdout line. Events arrive in pipe
//! order, so every response line is attributed to the most recent navigation
//! line preceding it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::{Result, SnapError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CaptureEvent {
    /// A target page navigation is starting; responses that follow belong to
    /// this host until the next navigation event.
    Navigation { url: String, host: String },
    /// One network response, body transported as base64.
    Response {
        url: String,
        status: u16,
        body: String,
    },
    /// The helper could not read a response body (already consumed, network
    /// error); best-effort capture skips the asset.
    ResponseError { url: String, message: String },
    /// The navigation sequence itself failed; the run aborts.
    Fatal { message: String },
    /// All target pages were processed.
    Done { pages: u32 },
}

impl CaptureEvent {
    /// Convenience constructor used by tests and mock fixtures.
    pub fn response(url: impl Into<String>, status: u16, body: &[u8]) -> Self {
        CaptureEvent::Response {
            url: url.into(),
            status,
            body: BASE64.encode(body),
        }
    }
}

/// Decodes a base64 response body.
pub fn decode_body(url: &str, body: &str) -> Result<Vec<u8>> {
    BASE64.decode(body).map_err(|e| SnapError::BodyDecode {
        url: url.to_string(),
        message: e.to_string(),
    })
}
