use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum SnapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Cross-origin asset {url}: expected host {expected}, got {actual}")]
    CrossOriginAsset {
        expected: String,
        actual: String,
        url: String,
    },

    #[error("Failed to decode response body for {url}: {message}")]
    BodyDecode { url: String, message: String },

    #[error("Browser helper error: {0}")]
    Browser(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl SnapError {
    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            SnapError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions under the dist root.",
            ),
            SnapError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify the page URL is absolute (e.g., https://example.com/).",
            ),
            SnapError::CrossOriginAsset {
                expected,
                actual,
                url,
            } => ErrorPayload::new(
                ErrorCategory::Capture,
                format!(
                    "Asset {} served from {} while capturing {}",
                    url, actual, expected
                ),
                "Cross-origin assets are never captured; this asset was skipped.",
            ),
            SnapError::BodyDecode { url, message } => ErrorPayload::new(
                ErrorCategory::Capture,
                format!("Body decode failed for {}: {}", url, message),
                "The response body may already be consumed; the asset was skipped.",
            ),
            SnapError::Browser(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("cannot find module 'playwright'")
                    || lower.contains("playwright npm package is missing")
                {
                    ErrorPayload::new(
                        ErrorCategory::Browser,
                        msg.to_string(),
                        "Install Playwright (e.g., `npm install playwright` and `npx playwright install chromium`).",
                    )
                } else if lower.contains("chromium executable") {
                    ErrorPayload::new(
                        ErrorCategory::Browser,
                        msg.to_string(),
                        "Run `npx playwright install chromium` to download the browser.",
                    )
                } else if lower.contains("not found on path") || lower.contains("node command") {
                    ErrorPayload::new(
                        ErrorCategory::Browser,
                        msg.to_string(),
                        "Install Node.js and ensure the node binary is on PATH (or pass --node-command).",
                    )
                } else if lower.contains("timed out") || lower.contains("timeout") {
                    ErrorPayload::new(
                        ErrorCategory::Browser,
                        msg.to_string(),
                        "Try increasing --timeout/--nav-timeout/--process-timeout, and ensure the pages finish loading.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Browser,
                        msg.to_string(),
                        "Re-run with --verbose for helper process details.",
                    )
                }
            }
            SnapError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check config/event inputs; run with --verbose for details.",
            ),
            SnapError::Config(msg) => ErrorPayload::new(
                ErrorCategory::Config,
                msg.to_string(),
                "Check flags/paths (e.g., --page URL, --dist DIR) and the config file.",
            ),
            SnapError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, SnapError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Browser,
    Capture,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
