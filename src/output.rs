use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ErrorPayload;

/// Schema version for output payloads.
pub const SNAP_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum SnapOutput {
    Capture(CaptureOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOutput {
    pub version: String,
    pub dist: PathBuf,
    pub pages: Vec<PageCapture>,
    pub totals: CaptureTotals,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCapture {
    pub url: String,
    pub host: String,
    pub assets_written: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureTotals {
    pub written: u64,
    pub skipped_status: u64,
    pub skipped_cross_origin: u64,
    pub skipped_duplicate: u64,
    pub skipped_document: u64,
    /// Responses that arrived before any navigation marker.
    pub skipped_unattributed: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}
