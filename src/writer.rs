//! Asset persistence: URL-to-filesystem mapping under the dist root.

use std::fs;
use std::path::{Path, PathBuf};

use crate::asset::{url_host, CapturedAsset};
use crate::{Result, SnapError};

/// Fallback filename when the URL path ends in a separator (root document).
pub const DEFAULT_DOCUMENT_NAME: &str = "index.html";

/// Writes captured assets under a fixed dist root, mirroring URL paths.
#[derive(Debug, Clone)]
pub struct AssetWriter {
    dist: PathBuf,
}

impl AssetWriter {
    pub fn new(dist: impl Into<PathBuf>) -> Self {
        Self { dist: dist.into() }
    }

    pub fn dist(&self) -> &Path {
        &self.dist
    }

    /// Persists one asset. Overwrites silently; no conflict detection.
    ///
    /// The host re-check is defensive: the caller already filtered by host,
    /// but a mismatching asset must never land in the tree.
    pub fn write_asset(&self, asset: &CapturedAsset) -> Result<PathBuf> {
        let actual = url_host(&asset.source_url).unwrap_or_default();
        if actual != asset.host {
            return Err(SnapError::CrossOriginAsset {
                expected: asset.host.clone(),
                actual,
                url: asset.source_url.to_string(),
            });
        }

        let (dir, name) = split_asset_path(asset.pathname());
        let mut out_dir = self.dist.clone();
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            out_dir.push(segment);
        }

        fs::create_dir_all(&out_dir)?;
        let out_path = out_dir.join(name);
        fs::write(&out_path, asset.payload.as_bytes())?;
        Ok(out_path)
    }
}

/// Splits a URL pathname into (directory, filename).
///
/// The filename is the last slash-delimited segment, falling back to
/// `index.html` when the path ends in `/`. Empty segments in the directory
/// (duplicate separators) are dropped by the writer when joining.
pub fn split_asset_path(pathname: &str) -> (&str, &str) {
    let (dir, name) = match pathname.rfind('/') {
        Some(idx) => (&pathname[..=idx], &pathname[idx + 1..]),
        None => ("", pathname),
    };
    if name.is_empty() {
        (dir, DEFAULT_DOCUMENT_NAME)
    } else {
        (dir, name)
    }
}
