//! TOML configuration file support.
//!
//! Priority: explicit `--config` path > `~/.config/sitesnap/config.toml` >
//! built-in defaults. CLI flags override whatever the file provides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::asset::url_host;
use crate::viewport::Viewport;
use crate::{Result, SnapError};

/// One URL configured for capture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageTarget {
    pub url: String,
    /// Whether the page's own document response is persisted alongside its
    /// assets (`index.html` for the root document case).
    #[serde(default = "default_true")]
    pub with_html: bool,
}

impl PageTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            with_html: true,
        }
    }

    pub fn without_html(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            with_html: false,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output root for the mirrored site tree.
    pub dist: PathBuf,
    pub pages: Vec<PageTarget>,
    /// Per-page wait after the viewport resize, for in-flight asset requests.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Initial browser viewport.
    pub viewport: Viewport,
    /// Viewport applied mid-capture to trigger responsive asset variants.
    pub mobile_viewport: Viewport,
    /// Wait after the end-of-document key press, for lazy content to start loading.
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
    pub timeouts: Timeouts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub navigation: Duration,
    /// Base budget for the helper process; per-page waits are added on top.
    #[serde(with = "humantime_serde")]
    pub process: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            process: Duration::from_secs(45),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dist: PathBuf::from("dist"),
            pages: Vec::new(),
            timeout: Duration::from_secs(5),
            viewport: Viewport::default(),
            mobile_viewport: Viewport::mobile(),
            settle_delay: Duration::from_millis(500),
            timeouts: Timeouts::default(),
        }
    }
}

impl Config {
    /// Loads config from an explicit path, the central config file, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.exists()),
        };

        match candidate {
            Some(p) => {
                let raw = fs::read_to_string(&p)?;
                toml::from_str(&raw)
                    .map_err(|e| SnapError::Config(format!("{}: {}", p.display(), e)))
            }
            None => Ok(Self::default()),
        }
    }

    /// `~/.config/sitesnap/config.toml`, if a home directory can be determined.
    pub fn central_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            Path::new(&home)
                .join(".config")
                .join("sitesnap")
                .join("config.toml")
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(SnapError::Config("viewport must be non-zero".to_string()));
        }
        if self.mobile_viewport.width == 0 || self.mobile_viewport.height == 0 {
            return Err(SnapError::Config(
                "mobile_viewport must be non-zero".to_string(),
            ));
        }
        for page in &self.pages {
            let url = Url::parse(&page.url)
                .map_err(|e| SnapError::Config(format!("invalid page URL {}: {}", page.url, e)))?;
            if url_host(&url).is_none() {
                return Err(SnapError::Config(format!(
                    "page URL has no host: {}",
                    page.url
                )));
            }
        }
        Ok(())
    }
}
