//! Site Snapshot Capture (sitesnap) Library
//!
//! A library for mirroring a site's same-host static assets (HTML, CSS, JS,
//! images) into a local directory tree. Pages are rendered in a headless
//! browser (Playwright via Node.js); every network response served from the
//! same host as the page being navigated is persisted exactly once under the
//! dist root, at a path mirroring the asset URL's path.
//!
//! # Module Overview
//!
//! - [`browser`] - Headless browser helper process and its event stream
//! - [`capture`] - The capture engine: filtering, dedup, delegation to the writer
//! - [`session`] - Run-scoped capture state (current host, seen URLs)
//! - [`asset`] - Captured asset payloads and image classification
//! - [`writer`] - URL-to-filesystem mapping and asset persistence
//! - [`config`] - TOML configuration file support
//! - [`output`] - JSON run-report schemas
//!
//! # Example
//!
//! ```no_run
//! use sitesnap_lib::{BrowserManager, BrowserOptions, CaptureEngine, PageTarget};
//!
//! # async fn example() -> sitesnap_lib::Result<()> {
//! let manager = BrowserManager::new(BrowserOptions::default());
//! let targets = vec![PageTarget::new("https://example.com/")];
//! let mut engine = CaptureEngine::new("dist", None);
//! let report = engine.run(&manager, &targets).await?;
//! println!("captured {} assets", report.totals.written);
//! # Ok(())
//! # }
//! ```

pub mod asset;
pub mod browser;
pub mod capture;
pub mod config;
pub mod error;
pub mod output;
pub mod progress;
pub mod session;
pub mod viewport;
pub mod writer;

pub use asset::{is_image_url, url_host, AssetPayload, CapturedAsset};
pub use browser::{
    BrowserManager, BrowserOptions, CaptureEvent, EventStream, DEFAULT_ASSET_TIMEOUT,
    DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_PROCESS_TIMEOUT, DEFAULT_SETTLE_DELAY,
};
pub use capture::CaptureEngine;
pub use config::{Config, PageTarget, Timeouts};
pub use error::{ErrorCategory, ErrorPayload, Result, SnapError};
pub use output::{
    CaptureOutput, CaptureTotals, ErrorOutput, PageCapture, SnapOutput, SNAP_OUTPUT_VERSION,
};
pub use progress::ProgressCallback;
pub use session::CaptureSession;
pub use viewport::Viewport;
pub use writer::AssetWriter;
