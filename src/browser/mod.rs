//! Browser automation module for driving capture runs.
//!
//! Pages are rendered by a Node.js/Playwright helper process driven by an
//! embedded script; the helper streams navigation and response events over
//! stdout and the engine consumes them in order.
//!
//! # Module Structure
//!
//! - [`manager`] - Helper process lifecycle and the event stream
//! - [`event`] - The NDJSON event schema crossing the pipe
//! - [`playwright`] - The embedded capture script and availability checks
//!
//! # Example
//!
//! ```no_run
//! use sitesnap_lib::{BrowserManager, BrowserOptions, PageTarget};
//!
//! # async fn example() -> sitesnap_lib::Result<()> {
//! let manager = BrowserManager::new(BrowserOptions::default());
//! let mut stream = manager
//!     .start_capture(&[PageTarget::new("https://example.com/")])
//!     .await?;
//! while let Some(event) = stream.next_event().await? {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod event;
mod manager;
mod playwright;

pub use event::{decode_body, CaptureEvent};
pub use manager::{
    BrowserManager, BrowserOptions, EventStream, DEFAULT_ASSET_TIMEOUT,
    DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_PROCESS_TIMEOUT, DEFAULT_SETTLE_DELAY,
};
