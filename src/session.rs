//! Run-scoped capture state.
//!
//! A [`CaptureSession`] tracks the host of the page currently being navigated
//! and the set of asset URLs already written this run. The seen-set grows
//! monotonically and is never cleared between targets, so an asset shared by
//! two pages is written once. Reservation is a single synchronous step taken
//! before any write begins, which closes the duplicate-write window that a
//! check-after-read sequence would leave open.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct CaptureSession {
    current_host: Option<String>,
    seen_urls: HashSet<String>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a new target page navigation.
    pub fn begin_page(&mut self, host: impl Into<String>) {
        self.current_host = Some(host.into());
    }

    /// Host of the page currently being navigated, if any navigation started.
    pub fn current_host(&self) -> Option<&str> {
        self.current_host.as_deref()
    }

    pub fn is_seen(&self, url: &str) -> bool {
        self.seen_urls.contains(url)
    }

    /// Reserves a URL for writing. Returns `true` if the URL was not seen
    /// before; a `false` return means another response for the same URL
    /// already claimed it and the caller must skip the write.
    pub fn reserve(&mut self, url: &str) -> bool {
        self.seen_urls.insert(url.to_string())
    }

    pub fn seen_count(&self) -> usize {
        self.seen_urls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_is_idempotent_per_url() {
        let mut session = CaptureSession::new();
        assert!(session.reserve("https://example.com/a.css"));
        assert!(!session.reserve("https://example.com/a.css"));
        assert!(session.is_seen("https://example.com/a.css"));
        assert_eq!(session.seen_count(), 1);
    }

    #[test]
    fn seen_urls_survive_page_transitions() {
        let mut session = CaptureSession::new();
        session.begin_page("example.com");
        assert!(session.reserve("https://example.com/shared.js"));

        session.begin_page("example.org");
        assert_eq!(session.current_host(), Some("example.org"));
        assert!(
            !session.reserve("https://example.com/shared.js"),
            "seen set must not be cleared between targets"
        );
    }

    #[test]
    fn no_host_before_first_navigation() {
        let session = CaptureSession::new();
        assert!(session.current_host().is_none());
    }
}
