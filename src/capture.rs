//! The capture engine: consumes the browser event stream and persists every
//! same-host, successful response exactly once.
//!
//! Filtering rules, per response:
//! - already-seen URLs are skipped (idempotent dedup across the whole run),
//! - only status 200 is captured,
//! - only responses whose host equals the current navigation host are
//!   captured (analytics, CDNs, third-party fonts never are),
//! - image URLs keep raw bytes, everything else is UTF-8 text,
//! - the URL is reserved in the session before the write.
//!
//! Per-asset failures (body decode, malformed URL, filesystem) are logged to
//! stderr and swallowed; capture is best-effort, only a failure of the
//! navigation sequence itself aborts the run.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use url::Url;

use crate::asset::{url_host, AssetPayload, CapturedAsset};
use crate::browser::{decode_body, BrowserManager, CaptureEvent};
use crate::config::PageTarget;
use crate::output::{CaptureOutput, CaptureTotals, PageCapture, SNAP_OUTPUT_VERSION};
use crate::progress::ProgressCallback;
use crate::session::CaptureSession;
use crate::writer::AssetWriter;
use crate::{Result, SnapError};

pub struct CaptureEngine {
    session: CaptureSession,
    writer: AssetWriter,
    progress: Option<ProgressCallback>,
    /// Target URL -> whether its own document response is persisted.
    document_policy: HashMap<String, bool>,
    current_document: Option<String>,
    pages: Vec<PageCapture>,
    totals: CaptureTotals,
    done: bool,
}

impl CaptureEngine {
    pub fn new(dist: impl Into<PathBuf>, progress: Option<ProgressCallback>) -> Self {
        Self {
            session: CaptureSession::new(),
            writer: AssetWriter::new(dist.into()),
            progress,
            document_policy: HashMap::new(),
            current_document: None,
            pages: Vec::new(),
            totals: CaptureTotals::default(),
            done: false,
        }
    }

    pub fn totals(&self) -> CaptureTotals {
        self.totals
    }

    /// Runs a full capture over the given targets.
    pub async fn run(
        &mut self,
        manager: &BrowserManager,
        targets: &[PageTarget],
    ) -> Result<CaptureOutput> {
        if targets.is_empty() {
            return Err(SnapError::Config(
                "no pages configured; pass --page or add pages to the config file".to_string(),
            ));
        }
        for target in targets {
            let url = Url::parse(&target.url)?;
            if url_host(&url).is_none() {
                return Err(SnapError::Config(format!(
                    "page URL has no host: {}",
                    target.url
                )));
            }
            // Key by the normalized serialization; the browser reports
            // normalized response URLs (e.g. a trailing slash the raw
            // target may lack).
            self.document_policy.insert(url.to_string(), target.with_html);
        }

        let start = Instant::now();
        let mut stream = manager.start_capture(targets).await?;
        while let Some(event) = stream.next_event().await? {
            self.handle_event(event)?;
        }

        if !self.done {
            return Err(SnapError::Browser(
                "capture ended before all pages were processed".to_string(),
            ));
        }

        Ok(CaptureOutput {
            version: SNAP_OUTPUT_VERSION.to_string(),
            dist: self.writer.dist().to_path_buf(),
            pages: std::mem::take(&mut self.pages),
            totals: self.totals,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Applies one event. Exposed so tests can drive the engine without a
    /// browser; `run` is a thin pump around this.
    pub fn handle_event(&mut self, event: CaptureEvent) -> Result<()> {
        match event {
            CaptureEvent::Navigation { url, host } => {
                self.session.begin_page(host.clone());
                self.current_document = Some(
                    Url::parse(&url)
                        .map(|u| u.to_string())
                        .unwrap_or_else(|_| url.clone()),
                );
                println!("HOST: {host}");
                self.log(&format!("navigating {url}"));
                self.pages.push(PageCapture {
                    url,
                    host,
                    assets_written: 0,
                });
            }
            CaptureEvent::Response { url, status, body } => {
                self.handle_response(url, status, body);
            }
            CaptureEvent::ResponseError { url, message } => {
                eprintln!("sitesnap: body read failed for {url}: {message}");
                self.totals.failed += 1;
            }
            CaptureEvent::Fatal { message } => {
                return Err(SnapError::Browser(message));
            }
            CaptureEvent::Done { pages } => {
                self.done = true;
                self.log(&format!("capture finished over {pages} page(s)"));
            }
        }
        Ok(())
    }

    fn handle_response(&mut self, url: String, status: u16, body: String) {
        if self.session.is_seen(&url) {
            self.totals.skipped_duplicate += 1;
            return;
        }
        if status != 200 {
            self.totals.skipped_status += 1;
            return;
        }

        let Some(host) = self.session.current_host().map(str::to_string) else {
            // Response before the first navigation marker; no host to
            // attribute it to.
            self.totals.skipped_unattributed += 1;
            return;
        };

        let parsed = match Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(e) => {
                eprintln!("sitesnap: malformed asset URL {url}: {e}");
                self.totals.failed += 1;
                return;
            }
        };

        if url_host(&parsed).as_deref() != Some(host.as_str()) {
            self.totals.skipped_cross_origin += 1;
            return;
        }

        if self.current_document.as_deref() == Some(parsed.as_str())
            && !self.document_for_current_page()
        {
            self.totals.skipped_document += 1;
            self.log(&format!("skipping document {url} (with_html = false)"));
            return;
        }

        let bytes = match decode_body(&url, &body) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("sitesnap: {e}");
                self.totals.failed += 1;
                return;
            }
        };
        let asset = CapturedAsset::new(parsed, host, AssetPayload::classify(&url, bytes));

        // Reserve before the write so a racing duplicate can never write twice.
        if !self.session.reserve(&url) {
            self.totals.skipped_duplicate += 1;
            return;
        }

        match self.writer.write_asset(&asset) {
            Ok(path) => {
                self.totals.written += 1;
                if let Some(page) = self.pages.last_mut() {
                    page.assets_written += 1;
                }
                println!("{url}");
                self.log(&format!(
                    "wrote {} ({} bytes, {})",
                    path.display(),
                    asset.payload.len(),
                    if asset.payload.is_binary() {
                        "binary"
                    } else {
                        "utf8"
                    }
                ));
            }
            Err(e) => {
                eprintln!("sitesnap: {e}");
                self.totals.failed += 1;
            }
        }
    }

    fn document_for_current_page(&self) -> bool {
        self.current_document
            .as_ref()
            .and_then(|url| self.document_policy.get(url))
            .copied()
            .unwrap_or(true)
    }

    fn log(&self, message: &str) {
        if let Some(cb) = &self.progress {
            cb(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn engine(dir: &TempDir) -> CaptureEngine {
        CaptureEngine::new(dir.path(), None)
    }

    fn navigate(engine: &mut CaptureEngine, url: &str, host: &str) {
        engine
            .handle_event(CaptureEvent::Navigation {
                url: url.to_string(),
                host: host.to_string(),
            })
            .unwrap();
    }

    #[test]
    fn non_200_responses_are_never_written() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);
        navigate(&mut engine, "https://example.com/", "example.com");

        for status in [204, 301, 304, 404, 500] {
            engine
                .handle_event(CaptureEvent::response(
                    format!("https://example.com/s{status}.css"),
                    status,
                    b"x",
                ))
                .unwrap();
        }

        assert_eq!(engine.totals().written, 0);
        assert_eq!(engine.totals().skipped_status, 5);
    }

    #[test]
    fn cross_origin_responses_are_excluded() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);
        navigate(&mut engine, "https://example.com/", "example.com");

        engine
            .handle_event(CaptureEvent::response(
                "https://cdn.other.com/font.woff",
                200,
                b"font",
            ))
            .unwrap();

        assert_eq!(engine.totals().written, 0);
        assert_eq!(engine.totals().skipped_cross_origin, 1);
        assert!(!dir.path().join("font.woff").exists());
    }

    #[test]
    fn duplicate_urls_are_written_at_most_once() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);
        navigate(&mut engine, "https://example.com/", "example.com");

        for _ in 0..3 {
            engine
                .handle_event(CaptureEvent::response(
                    "https://example.com/app.js",
                    200,
                    b"console.log(1)",
                ))
                .unwrap();
        }

        assert_eq!(engine.totals().written, 1);
        assert_eq!(engine.totals().skipped_duplicate, 2);
    }

    #[test]
    fn dedup_spans_page_transitions() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);

        navigate(&mut engine, "https://example.com/", "example.com");
        engine
            .handle_event(CaptureEvent::response(
                "https://example.com/shared.css",
                200,
                b"a",
            ))
            .unwrap();

        navigate(&mut engine, "https://example.com/about", "example.com");
        engine
            .handle_event(CaptureEvent::response(
                "https://example.com/shared.css",
                200,
                b"a",
            ))
            .unwrap();

        assert_eq!(engine.totals().written, 1);
        assert_eq!(engine.totals().skipped_duplicate, 1);
    }

    #[test]
    fn image_bytes_are_written_raw() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);
        navigate(&mut engine, "https://example.com/", "example.com");

        let png = [0x89u8, 0x50, 0x4e, 0x47, 0x00, 0xff];
        engine
            .handle_event(CaptureEvent::response(
                "https://example.com/a/b/c.png",
                200,
                &png,
            ))
            .unwrap();

        let written = std::fs::read(dir.path().join("a").join("b").join("c.png")).unwrap();
        assert_eq!(written, png);
    }

    #[test]
    fn root_document_is_written_as_index_html() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);
        navigate(&mut engine, "https://example.com/", "example.com");

        engine
            .handle_event(CaptureEvent::response(
                "https://example.com/",
                200,
                b"<html></html>",
            ))
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("index.html")).unwrap(),
            "<html></html>"
        );
    }

    #[test]
    fn with_html_false_skips_the_document_response() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);
        engine
            .document_policy
            .insert("https://example.com/".to_string(), false);
        navigate(&mut engine, "https://example.com/", "example.com");

        engine
            .handle_event(CaptureEvent::response(
                "https://example.com/",
                200,
                b"<html></html>",
            ))
            .unwrap();
        engine
            .handle_event(CaptureEvent::response(
                "https://example.com/style.css",
                200,
                b"body{}",
            ))
            .unwrap();

        assert!(!dir.path().join("index.html").exists());
        assert!(dir.path().join("style.css").exists());
        assert_eq!(engine.totals().skipped_document, 1);
        assert_eq!(engine.totals().written, 1);
    }

    #[test]
    fn document_skip_matches_unslashed_targets() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);
        // Policy keys are normalized; the raw target had no trailing slash.
        engine
            .document_policy
            .insert("https://example.com/".to_string(), false);
        navigate(&mut engine, "https://example.com", "example.com");

        engine
            .handle_event(CaptureEvent::response(
                "https://example.com/",
                200,
                b"<html></html>",
            ))
            .unwrap();

        assert!(
            !dir.path().join("index.html").exists(),
            "document must be skipped for an unslashed target"
        );
        assert_eq!(engine.totals().skipped_document, 1);
    }

    #[test]
    fn response_before_any_navigation_is_unattributed() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);

        engine
            .handle_event(CaptureEvent::response(
                "https://example.com/early.css",
                200,
                b"x",
            ))
            .unwrap();

        assert_eq!(engine.totals().skipped_unattributed, 1);
        assert_eq!(engine.totals().skipped_cross_origin, 0);
        assert_eq!(engine.totals().written, 0);
    }

    #[test]
    fn fatal_event_aborts() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);
        let err = engine
            .handle_event(CaptureEvent::Fatal {
                message: "browser crashed".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, SnapError::Browser(_)));
    }

    #[test]
    fn body_read_errors_are_swallowed_and_counted() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);
        navigate(&mut engine, "https://example.com/", "example.com");

        engine
            .handle_event(CaptureEvent::ResponseError {
                url: "https://example.com/x.js".to_string(),
                message: "body already consumed".to_string(),
            })
            .unwrap();

        assert_eq!(engine.totals().failed, 1);
        assert_eq!(engine.totals().written, 0);
    }

    #[test]
    fn end_to_end_scenario_writes_exactly_two_files() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);
        engine
            .document_policy
            .insert("https://example.com/".to_string(), true);

        navigate(&mut engine, "https://example.com/", "example.com");
        for event in [
            CaptureEvent::response("https://example.com/", 200, b"<html></html>"),
            CaptureEvent::response("https://example.com/style.css", 200, b"body{}"),
            CaptureEvent::response("https://cdn.other.com/font.woff", 200, b"font"),
        ] {
            engine.handle_event(event).unwrap();
        }
        engine
            .handle_event(CaptureEvent::Done { pages: 1 })
            .unwrap();

        assert!(dir.path().join("index.html").exists());
        assert!(dir.path().join("style.css").exists());
        assert_eq!(engine.totals().written, 2);
        assert_eq!(engine.totals().skipped_cross_origin, 1);
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 2, "exactly two files under dist");
    }
}
