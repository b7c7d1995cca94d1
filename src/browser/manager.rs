//! Browser manager for the capture helper process.
//!
//! `BrowserManager` spawns the Node.js/Playwright helper with the embedded
//! capture script and exposes its stdout as an ordered stream of
//! [`CaptureEvent`]s, with a whole-run deadline scaled by page count.

use std::collections::VecDeque;
use std::fs;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};

use super::event::CaptureEvent;
use super::playwright::{
    ensure_node_available, ensure_playwright_available, map_helper_error, map_spawn_error,
    mock_events_path, CAPTURE_SCRIPT,
};
use crate::config::PageTarget;
use crate::{Result, SnapError, Viewport};

/// Default wait after the viewport resize, for in-flight asset requests.
pub const DEFAULT_ASSET_TIMEOUT: Duration = Duration::from_secs(5);

/// Default wait after the end-of-document key press.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Default timeout for page navigation.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default base budget for the helper process (per-page waits are added).
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(45);

/// Configuration options for the capture helper.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// The Node.js command to use (default: "node").
    pub node_command: String,
    /// Initial viewport for page loads.
    pub viewport: Viewport,
    /// Small viewport applied mid-capture for responsive asset variants.
    pub mobile_viewport: Viewport,
    /// Wait after the end-of-document key press.
    pub settle_delay: Duration,
    /// Per-page wait after the resize, for in-flight asset requests.
    pub asset_timeout: Duration,
    /// Timeout for each page navigation.
    pub navigation_timeout: Duration,
    /// Base budget for the whole helper process.
    pub process_timeout: Duration,
    /// Whether to run in headless mode.
    pub headless: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            node_command: "node".to_string(),
            viewport: Viewport::default(),
            mobile_viewport: Viewport::mobile(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            asset_timeout: DEFAULT_ASSET_TIMEOUT,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            process_timeout: DEFAULT_PROCESS_TIMEOUT,
            headless: true,
        }
    }
}

/// Spawns the capture helper and hands out its event stream.
#[derive(Debug, Clone)]
pub struct BrowserManager {
    options: BrowserOptions,
}

impl BrowserManager {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BrowserOptions {
        &self.options
    }

    /// Whole-run deadline: base budget plus every per-page wait.
    pub fn process_budget(&self, page_count: usize) -> Duration {
        let per_page = self.options.navigation_timeout
            + self.options.settle_delay
            + self.options.asset_timeout;
        self.options.process_timeout + per_page * page_count as u32
    }

    /// Starts a capture over the given targets and returns its event stream.
    ///
    /// When `SITESNAP_MOCK_EVENTS` is set the events are replayed from that
    /// file and no process is spawned.
    pub async fn start_capture(&self, pages: &[PageTarget]) -> Result<EventStream> {
        if let Some(path) = mock_events_path() {
            return EventStream::from_mock_file(&path);
        }

        ensure_node_available(&self.options.node_command).await?;
        ensure_playwright_available(&self.options.node_command).await?;

        let pages_json = serde_json::to_string(pages)?;

        let mut cmd = Command::new(&self.options.node_command);
        cmd.arg("-e")
            .arg(CAPTURE_SCRIPT)
            .arg(pages_json)
            .arg(self.options.asset_timeout.as_millis().to_string())
            .arg(self.options.settle_delay.as_millis().to_string())
            .arg(self.options.navigation_timeout.as_millis().to_string())
            .arg(self.options.viewport.width.to_string())
            .arg(self.options.viewport.height.to_string())
            .arg(self.options.mobile_viewport.width.to_string())
            .arg(self.options.mobile_viewport.height.to_string())
            .arg(if self.options.headless { "1" } else { "0" })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|err| map_spawn_error(err, &self.options.node_command))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            SnapError::Browser("Capture helper spawned without stdout pipe".to_string())
        })?;
        let stderr_pipe = child.stderr.take();

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut err) = stderr_pipe {
                let _ = err.read_to_end(&mut buf).await;
            }
            buf
        });

        Ok(EventStream {
            inner: StreamInner::Helper {
                child,
                lines: BufReader::new(stdout).lines(),
                stderr_task,
                deadline: Instant::now() + self.process_budget(pages.len()),
            },
        })
    }
}

/// Ordered stream of capture events, from the helper process or a fixture.
pub struct EventStream {
    inner: StreamInner,
}

enum StreamInner {
    Helper {
        child: Child,
        lines: Lines<BufReader<ChildStdout>>,
        stderr_task: JoinHandle<Vec<u8>>,
        deadline: Instant,
    },
    Mock {
        events: VecDeque<CaptureEvent>,
    },
}

impl EventStream {
    fn from_mock_file(path: &std::path::Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let mut events = VecDeque::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let event: CaptureEvent = serde_json::from_str(line).map_err(|e| {
                SnapError::Config(format!("bad mock event in {}: {}", path.display(), e))
            })?;
            events.push_back(event);
        }
        Ok(EventStream {
            inner: StreamInner::Mock { events },
        })
    }

    /// Yields the next event, or `None` once the helper exits cleanly.
    ///
    /// Non-JSON stdout lines (Playwright warnings) are skipped. Exceeding the
    /// run deadline kills the helper and fails the run; a non-zero helper
    /// exit at end-of-stream is mapped through its collected stderr.
    pub async fn next_event(&mut self) -> Result<Option<CaptureEvent>> {
        match &mut self.inner {
            StreamInner::Mock { events } => Ok(events.pop_front()),
            StreamInner::Helper {
                child,
                lines,
                stderr_task,
                deadline,
            } => loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                let line = match timeout(remaining, lines.next_line()).await {
                    Err(_) => {
                        let _ = child.kill().await;
                        let _ = child.wait().await;
                        return Err(SnapError::Browser(
                            "Capture helper timed out; the run deadline was exceeded".to_string(),
                        ));
                    }
                    Ok(Err(err)) => return Err(SnapError::Io(err)),
                    Ok(Ok(line)) => line,
                };

                let Some(line) = line else {
                    let status = child.wait().await?;
                    if !status.success() {
                        let stderr = match stderr_task.await {
                            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
                            Err(_) => String::new(),
                        };
                        return Err(map_helper_error(status.to_string(), &stderr));
                    }
                    return Ok(None);
                };

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str::<CaptureEvent>(trimmed) {
                    Ok(event) => return Ok(Some(event)),
                    Err(_) => continue,
                }
            },
        }
    }
}
