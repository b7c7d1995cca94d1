//! Playwright integration for the capture helper.
//!
//! This module contains the inline capture script, error mapping, and
//! availability checks for Node.js and Playwright.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::{Result, SnapError};

/// Capture script run via `node -e`.
///
/// Arguments: pages JSON, per-page asset wait (ms), settle delay (ms),
/// navigation timeout (ms), initial viewport WxH, mobile viewport WxH,
/// headless flag. Emits one JSON event per line on stdout; the Rust side
/// does all filtering and persistence.
///
/// The final explicit exit is required: Playwright leaves background handles
/// open that would otherwise keep the process alive after the last page.
pub(crate) const CAPTURE_SCRIPT: &str = r#"
const [, pagesJson, assetWait, settleWait, navTimeout, width, height, mobileWidth, mobileHeight, headlessFlag] = process.argv;

function emit(event) {
  process.stdout.write(JSON.stringify(event) + '\n');
}

async function run() {
  let browser;
  let failed = false;
  try {
    const { chromium } = require('playwright');
    const pages = JSON.parse(pagesJson);
    browser = await chromium.launch({ headless: headlessFlag !== '0' });
    const context = await browser.newContext({
      viewport: {
        width: parseInt(width, 10),
        height: parseInt(height, 10)
      }
    });
    const page = await context.newPage();

    page.on('response', async (response) => {
      const url = response.url();
      try {
        const body = await response.body();
        emit({ type: 'response', url, status: response.status(), body: body.toString('base64') });
      } catch (err) {
        emit({ type: 'response-error', url, message: err && err.message ? err.message : String(err) });
      }
    });

    for (const target of pages) {
      const host = new URL(target.url).host;
      emit({ type: 'navigation', url: target.url, host });
      await page.goto(target.url, { timeout: parseInt(navTimeout, 10) });
      await page.keyboard.press('End');
      await page.waitForTimeout(parseInt(settleWait, 10));
      await page.setViewportSize({
        width: parseInt(mobileWidth, 10),
        height: parseInt(mobileHeight, 10)
      });
      await page.waitForTimeout(parseInt(assetWait, 10));
    }

    emit({ type: 'done', pages: pages.length });
  } catch (err) {
    failed = true;
    emit({ type: 'fatal', message: err && err.message ? err.message : String(err) });
  } finally {
    if (browser) {
      await browser.close();
    }
    process.exit(failed ? 1 : 0);
  }
}

run();
"#;

/// Timeout for checking node/playwright availability.
pub(crate) const NODE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Script to check if Playwright is installed.
const PLAYWRIGHT_CHECK_SCRIPT: &str = "require('playwright'); process.stdout.write('ok');";

/// Maps a spawn error to an appropriate SnapError.
pub(crate) fn map_spawn_error(err: io::Error, command: &str) -> SnapError {
    if err.kind() == io::ErrorKind::NotFound {
        SnapError::Browser(format!(
            "Unable to spawn capture helper; '{}' was not found on PATH",
            command
        ))
    } else {
        SnapError::Io(err)
    }
}

/// Maps helper stderr output to an appropriate SnapError.
pub(crate) fn map_helper_error(status_text: impl Into<String>, stderr: &str) -> SnapError {
    let lower = stderr.to_ascii_lowercase();

    if lower.contains("cannot find module 'playwright'") {
        return SnapError::Browser(
            "Playwright npm package is missing; install with `npm install playwright`.".to_string(),
        );
    }

    if lower.contains("executable doesn't exist") || lower.contains("chromium executable") {
        return SnapError::Browser(
            "chromium executable is missing; run `npx playwright install chromium`.".to_string(),
        );
    }

    if lower.contains("timeout") {
        return SnapError::Browser(
            "Capture helper timed out; try increasing --nav-timeout/--process-timeout, and ensure the pages finish loading."
                .to_string(),
        );
    }

    SnapError::Browser(format!(
        "Capture helper exited with status {}: {}",
        status_text.into(),
        stderr.trim()
    ))
}

/// Path to an NDJSON event fixture replacing the helper process, if set.
///
/// Test seam: when `SITESNAP_MOCK_EVENTS` points at a file, the manager
/// replays its events instead of spawning Node/Playwright.
pub(crate) fn mock_events_path() -> Option<PathBuf> {
    match std::env::var("SITESNAP_MOCK_EVENTS") {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => None,
    }
}

/// Ensures Node.js is available on the system.
pub(crate) async fn ensure_node_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let status = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.status())
        .await
        .map_err(|_| {
            SnapError::Browser(format!(
                "Timed out checking node availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !status.success() {
        return Err(SnapError::Browser(format!(
            "Node command {:?} is not available (exit {})",
            node_command, status
        )));
    }

    Ok(())
}

/// Ensures the Playwright npm package is installed.
pub(crate) async fn ensure_playwright_available(node_command: &str) -> Result<()> {
    if mock_events_path().is_some() {
        return Ok(());
    }

    let mut cmd = Command::new(node_command);
    cmd.arg("-e")
        .arg(PLAYWRIGHT_CHECK_SCRIPT)
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let output = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.output())
        .await
        .map_err(|_| {
            SnapError::Browser(format!(
                "Timed out checking Playwright availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(map_helper_error(format!("{:?}", output.status), &stderr));
    }

    Ok(())
}
