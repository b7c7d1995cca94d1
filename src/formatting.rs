use std::fmt::Write as FmtWrite;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sitesnap_lib::output::SNAP_OUTPUT_VERSION;
use sitesnap_lib::{ErrorOutput, SnapError, SnapOutput};

use crate::cli::OutputFormat;

/// Write the run report in the requested format.
pub fn write_output(
    body: &SnapOutput,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output)?,
        OutputFormat::Pretty => write_pretty_output(body, output)?,
    };
    Ok(())
}

/// Render an error and return the fatal exit code.
pub fn render_error(err: SnapError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let error_payload = err.to_payload();
    let payload = SnapOutput::Error(ErrorOutput {
        version: SNAP_OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    // Exit code 2 is reserved for fatal errors; per-asset failures never
    // reach here.
    ExitCode::from(2)
}

fn write_json_output(
    body: &SnapOutput,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    emit(&content, output)
}

fn write_pretty_output(
    body: &SnapOutput,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = render_pretty(body)?;
    emit(&content, output)
}

fn emit(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

fn render_pretty(body: &SnapOutput) -> Result<String, Box<dyn std::error::Error>> {
    let mut out = String::new();
    match body {
        SnapOutput::Capture(report) => {
            writeln!(
                out,
                "Captured {} asset(s) from {} page(s) into {} in {} ms",
                report.totals.written,
                report.pages.len(),
                report.dist.display(),
                report.elapsed_ms
            )?;
            for page in &report.pages {
                writeln!(
                    out,
                    "  {} ({}): {} asset(s)",
                    page.host, page.url, page.assets_written
                )?;
            }
            writeln!(
                out,
                "Skipped: {} non-200, {} cross-origin, {} duplicate, {} document, {} unattributed; {} failed",
                report.totals.skipped_status,
                report.totals.skipped_cross_origin,
                report.totals.skipped_duplicate,
                report.totals.skipped_document,
                report.totals.skipped_unattributed,
                report.totals.failed
            )?;
        }
        SnapOutput::Error(err) => {
            writeln!(out, "error[{:?}]: {}", err.error.category, err.error.message)?;
            if let Some(remediation) = &err.error.remediation {
                writeln!(out, "  hint: {remediation}")?;
            }
        }
    }
    Ok(out.trim_end().to_string())
}
