mod cli;
mod formatting;
mod settings;

use std::process::ExitCode;
use std::sync::Arc;

use sitesnap_lib::{BrowserManager, CaptureEngine, ProgressCallback, SnapOutput};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();

    let config = match settings::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return formatting::render_error(err, args.format, args.output.clone()),
    };

    let resolved = match settings::resolve_settings(&args, &config) {
        Ok(resolved) => resolved,
        Err(err) => return formatting::render_error(err, args.format, args.output.clone()),
    };

    if args.verbose {
        settings::log_effective_settings(args.config.as_deref(), &resolved);
    }

    let progress: Option<ProgressCallback> = if args.verbose {
        Some(Arc::new(|message: &str| eprintln!("sitesnap: {message}")))
    } else {
        None
    };

    let manager = BrowserManager::new(resolved.browser.clone());
    let mut engine = CaptureEngine::new(resolved.dist.clone(), progress);

    match engine.run(&manager, &resolved.targets).await {
        Ok(report) => {
            if let Err(err) =
                formatting::write_output(&SnapOutput::Capture(report), args.format, args.output.as_deref())
            {
                eprintln!("Failed to write output: {}", err);
                return ExitCode::from(2);
            }
            ExitCode::SUCCESS
        }
        Err(err) => formatting::render_error(err, args.format, args.output.clone()),
    }
}
