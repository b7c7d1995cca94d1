use std::path::{Path, PathBuf};
use std::time::Duration;

use sitesnap_lib::{BrowserOptions, Config, PageTarget, Result, SnapError};

use crate::cli::Cli;

/// Settings after merging CLI flags over the config file.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub dist: PathBuf,
    pub targets: Vec<PageTarget>,
    pub browser: BrowserOptions,
}

/// Load config from a TOML file, the central config, or defaults.
/// Priority: explicit path > ~/.config/sitesnap/config.toml > defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        SnapError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        SnapError::Config(prefix)
    })?;
    Ok(cfg)
}

/// Merge CLI arguments with the config file, preferring CLI when present.
/// Pages on the CLI replace config pages entirely.
pub fn resolve_settings(cli: &Cli, config: &Config) -> Result<ResolvedSettings> {
    let targets: Vec<PageTarget> = if cli.pages.is_empty() {
        config
            .pages
            .iter()
            .map(|p| PageTarget {
                url: p.url.clone(),
                with_html: p.with_html && !cli.no_html,
            })
            .collect()
    } else {
        cli.pages
            .iter()
            .map(|url| PageTarget {
                url: url.clone(),
                with_html: !cli.no_html,
            })
            .collect()
    };

    if targets.is_empty() {
        return Err(SnapError::Config(
            "no pages configured; pass --page or add pages to the config file".to_string(),
        ));
    }

    let browser = BrowserOptions {
        node_command: cli.node_command.clone(),
        viewport: cli.viewport.unwrap_or(config.viewport),
        mobile_viewport: cli.mobile_viewport.unwrap_or(config.mobile_viewport),
        settle_delay: cli
            .settle_delay
            .map(Duration::from_millis)
            .unwrap_or(config.settle_delay),
        asset_timeout: cli
            .timeout
            .map(Duration::from_millis)
            .unwrap_or(config.timeout),
        navigation_timeout: cli
            .nav_timeout
            .map(Duration::from_secs)
            .unwrap_or(config.timeouts.navigation),
        process_timeout: cli
            .process_timeout
            .map(Duration::from_secs)
            .unwrap_or(config.timeouts.process),
        headless: !cli.headful,
    };

    Ok(ResolvedSettings {
        dist: cli.dist.clone().unwrap_or_else(|| config.dist.clone()),
        targets,
        browser,
    })
}

/// Log effective settings to stderr (verbose mode).
pub fn log_effective_settings(config_path: Option<&Path>, settings: &ResolvedSettings) {
    let config_source = config_path
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "defaults/built-in".to_string());
    eprintln!(
        "Effective settings (source: {}): dist {}, {} page(s), viewport {} -> {}, settle {:?}, asset wait {:?}, timeouts nav {:?} / process {:?}",
        config_source,
        settings.dist.display(),
        settings.targets.len(),
        settings.browser.viewport,
        settings.browser.mobile_viewport,
        settings.browser.settle_delay,
        settings.browser.asset_timeout,
        settings.browser.navigation_timeout,
        settings.browser.process_timeout,
    );
}
