use clap::{Parser, ValueEnum};
use sitesnap_lib::Viewport;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sitesnap")]
#[command(
    version,
    about = "Site snapshot capture - mirror a site's same-host assets into a local directory tree",
    long_about = "Site Snapshot Capture (sitesnap)\n\nNavigates each target page in a headless browser, intercepts every network response served from the page's own host, and writes each successful response once under the dist root at a path mirroring the asset URL.\n\nRequires Node.js with the Playwright npm package (`npm install playwright` and `npx playwright install chromium`)."
)]
pub struct Cli {
    #[arg(
        long = "page",
        value_name = "URL",
        help = "Target page URL to capture (repeatable; replaces pages from the config file)"
    )]
    pub pages: Vec<String>,

    #[arg(long, help = "Skip writing each page's own document response")]
    pub no_html: bool,

    #[arg(long, value_name = "PATH", help = "Output root for the mirrored tree")]
    pub dist: Option<PathBuf>,

    #[arg(
        long,
        value_name = "MS",
        help = "Per-page wait after the viewport resize, for in-flight asset requests (milliseconds)"
    )]
    pub timeout: Option<u64>,

    #[arg(
        long,
        value_name = "MS",
        help = "Wait after the end-of-document key press, for lazy content (milliseconds)"
    )]
    pub settle_delay: Option<u64>,

    #[arg(long, value_name = "WIDTHxHEIGHT", help = "Initial viewport")]
    pub viewport: Option<Viewport>,

    #[arg(
        long,
        value_name = "WIDTHxHEIGHT",
        help = "Viewport applied mid-capture to trigger responsive asset variants"
    )]
    pub mobile_viewport: Option<Viewport>,

    #[arg(
        long,
        value_name = "SECS",
        help = "Navigation timeout per page (seconds)"
    )]
    pub nav_timeout: Option<u64>,

    #[arg(
        long,
        value_name = "SECS",
        help = "Base budget for the browser helper process (seconds); per-page waits are added"
    )]
    pub process_timeout: Option<u64>,

    #[arg(
        long,
        value_name = "CMD",
        default_value = "node",
        help = "Node.js command used to run the capture helper"
    )]
    pub node_command: String,

    #[arg(long, help = "Run the browser with a visible window")]
    pub headful: bool,

    #[arg(long, value_enum, default_value = "json", help = "Run report format")]
    pub format: OutputFormat,

    #[arg(
        long,
        short,
        help = "Write the run report to this file (stdout if omitted)"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Optional config file (TOML) to set defaults for dist/pages/timeouts; CLI flags override config"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::{Cli, OutputFormat};
    use clap::Parser;

    #[test]
    fn defaults_match_expected() {
        let cli = Cli::parse_from(["sitesnap", "--page", "https://example.com/"]);

        assert_eq!(cli.pages, vec!["https://example.com/".to_string()]);
        assert!(!cli.no_html);
        assert!(cli.dist.is_none());
        assert!(cli.timeout.is_none());
        assert!(cli.settle_delay.is_none());
        assert!(cli.viewport.is_none());
        assert!(cli.mobile_viewport.is_none());
        assert!(cli.nav_timeout.is_none());
        assert!(cli.process_timeout.is_none());
        assert_eq!(cli.node_command, "node");
        assert!(!cli.headful);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(cli.output.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn pages_are_repeatable() {
        let cli = Cli::parse_from([
            "sitesnap",
            "--page",
            "https://example.com/",
            "--page",
            "https://example.com/about",
        ]);
        assert_eq!(cli.pages.len(), 2);
    }

    #[test]
    fn overrides_are_respected() {
        let cli = Cli::parse_from([
            "sitesnap",
            "--page",
            "https://example.com/",
            "--no-html",
            "--dist",
            "snapshot",
            "--timeout",
            "2500",
            "--settle-delay",
            "100",
            "--viewport",
            "1920x1080",
            "--mobile-viewport",
            "375x667",
            "--nav-timeout",
            "20",
            "--process-timeout",
            "90",
            "--format",
            "pretty",
            "--output",
            "report.json",
            "--config",
            "sitesnap.toml",
            "--verbose",
        ]);

        assert!(cli.no_html);
        assert_eq!(cli.dist.as_deref(), Some(std::path::Path::new("snapshot")));
        assert_eq!(cli.timeout, Some(2500));
        assert_eq!(cli.settle_delay, Some(100));
        assert_eq!(cli.viewport.unwrap().width, 1920);
        assert_eq!(cli.mobile_viewport.unwrap().height, 667);
        assert_eq!(cli.nav_timeout, Some(20));
        assert_eq!(cli.process_timeout, Some(90));
        assert!(matches!(cli.format, OutputFormat::Pretty));
        assert_eq!(
            cli.output.as_deref(),
            Some(std::path::Path::new("report.json"))
        );
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("sitesnap.toml"))
        );
        assert!(cli.verbose);
    }
}
