//! Server binary for pdf2html-gateway.
//!
//! A thin shim over the library crate that maps CLI flags and `PDF2HTML_*`
//! environment variables to `GatewayConfig` and serves the router.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pdf2html_gateway::{server, AppState, GatewayConfig, OutputMode, Pipeline, Verbosity};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdf2html-server",
    version,
    about = "HTTP gateway converting PDFs fetched by URL to HTML with pdf2htmlEX"
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "PDF2HTML_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// Maximum conversions running at once; extra requests queue.
    #[arg(short, long, env = "PDF2HTML_MAX_CONCURRENT", default_value_t = 50)]
    max_concurrent: usize,

    /// PDF download timeout in seconds.
    #[arg(long, env = "PDF2HTML_DOWNLOAD_TIMEOUT", default_value_t = 300)]
    download_timeout: u64,

    /// Do not send browser-like User-Agent/Accept headers when downloading.
    #[arg(long, env = "PDF2HTML_NO_BROWSER_IDENTITY")]
    no_browser_identity: bool,

    /// Converter executable (looked up on PATH unless a path is given).
    #[arg(long, env = "PDF2HTML_CONVERTER", default_value = "pdf2htmlEX")]
    converter: PathBuf,

    /// Kill the converter after this many seconds (default: never).
    #[arg(long, env = "PDF2HTML_CONVERTER_TIMEOUT")]
    converter_timeout: Option<u64>,

    /// Output shape used when a request does not pass `mode`.
    #[arg(long, env = "PDF2HTML_MODE", value_enum, default_value = "single")]
    mode: ModeArg,

    /// Parent directory for per-request workspaces (default: system temp dir).
    #[arg(long, env = "PDF2HTML_WORKSPACE_ROOT")]
    workspace_root: Option<PathBuf>,

    /// Log converter output and debug details.
    #[arg(short, long, env = "PDF2HTML_VERBOSE", conflicts_with = "quiet")]
    verbose: bool,

    /// Only log failures.
    #[arg(short, long, env = "PDF2HTML_QUIET")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Single,
    Paginated,
}

impl From<ModeArg> for OutputMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Single => OutputMode::Single,
            ModeArg::Paginated => OutputMode::Paginated,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let (filter, verbosity) = if cli.verbose {
        ("debug", Verbosity::Verbose)
    } else if cli.quiet {
        ("warn", Verbosity::Quiet)
    } else {
        ("info", Verbosity::Normal)
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli, verbosity)?;
    tracing::debug!(?config, "configuration loaded");

    let pipeline = Pipeline::new(config).context("Failed to initialise conversion pipeline")?;
    server::serve(&cli.bind, AppState::new(pipeline))
        .await
        .with_context(|| format!("Server on {} stopped with an error", cli.bind))?;

    Ok(())
}

fn build_config(cli: &Cli, verbosity: Verbosity) -> Result<GatewayConfig> {
    let mut builder = GatewayConfig::builder()
        .max_concurrent_conversions(cli.max_concurrent)
        .download_timeout_secs(cli.download_timeout)
        .browser_identity(!cli.no_browser_identity)
        .converter_program(cli.converter.clone())
        .converter_timeout_secs(cli.converter_timeout)
        .default_output_mode(cli.mode.into())
        .verbosity(verbosity);

    if let Some(root) = &cli.workspace_root {
        builder = builder.workspace_root(root.clone());
    }

    builder.build().context("Invalid configuration")
}
