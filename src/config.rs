//! Configuration types for the conversion gateway.
//!
//! All gateway behaviour is controlled through [`GatewayConfig`], built via
//! its [`GatewayConfigBuilder`]. The config is created once at startup and
//! shared read-only across every request handler behind an `Arc`.

use crate::error::GatewayError;
use crate::pipeline::converter::ConversionOptions;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default ceiling on concurrently running conversions.
pub const DEFAULT_MAX_CONCURRENT_CONVERSIONS: usize = 50;

/// Default client-side timeout for the PDF download, in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Default converter executable, resolved on `PATH`.
pub const DEFAULT_CONVERTER_PROGRAM: &str = "pdf2htmlEX";

/// Configuration for the conversion gateway.
///
/// Built via [`GatewayConfig::builder()`] or using
/// [`GatewayConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2html_gateway::{GatewayConfig, OutputMode};
///
/// let config = GatewayConfig::builder()
///     .max_concurrent_conversions(8)
///     .default_output_mode(OutputMode::Paginated)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_concurrent_conversions, 8);
/// ```
#[derive(Clone)]
pub struct GatewayConfig {
    /// Maximum number of conversions running at once. Default: 50.
    ///
    /// Requests beyond this ceiling wait (without timeout) for a free slot.
    /// This is independent of how many HTTP connections the server accepts.
    pub max_concurrent_conversions: usize,

    /// Download timeout for the source PDF in seconds. Default: 300.
    pub download_timeout_secs: u64,

    /// Send browser-like `User-Agent`/`Accept` headers when fetching. Default: true.
    ///
    /// Some origins reject requests that do not look like they come from a browser.
    pub browser_identity: bool,

    /// Converter executable name or path. Default: `pdf2htmlEX`.
    pub converter_program: PathBuf,

    /// Kill the converter after this many seconds. Default: `None` (wait forever).
    pub converter_timeout_secs: Option<u64>,

    /// Output shape used when a request does not ask for one. Default: single document.
    pub default_output_mode: OutputMode,

    /// How chatty the pipeline is in the logs. Default: [`Verbosity::Normal`].
    pub verbosity: Verbosity,

    /// Name prefix for per-request workspace directories. Default: `pdf2html-`.
    pub workspace_prefix: String,

    /// Parent directory for workspaces. `None` uses the system temp directory.
    pub workspace_root: Option<PathBuf>,

    /// Fixed converter flag set.
    pub conversion: ConversionOptions,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_concurrent_conversions: DEFAULT_MAX_CONCURRENT_CONVERSIONS,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            browser_identity: true,
            converter_program: PathBuf::from(DEFAULT_CONVERTER_PROGRAM),
            converter_timeout_secs: None,
            default_output_mode: OutputMode::default(),
            verbosity: Verbosity::default(),
            workspace_prefix: "pdf2html-".to_string(),
            workspace_root: None,
            conversion: ConversionOptions::default(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("max_concurrent_conversions", &self.max_concurrent_conversions)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("browser_identity", &self.browser_identity)
            .field("converter_program", &self.converter_program)
            .field("converter_timeout_secs", &self.converter_timeout_secs)
            .field("default_output_mode", &self.default_output_mode)
            .field("verbosity", &self.verbosity)
            .field("workspace_prefix", &self.workspace_prefix)
            .field("workspace_root", &self.workspace_root)
            .field("conversion", &self.conversion)
            .finish()
    }
}

impl GatewayConfig {
    /// Create a new builder for `GatewayConfig`.
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GatewayConfig`].
#[derive(Debug)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    pub fn max_concurrent_conversions(mut self, n: usize) -> Self {
        self.config.max_concurrent_conversions = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn browser_identity(mut self, v: bool) -> Self {
        self.config.browser_identity = v;
        self
    }

    pub fn converter_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.converter_program = program.into();
        self
    }

    pub fn converter_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.converter_timeout_secs = secs;
        self
    }

    pub fn default_output_mode(mut self, mode: OutputMode) -> Self {
        self.config.default_output_mode = mode;
        self
    }

    pub fn verbosity(mut self, v: Verbosity) -> Self {
        self.config.verbosity = v;
        self
    }

    pub fn workspace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.workspace_prefix = prefix.into();
        self
    }

    pub fn workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.workspace_root = Some(root.into());
        self
    }

    pub fn conversion(mut self, options: ConversionOptions) -> Self {
        self.config.conversion = options;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GatewayConfig, GatewayError> {
        let c = &self.config;
        if c.max_concurrent_conversions == 0 {
            return Err(GatewayError::InvalidConfig(
                "max_concurrent_conversions must be ≥ 1".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(GatewayError::InvalidConfig(
                "download_timeout_secs must be ≥ 1".into(),
            ));
        }
        if c.converter_timeout_secs == Some(0) {
            return Err(GatewayError::InvalidConfig(
                "converter_timeout_secs must be ≥ 1 when set".into(),
            ));
        }
        if c.converter_program.as_os_str().is_empty() {
            return Err(GatewayError::InvalidConfig(
                "converter_program must not be empty".into(),
            ));
        }
        if c.workspace_prefix.contains(std::path::is_separator) {
            return Err(GatewayError::InvalidConfig(format!(
                "workspace_prefix must not contain a path separator, got {:?}",
                c.workspace_prefix
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Shape of the conversion result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One self-contained HTML document. (default)
    #[default]
    Single,
    /// One HTML fragment per page, returned as an ordered JSON list.
    Paginated,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Single => "single",
            OutputMode::Paginated => "paginated",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(OutputMode::Single),
            "paginated" => Ok(OutputMode::Paginated),
            other => Err(GatewayError::BadRequest(format!(
                "unknown mode '{other}' (expected 'single' or 'paginated')"
            ))),
        }
    }
}

/// How much the pipeline logs about each request.
///
/// | Level | Per-step `info!` | Converter stdout/stderr on success |
/// |-------|------------------|------------------------------------|
/// | `Quiet`   | no  | no  |
/// | `Normal`  | yes | no  |
/// | `Verbose` | yes | yes |
///
/// Failures are logged at every level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn steps(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    pub fn process_output(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}
