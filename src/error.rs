//! Error types for the pdf2html gateway.
//!
//! Every pipeline component returns [`GatewayError`]. The variants mirror the
//! stages of a request so the HTTP layer can map them without inspecting
//! message text:
//!
//! * [`GatewayError::BadRequest`] — the caller's fault (missing or malformed
//!   `pdf_url`). Mapped to HTTP 400.
//! * everything else — a fault in the environment, the origin, or the converter.
//!   Mapped to HTTP 500 with the message embedded in a JSON body.
//!
//! No variant is ever retried; there is no partial success.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while handling one conversion request.
#[derive(Debug, Error)]
pub enum GatewayError {
    // ── Request errors ────────────────────────────────────────────────────
    /// Missing or malformed input parameter.
    #[error("{0}")]
    BadRequest(String),

    // ── Workspace errors ──────────────────────────────────────────────────
    /// The per-request temporary directory could not be created.
    #[error("failed to create workspace directory: {source}")]
    Workspace {
        #[source]
        source: std::io::Error,
    },

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// Downloading the source document failed.
    #[error("failed to download PDF from '{url}': {failure}")]
    Fetch { url: String, failure: FetchFailure },

    // ── Validation errors ─────────────────────────────────────────────────
    /// The fetched file does not start with the `%PDF` signature.
    #[error("downloaded file is not a valid PDF (starts with: {prefix:?})")]
    NotAPdf { path: PathBuf, prefix: String },

    /// The fetched file could not be opened or read for validation.
    #[error("failed to read '{path}' for validation: {source}")]
    ValidationIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The converter failed to start or to finish successfully.
    #[error("PDF to HTML conversion failed: {0}")]
    Conversion(ConversionFailure),

    // ── Assembly errors ───────────────────────────────────────────────────
    /// The converter reported success but the expected artifact is absent.
    #[error("output HTML file not found: '{path}'")]
    MissingOutput { path: PathBuf },

    /// Paginated mode produced no `page-N.html` files at all.
    #[error(
        "converter produced no page files in '{dir}'\n\
The installed pdf2htmlEX build may not support --split-pages."
    )]
    NoPages { dir: PathBuf },

    /// An output artifact exists but could not be read.
    #[error("failed to read converter output '{path}': {source}")]
    OutputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// `true` when the request itself was at fault rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GatewayError::BadRequest(_))
    }
}

/// Why a fetch failed.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// The origin answered with a non-2xx status.
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// The request did not complete before the client timeout.
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Connection, TLS, or body-transfer failure.
    #[error("{0}")]
    Transport(String),

    /// Writing the body to the local destination failed.
    #[error("write to '{path}' failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why the converter invocation failed.
#[derive(Debug, Error)]
pub enum ConversionFailure {
    /// The process could not be spawned (binary missing from PATH, not executable).
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited unsuccessfully.
    #[error("{status}: {stderr}")]
    Exit { status: String, stderr: String },

    /// Collecting the process's exit status or output failed.
    #[error("failed waiting for converter: {source}")]
    Wait {
        #[source]
        source: std::io::Error,
    },

    /// The process exceeded the configured timeout and was killed.
    #[error("converter timed out after {secs}s")]
    TimedOut { secs: u64 },
}
