//! # pdf2html-gateway
//!
//! A synchronous HTTP gateway that turns a PDF URL into HTML.
//!
//! Given `GET /pdf-to-html?pdf_url=…`, the gateway downloads the PDF,
//! checks its signature, runs the external `pdf2htmlEX` converter in an
//! isolated temporary directory, and returns either one self-contained HTML
//! document or an ordered JSON list of per-page fragments.
//!
//! ## Pipeline Overview
//!
//! ```text
//! request
//!  │
//!  ├─ 1. Admit     wait for a free conversion slot (bounded, no timeout)
//!  ├─ 2. Workspace fresh temp dir, removed on every exit path
//!  ├─ 3. Fetch     stream the PDF to disk (reqwest)
//!  ├─ 4. Validate  first four bytes must be %PDF
//!  ├─ 5. Convert   pdf2htmlEX with a fixed flag set
//!  └─ 6. Assemble  output.html, or page-1.html … page-N.html until the first gap
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2html_gateway::{server, GatewayConfig, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::new(GatewayConfig::default())?;
//!     server::serve("0.0.0.0:8080", server::AppState::new(pipeline)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2html-server` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod admission;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod server;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use admission::{AdmissionController, AdmissionToken};
pub use config::{GatewayConfig, GatewayConfigBuilder, OutputMode, Verbosity};
pub use convert::{ConversionRequest, Pipeline};
pub use error::{ConversionFailure, FetchFailure, GatewayError};
pub use output::{Artifact, ConversionResult, PageFragment, PagesDocument};
pub use pipeline::converter::ConversionOptions;
pub use server::{create_router, AppState};
pub use workspace::Workspace;
