//! One request lifecycle: admission, workspace, fetch, validate, convert,
//! assemble, then unconditional cleanup.
//!
//! [`Pipeline`] owns the long-lived collaborators (HTTP client, converter
//! settings, admission controller) and is shared by every request. Each
//! [`Pipeline::run`] call holds an admission slot and a fresh workspace for
//! its whole duration and gives both back on every exit path.

use crate::admission::AdmissionController;
use crate::config::{GatewayConfig, OutputMode, Verbosity};
use crate::error::GatewayError;
use crate::output::ConversionResult;
use crate::pipeline::assemble;
use crate::pipeline::converter::Converter;
use crate::pipeline::fetch::Fetcher;
use crate::pipeline::validate;
use crate::workspace::Workspace;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// A validated conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    url: reqwest::Url,
    mode: OutputMode,
}

impl ConversionRequest {
    /// Validate `pdf_url` and pair it with an output mode.
    ///
    /// Only absolute `http`/`https` URLs are accepted; anything else is a
    /// [`GatewayError::BadRequest`].
    pub fn new(pdf_url: &str, mode: OutputMode) -> Result<Self, GatewayError> {
        let pdf_url = pdf_url.trim();
        if pdf_url.is_empty() {
            return Err(GatewayError::BadRequest("missing pdf_url parameter".into()));
        }
        let url = reqwest::Url::parse(pdf_url).map_err(|e| {
            GatewayError::BadRequest(format!("invalid pdf_url '{pdf_url}': {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GatewayError::BadRequest(format!(
                "invalid pdf_url '{pdf_url}': only http and https URLs are supported"
            )));
        }
        Ok(Self { url, mode })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }
}

/// The configured conversion pipeline. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<GatewayConfig>,
    admission: AdmissionController,
    fetcher: Fetcher,
    converter: Converter,
}

impl Pipeline {
    /// Build a pipeline with an admission controller sized from the config.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let admission = AdmissionController::new(config.max_concurrent_conversions);
        Self::with_admission(config, admission)
    }

    /// Build a pipeline around an externally owned admission controller.
    pub fn with_admission(
        config: GatewayConfig,
        admission: AdmissionController,
    ) -> Result<Self, GatewayError> {
        let fetcher = Fetcher::new(&config)?;
        let converter = Converter::new(&config);
        Ok(Self {
            config: Arc::new(config),
            admission,
            fetcher,
            converter,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    /// Run one request to completion.
    ///
    /// The admission slot is taken before any filesystem or process work and
    /// released after the workspace is gone, whatever the outcome.
    pub async fn run(&self, request: &ConversionRequest) -> Result<ConversionResult, GatewayError> {
        let started = Instant::now();
        let verbosity = self.config.verbosity;

        let token = self.admission.acquire().await;
        let workspace = match Workspace::create(&self.config) {
            Ok(ws) => ws,
            Err(e) => {
                warn!(error = %e, "workspace creation failed");
                finish(verbosity, request, started, false);
                return Err(e);
            }
        };
        if verbosity.steps() {
            info!(workspace = %workspace.path().display(), "workspace created");
        }

        let result = self.run_in(&workspace, request).await;

        workspace.destroy();
        token.release();

        if let Err(e) = &result {
            warn!(url = request.url(), mode = %request.mode(), error = %e, "conversion failed");
        }
        finish(verbosity, request, started, result.is_ok());
        result
    }

    async fn run_in(
        &self,
        workspace: &Workspace,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, GatewayError> {
        let steps = self.config.verbosity.steps();
        let input = workspace.input_path();

        if steps {
            info!(url = request.url(), "downloading PDF");
        }
        self.fetcher.fetch(request.url(), &input).await?;

        validate::validate(&input).await?;
        if steps {
            info!(path = %input.display(), "PDF downloaded and validated");
        }

        let output = workspace.output_path();
        if steps {
            info!(mode = %request.mode(), "starting PDF to HTML conversion");
        }
        self.converter.convert(&input, &output, request.mode()).await?;

        let result = match request.mode() {
            OutputMode::Single => ConversionResult::Document(assemble::assemble_single(&output).await?),
            OutputMode::Paginated => {
                ConversionResult::Pages(assemble::assemble_paginated(workspace.path()).await?)
            }
        };
        if steps {
            match result.page_count() {
                Some(n) => info!(pages = n, "assembled page fragments"),
                None => info!("assembled HTML document"),
            }
        }
        Ok(result)
    }
}

fn finish(verbosity: Verbosity, request: &ConversionRequest, started: Instant, ok: bool) {
    if verbosity.steps() || !ok {
        info!(
            url = request.url(),
            mode = %request.mode(),
            ok,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );
    }
}
