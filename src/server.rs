//! HTTP surface: `GET /pdf-to-html` and `GET /health`.
//!
//! The handler parses the query, hands a [`ConversionRequest`] to the shared
//! [`Pipeline`], and maps the outcome to a response. `BadRequest` becomes
//! 400; every other failure becomes 500 with `{"error": "<message>"}`.
//!
//! The pipeline runs on its own task. A client that disconnects mid-request
//! drops only the handler; the conversion still finishes and cleans up.

use crate::config::OutputMode;
use crate::convert::{ConversionRequest, Pipeline};
use crate::error::GatewayError;
use crate::output::{ConversionResult, PagesDocument};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }
}

/// Build the gateway router.
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/pdf-to-html", get(convert_handler))
        .route("/health", get(health_handler))
        .layer(trace_layer)
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        max_concurrent_conversions = state.pipeline.admission().capacity(),
        "pdf2html gateway listening"
    );
    axum::serve(listener, create_router(state)).await
}

/// Query parameters of `/pdf-to-html`. A repeated key keeps its first value.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConvertParams {
    pub pdf_url: Option<String>,
    pub mode: Option<String>,
}

impl ConvertParams {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "pdf_url" => &mut params.pdf_url,
                "mode" => &mut params.mode,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub max_concurrent_conversions: usize,
    pub in_flight: usize,
}

/// Error wrapper that knows how to render itself as an HTTP response.
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// `GET /pdf-to-html?pdf_url=<url>[&mode=single|paginated]`
pub async fn convert_handler(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, ApiError> {
    let request = parse_request(params, state.pipeline.config().default_output_mode)?;

    let pipeline = state.pipeline.clone();
    let outcome = tokio::spawn(async move { pipeline.run(&request).await })
        .await
        .map_err(|e| GatewayError::Internal(format!("conversion task failed: {e}")))?;

    match outcome? {
        ConversionResult::Document(artifact) => {
            Ok(([(header::CONTENT_TYPE, artifact.content_type)], artifact.bytes).into_response())
        }
        ConversionResult::Pages(pages) => Ok(Json(PagesDocument { pages }).into_response()),
    }
}

fn parse_request(
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
    default_mode: OutputMode,
) -> Result<ConversionRequest, GatewayError> {
    let Query(pairs) = params
        .map_err(|e| GatewayError::BadRequest(format!("malformed query string: {e}")))?;
    let params = ConvertParams::from_pairs(pairs);

    let pdf_url = params
        .pdf_url
        .ok_or_else(|| GatewayError::BadRequest("missing pdf_url parameter".into()))?;
    let mode = match params.mode.as_deref() {
        Some(m) if !m.trim().is_empty() => m.parse()?,
        _ => default_mode,
    };
    ConversionRequest::new(&pdf_url, mode)
}

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let admission = state.pipeline.admission();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            max_concurrent_conversions: admission.capacity(),
            in_flight: admission.in_flight(),
        }),
    )
}
