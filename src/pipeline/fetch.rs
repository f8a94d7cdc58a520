//! Fetch the source PDF over HTTP(S) into the workspace.
//!
//! The body is streamed chunk by chunk straight to disk so a large PDF never
//! sits in memory in full. Content type is not checked here; the validator
//! sniffs the bytes on disk afterwards.

use crate::config::GatewayConfig;
use crate::error::{FetchFailure, GatewayError};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// `User-Agent` presented when browser identity is enabled.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

const BROWSER_ACCEPT: &str = "application/pdf,*/*;q=0.9";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// A reusable download client carrying the configured timeout and headers.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl Fetcher {
    /// Build a fetcher from the gateway config.
    ///
    /// Redirects follow reqwest's default policy (up to 10 hops).
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs));

        if config.browser_identity {
            builder = builder.default_headers(browser_headers());
        }

        let client = builder
            .build()
            .map_err(|e| GatewayError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout_secs: config.download_timeout_secs,
        })
    }

    /// GET `url` and stream the body into `dest`, creating or truncating it.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<(), GatewayError> {
        let fail = |failure: FetchFailure| GatewayError::Fetch {
            url: url.to_string(),
            failure,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fail(self.transport_failure(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(FetchFailure::Status {
                status: status.as_u16(),
            }));
        }
        if let Some(len) = response.content_length() {
            debug!(url, bytes = len, "download size announced");
        }

        let io_failure = |source: std::io::Error| FetchFailure::Io {
            path: dest.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| fail(io_failure(e)))?;

        let mut written: u64 = 0;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| fail(self.transport_failure(e)))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| fail(io_failure(e)))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| fail(io_failure(e)))?;

        debug!(url, bytes = written, dest = %dest.display(), "download complete");
        Ok(())
    }

    fn transport_failure(&self, e: reqwest::Error) -> FetchFailure {
        if e.is_timeout() {
            FetchFailure::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            FetchFailure::Transport(e.to_string())
        }
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::get;
    use axum::Router;

    async fn spawn_origin() -> String {
        let app = Router::new()
            .route("/doc.pdf", get(|| async { "%PDF-1.7\nbody" }))
            .route(
                "/big.pdf",
                get(|| async {
                    let mut body = b"%PDF-1.4\n".to_vec();
                    body.extend(std::iter::repeat(b'x').take(1 << 20));
                    body
                }),
            )
            .route("/missing.pdf", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/needs-browser.pdf",
                get(|headers: AxumHeaders| async move {
                    let ua = headers
                        .get("user-agent")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default();
                    if ua.starts_with("Mozilla/") {
                        Ok("%PDF-1.5")
                    } else {
                        Err(StatusCode::FORBIDDEN)
                    }
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn fetcher(browser_identity: bool) -> Fetcher {
        let config = GatewayConfig::builder()
            .download_timeout_secs(10)
            .browser_identity(browser_identity)
            .build()
            .unwrap();
        Fetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn fetch_writes_body_to_destination() {
        let origin = spawn_origin().await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("input.pdf");

        fetcher(true)
            .fetch(&format!("{origin}/doc.pdf"), &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.7\nbody");
    }

    #[tokio::test]
    async fn fetch_streams_large_bodies() {
        let origin = spawn_origin().await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("input.pdf");

        fetcher(true)
            .fetch(&format!("{origin}/big.pdf"), &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 9 + (1 << 20));
    }

    #[tokio::test]
    async fn non_success_status_is_status_failure() {
        let origin = spawn_origin().await;
        let dir = tempfile::tempdir().unwrap();

        let err = fetcher(true)
            .fetch(&format!("{origin}/missing.pdf"), &dir.path().join("x.pdf"))
            .await
            .unwrap_err();

        assert!(
            matches!(
                err,
                GatewayError::Fetch {
                    failure: FetchFailure::Status { status: 404 },
                    ..
                }
            ),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn browser_identity_is_presented_when_enabled() {
        let origin = spawn_origin().await;
        let dir = tempfile::tempdir().unwrap();
        let url = format!("{origin}/needs-browser.pdf");

        fetcher(true)
            .fetch(&url, &dir.path().join("a.pdf"))
            .await
            .unwrap();

        let err = fetcher(false)
            .fetch(&url, &dir.path().join("b.pdf"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTP 403"), "got: {err}");
    }

    #[tokio::test]
    async fn connection_refused_is_transport_failure() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let err = fetcher(true)
            .fetch(&format!("http://{addr}/doc.pdf"), &dir.path().join("x.pdf"))
            .await
            .unwrap_err();

        assert!(
            matches!(
                err,
                GatewayError::Fetch {
                    failure: FetchFailure::Transport(_),
                    ..
                }
            ),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn unwritable_destination_is_io_failure() {
        let origin = spawn_origin().await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("no/such/dir/input.pdf");

        let err = fetcher(true)
            .fetch(&format!("{origin}/doc.pdf"), &dest)
            .await
            .unwrap_err();

        assert!(
            matches!(
                err,
                GatewayError::Fetch {
                    failure: FetchFailure::Io { .. },
                    ..
                }
            ),
            "got: {err:?}"
        );
    }
}
