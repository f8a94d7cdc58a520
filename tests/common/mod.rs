//! Shared fixtures: a local origin server and fake converter scripts.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::RawQuery;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use pdf2html_gateway::{create_router, AppState, GatewayConfig, OutputMode, Pipeline};
use std::path::{Path, PathBuf};
use tower::ServiceExt;

pub const PDF_BYTES: &[u8] = b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n";

/// Start an origin server on an ephemeral port and return its base URL.
pub async fn spawn_origin() -> String {
    let app = Router::new()
        .route("/doc.pdf", get(|| async { PDF_BYTES }))
        .route(
            "/signed.pdf",
            get(|RawQuery(q): RawQuery| async move {
                // Only the exact signed query is accepted.
                if q.as_deref() == Some("token=a%26b&expires=1") {
                    Ok(PDF_BYTES)
                } else {
                    Err(StatusCode::FORBIDDEN)
                }
            }),
        )
        .route(
            "/error-page.pdf",
            get(|| async { "<!DOCTYPE html><html><body>Please log in</body></html>" }),
        )
        .route("/empty.pdf", get(|| async { "" }))
        .route("/gone.pdf", get(|| async { StatusCode::NOT_FOUND }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Write an executable `/bin/sh` script named `name` into `dir`.
///
/// The script body sees `$dest` (value of `--dest-dir`), `$split`
/// (value of `--split-pages`, empty in single mode) and `$out` (the last
/// positional argument).
#[cfg(unix)]
pub fn fake_converter(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
        r#"#!/bin/sh
dest=""; split=""; prev=""; out=""
for a in "$@"; do
  case "$prev" in
    --dest-dir) dest="$a" ;;
    --split-pages) split="$a" ;;
  esac
  prev="$a"; out="$a"
done
{body}
"#
    );
    let path = dir.join(name);
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub const SINGLE_OK: &str =
    r#"printf '<!DOCTYPE html>\n<html><head><meta charset="utf-8"/></head><body>converted</body></html>\n' > "$dest/$out""#;

pub const PAGES_OK: &str = r#"
[ "$split" = "1" ] || { echo "split-pages not requested" >&2; exit 2; }
printf '<html/>' > "$dest/$out"
printf '\n  <div class="pf">one</div>\n' > "$dest/page-1.html"
printf '<div class="pf">two</div>\t\n' > "$dest/page-2.html"
printf '   <div class="pf">three</div>' > "$dest/page-3.html"
"#;

pub const PAGES_WITH_GAP: &str = r#"
printf 'one' > "$dest/page-1.html"
printf 'two' > "$dest/page-2.html"
printf 'four' > "$dest/page-4.html"
"#;

pub const FAILS: &str = r#"echo "Error: PDF parse failed" >&2; exit 1"#;

pub const SUCCEEDS_WITHOUT_OUTPUT: &str = "exit 0";

/// Gateway under test with a private workspace root.
pub struct Gateway {
    pub router: Router,
    pub pipeline: Pipeline,
    pub workspaces: tempfile::TempDir,
}

impl Gateway {
    pub fn new(converter: PathBuf, capacity: usize, default_mode: OutputMode) -> Self {
        let workspaces = tempfile::tempdir().unwrap();
        let config = GatewayConfig::builder()
            .converter_program(converter)
            .max_concurrent_conversions(capacity)
            .download_timeout_secs(10)
            .default_output_mode(default_mode)
            .workspace_root(workspaces.path())
            .build()
            .unwrap();
        let pipeline = Pipeline::new(config).unwrap();
        let router = create_router(AppState::new(pipeline.clone()));
        Self {
            router,
            pipeline,
            workspaces,
        }
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    /// Number of entries left under the workspace root.
    pub fn leftover_workspaces(&self) -> usize {
        std::fs::read_dir(self.workspaces.path()).unwrap().count()
    }
}

/// `/pdf-to-html` URI with `pdf_url` (and optionally `mode`) properly encoded.
pub fn convert_uri(pdf_url: &str, mode: Option<&str>) -> String {
    let mut u = reqwest::Url::parse("http://gateway/pdf-to-html").unwrap();
    {
        let mut q = u.query_pairs_mut();
        q.append_pair("pdf_url", pdf_url);
        if let Some(m) = mode {
            q.append_pair("mode", m);
        }
    }
    format!("{}?{}", u.path(), u.query().unwrap_or_default())
}

pub async fn body_bytes(resp: Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}
