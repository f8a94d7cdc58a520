//! Turn converter output on disk into a [`ConversionResult`].
//!
//! Single mode hands back the one output file as-is. Paginated mode reads
//! `page-1.html`, `page-2.html`, … in order and stops at the first missing
//! index: a gap truncates the sequence, higher pages are never reached.

use crate::error::GatewayError;
use crate::output::{Artifact, PageFragment, HTML_CONTENT_TYPE};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

static RE_PAGE_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^page-\d+\.html$").unwrap());

/// File name of page `n` (1-based).
pub fn page_file_name(n: usize) -> String {
    format!("page-{n}.html")
}

/// Read the single output document at `path`.
pub async fn assemble_single(path: &Path) -> Result<Artifact, GatewayError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Artifact {
            bytes,
            content_type: HTML_CONTENT_TYPE,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(GatewayError::MissingOutput {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(GatewayError::OutputRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Collect the gap-free run of page fragments in `dir`, starting at page 1.
///
/// Fails with [`GatewayError::NoPages`] when the directory holds no page
/// files at all. If page files exist but `page-1.html` is not among them the
/// result is an empty list.
pub async fn assemble_paginated(dir: &Path) -> Result<Vec<PageFragment>, GatewayError> {
    let found = count_page_files(dir).await?;
    if found == 0 {
        return Err(GatewayError::NoPages {
            dir: dir.to_path_buf(),
        });
    }

    let mut pages = Vec::with_capacity(found);
    for page in 1.. {
        let path = dir.join(page_file_name(page));
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => break,
            Err(source) => return Err(GatewayError::OutputRead { path, source }),
        };
        // Invalid UTF-8 becomes U+FFFD rather than failing the request.
        pages.push(PageFragment {
            page,
            content: String::from_utf8_lossy(&bytes).trim().to_string(),
        });
    }

    if pages.len() < found {
        debug!(
            found,
            assembled = pages.len(),
            "page sequence has a gap; later pages dropped"
        );
    }
    Ok(pages)
}

async fn count_page_files(dir: &Path) -> Result<usize, GatewayError> {
    let read_err = |source: std::io::Error| GatewayError::OutputRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    let mut count = 0;
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        if RE_PAGE_FILE.is_match(&entry.file_name().to_string_lossy()) {
            count += 1;
        }
    }
    Ok(count)
}
