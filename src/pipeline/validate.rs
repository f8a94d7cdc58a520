//! Cheap structural sniff of the downloaded file.
//!
//! Only the first four bytes are inspected. The goal is to reject obvious
//! garbage (an HTML error page, an empty body) before paying for a converter
//! run, not to parse the document.

use crate::error::GatewayError;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};

/// Magic signature every PDF starts with.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Maximum number of leading bytes echoed back in a validation error.
pub const DIAGNOSTIC_PREFIX_LEN: usize = 200;

/// Fail with [`GatewayError::NotAPdf`] unless `path` begins with `%PDF`.
pub async fn validate(path: &Path) -> Result<(), GatewayError> {
    let io_err = |source: std::io::Error| GatewayError::ValidationIo {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::open(path).await.map_err(io_err)?;

    let mut magic = [0u8; 4];
    let n = read_up_to(&mut file, &mut magic).await.map_err(io_err)?;
    if is_pdf_signature(&magic[..n]) {
        return Ok(());
    }

    file.seek(std::io::SeekFrom::Start(0))
        .await
        .map_err(io_err)?;
    let mut head = [0u8; DIAGNOSTIC_PREFIX_LEN];
    let n = read_up_to(&mut file, &mut head).await.map_err(io_err)?;

    Err(GatewayError::NotAPdf {
        path: path.to_path_buf(),
        prefix: String::from_utf8_lossy(&head[..n]).into_owned(),
    })
}

/// `true` if `head` starts with the full PDF signature.
pub fn is_pdf_signature(head: &[u8]) -> bool {
    head.starts_with(PDF_MAGIC)
}

/// Fill as much of `buf` as the reader provides, stopping at EOF.
async fn read_up_to<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn validate_bytes(bytes: &[u8]) -> Result<(), GatewayError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.pdf");
        std::fs::write(&path, bytes).unwrap();
        validate(&path).await
    }

    #[test]
    fn signature_check() {
        assert!(is_pdf_signature(b"%PDF-1.7"));
        assert!(is_pdf_signature(b"%PDF"));
        assert!(!is_pdf_signature(b"%PD"));
        assert!(!is_pdf_signature(b""));
        assert!(!is_pdf_signature(b" %PDF"));
    }

    #[tokio::test]
    async fn accepts_pdf_header() {
        validate_bytes(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n").await.unwrap();
    }

    #[tokio::test]
    async fn rejects_empty_file() {
        let err = validate_bytes(b"").await.unwrap_err();
        match err {
            GatewayError::NotAPdf { prefix, .. } => assert_eq!(prefix, ""),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_short_file() {
        let err = validate_bytes(b"%PD").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotAPdf { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn rejects_html_with_diagnostic_prefix() {
        let err = validate_bytes(b"<!DOCTYPE html><html><body>Access denied</body></html>")
            .await
            .unwrap_err();
        match err {
            GatewayError::NotAPdf { prefix, .. } => {
                assert!(prefix.starts_with("<!DOCTYPE html>"), "got: {prefix}");
                assert!(prefix.contains("Access denied"));
            }
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn diagnostic_prefix_is_capped() {
        let body = vec![b'a'; 10_000];
        let err = validate_bytes(&body).await.unwrap_err();
        match err {
            GatewayError::NotAPdf { prefix, .. } => {
                assert_eq!(prefix.len(), DIAGNOSTIC_PREFIX_LEN)
            }
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate(&dir.path().join("nope.pdf")).await.unwrap_err();
        assert!(matches!(err, GatewayError::ValidationIo { .. }), "got: {err:?}");
    }
}
