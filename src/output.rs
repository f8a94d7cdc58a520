//! Result types produced by a conversion.

use serde::Serialize;

/// Media type of a single-document result.
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// A single opaque output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Raw file contents as written by the converter.
    pub bytes: Vec<u8>,
    /// Declared media type; always [`HTML_CONTENT_TYPE`] today.
    pub content_type: &'static str,
}

/// One page of a paginated conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFragment {
    /// 1-based page number.
    pub page: usize,
    /// Page markup with surrounding whitespace removed.
    pub content: String,
}

/// JSON body returned for paginated conversions: `{"pages": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagesDocument {
    pub pages: Vec<PageFragment>,
}

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    Document(Artifact),
    /// Gap-free, ascending from page 1.
    Pages(Vec<PageFragment>),
}

impl ConversionResult {
    /// Number of pages for paginated output, `None` for a single document.
    pub fn page_count(&self) -> Option<usize> {
        match self {
            ConversionResult::Document(_) => None,
            ConversionResult::Pages(p) => Some(p.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_document_json_shape() {
        let doc = PagesDocument {
            pages: vec![
                PageFragment { page: 1, content: "<div>a</div>".into() },
                PageFragment { page: 2, content: "<div>b</div>".into() },
            ],
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "pages": [
                    {"page": 1, "content": "<div>a</div>"},
                    {"page": 2, "content": "<div>b</div>"}
                ]
            })
        );
    }

    #[test]
    fn page_count_only_for_pages() {
        let doc = ConversionResult::Document(Artifact {
            bytes: b"<html/>".to_vec(),
            content_type: HTML_CONTENT_TYPE,
        });
        assert_eq!(doc.page_count(), None);
        assert_eq!(ConversionResult::Pages(vec![]).page_count(), Some(0));
    }
}
