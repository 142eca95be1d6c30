//! Input resolution: turn a user-supplied path or URL into uploaded bytes.
//!
//! This is the "file upload" step of the pipeline. The bytes are not
//! validated here: a file that turns out not to be a PDF is a normal
//! extraction failure, reported in the chat like any unreadable document.

use crate::error::PdfSumError;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Raw bytes of one user-submitted document.
///
/// Owned by the controller for one run and dropped once text has been
/// extracted.
#[derive(Clone)]
pub struct UploadedDocument {
    /// Display name (file name or last URL segment).
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to uploaded bytes.
///
/// URLs are downloaded into memory; anything else is read as a local file.
pub async fn resolve_input(
    input: &str,
    timeout_secs: u64,
) -> Result<UploadedDocument, PdfSumError> {
    if input.trim().is_empty() {
        return Err(PdfSumError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

/// Read a local file, mapping the common failures to descriptive errors.
async fn read_local(path: &Path) -> Result<UploadedDocument, PdfSumError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PdfSumError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => PdfSumError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PdfSumError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(UploadedDocument {
        name: file_name(path),
        bytes,
    })
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<UploadedDocument, PdfSumError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PdfSumError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            PdfSumError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            PdfSumError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(PdfSumError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PdfSumError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());

    Ok(UploadedDocument {
        name: url_file_name(url),
        bytes: bytes.to_vec(),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extract a reasonable file name from the URL path.
fn url_file_name(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_url_file_name() {
        assert_eq!(url_file_name("https://arxiv.org/pdf/paper.pdf"), "paper.pdf");
        assert_eq!(url_file_name("https://arxiv.org/pdf/1706.03762"), "1706.03762");
        assert_eq!(url_file_name("https://example.com/"), "downloaded.pdf");
    }

    #[tokio::test]
    async fn reads_local_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.4 fake").unwrap();

        let doc = resolve_input(tmp.path().to_str().unwrap(), 5).await.unwrap();
        assert_eq!(doc.bytes, b"%PDF-1.4 fake");
        assert_eq!(doc.len(), 13);
        assert!(!doc.name.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let err = resolve_input("/definitely/not/a/real/file.pdf", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfSumError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn blank_input_is_invalid() {
        let err = resolve_input("   ", 5).await.unwrap_err();
        assert!(matches!(err, PdfSumError::InvalidInput { .. }));
    }

    #[test]
    fn debug_hides_bytes() {
        let doc = UploadedDocument::new("a.pdf", vec![0u8; 3]);
        assert_eq!(format!("{doc:?}"), r#"UploadedDocument { name: "a.pdf", len: 3 }"#);
    }
}
