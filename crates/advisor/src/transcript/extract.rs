//! Text extraction from uploaded documents.

use super::error::TranscriptError;
use std::sync::Arc;
use std::time::Duration;

/// Turns the bytes of an uploaded document into text.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, TranscriptError>;
}

/// PDF text-layer extractor using the pdf-extract crate.
/// Scanned, image-only PDFs produce no text and are rejected.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, TranscriptError> {
        let text = pdf_extract::extract_text_from_mem(bytes)?;
        if text.trim().is_empty() {
            return Err(TranscriptError::EmptyDocument);
        }
        Ok(text)
    }
}

/// Accepts documents that are already UTF-8 text.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, TranscriptError> {
        let text = std::str::from_utf8(bytes).map_err(|e| TranscriptError::Extraction {
            message: format!("file is not valid UTF-8 text: {e}"),
        })?;
        if text.trim().is_empty() {
            return Err(TranscriptError::EmptyDocument);
        }
        Ok(text.to_string())
    }
}

/// Runs extraction on the blocking pool and gives up after `timeout`.
pub async fn extract_with_timeout(
    extractor: Arc<dyn TextExtractor>,
    bytes: Vec<u8>,
    timeout: Duration,
) -> Result<String, TranscriptError> {
    let task = tokio::task::spawn_blocking(move || extractor.extract_text(&bytes));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(TranscriptError::Extraction {
            message: format!("extraction task failed: {join_err}"),
        }),
        Err(_) => Err(TranscriptError::ExtractionTimeout {
            secs: timeout.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowExtractor;

    impl TextExtractor for SlowExtractor {
        fn extract_text(&self, _bytes: &[u8]) -> Result<String, TranscriptError> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(String::new())
        }
    }

    #[test]
    fn test_plain_text_extraction() {
        let text = PlainTextExtractor.extract_text(b"Fall 2024\n").unwrap();
        assert_eq!(text, "Fall 2024\n");

        assert_eq!(
            PlainTextExtractor.extract_text(b"  \n "),
            Err(TranscriptError::EmptyDocument)
        );
        assert!(matches!(
            PlainTextExtractor.extract_text(&[0xff, 0xfe, 0x00]),
            Err(TranscriptError::Extraction { .. })
        ));
    }

    #[test]
    fn test_garbage_pdf_is_an_extraction_error() {
        let result = PdfTextExtractor.extract_text(b"definitely not a pdf");
        assert!(matches!(result, Err(TranscriptError::Extraction { .. })));
    }

    #[tokio::test]
    async fn test_extraction_timeout() {
        let result = extract_with_timeout(
            Arc::new(SlowExtractor),
            Vec::new(),
            Duration::from_millis(10),
        )
        .await;

        assert!(matches!(result, Err(TranscriptError::ExtractionTimeout { .. })));
    }

    #[tokio::test]
    async fn test_extraction_success() {
        let text = extract_with_timeout(
            Arc::new(PlainTextExtractor),
            b"CSC 110".to_vec(),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(text, "CSC 110");
    }
}
