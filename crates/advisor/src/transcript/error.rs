//! Error types for transcript ingestion.

use std::fmt;
use thiserror::Error;

/// The ingestion step at which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Upload,
    Extraction,
    Parsing,
}

impl fmt::Display for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseStage::Upload => "upload",
            ParseStage::Extraction => "extraction",
            ParseStage::Parsing => "parsing",
        };
        f.write_str(name)
    }
}

/// Errors that stop a transcript from being processed at all.
///
/// Unrecognized lines and missing identity fields are never errors; these
/// variants only cover input that cannot be turned into text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    /// No file or text was supplied
    #[error("Failed to process transcript: no transcript provided")]
    NoInput,

    /// The uploaded file is not a format we can read text from
    #[error("Failed to process transcript: unsupported file type {mime}")]
    UnsupportedMediaType { mime: String },

    /// Text extraction from the document failed
    #[error("Failed to process transcript: {message}")]
    Extraction { message: String },

    /// Text extraction did not finish in time
    #[error("Failed to process transcript: text extraction timed out after {secs}s")]
    ExtractionTimeout { secs: u64 },

    /// The document has no text layer (scanned image or blank file)
    #[error("Failed to process transcript: document contains no extractable text")]
    EmptyDocument,
}

impl TranscriptError {
    /// Returns the stage that produced this error.
    pub fn stage(&self) -> ParseStage {
        match self {
            TranscriptError::NoInput | TranscriptError::UnsupportedMediaType { .. } => {
                ParseStage::Upload
            }
            TranscriptError::Extraction { .. } | TranscriptError::ExtractionTimeout { .. } => {
                ParseStage::Extraction
            }
            TranscriptError::EmptyDocument => ParseStage::Parsing,
        }
    }
}

impl From<pdf_extract::OutputError> for TranscriptError {
    fn from(err: pdf_extract::OutputError) -> Self {
        TranscriptError::Extraction {
            message: err.to_string(),
        }
    }
}
