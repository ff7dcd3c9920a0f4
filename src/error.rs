//! Error types for the docsift library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SiftError`] — **Fatal**: the analysis run cannot proceed at all
//!   (missing input folder, invalid configuration, output file unwritable).
//!   Returned as `Err(SiftError)` from `analyze_folder` and
//!   `write_output_file`.
//!
//! * [`DocumentError`] — **Non-fatal**: a single PDF failed (corrupt file,
//!   no pages, no extractable text) but the rest of the collection is fine.
//!   The loader logs these and skips the document rather than losing the
//!   whole run to one bad file.
//!
//! False-positive section headers are not errors at all: the detector drops
//! them silently, since they are expected noise of the heuristic. The pure
//! [`crate::analyze::analyze`] operation has no error path — a run where no
//! document yields usable text returns an output with zero sections, and
//! the caller decides whether that is a failure.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docsift library.
///
/// Per-document failures use [`DocumentError`] and are logged and skipped by
/// the loader rather than propagated here.
#[derive(Debug, Error)]
pub enum SiftError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input folder was not found at the given path.
    #[error("PDF folder not found: '{path}'\nCheck the path exists and is a directory.")]
    FolderNotFound { path: PathBuf },

    /// The input folder exists but could not be listed.
    #[error("Failed to read PDF folder '{path}': {source}")]
    FolderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single document.
///
/// Emitted by the loader when one PDF in the collection cannot contribute
/// text. The run continues with the remaining documents.
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    /// pdfium could not open or parse the file.
    #[error("'{path}' could not be opened as a PDF: {detail}")]
    OpenFailed { path: PathBuf, detail: String },

    /// The PDF opened but contains no pages.
    #[error("'{path}' has no pages")]
    NoPages { path: PathBuf },

    /// Every page of the PDF yielded empty text (scanned images, no text layer).
    #[error("'{path}' has no extractable text")]
    NoText { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_not_found_display() {
        let e = SiftError::FolderNotFound {
            path: PathBuf::from("/missing/dir"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/missing/dir"), "got: {msg}");
    }

    #[test]
    fn invalid_config_display() {
        let e = SiftError::InvalidConfig("max_sections must be ≥ 1".into());
        assert!(e.to_string().contains("max_sections"));
    }

    #[test]
    fn output_write_failed_carries_source() {
        use std::error::Error as _;
        let e = SiftError::OutputWriteFailed {
            path: PathBuf::from("out.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("out.json"));
        assert!(e.source().is_some());
    }

    #[test]
    fn document_error_display() {
        let e = DocumentError::NoText {
            path: PathBuf::from("scan.pdf"),
        };
        assert!(e.to_string().contains("scan.pdf"));
        assert!(e.to_string().contains("no extractable text"));
    }
}
