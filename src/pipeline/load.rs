//! Document loading: per-page plain text extraction via pdfium.
//!
//! The loader is the only stage that touches the filesystem. It walks a
//! folder, opens each `*.pdf` in turn, and pulls the text layer of every
//! page. One pdfium document handle is open at a time; it is dropped before
//! the next file is opened, so a panic or error mid-collection never leaks
//! handles.
//!
//! Failure policy: a file that cannot be opened, has no pages, or yields no
//! text anywhere is logged at `warn` level and skipped. Only a missing or
//! unreadable *folder* is fatal — a collection with some bad files still
//! produces a result from the good ones.

use crate::error::{DocumentError, SiftError};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One physical PDF page, in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub page_number: u32,
    /// Raw extracted page text, possibly empty.
    pub text: String,
}

impl Page {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// A loaded document: filename plus ordered pages.
///
/// Value-like and immutable once built; the detector consumes it and the
/// pipeline discards it after sections are extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub filename: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(filename: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            filename: filename.into(),
            pages,
        }
    }
}

/// Load every readable PDF in `folder`, in filename order.
///
/// # Errors
/// Fatal only when the folder itself is missing or unlistable. Individual
/// unreadable documents are warned about and skipped; an all-bad collection
/// returns `Ok(vec![])`.
pub fn load_documents(folder: &Path) -> Result<Vec<Document>, SiftError> {
    if !folder.is_dir() {
        return Err(SiftError::FolderNotFound {
            path: folder.to_path_buf(),
        });
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(folder)
        .map_err(|e| SiftError::FolderRead {
            path: folder.to_path_buf(),
            source: e,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    // Filename order keeps reruns deterministic regardless of directory
    // iteration order.
    paths.sort();

    if paths.is_empty() {
        info!("No PDF files found in {}", folder.display());
        return Ok(Vec::new());
    }

    let pdfium = Pdfium::default();
    let mut documents = Vec::with_capacity(paths.len());

    for path in &paths {
        match load_single(&pdfium, path) {
            Ok(doc) => {
                debug!("Loaded {} ({} pages)", doc.filename, doc.pages.len());
                documents.push(doc);
            }
            Err(e) => warn!("Skipping document: {e}"),
        }
    }

    info!(
        "Loaded {}/{} documents from {}",
        documents.len(),
        paths.len(),
        folder.display()
    );
    Ok(documents)
}

/// Open one PDF and extract its per-page text.
fn load_single(pdfium: &Pdfium, path: &Path) -> Result<Document, DocumentError> {
    let document =
        pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| DocumentError::OpenFailed {
                path: path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

    let pdf_pages = document.pages();
    if pdf_pages.len() == 0 {
        return Err(DocumentError::NoPages {
            path: path.to_path_buf(),
        });
    }

    let mut pages = Vec::with_capacity(pdf_pages.len() as usize);
    for (index, page) in pdf_pages.iter().enumerate() {
        // A page without a text layer (scan, pure graphics) contributes an
        // empty string; the detector skips it.
        let text = page.text().map(|t| t.all()).unwrap_or_default();
        pages.push(Page::new(index as u32 + 1, text));
    }

    if pages.iter().all(|p| p.text.trim().is_empty()) {
        return Err(DocumentError::NoText {
            path: path.to_path_buf(),
        });
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Document::new(filename, pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_folder_is_fatal() {
        let err = load_documents(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, SiftError::FolderNotFound { .. }));
    }

    #[test]
    fn empty_folder_yields_no_documents() {
        let dir = tempfile::tempdir().unwrap();
        let docs = load_documents(dir.path()).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn non_pdf_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a pdf").unwrap();
        let docs = load_documents(dir.path()).unwrap();
        assert!(docs.is_empty());
    }
}
