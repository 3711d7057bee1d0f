use std::path::{Path, PathBuf};
use thiserror::Error;

use super::ocr;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("None of the {0} supplied files produced readable text")]
    NoText(usize),
}

/// Outcome of one ingestion batch: the concatenated text plus which files
/// made it in and which were skipped.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub text: String,
    pub processed: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, String)>,
}

/// Extract plain text from a batch of PDF files.
///
/// Each file is tried with the PDF text layer first and falls back to OCR
/// over the embedded page images when the text layer is empty. A file that
/// fails entirely is logged and skipped; the batch only errors when no file
/// contributed any text.
pub fn extract_text_from_pdfs<P: AsRef<Path>>(paths: &[P]) -> Result<IngestReport, IngestError> {
    let mut report = IngestReport::default();

    for path in paths {
        let path = path.as_ref();
        match extract_single(path) {
            Ok(text) => {
                report.text.push_str(&text);
                report.text.push('\n');
                report.processed.push(path.to_path_buf());
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                report.skipped.push((path.to_path_buf(), e.to_string()));
            }
        }
    }

    report.text = report.text.trim().to_string();
    if report.text.is_empty() {
        return Err(IngestError::NoText(paths.len()));
    }

    Ok(report)
}

fn extract_single(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path)?;

    // Text layer first
    match pdf_extract::extract_text_from_mem(&bytes) {
        Ok(text) if !text.trim().is_empty() => return Ok(text),
        Ok(_) => log::info!("{}: empty text layer, falling back to OCR", path.display()),
        Err(e) => log::info!(
            "{}: text extraction failed ({}), falling back to OCR",
            path.display(),
            e
        ),
    }

    let text = ocr::extract_scanned_text(&bytes)?;
    if text.trim().is_empty() {
        anyhow::bail!("no text layer and OCR produced nothing");
    }
    Ok(text)
}
