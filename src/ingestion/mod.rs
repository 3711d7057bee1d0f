mod ocr;
mod pdf;

pub use pdf::{extract_text_from_pdfs, IngestError, IngestReport};
