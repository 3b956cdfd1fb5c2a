//! Extractors that turn raw design files into text or BOM rows.
//!
//! These carry no domain heuristics; the inferencer and netlist parser do the
//! interpretation.

pub mod archive;
pub mod bom;
pub mod format_detector;
pub mod pdf;

use std::path::Path;
use thiserror::Error;

pub use archive::extract_zip;
pub use bom::{bom_rows_to_text, parse_bom, BomRow};
pub use format_detector::{display_extension, InputKind};
pub use pdf::{extract_pdf_hints, filter_pdf_hints};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("Archive error: {0}")]
    Archive(String),
}

/// Read an Altium document as text. Binary content is not parsed; invalid
/// UTF-8 sequences are dropped.
pub fn read_altium_text(path: &Path) -> Result<String, IngestError> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect())
}

/// Plain text of a single (non-archive) input, as fed to the inferencer.
/// Entity JSON and netlists are returned verbatim.
pub fn extract_text(path: &Path, kind: InputKind) -> Result<String, IngestError> {
    match kind {
        InputKind::Bom => Ok(bom_rows_to_text(&parse_bom(path)?)),
        InputKind::Pdf => Ok(extract_pdf_hints(path).join("\n")),
        InputKind::Altium => read_altium_text(path),
        InputKind::Json | InputKind::Netlist => {
            let bytes = std::fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        InputKind::Archive => Ok(String::new()),
    }
}
