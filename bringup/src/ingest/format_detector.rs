//! Input type detection
//!
//! Routes an input file to the right extractor by its extension.

use std::path::Path;

/// Kind of design artifact, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Entity JSON in the interchange shape
    Json,
    /// BOM spreadsheet or CSV
    Bom,
    /// Altium document, read as raw text
    Altium,
    Pdf,
    /// IPC-D-356A netlist
    Netlist,
    /// ZIP bundle of any of the above
    Archive,
}

impl InputKind {
    /// Detect the kind from a path. `None` for unsupported extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::from_extension(&ext)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.') {
            "json" => Some(InputKind::Json),
            "csv" | "xlsx" | "xlsm" | "xls" => Some(InputKind::Bom),
            "schdoc" | "pcbdoc" | "prjpcb" | "bomdoc" => Some(InputKind::Altium),
            "pdf" => Some(InputKind::Pdf),
            "txt" | "net" | "ipc" | "356" | "d356" => Some(InputKind::Netlist),
            "zip" => Some(InputKind::Archive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Json => "entity JSON",
            InputKind::Bom => "BOM",
            InputKind::Altium => "Altium document",
            InputKind::Pdf => "PDF",
            InputKind::Netlist => "IPC-D-356A netlist",
            InputKind::Archive => "ZIP archive",
        }
    }

    /// Kinds whose text goes through the heuristic inferencer.
    pub fn is_heuristic(&self) -> bool {
        matches!(self, InputKind::Bom | InputKind::Altium | InputKind::Pdf)
    }
}

/// Lower-cased extension with a leading dot, for error messages.
pub fn display_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}
