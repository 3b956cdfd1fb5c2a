//! BOM reader
//!
//! Reduces a CSV or spreadsheet BOM to `(refdes, value)` pairs taken from the
//! first two columns. Rows with fewer than two cells are dropped.

use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::IngestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomRow {
    pub refdes: String,
    pub value: String,
}

impl BomRow {
    fn new(refdes: &str, value: &str) -> Self {
        Self {
            refdes: refdes.trim().to_string(),
            value: value.trim().to_string(),
        }
    }
}

/// Read a BOM file. A missing file or unknown extension yields no rows.
pub fn parse_bom(path: &Path) -> Result<Vec<BomRow>, IngestError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => {
            let file = File::open(path)?;
            parse_bom_csv(BufReader::new(file))
        }
        "xlsx" | "xlsm" | "xls" => parse_bom_spreadsheet(path),
        _ => Ok(Vec::new()),
    }
}

/// Every record is data; a header row simply becomes one more pair.
pub fn parse_bom_csv<R: std::io::Read>(reader: R) -> Result<Vec<BomRow>, IngestError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (row_idx, result) in rdr.byte_records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("BOM row {}: skipped ({})", row_idx + 1, e);
                continue;
            }
        };
        if record.len() < 2 {
            continue;
        }
        rows.push(BomRow::new(&lossy_cell(&record[0]), &lossy_cell(&record[1])));
    }
    Ok(rows)
}

/// Decode a cell, dropping bytes that are not valid UTF-8.
fn lossy_cell(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace(char::REPLACEMENT_CHARACTER, "")
}

fn parse_bom_spreadsheet(path: &Path) -> Result<Vec<BomRow>, IngestError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| IngestError::Spreadsheet(e.to_string()))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => return Err(IngestError::Spreadsheet(e.to_string())),
        None => return Ok(Vec::new()),
    };

    Ok(range
        .rows()
        .filter(|row| row.len() >= 2)
        .map(|row| BomRow::new(&row[0].to_string(), &row[1].to_string()))
        .filter(|row| !(row.refdes.is_empty() && row.value.is_empty()))
        .collect())
}

/// Flatten rows into `"{ref} {value}"` lines for the inferencer.
pub fn bom_rows_to_text(rows: &[BomRow]) -> String {
    rows.iter()
        .map(|r| format!("{} {}", r.refdes, r.value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_csv_rows() {
        let rows = parse_bom_csv("Ref,Value\nY1,16MHz\nU1, 3V3 Regulator \n".as_bytes()).unwrap();
        assert!(rows.contains(&BomRow::new("Y1", "16MHz")));
        assert!(rows.iter().any(|r| r.value == "3V3 Regulator"));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_invalid_utf8_row_is_kept() {
        let data = b"Y1,16MHz \xff\xfeCrystal\nC1,100nF\n";
        let rows = parse_bom_csv(&data[..]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], BomRow::new("Y1", "16MHz Crystal"));
        assert_eq!(rows[1], BomRow::new("C1", "100nF"));
    }

    #[test]
    fn test_short_rows_dropped() {
        let rows = parse_bom_csv("J1\n\nC1,100n,0402\n".as_bytes()).unwrap();
        assert_eq!(rows, vec![BomRow::new("C1", "100n")]);
    }

    #[test]
    fn test_parse_bom_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"Y1,16MHz\nJP1,+5V\n").unwrap();
        let rows = parse_bom(file.path()).unwrap();
        assert_eq!(rows[1], BomRow::new("JP1", "+5V"));
    }

    #[test]
    fn test_missing_or_unknown_file() {
        assert!(parse_bom(Path::new("missing_bom.csv")).unwrap().is_empty());
        let file = tempfile::Builder::new().suffix(".ods2").tempfile().unwrap();
        assert!(parse_bom(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_rows_to_text() {
        let text = bom_rows_to_text(&[BomRow::new("Y1", "16MHz"), BomRow::new("U2", "SX1276")]);
        assert_eq!(text, "Y1 16MHz\nU2 SX1276");
    }
}
