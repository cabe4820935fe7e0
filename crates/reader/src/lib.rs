//! Raw file decoding.
//!
//! Turns a selected file into an ordered grid of string cells. Row 0 holds
//! the headers. Two inputs are understood:
//!
//! - delimited text (`.csv`): rows split on line breaks, cells on commas
//! - spreadsheets (`.xlsx`): the first sheet is rendered to delimited text
//!   and then split the same way
//!
//! No trimming happens: a trailing blank line yields a trailing empty row.

pub mod csv;
pub mod preview;
pub mod xlsx;

use std::path::Path;

use thiserror::Error;

pub use preview::{PreviewWindow, MIN_PREVIEW, PREVIEW_STEP};

/// Ordered rows of string cells. Row 0 is the header row.
pub type CellGrid = Vec<Vec<String>>;

/// Errors raised while decoding a file.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("file type '{0}' not supported")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),
}

/// Decodable file kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Xlsx,
}

impl FileKind {
    pub const CSV_MIME: &'static str = "text/csv";
    pub const XLSX_MIME: &'static str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

    /// Detect the kind from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ReadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(FileKind::Csv),
            "xlsx" => Ok(FileKind::Xlsx),
            _ => Err(ReadError::UnsupportedFormat(
                if ext.is_empty() { path.display().to_string() } else { format!(".{}", ext) },
            )),
        }
    }

    pub fn from_mime(mime: &str) -> Result<Self, ReadError> {
        match mime {
            Self::CSV_MIME => Ok(FileKind::Csv),
            Self::XLSX_MIME => Ok(FileKind::Xlsx),
            other => Err(ReadError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            FileKind::Csv => Self::CSV_MIME,
            FileKind::Xlsx => Self::XLSX_MIME,
        }
    }
}

/// Decode a file on disk into a cell grid.
pub fn read_file(path: &Path) -> Result<CellGrid, ReadError> {
    let kind = FileKind::from_path(path)?;
    let bytes = std::fs::read(path)?;
    read_bytes(kind, bytes)
}

/// Decode in-memory file contents of a known kind.
pub fn read_bytes(kind: FileKind, bytes: Vec<u8>) -> Result<CellGrid, ReadError> {
    match kind {
        FileKind::Csv => Ok(crate::csv::split_delimited(&crate::csv::decode_text(bytes))),
        FileKind::Xlsx => {
            let text = xlsx::first_sheet_as_delimited(bytes)?;
            Ok(crate::csv::split_delimited(&text))
        }
    }
}

/// Boundary entry point: decode failures are logged and swallowed.
///
/// Returns `None` when the file cannot be decoded; callers simply do not
/// advance (no preview, no plan).
pub fn load(path: &Path) -> Option<CellGrid> {
    match read_file(path) {
        Ok(grid) => {
            tracing::debug!(path = %path.display(), rows = grid.len(), "decoded file");
            Some(grid)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), "{}", e);
            None
        }
    }
}

/// Header row of a grid (empty when the grid is empty).
pub fn headers(grid: &CellGrid) -> &[String] {
    grid.first().map(Vec::as_slice).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(FileKind::from_path(Path::new("a.csv")).unwrap(), FileKind::Csv);
        assert_eq!(FileKind::from_path(Path::new("a.XLSX")).unwrap(), FileKind::Xlsx);
        let err = FileKind::from_path(Path::new("a.pdf")).unwrap_err();
        assert!(matches!(err, ReadError::UnsupportedFormat(ref s) if s == ".pdf"));
    }

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(FileKind::from_mime("text/csv").unwrap(), FileKind::Csv);
        assert_eq!(FileKind::from_mime(FileKind::XLSX_MIME).unwrap(), FileKind::Xlsx);
        assert!(FileKind::from_mime("application/json").is_err());
        assert_eq!(FileKind::Xlsx.mime(), FileKind::XLSX_MIME);
    }

    #[test]
    fn test_read_csv_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.csv");
        fs::write(&path, "name,age\nAlice,30\nBob,25").unwrap();

        let grid = read_file(&path).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(headers(&grid), ["name", "age"]);
        assert_eq!(grid[2], vec!["Bob", "25"]);
    }

    #[test]
    fn test_trailing_newline_keeps_empty_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a,b\n1,2\n").unwrap();

        let grid = read_file(&path).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[2], vec![String::new()]);
    }

    #[test]
    fn test_load_swallows_unsupported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "a,b").unwrap();
        assert!(load(&path).is_none());
    }

    #[test]
    fn test_headers_of_empty_grid() {
        let grid: CellGrid = Vec::new();
        assert!(headers(&grid).is_empty());
    }
}
