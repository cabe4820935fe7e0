// Spreadsheet decoding: first sheet rendered to delimited text

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::ReadError;

/// Render the first worksheet of an xlsx workbook as comma-delimited text.
///
/// Cells containing commas, quotes or line breaks are quoted. Rows are
/// joined with `\n` and no line break follows the last row. Data that does
/// not start at A1 is padded so positions match the sheet.
pub fn first_sheet_as_delimited(bytes: Vec<u8>) -> Result<String, ReadError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| ReadError::Spreadsheet(e.to_string()))?;

    let Some(first) = workbook.sheet_names().first().cloned() else {
        return Err(ReadError::Spreadsheet("workbook contains no sheets".into()));
    };

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| ReadError::Spreadsheet(format!("failed to read sheet '{}': {}", first, e)))?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (_, width) = range.get_size();
    let total_cols = start_col as usize + width;

    let mut lines = Vec::with_capacity(start_row as usize + range.height());
    for _ in 0..start_row {
        lines.push(delimited_line(&vec![String::new(); total_cols.max(1)])?);
    }
    for row in range.rows() {
        let mut record = vec![String::new(); start_col as usize];
        record.extend(row.iter().map(cell_text));
        lines.push(delimited_line(&record)?);
    }
    let text = lines.join("\n");

    tracing::debug!(sheet = %first, bytes = text.len(), "rendered first sheet");
    Ok(text)
}

/// One record as CSV text. A lone empty field stays empty rather than
/// becoming `""`.
fn delimited_line(record: &[String]) -> Result<String, ReadError> {
    if record.len() <= 1 && record.iter().all(String::is_empty) {
        return Ok(String::new());
    }

    let mut writer = ::csv::WriterBuilder::new()
        .flexible(true)
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(record)
        .map_err(|e| ReadError::Spreadsheet(e.to_string()))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ReadError::Spreadsheet(e.to_string()))?;

    let mut line = String::from_utf8_lossy(&bytes).into_owned();
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) if value.time() == chrono::NaiveTime::MIN => {
                value.format("%Y-%m-%d").to_string()
            }
            Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}
