// Plain-text rendering for terminal output

use castgrid_core::DisplayPage;
use serde_json::Value;

/// Cell text: strings unquoted, null empty, anything else as JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Left-aligned columns separated by two spaces, with a rule under the
/// header row.
pub fn aligned(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).chain([header.len()]).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |row: &[String]| -> String {
        let cells: Vec<String> = (0..columns)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                format!("{:<width$}", cell, width = widths[i])
            })
            .collect();
        cells.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&line(header));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

pub fn page_table(page: &DisplayPage) -> String {
    let header: Vec<String> = page.columns.iter().map(|c| c.header.clone()).collect();
    let rows: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.ordinal.to_string())
                .chain(row.cells.iter().map(cell_text))
                .collect()
        })
        .collect();
    aligned(&header, &rows)
}

/// e.g. `Page 2 of 3 (250 rows)`; page is shown 1-based.
pub fn page_footer(page: &DisplayPage) -> String {
    let pages = if page.page_size == 0 {
        0
    } else {
        page.total_rows.div_ceil(page.page_size)
    };
    format!("Page {} of {} ({} rows)", page.page + 1, pages.max(1), page.total_rows)
}
