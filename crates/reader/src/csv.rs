// Delimited text decoding

use crate::CellGrid;

/// Decode raw bytes as text, converting from Windows-1252 when the bytes
/// are not valid UTF-8 (common for Excel-exported CSVs).
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

/// Split delimited text into a cell grid.
///
/// Rows are split on line breaks and cells on commas, with no quote
/// handling and no trimming. A trailing line break produces a trailing
/// row holding one empty cell; rows are not padded to the header width.
pub fn split_delimited(content: &str) -> CellGrid {
    content
        .split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            line.split(',').map(str::to_string).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let grid = split_delimited("a,b,c\n1,2,3");
        assert_eq!(grid, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_split_crlf() {
        let grid = split_delimited("a,b\r\n1,2\r\n");
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], vec!["a", "b"]);
        assert_eq!(grid[1], vec!["1", "2"]);
        assert_eq!(grid[2], vec![""]);
    }

    #[test]
    fn test_split_ragged_rows_not_padded() {
        let grid = split_delimited("a,b,c\n1\n1,2,3,4");
        assert_eq!(grid[1].len(), 1);
        assert_eq!(grid[2].len(), 4);
    }

    #[test]
    fn test_split_does_not_honor_quotes() {
        let grid = split_delimited("name\n\"Doe, Jane\"");
        assert_eq!(grid[1], vec!["\"Doe", " Jane\""]);
    }

    #[test]
    fn test_empty_input_is_one_empty_header() {
        assert_eq!(split_delimited(""), vec![vec![""]]);
    }

    #[test]
    fn test_decode_windows_1252() {
        // "café" with é encoded as 0xE9
        let bytes = vec![b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_text(bytes), "café");
    }
}
