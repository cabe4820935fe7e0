// Raw preview window over a decoded grid

use crate::CellGrid;

/// Smallest preview length.
pub const MIN_PREVIEW: usize = 5;

/// Rows added or removed by one `more`/`less` step.
pub const PREVIEW_STEP: usize = 5;

/// A growable window over the data rows (everything after the header).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewWindow {
    length: usize,
    data_rows: usize,
}

impl PreviewWindow {
    pub fn new(grid: &CellGrid) -> Self {
        Self {
            length: MIN_PREVIEW,
            data_rows: grid.len().saturating_sub(1),
        }
    }

    /// Requested window length, never below [`MIN_PREVIEW`].
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of data rows the window actually shows.
    pub fn shown(&self) -> usize {
        self.length.min(self.data_rows)
    }

    pub fn data_rows(&self) -> usize {
        self.data_rows
    }

    pub fn more(&mut self) {
        self.resize(self.length + PREVIEW_STEP);
    }

    pub fn less(&mut self) {
        self.resize(self.length.saturating_sub(PREVIEW_STEP));
    }

    pub fn can_more(&self) -> bool {
        self.length < self.data_rows
    }

    pub fn can_less(&self) -> bool {
        self.length > MIN_PREVIEW
    }

    /// Jump to a requested length, clamped like `more`/`less`.
    pub fn resize(&mut self, requested: usize) {
        // Clamp to the data first, then the floor wins
        self.length = requested.min(self.data_rows).max(MIN_PREVIEW);
    }

    /// Visible data rows of `grid`.
    pub fn rows<'a>(&self, grid: &'a CellGrid) -> &'a [Vec<String>] {
        let end = (self.shown() + 1).min(grid.len());
        if end <= 1 {
            return &[];
        }
        &grid[1..end]
    }

    pub fn label(&self) -> String {
        format!("Previewing {} of {}", self.shown(), self.data_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(data_rows: usize) -> CellGrid {
        let mut g = vec![vec!["h".to_string()]];
        for i in 0..data_rows {
            g.push(vec![i.to_string()]);
        }
        g
    }

    #[test]
    fn test_starts_at_minimum() {
        let g = grid(12);
        let w = PreviewWindow::new(&g);
        assert_eq!(w.length(), MIN_PREVIEW);
        assert_eq!(w.rows(&g).len(), 5);
        assert_eq!(w.rows(&g)[0], vec!["0"]);
        assert_eq!(w.label(), "Previewing 5 of 12");
        assert!(!w.can_less());
        assert!(w.can_more());
    }

    #[test]
    fn test_more_clamps_to_data_rows() {
        let g = grid(12);
        let mut w = PreviewWindow::new(&g);
        w.more();
        assert_eq!(w.length(), 10);
        w.more();
        assert_eq!(w.length(), 12);
        assert!(!w.can_more());
        assert_eq!(w.rows(&g).len(), 12);
    }

    #[test]
    fn test_less_clamps_to_minimum() {
        let g = grid(20);
        let mut w = PreviewWindow::new(&g);
        w.more();
        w.less();
        w.less();
        assert_eq!(w.length(), MIN_PREVIEW);
    }

    #[test]
    fn test_small_grid() {
        let g = grid(2);
        let mut w = PreviewWindow::new(&g);
        assert_eq!(w.shown(), 2);
        assert!(!w.can_more());
        w.more();
        assert_eq!(w.length(), MIN_PREVIEW);
        assert_eq!(w.rows(&g).len(), 2);
    }

    #[test]
    fn test_header_only_grid() {
        let g = grid(0);
        let w = PreviewWindow::new(&g);
        assert!(w.rows(&g).is_empty());
        assert_eq!(w.label(), "Previewing 0 of 0");
    }
}
