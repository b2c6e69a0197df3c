//! Deterministic enumeration of the scan grid.

/// One cell of the scan grid along with the viewport coordinate of its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub col: usize,
    pub row: usize,
    pub u: f64,
    pub v: f64,
}

/// A `columns` × `rows` grid laid over the viewport. Cells are visited row-major: row 0 from
/// left to right, then row 1, and so on. Sample coordinates are cell centers, so no sample falls
/// on the edge of the frustum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrustumGrid {
    columns: usize,
    rows: usize,
}

impl FrustumGrid {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell(&self, col: usize, row: usize) -> GridCell {
        GridCell {
            col,
            row,
            u: (col as f64 + 0.5) / self.columns as f64,
            v: (row as f64 + 0.5) / self.rows as f64,
        }
    }

    pub fn cells(&self) -> GridCellIter<'_> {
        GridCellIter {
            grid: self,
            col: 0,
            row: 0,
        }
    }
}

pub struct GridCellIter<'a> {
    grid: &'a FrustumGrid,
    col: usize,
    row: usize,
}

impl Iterator for GridCellIter<'_> {
    type Item = GridCell;

    fn next(&mut self) -> Option<Self::Item> {
        if self.grid.columns == 0 || self.row >= self.grid.rows {
            return None;
        }

        let cell = self.grid.cell(self.col, self.row);
        self.col += 1;

        if self.col >= self.grid.columns {
            self.col = 0;
            self.row += 1;
        }

        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.grid.columns == 0 || self.row >= self.grid.rows {
            0
        } else {
            (self.grid.rows - self.row) * self.grid.columns - self.col
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridCellIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test_case(1, 1)]
    #[test_case(2, 1)]
    #[test_case(1, 3)]
    #[test_case(60, 40)]
    fn visits_every_cell_once(columns: usize, rows: usize) {
        let grid = FrustumGrid::new(columns, rows);
        let cells = grid.cells().collect::<Vec<_>>();
        assert_eq!(cells.len(), columns * rows);
        assert_eq!(grid.cells().len(), columns * rows);

        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell.row, i / columns);
            assert_eq!(cell.col, i % columns);
        }
    }

    #[test]
    fn coordinates_are_cell_centers() {
        let grid = FrustumGrid::new(4, 2);
        let cells = grid.cells().collect::<Vec<_>>();

        let us = cells[..4].iter().map(|c| c.u).collect::<Vec<_>>();
        assert_eq!(us, vec![0.125, 0.375, 0.625, 0.875]);
        assert_relative_eq!(cells[0].v, 0.25);
        assert_relative_eq!(cells[4].v, 0.75);
        assert_relative_eq!(cells[7].u, 0.875);
    }

    #[test]
    fn samples_never_touch_edges() {
        let grid = FrustumGrid::new(7, 5);
        for cell in grid.cells() {
            assert!(cell.u > 0.0 && cell.u < 1.0);
            assert!(cell.v > 0.0 && cell.v < 1.0);
        }
    }

    #[test]
    fn empty_grid_yields_nothing() {
        assert_eq!(FrustumGrid::new(0, 5).cells().count(), 0);
        assert_eq!(FrustumGrid::new(5, 0).cells().count(), 0);
    }

    #[test]
    fn size_hint_tracks_progress() {
        let grid = FrustumGrid::new(3, 2);
        let mut iter = grid.cells();
        iter.next();
        iter.next();
        iter.next();
        iter.next();
        assert_eq!(iter.len(), 2);
    }
}
