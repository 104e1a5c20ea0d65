//! Board state and cell-level collision queries
//!
//! Coordinates are (col, row) with row 0 at the TOP of the hidden
//! buffer; rows `BUFFER_HEIGHT..TOTAL_HEIGHT` are the visible field.

use crate::tetromino::ShapeKind;

pub const BOARD_WIDTH: usize = 10;
pub const VISIBLE_HEIGHT: usize = 20;
/// Hidden rows above the visible board where pieces spawn
pub const BUFFER_HEIGHT: usize = 2;
pub const TOTAL_HEIGHT: usize = VISIBLE_HEIGHT + BUFFER_HEIGHT;

/// The locked-cell grid. A cell is either empty or holds the shape kind
/// that locked there (which also gives its color).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Stored as [row][col], row index grows downward
    cells: [[Option<ShapeKind>; BOARD_WIDTH]; TOTAL_HEIGHT],
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: [[None; BOARD_WIDTH]; TOTAL_HEIGHT],
        }
    }

    /// Collision query, failing closed: outside the side walls or below
    /// the floor reads as occupied. Above the top (row < 0) reads as
    /// free, so a tall piece may poke out over the buffer before it
    /// locks.
    pub fn is_occupied(&self, col: i32, row: i32) -> bool {
        if col < 0 || col >= BOARD_WIDTH as i32 {
            return true;
        }
        if row >= TOTAL_HEIGHT as i32 {
            return true;
        }
        if row < 0 {
            return false;
        }
        self.cells[row as usize][col as usize].is_some()
    }

    /// Cell contents for rendering. Out-of-range reads as empty.
    pub fn cell(&self, col: i32, row: i32) -> Option<ShapeKind> {
        if col < 0 || row < 0 || col >= BOARD_WIDTH as i32 || row >= TOTAL_HEIGHT as i32 {
            return None;
        }
        self.cells[row as usize][col as usize]
    }

    /// Write a locked piece's cells into the grid. The caller has
    /// already verified the placement is collision-free; cells above
    /// row 0 have nowhere to go and are dropped.
    pub fn lock(&mut self, cells: &[(i32, i32)], kind: ShapeKind) {
        for &(col, row) in cells {
            if (0..BOARD_WIDTH as i32).contains(&col) && (0..TOTAL_HEIGHT as i32).contains(&row) {
                self.cells[row as usize][col as usize] = Some(kind);
            }
        }
    }

    /// Remove every full row in one pass, shifting everything above
    /// each removed row down by one per removal. Returns the number of
    /// rows cleared.
    pub fn clear_full_lines(&mut self) -> usize {
        let mut write_row = TOTAL_HEIGHT;
        for read_row in (0..TOTAL_HEIGHT).rev() {
            if self.row_full(read_row) {
                continue;
            }
            write_row -= 1;
            if write_row != read_row {
                self.cells[write_row] = self.cells[read_row];
            }
        }
        // Whatever was not rewritten at the top becomes empty
        let cleared = write_row;
        for row in 0..write_row {
            self.cells[row] = [None; BOARD_WIDTH];
        }
        cleared
    }

    /// Rows a clear pass would remove right now. The renderer flashes
    /// these between lock and clear.
    pub fn full_rows(&self) -> Vec<usize> {
        (0..TOTAL_HEIGHT).filter(|&row| self.row_full(row)).collect()
    }

    fn row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_some())
    }

    /// True when no cell is occupied, which is what makes a clear
    /// "perfect".
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_none()))
    }

    /// Block-out check: a locked cell in the hidden spawn rows loses
    /// the game.
    pub fn buffer_occupied(&self) -> bool {
        self.cells[..BUFFER_HEIGHT]
            .iter()
            .any(|row| row.iter().any(|cell| cell.is_some()))
    }
}
