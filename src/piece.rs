//! Active falling piece logic

use crate::board::Grid;
use crate::srs;
use crate::tetromino::{Rotation, ShapeKind};

/// Pivot spawn position: centered, in the hidden buffer rows.
pub const SPAWN_COL: i32 = 5;
pub const SPAWN_ROW: i32 = 0;

/// An active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: ShapeKind,
    /// Current rotation state
    pub rotation: Rotation,
    /// Pivot position (col, row), row growing downward
    pub col: i32,
    pub row: i32,
}

impl Piece {
    /// A fresh piece at the spawn position.
    pub fn spawn(kind: ShapeKind) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            col: SPAWN_COL,
            row: SPAWN_ROW,
        }
    }

    /// Absolute cells occupied at the current position and rotation.
    pub fn cells(&self) -> [(i32, i32); 4] {
        self.kind
            .offsets(self.rotation)
            .map(|(dx, dy)| (self.col + dx, self.row + dy))
    }

    /// Would any cell collide after shifting by the trial offset? All
    /// movement, rotation, and drop logic is built on this one query;
    /// nothing is committed here.
    pub fn collides(&self, grid: &Grid, (dx, dy): (i32, i32)) -> bool {
        self.cells()
            .iter()
            .any(|&(col, row)| grid.is_occupied(col + dx, row + dy))
    }

    /// Shift the piece if the target cells are free.
    pub fn try_move(&mut self, grid: &Grid, dx: i32, dy: i32) -> bool {
        if self.collides(grid, (dx, dy)) {
            return false;
        }
        self.col += dx;
        self.row += dy;
        true
    }

    /// Rotate by `delta` quarter turns: +1 clockwise, -1 counter-
    /// clockwise, +2 for a half turn (two clockwise steps sharing the
    /// same kick search). On failure the piece is exactly as it was.
    pub fn try_rotate(&mut self, grid: &Grid, delta: i32) -> bool {
        match delta {
            1 | -1 => self.quarter_turn(grid, delta),
            2 => {
                let saved = *self;
                if self.quarter_turn(grid, 1) && self.quarter_turn(grid, 1) {
                    true
                } else {
                    *self = saved;
                    false
                }
            }
            _ => false,
        }
    }

    fn quarter_turn(&mut self, grid: &Grid, step: i32) -> bool {
        let saved = *self;
        self.rotation = if step > 0 {
            self.rotation.cw()
        } else {
            self.rotation.ccw()
        };
        // In-place attempt first, then each kick from the table
        if !self.collides(grid, (0, 0)) {
            return true;
        }
        for &(dx, dy) in srs::wall_kicks(self.kind, saved.rotation, self.rotation) {
            if !self.collides(grid, (dx, dy)) {
                self.col += dx;
                self.row += dy;
                return true;
            }
        }
        *self = saved;
        false
    }

    /// How far the piece can fall straight down. Drives both the ghost
    /// preview and hard drop.
    pub fn hard_drop_distance(&self, grid: &Grid) -> i32 {
        let mut distance = 0;
        while !self.collides(grid, (0, distance + 1)) {
            distance += 1;
        }
        distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BOARD_WIDTH, BUFFER_HEIGHT, TOTAL_HEIGHT};

    #[test]
    fn spawn_sits_inside_the_buffer() {
        for kind in ShapeKind::ALL {
            let piece = Piece::spawn(kind);
            for (col, row) in piece.cells() {
                assert!((0..BOARD_WIDTH as i32).contains(&col), "{kind:?}");
                assert!((0..BUFFER_HEIGHT as i32).contains(&row), "{kind:?}");
            }
        }
    }

    #[test]
    fn moves_commit_only_when_legal() {
        let grid = Grid::new();
        let mut piece = Piece::spawn(ShapeKind::T);
        assert!(piece.try_move(&grid, 0, 1));
        assert!(!piece.collides(&grid, (0, 0)));

        // Walk into the left wall: eventually the move fails and the
        // piece stays put
        while piece.try_move(&grid, -1, 0) {}
        let stuck = piece;
        assert!(!piece.try_move(&grid, -1, 0));
        assert_eq!(piece, stuck);
    }

    #[test]
    fn resting_piece_never_occupies_illegal_cells() {
        let mut grid = Grid::new();
        grid.lock(&[(3, 15), (4, 15), (5, 15), (6, 15)], ShapeKind::J);
        let mut piece = Piece::spawn(ShapeKind::S);
        for action in 0..40 {
            let moved = match action % 4 {
                0 => piece.try_move(&grid, 1, 0),
                1 => piece.try_move(&grid, 0, 1),
                2 => piece.try_rotate(&grid, 1),
                _ => piece.try_move(&grid, -1, 0),
            };
            let _ = moved;
            assert!(!piece.collides(&grid, (0, 0)));
        }
    }

    #[test]
    fn blocked_rotation_reverts_completely() {
        // Horizontal I in a one-row slot: full rows directly above and
        // below leave no room for any kicked vertical placement.
        let mut grid = Grid::new();
        for col in 0..BOARD_WIDTH as i32 {
            grid.lock(&[(col, 19), (col, 21)], ShapeKind::L);
        }
        let mut piece = Piece {
            kind: ShapeKind::I,
            rotation: Rotation::North,
            col: 5,
            row: 20,
        };
        assert!(!piece.collides(&grid, (0, 0)));

        let before = piece;
        assert!(!piece.try_rotate(&grid, 1));
        assert_eq!(piece, before);
        assert!(!piece.try_rotate(&grid, -1));
        assert_eq!(piece, before);
        assert!(!piece.try_rotate(&grid, 2));
        assert_eq!(piece, before);
    }

    #[test]
    fn half_turn_is_all_or_nothing() {
        // Sweep both tables' pieces across a cluttered grid; whatever
        // the outcome, state must be consistent afterwards.
        let mut grid = Grid::new();
        for row in 12..TOTAL_HEIGHT as i32 {
            for col in 0..BOARD_WIDTH as i32 {
                if (col + row) % 3 == 0 {
                    grid.lock(&[(col, row)], ShapeKind::Z);
                }
            }
        }
        for kind in [ShapeKind::T, ShapeKind::I, ShapeKind::L] {
            for col in 0..BOARD_WIDTH as i32 {
                for row in 8..20 {
                    let start = Piece {
                        kind,
                        rotation: Rotation::North,
                        col,
                        row,
                    };
                    if start.collides(&grid, (0, 0)) {
                        continue;
                    }
                    let mut piece = start;
                    if piece.try_rotate(&grid, 2) {
                        assert_eq!(piece.rotation, Rotation::South);
                        assert!(!piece.collides(&grid, (0, 0)));
                    } else {
                        assert_eq!(piece, start);
                    }
                }
            }
        }
    }

    #[test]
    fn o_piece_rotation_is_trivially_legal() {
        let grid = Grid::new();
        let mut piece = Piece::spawn(ShapeKind::O);
        let cells_before = piece.cells();
        assert!(piece.try_rotate(&grid, 1));
        assert_eq!(piece.rotation, Rotation::East);
        assert_eq!(piece.cells(), cells_before);
    }

    #[test]
    fn wall_kick_lifts_rotation_off_the_wall() {
        // Vertical I hugging the left wall cannot rotate in place; a
        // kick shifts it right instead of failing.
        let grid = Grid::new();
        let mut piece = Piece {
            kind: ShapeKind::I,
            rotation: Rotation::East,
            col: 0,
            row: 10,
        };
        assert!(!piece.collides(&grid, (0, 0)));
        assert!(piece.try_rotate(&grid, 1));
        assert_eq!(piece.rotation, Rotation::South);
        assert!(!piece.collides(&grid, (0, 0)));
        assert!(piece.col > 0);
    }

    #[test]
    fn drop_distance_reaches_the_floor() {
        let grid = Grid::new();
        let piece = Piece::spawn(ShapeKind::T);
        let distance = piece.hard_drop_distance(&grid);
        assert_eq!(distance, TOTAL_HEIGHT as i32 - 2);

        let mut dropped = piece;
        assert!(dropped.try_move(&grid, 0, distance));
        assert!(dropped.collides(&grid, (0, 1)));
    }

    #[test]
    fn drop_distance_respects_the_stack() {
        let mut grid = Grid::new();
        for col in 0..BOARD_WIDTH as i32 {
            grid.lock(&[(col, 12)], ShapeKind::S);
        }
        let piece = Piece::spawn(ShapeKind::O);
        // O cells sit at rows 0-1; first occupied row is 12
        assert_eq!(piece.hard_drop_distance(&grid), 10);
    }
}
