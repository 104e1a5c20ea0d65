//! Shape definitions for the 7 tetrominoes
//!
//! Each shape is defined once, as cell offsets around its pivot in the
//! spawn orientation; the other three rotation states are derived at
//! compile time. Coordinates are (dx, dy) with x growing rightward and
//! y growing DOWN the board.

use ratatui::style::Color;

/// The 7 shapes, tagged with their classic numeric ids (1-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShapeKind {
    I = 1,
    Z = 2,
    T = 3,
    O = 4,
    L = 5,
    S = 6,
    J = 7,
}

/// Rotation states, SRS naming: North is the spawn state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

// Spawn-state cells per shape. Pivot is (0, 0).
//
//   I: IIII    Z: ZZ.    T: TTT    O: OO    L: LLL    S: .SS    J: JJJ
//                 .ZZ       .T.       OO       L..       SS.       ..J
const I_CELLS: [(i32, i32); 4] = [(-1, 0), (0, 0), (1, 0), (2, 0)];
const Z_CELLS: [(i32, i32); 4] = [(-1, 0), (0, 0), (0, 1), (1, 1)];
const T_CELLS: [(i32, i32); 4] = [(-1, 0), (0, 0), (0, 1), (1, 0)];
const O_CELLS: [(i32, i32); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];
const L_CELLS: [(i32, i32); 4] = [(0, 1), (0, 0), (1, 0), (2, 0)];
const S_CELLS: [(i32, i32); 4] = [(-1, 1), (0, 1), (0, 0), (1, 0)];
const J_CELLS: [(i32, i32); 4] = [(-1, 0), (0, 0), (1, 0), (1, 1)];

/// Quarter turn clockwise in a y-down frame: (x, y) -> (-y, x).
const fn turn_cw(cells: [(i32, i32); 4]) -> [(i32, i32); 4] {
    let mut out = [(0, 0); 4];
    let mut i = 0;
    while i < 4 {
        out[i] = (-cells[i].1, cells[i].0);
        i += 1;
    }
    out
}

/// All four rotation states derived from the spawn state.
const fn spin(base: [(i32, i32); 4]) -> [[(i32, i32); 4]; 4] {
    let east = turn_cw(base);
    let south = turn_cw(east);
    let west = turn_cw(south);
    [base, east, south, west]
}

// The O piece is pinned: rotating it would walk its cells around the
// pivot, but all four of its states are the same square.
static SHAPE_TABLE: [[[(i32, i32); 4]; 4]; 7] = [
    spin(I_CELLS),
    spin(Z_CELLS),
    spin(T_CELLS),
    [O_CELLS, O_CELLS, O_CELLS, O_CELLS],
    spin(L_CELLS),
    spin(S_CELLS),
    spin(J_CELLS),
];

impl ShapeKind {
    /// All shapes in id order, for bag shuffling.
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::Z,
        ShapeKind::T,
        ShapeKind::O,
        ShapeKind::L,
        ShapeKind::S,
        ShapeKind::J,
    ];

    /// Classic numeric id (1-7).
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Cell offsets around the pivot for the given rotation state.
    pub fn offsets(self, rotation: Rotation) -> [(i32, i32); 4] {
        SHAPE_TABLE[self.id() as usize - 1][rotation.index()]
    }

    /// Display color for this shape.
    pub fn color(self) -> Color {
        match self {
            ShapeKind::I => Color::Cyan,
            ShapeKind::Z => Color::Red,
            ShapeKind::T => Color::Magenta,
            ShapeKind::O => Color::Yellow,
            ShapeKind::L => Color::Rgb(255, 165, 0),
            ShapeKind::S => Color::Green,
            ShapeKind::J => Color::Blue,
        }
    }
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    /// Table index: North=0, East=1, South=2, West=3.
    pub fn index(self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Clockwise: North -> East -> South -> West -> North.
    pub fn cw(self) -> Rotation {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Counter-clockwise: North -> West -> South -> East -> North.
    pub fn ccw(self) -> Rotation {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_has_four_cells() {
        for kind in ShapeKind::ALL {
            for rotation in Rotation::ALL {
                assert_eq!(kind.offsets(rotation).len(), 4);
            }
        }
    }

    #[test]
    fn o_piece_never_changes() {
        let spawn = ShapeKind::O.offsets(Rotation::North);
        for rotation in Rotation::ALL {
            assert_eq!(ShapeKind::O.offsets(rotation), spawn);
        }
    }

    #[test]
    fn i_piece_east_is_vertical() {
        let cells = ShapeKind::I.offsets(Rotation::East);
        assert!(cells.iter().all(|&(dx, _)| dx == 0));
        let mut ys: Vec<i32> = cells.iter().map(|&(_, dy)| dy).collect();
        ys.sort_unstable();
        assert_eq!(ys, vec![-1, 0, 1, 2]);
    }

    #[test]
    fn four_cw_turns_return_to_spawn() {
        for kind in ShapeKind::ALL {
            let mut rotation = Rotation::North;
            for _ in 0..4 {
                rotation = rotation.cw();
            }
            assert_eq!(rotation, Rotation::North);
            assert_eq!(kind.offsets(rotation), kind.offsets(Rotation::North));
        }
    }

    #[test]
    fn cw_then_ccw_is_identity() {
        for rotation in Rotation::ALL {
            assert_eq!(rotation.cw().ccw(), rotation);
            assert_eq!(rotation.ccw().cw(), rotation);
        }
    }

    #[test]
    fn ids_cover_one_through_seven() {
        let mut ids: Vec<u8> = ShapeKind::ALL.iter().map(|k| k.id()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    }
}
