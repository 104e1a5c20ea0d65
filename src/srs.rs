//! Super Rotation System (SRS) wall kick data
//!
//! When a rotation collides in place, these offsets are tried in order
//! until one fits. Tables are keyed by the (from, to) rotation pair;
//! the I piece has its own table and the O piece never kicks. The
//! no-offset attempt is implicit and is not stored here.

use crate::tetromino::{Rotation, ShapeKind};

/// One candidate kick, (dx, dy) with y growing down the board.
pub type Kick = (i32, i32);

const NO_ENTRY: &[Kick] = &[];

// Standard SRS values with vertical components negated for the y-down
// frame. Indexed [from][to]; only adjacent states carry entries, since
// 180-degree turns are performed as two quarter turns.
#[rustfmt::skip]
static COMMON_KICKS: [[&[Kick]; 4]; 4] = [
    // from North
    [NO_ENTRY,
     &[(-1, 0), (-1, -1), (0, 2), (-1, 2)],   // -> East
     NO_ENTRY,
     &[(1, 0), (1, -1), (0, 2), (1, 2)]],     // -> West
    // from East
    [&[(1, 0), (1, 1), (0, -2), (1, -2)],     // -> North
     NO_ENTRY,
     &[(1, 0), (1, 1), (0, -2), (1, -2)],     // -> South
     NO_ENTRY],
    // from South
    [NO_ENTRY,
     &[(-1, 0), (-1, -1), (0, 2), (-1, 2)],   // -> East
     NO_ENTRY,
     &[(1, 0), (1, -1), (0, 2), (1, 2)]],     // -> West
    // from West
    [&[(-1, 0), (-1, 1), (0, -2), (-1, -2)],  // -> North
     NO_ENTRY,
     &[(-1, 0), (-1, 1), (0, -2), (-1, -2)],  // -> South
     NO_ENTRY],
];

#[rustfmt::skip]
static I_KICKS: [[&[Kick]; 4]; 4] = [
    // from North
    [NO_ENTRY,
     &[(-2, 0), (1, 0), (-2, 1), (1, -2)],    // -> East
     NO_ENTRY,
     &[(-1, 0), (2, 0), (-1, -2), (2, 1)]],   // -> West
    // from East
    [&[(2, 0), (-1, 0), (2, -1), (-1, 2)],    // -> North
     NO_ENTRY,
     &[(-1, 0), (2, 0), (-1, -2), (2, 1)],    // -> South
     NO_ENTRY],
    // from South
    [NO_ENTRY,
     &[(1, 0), (-2, 0), (1, 2), (-2, -1)],    // -> East
     NO_ENTRY,
     &[(2, 0), (-1, 0), (2, -1), (-1, 2)]],   // -> West
    // from West
    [&[(1, 0), (-2, 0), (1, 2), (-2, -1)],    // -> North
     NO_ENTRY,
     &[(-2, 0), (1, 0), (-2, 1), (1, -2)],    // -> South
     NO_ENTRY],
];

/// Kick candidates for rotating `kind` from one state to an adjacent one.
///
/// The returned slice does not include the implicit (0, 0) attempt. The
/// O piece always gets an empty slice: its four states are identical, so
/// the in-place attempt is the whole search.
pub fn wall_kicks(kind: ShapeKind, from: Rotation, to: Rotation) -> &'static [Kick] {
    match kind {
        ShapeKind::O => NO_ENTRY,
        ShapeKind::I => I_KICKS[from.index()][to.index()],
        _ => COMMON_KICKS[from.index()][to.index()],
    }
}

/// Every (from, to) pair the rotation logic can request: each state to
/// its two neighbors.
pub fn reachable_transitions() -> impl Iterator<Item = (Rotation, Rotation)> {
    Rotation::ALL
        .into_iter()
        .flat_map(|from| [(from, from.cw()), (from, from.ccw())])
}

/// Startup check that both tables cover every reachable transition.
///
/// A gap here is a build-data bug, not a gameplay situation, so this
/// panics rather than threading an error through every rotation. Run
/// once when a session is created.
pub fn verify_tables() {
    for (from, to) in reachable_transitions() {
        assert!(
            !wall_kicks(ShapeKind::T, from, to).is_empty(),
            "wall-kick table has no entry for {from:?} -> {to:?}"
        );
        assert!(
            !wall_kicks(ShapeKind::I, from, to).is_empty(),
            "I-piece wall-kick table has no entry for {from:?} -> {to:?}"
        );
    }
}
