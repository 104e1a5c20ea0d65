//! Line-clear scoring and the speed curve

/// Points for clearing 0..=4 lines at once, before the level multiplier.
const LINE_POINTS: [u64; 5] = [0, 40, 100, 300, 1200];

/// Ticks per gravity step on a fresh board.
pub const BASE_GRAVITY_TICKS: u32 = 20;

const MAX_LEVEL: u32 = 21;

/// Score and line accounting for one session. Level and gravity speed
/// are both derived from the line total, so this is the single place
/// the difficulty curve lives.
#[derive(Debug, Clone, Copy, Default)]
pub struct Score {
    pub points: u64,
    pub lines: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level multiplier: one step per 4 lines, capped at 21.
    pub fn level(&self) -> u32 {
        MAX_LEVEL.min(1 + self.lines / 4)
    }

    /// Ticks between gravity steps. Shrinks as lines accumulate, floor-
    /// clamped so it never reaches zero.
    pub fn gravity_interval(&self) -> u64 {
        u64::from(BASE_GRAVITY_TICKS.saturating_sub(self.lines / 4).max(1))
    }

    /// Record `cleared` simultaneous lines. The multiplier in effect
    /// before these lines are counted is the one that applies; a
    /// perfect clear doubles the reward. Returns the points awarded.
    pub fn add_clear(&mut self, cleared: usize, perfect: bool) -> u64 {
        let mut awarded = LINE_POINTS[cleared.min(4)] * u64::from(self.level());
        if perfect {
            awarded *= 2;
        }
        self.points += awarded;
        self.lines += cleared as u32;
        awarded
    }
}
