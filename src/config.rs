//! Timing, geometry and tuning constants.

use palette::Srgb;

// ── Loop timing ─────────────────────────────────────────────────────────────

/// Sleep at the end of every main-loop iteration.
pub const TICK_MS: u64 = 1;

/// Settle time between driving a keypad column and reading its rows.
pub const COLUMN_SETTLE_US: u32 = 1_000;

/// How long the title splash stays up before the menu appears.
pub const SPLASH_HOLD_MS: u64 = 2_000;

/// Encoder counts per mechanical detent.
pub const COUNTS_PER_DETENT: i32 = 4;

// ── Game surface ────────────────────────────────────────────────────────────

/// Width of the monochrome game surface.
pub const FRAME_W: u32 = 128;
/// Height of the monochrome game surface.
pub const FRAME_H: u32 = 64;

/// Splash bitmap origin on the game surface.
pub const SPLASH_X: i32 = 32;
pub const SPLASH_Y: i32 = 0;

// ── Field layout ────────────────────────────────────────────────────────────

/// Distinct distances between the horizon and the car.
pub const DEPTH_ROWS: usize = 4;
/// Player positions across the road.
pub const LANES: usize = 3;
/// One indicator LED per field cell.
pub const INDICATOR_COUNT: usize = DEPTH_ROWS * LANES;

// ── Indicator colours ───────────────────────────────────────────────────────

pub const OBSTACLE_COLOR: Srgb<u8> = Srgb::new(0, 255, 0);
pub const CAR_COLOR: Srgb<u8> = Srgb::new(255, 0, 0);
pub const EMPTY_COLOR: Srgb<u8> = Srgb::new(0, 0, 0);

/// Gameplay tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Ticks between advances at the start of a run.
    pub initial_tick_threshold: u32,
    /// The advance window never shrinks below this many ticks.
    pub min_tick_threshold: u32,
    /// Percentage of the window kept after each advance.
    pub shrink_percent: u32,
    /// Pixels the info text moves per encoder step.
    pub scroll_step: i16,
    /// Lowest scroll offset: text height minus the viewport.
    pub scroll_floor: i16,
}

impl GameConfig {
    pub const DEFAULT: Self = Self {
        initial_tick_threshold: 180,
        min_tick_threshold: 20,
        shrink_percent: 98,
        scroll_step: 4,
        scroll_floor: -14 * 8,
    };

    /// Next advance window after one advance.
    #[must_use]
    pub const fn shrink(&self, threshold: u32) -> u32 {
        let next = threshold * self.shrink_percent / 100;
        if next < self.min_tick_threshold {
            self.min_tick_threshold
        } else {
            next
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrink_follows_ninety_eight_percent() {
        let config = GameConfig::DEFAULT;
        assert_eq!(config.shrink(180), 176);
        assert_eq!(config.shrink(100), 98);
    }

    #[test]
    fn shrink_stops_at_floor() {
        let config = GameConfig::DEFAULT;
        assert_eq!(config.shrink(20), 20);
        assert_eq!(config.shrink(21), 20);

        let mut t = config.initial_tick_threshold;
        for _ in 0..1_000 {
            let next = config.shrink(t);
            assert!(next <= t);
            assert!(next >= config.min_tick_threshold);
            t = next;
        }
        assert_eq!(t, config.min_tick_threshold);
    }
}
