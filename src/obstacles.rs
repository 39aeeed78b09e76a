//! The 4×3 obstacle grid.
//!
//! Row 0 is the farthest from the car, row 3 is level with it. Every advance
//! moves the whole field one row closer and spawns at most one new obstacle
//! in row 0.

use crate::config::{
    DEPTH_ROWS,
    LANES,
};

/// Row the car drives in.
pub const PLAYER_ROW: usize = DEPTH_ROWS - 1;

/// Upper bound (exclusive) of the spawn draw. Draws below [`LANES`] name the
/// lane that gets an obstacle, the rest leave the row empty.
pub const SPAWN_RANGE: u32 = 2 * LANES as u32;

/// Outcome of one advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum Advance {
    Clear,
    /// An obstacle reached the car's lane.
    Collision,
}

/// Obstacles between the horizon (row 0) and the car (row [`PLAYER_ROW`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObstacleField {
    grid: [[bool; LANES]; DEPTH_ROWS],
}

impl ObstacleField {
    /// Empty road.
    pub const fn new() -> Self {
        Self {
            grid: [[false; LANES]; DEPTH_ROWS],
        }
    }

    /// Remove every obstacle.
    pub fn clear(&mut self) {
        self.grid = [[false; LANES]; DEPTH_ROWS];
    }

    /// Out-of-range cells read as empty.
    #[must_use]
    pub fn has(&self, row: usize, lane: usize) -> bool {
        self.grid
            .get(row)
            .and_then(|r| r.get(lane))
            .copied()
            .unwrap_or(false)
    }

    /// Place or remove one obstacle. Out-of-range cells are ignored.
    pub fn set(&mut self, row: usize, lane: usize, obstacle: bool) {
        if let Some(cell) = self.grid.get_mut(row).and_then(|r| r.get_mut(lane)) {
            *cell = obstacle;
        }
    }

    /// An obstacle is already level with the car in `lane`.
    #[must_use]
    pub fn blocks(&self, lane: usize) -> bool {
        self.has(PLAYER_ROW, lane)
    }

    /// One depth row, left lane first.
    #[must_use]
    pub fn row(&self, row: usize) -> [bool; LANES] {
        self.grid.get(row).copied().unwrap_or([false; LANES])
    }

    /// Obstacles on the road.
    #[must_use]
    pub fn count(&self) -> usize {
        self.grid.iter().flatten().filter(|&&cell| cell).count()
    }

    /// Move every row one step toward the car, check `lane` for a hit, then
    /// spawn the new far row from `draw` (expected in `0..SPAWN_RANGE`).
    pub fn advance(&mut self, lane: usize, draw: u32) -> Advance {
        self.grid.copy_within(..PLAYER_ROW, 1);
        self.grid[0] = [false; LANES];

        let outcome = if self.blocks(lane) {
            Advance::Collision
        } else {
            Advance::Clear
        };

        if let Some(cell) = self.grid[0].get_mut(draw as usize) {
            *cell = true;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;

    #[test]
    fn advance_shifts_rows_toward_player() {
        let mut field = ObstacleField::new();
        field.set(0, 2, true);
        field.set(1, 0, true);

        assert_eq!(field.advance(1, 5), Advance::Clear);
        assert_eq!(field.row(0), [false; LANES]);
        assert_eq!(field.row(1), [false, false, true]);
        assert_eq!(field.row(2), [true, false, false]);
        assert_eq!(field.row(3), [false; LANES]);
    }

    #[test]
    fn draw_below_lane_count_spawns_in_that_lane() {
        for lane in 0..LANES {
            let mut field = ObstacleField::new();
            let _ = field.advance(1, lane as u32);
            assert!(field.has(0, lane));
            assert_eq!(field.count(), 1);
        }
    }

    #[test]
    fn draw_past_lane_count_leaves_row_empty() {
        for draw in LANES as u32..SPAWN_RANGE {
            let mut field = ObstacleField::new();
            let _ = field.advance(1, draw);
            assert_eq!(field.count(), 0);
        }
    }

    #[test]
    fn obstacle_reaching_car_lane_collides() {
        let mut field = ObstacleField::new();
        field.set(2, 1, true);
        assert_eq!(field.advance(1, 5), Advance::Collision);

        let mut field = ObstacleField::new();
        field.set(2, 0, true);
        assert_eq!(field.advance(1, 5), Advance::Clear);
        assert!(field.blocks(0));
    }

    #[test]
    fn obstacle_in_player_row_drops_off() {
        let mut field = ObstacleField::new();
        field.set(PLAYER_ROW, 1, true);
        assert_eq!(field.advance(0, 5), Advance::Clear);
        assert_eq!(field.count(), 0);
    }

    #[test]
    fn rows_never_hold_more_than_one_obstacle() {
        let mut field = ObstacleField::new();
        let mut rng = Rng::new(42);
        for _ in 0..500 {
            let _ = field.advance(1, rng.range(SPAWN_RANGE));
            for row in 0..DEPTH_ROWS {
                assert!(field.row(row).iter().filter(|&&c| c).count() <= 1);
            }
        }
    }

    #[test]
    fn out_of_range_cells_are_empty() {
        let mut field = ObstacleField::new();
        field.set(DEPTH_ROWS, 0, true);
        field.set(0, LANES, true);
        assert_eq!(field.count(), 0);
        assert!(!field.has(DEPTH_ROWS, 0));
    }
}
