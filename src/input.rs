//! Input sampling: keypad matrix scan, encoder steps and confirm-button edges.
//!
//! Everything here runs once per tick from the main loop and produces a fresh
//! [`Inputs`] value. Nothing is buffered between ticks except the edge
//! detectors' previous levels and the encoder's previous position.

use embedded_hal::{
    delay::DelayNs,
    digital::{
        InputPin,
        OutputPin,
    },
};

use crate::config::COLUMN_SETTLE_US;

/// Keypad columns, driven one at a time.
pub const COLUMNS: usize = 4;
/// Keypad rows, read while a column is driven.
pub const ROWS: usize = 3;
/// Keys on the matrix.
pub const KEY_COUNT: usize = COLUMNS * ROWS;

/// Anything that can report the encoder's accumulated position.
pub trait EncoderPosition {
    /// Current position in detents. Only the change between calls matters.
    fn position(&mut self) -> i32;
}

/// Direction of encoder movement since the previous tick.
///
/// Several detents within one tick still count as a single step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderDelta {
    Negative,
    #[default]
    Zero,
    Positive,
}

impl EncoderDelta {
    #[must_use]
    pub const fn from_change(change: i32) -> Self {
        if change > 0 {
            Self::Positive
        } else if change < 0 {
            Self::Negative
        } else {
            Self::Zero
        }
    }
}

/// Turns an absolute encoder position into per-tick steps.
#[derive(Default)]
pub struct EncoderTracker {
    last: Option<i32>,
}

impl EncoderTracker {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// The first sample only sets the baseline.
    pub fn update(&mut self, position: i32) -> EncoderDelta {
        let delta = match self.last {
            Some(last) => EncoderDelta::from_change(position.saturating_sub(last)),
            None => EncoderDelta::Zero,
        };
        self.last = Some(position);
        delta
    }
}

/// Rebuilds a running count from a hardware counter that snaps back to zero
/// whenever it reaches `+span` or `-span`.
///
/// Reads must come often enough that fewer than `span / 2` counts arrive
/// between them.
pub struct CounterUnwrap {
    span: i32,
    last: i32,
    total: i32,
}

impl CounterUnwrap {
    pub const fn new(span: i16) -> Self {
        Self {
            span: span as i32,
            last: 0,
            total: 0,
        }
    }

    /// Feed the raw counter value; returns the total since construction.
    pub fn update(&mut self, raw: i16) -> i32 {
        let raw = i32::from(raw);
        let half = self.span / 2;
        let step = (raw - self.last + half).rem_euclid(self.span) - half;
        self.last = raw;
        self.total = self.total.wrapping_add(step);
        self.total
    }
}

/// Reports a button press exactly once until the button is seen released.
#[derive(Default)]
pub struct EdgeDetector {
    was_pressed: bool,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self { was_pressed: false }
    }

    /// Feed the current level; `true` only on the released → pressed edge.
    pub fn update(&mut self, pressed: bool) -> bool {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        edge
    }
}

/// Snapshot of all twelve keypad keys. Key index is `3 * column + row`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyMatrixState(u16);

impl KeyMatrixState {
    pub const EMPTY: Self = Self(0);

    pub fn set(&mut self, index: usize, pressed: bool) {
        if index >= KEY_COUNT {
            return;
        }
        if pressed {
            self.0 |= 1 << index;
        } else {
            self.0 &= !(1 << index);
        }
    }

    #[must_use]
    pub const fn pressed(&self, index: usize) -> bool {
        index < KEY_COUNT && self.0 & (1 << index) != 0
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Keys down now that were up in `previous`.
    #[must_use]
    pub const fn newly_pressed(&self, previous: Self) -> Self {
        Self(self.0 & !previous.0)
    }

    pub fn iter_pressed(self) -> impl Iterator<Item = usize> {
        (0..KEY_COUNT).filter(move |&i| self.pressed(i))
    }
}

/// Strobe scanner for the 4×3 keypad.
///
/// Columns are outputs driven high one at a time; rows are inputs with
/// pull-downs.
pub struct KeyMatrix<C, R, D> {
    columns: [C; COLUMNS],
    rows: [R; ROWS],
    delay: D,
}

impl<C, R, D> KeyMatrix<C, R, D>
where
    C: OutputPin,
    R: InputPin,
    D: DelayNs,
{
    pub fn new(mut columns: [C; COLUMNS], rows: [R; ROWS], delay: D) -> Self {
        for column in &mut columns {
            column.set_low().ok();
        }
        Self {
            columns,
            rows,
            delay,
        }
    }

    /// Blocks for one settle delay per column. A pin that fails to read
    /// counts as released.
    pub fn scan(&mut self) -> KeyMatrixState {
        let mut state = KeyMatrixState::EMPTY;

        for active in 0..COLUMNS {
            for (i, column) in self.columns.iter_mut().enumerate() {
                if i == active {
                    column.set_high().ok();
                } else {
                    column.set_low().ok();
                }
            }
            self.delay.delay_us(COLUMN_SETTLE_US);

            for (row, pin) in self.rows.iter_mut().enumerate() {
                state.set(ROWS * active + row, pin.is_high().unwrap_or(false));
            }
        }

        for column in &mut self.columns {
            column.set_low().ok();
        }

        state
    }
}

/// Everything the game needs to know about the controls for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inputs {
    pub encoder: EncoderDelta,
    /// The confirm button went down this tick.
    pub confirm: bool,
    pub keys: KeyMatrixState,
    /// Keys that went down this tick.
    pub key_edges: KeyMatrixState,
}

#[cfg(test)]
impl Inputs {
    pub(crate) const fn turn(delta: EncoderDelta) -> Self {
        Self {
            encoder: delta,
            confirm: false,
            keys: KeyMatrixState::EMPTY,
            key_edges: KeyMatrixState::EMPTY,
        }
    }

    pub(crate) const fn press() -> Self {
        Self {
            encoder: EncoderDelta::Zero,
            confirm: true,
            keys: KeyMatrixState::EMPTY,
            key_edges: KeyMatrixState::EMPTY,
        }
    }
}

/// Owns the control hardware and turns raw levels into [`Inputs`].
pub struct InputSampler<C, R, D, E, B> {
    matrix: KeyMatrix<C, R, D>,
    encoder: E,
    tracker: EncoderTracker,
    /// Encoder push-button, active low.
    confirm: B,
    confirm_edge: EdgeDetector,
    last_keys: KeyMatrixState,
}

impl<C, R, D, E, B> InputSampler<C, R, D, E, B>
where
    C: OutputPin,
    R: InputPin,
    D: DelayNs,
    E: EncoderPosition,
    B: InputPin,
{
    pub fn new(matrix: KeyMatrix<C, R, D>, mut encoder: E, confirm: B) -> Self {
        let mut tracker = EncoderTracker::new();
        tracker.update(encoder.position());
        Self {
            matrix,
            encoder,
            tracker,
            confirm,
            confirm_edge: EdgeDetector::new(),
            last_keys: KeyMatrixState::EMPTY,
        }
    }

    pub fn sample(&mut self) -> Inputs {
        let keys = self.matrix.scan();
        let key_edges = keys.newly_pressed(self.last_keys);
        self.last_keys = keys;

        let encoder = self.tracker.update(self.encoder.position());
        let held = self.confirm.is_low().unwrap_or(false);
        let confirm = self.confirm_edge.update(held);

        Inputs {
            encoder,
            confirm,
            keys,
            key_edges,
        }
    }
}
