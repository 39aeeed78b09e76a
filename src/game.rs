//! Game flow: splash, menu, instructions, the run itself and the lose screen.
//!
//! [`GameState`] owns every piece of mutable game data. The main loop calls
//! [`GameState::update`] exactly once per tick with fully resolved inputs and
//! only reads the state afterwards to render it.

use crate::{
    config::{
        GameConfig,
        LANES,
    },
    input::{
        EncoderDelta,
        Inputs,
    },
    obstacles::{
        Advance,
        ObstacleField,
        SPAWN_RANGE,
    },
    rng::Rng,
};

/// Screen the game is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ui {
    Boot,
    Menu,
    Info,
    Play,
    Lose,
}

/// Menu entries, top to bottom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuItem {
    #[default]
    StartGame,
    Info,
}

/// Per-run data, reset every time a new run starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Session {
    /// Car position, `0..LANES`.
    pub lane: usize,
    /// Ticks survived.
    pub score: u32,
    /// Ticks between advances; shrinks as the run goes on.
    pub tick_threshold: u32,
    /// Ticks since the last advance.
    pub frame: u32,
}

impl Session {
    /// Middle lane, zero score, slowest advance window.
    pub const fn new(config: &GameConfig) -> Self {
        Self {
            lane: LANES / 2,
            score: 0,
            tick_threshold: config.initial_tick_threshold,
            frame: 0,
        }
    }
}

/// Everything the game knows, advanced once per tick by [`GameState::update`].
pub struct GameState {
    config: GameConfig,
    ui: Ui,
    cursor: MenuItem,
    /// Vertical offset of the instructions text, in pixels.
    scroll: i16,
    session: Session,
    field: ObstacleField,
    rng: Rng,
}

impl GameState {
    /// Start at the boot splash with an empty road.
    pub const fn new(config: GameConfig, seed: u32) -> Self {
        Self {
            config,
            ui: Ui::Boot,
            cursor: MenuItem::StartGame,
            scroll: 0,
            session: Session::new(&config),
            field: ObstacleField::new(),
            rng: Rng::new(seed),
        }
    }

    /// Screen currently shown.
    pub const fn ui(&self) -> Ui {
        self.ui
    }

    /// Highlighted menu entry.
    pub const fn cursor(&self) -> MenuItem {
        self.cursor
    }

    /// Offset of the instructions text, `scroll_floor..=0`.
    pub const fn scroll(&self) -> i16 {
        self.scroll
    }

    /// Current or most recent run.
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Road ahead of the car.
    pub const fn field(&self) -> &ObstacleField {
        &self.field
    }

    /// Tuning in use.
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Advance the game by one tick.
    pub fn update(&mut self, inputs: &Inputs) {
        match self.ui {
            // The splash hold happens in the main loop before the first tick.
            Ui::Boot => self.enter(Ui::Menu),
            Ui::Menu => self.update_menu(inputs),
            Ui::Info => self.update_info(inputs),
            Ui::Play => self.update_play(inputs),
            Ui::Lose => self.update_lose(inputs),
        }
    }

    fn enter(&mut self, next: Ui) {
        info!("{} -> {}", self.ui, next);
        self.ui = next;
    }

    fn update_menu(&mut self, inputs: &Inputs) {
        match inputs.encoder {
            EncoderDelta::Positive => self.cursor = MenuItem::Info,
            EncoderDelta::Negative => self.cursor = MenuItem::StartGame,
            EncoderDelta::Zero => {}
        }

        if !inputs.confirm {
            return;
        }

        match self.cursor {
            MenuItem::StartGame => self.start_run(),
            MenuItem::Info => {
                self.scroll = 0;
                self.enter(Ui::Info);
            }
        }
    }

    fn update_info(&mut self, inputs: &Inputs) {
        let step = self.config.scroll_step;
        self.scroll = match inputs.encoder {
            EncoderDelta::Positive => self.scroll.saturating_sub(step),
            EncoderDelta::Negative => self.scroll.saturating_add(step),
            EncoderDelta::Zero => self.scroll,
        }
        .clamp(self.config.scroll_floor, 0);

        if inputs.confirm {
            self.back_to_menu();
        }
    }

    fn update_play(&mut self, inputs: &Inputs) {
        self.session.score = self.session.score.saturating_add(1);
        self.session.frame += 1;

        if self.session.frame >= self.session.tick_threshold {
            self.session.frame = 0;
            let outcome = self.field.advance(self.session.lane, self.rng.range(SPAWN_RANGE));
            self.speed_up();
            debug!(
                "advance: threshold {} score {}",
                self.session.tick_threshold,
                self.session.score
            );

            if outcome == Advance::Collision {
                info!("hit in lane {}", self.session.lane);
                self.enter(Ui::Lose);
                return;
            }
        }

        let lane = match inputs.encoder {
            // The device is held rotated, so clockwise steers toward lane 0.
            EncoderDelta::Positive => self.session.lane.saturating_sub(1),
            EncoderDelta::Negative => (self.session.lane + 1).min(LANES - 1),
            EncoderDelta::Zero => return,
        };
        self.session.lane = lane;

        if self.field.blocks(lane) {
            info!("steered into lane {}", lane);
            self.enter(Ui::Lose);
        }
    }

    fn update_lose(&mut self, inputs: &Inputs) {
        if inputs.confirm {
            self.back_to_menu();
        }
    }

    fn start_run(&mut self) {
        self.session = Session::new(&self.config);
        self.field.clear();
        self.enter(Ui::Play);
    }

    fn back_to_menu(&mut self) {
        self.scroll = 0;
        self.cursor = MenuItem::StartGame;
        self.enter(Ui::Menu);
    }

    fn speed_up(&mut self) {
        let before = self.session.tick_threshold;
        self.session.tick_threshold = self.config.shrink(before);
        if self.session.tick_threshold == self.config.min_tick_threshold
            && before != self.session.tick_threshold
        {
            warn!("advance window reached its floor of {} ticks", self.session.tick_threshold);
        }
    }
}

#[cfg(test)]
impl GameState {
    pub(crate) fn field_mut(&mut self) -> &mut ObstacleField {
        &mut self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::{
            EdgeDetector,
            EncoderTracker,
        },
        obstacles::PLAYER_ROW,
    };

    const IDLE: Inputs = Inputs::turn(EncoderDelta::Zero);
    const CW: Inputs = Inputs::turn(EncoderDelta::Positive);
    const CCW: Inputs = Inputs::turn(EncoderDelta::Negative);
    const PRESS: Inputs = Inputs::press();

    fn in_menu() -> GameState {
        let mut game = GameState::new(GameConfig::DEFAULT, 7);
        game.update(&IDLE);
        assert_eq!(game.ui(), Ui::Menu);
        game
    }

    fn playing() -> GameState {
        let mut game = in_menu();
        game.update(&PRESS);
        assert_eq!(game.ui(), Ui::Play);
        game
    }

    #[test]
    fn boot_moves_to_menu_whatever_the_input() {
        let mut game = GameState::new(GameConfig::DEFAULT, 1);
        assert_eq!(game.ui(), Ui::Boot);
        game.update(&PRESS);
        assert_eq!(game.ui(), Ui::Menu);
        assert_eq!(game.cursor(), MenuItem::StartGame);
    }

    #[test]
    fn starting_a_run_resets_the_session() {
        let mut game = playing();
        game.session.score = 99;
        game.session.lane = 0;
        game.session.tick_threshold = 40;
        game.field.set(1, 2, true);
        game.ui = Ui::Menu;

        game.update(&PRESS);
        assert_eq!(game.ui(), Ui::Play);
        assert_eq!(
            *game.session(),
            Session {
                lane: 1,
                score: 0,
                tick_threshold: 180,
                frame: 0,
            }
        );
        assert_eq!(game.field().count(), 0);
    }

    #[test]
    fn first_advance_lands_after_threshold_ticks() {
        let mut game = playing();
        for _ in 0..179 {
            game.update(&IDLE);
        }
        assert_eq!(game.session().tick_threshold, 180);

        game.update(&IDLE);
        assert_eq!(game.ui(), Ui::Play);
        assert_eq!(game.session().score, 180);
        assert_eq!(game.session().frame, 0);
        assert_eq!(game.session().tick_threshold, 176);
        assert_eq!(game.field().row(PLAYER_ROW), [false; LANES]);
        assert!(game.field().count() <= 1);
    }

    #[test]
    fn steering_into_an_obstacle_loses_immediately() {
        let mut game = playing();
        game.field.set(PLAYER_ROW, 0, true);
        game.update(&CW);
        let score = game.session().score;
        assert_eq!(game.ui(), Ui::Lose);
        assert_eq!(game.session().lane, 0);

        for _ in 0..10 {
            game.update(&IDLE);
        }
        assert_eq!(game.session().score, score);
    }

    #[test]
    fn obstacle_shifting_onto_the_car_loses() {
        let mut game = playing();
        game.field.set(PLAYER_ROW - 1, 1, true);
        game.session.frame = game.session.tick_threshold - 1;

        game.update(&IDLE);
        assert_eq!(game.ui(), Ui::Lose);
        let score = game.session().score;
        game.update(&IDLE);
        assert_eq!(game.session().score, score);
    }

    #[test]
    fn lane_clamps_at_both_edges() {
        let mut game = playing();
        for _ in 0..5 {
            game.update(&CW);
        }
        assert_eq!(game.session().lane, 0);
        for _ in 0..5 {
            game.update(&CCW);
        }
        assert_eq!(game.session().lane, LANES - 1);
        assert_eq!(game.ui(), Ui::Play);
    }

    #[test]
    fn threshold_never_increases_and_stays_positive() {
        let mut game = playing();
        let mut previous = game.session().tick_threshold;
        for _ in 0..20_000 {
            // Keep the car out of the way of whatever spawns.
            for lane in 0..LANES {
                game.field.set(PLAYER_ROW - 1, lane, false);
            }
            game.update(&IDLE);
            let threshold = game.session().tick_threshold;
            assert!(threshold <= previous);
            assert!(threshold >= game.config().min_tick_threshold);
            previous = threshold;
        }
        assert_eq!(game.ui(), Ui::Play);
        assert_eq!(previous, game.config().min_tick_threshold);
    }

    #[test]
    fn menu_cursor_moves_once_per_encoder_change() {
        let mut game = in_menu();
        let mut tracker = EncoderTracker::new();
        tracker.update(0);

        for position in [1, 1, 1] {
            game.update(&Inputs::turn(tracker.update(position)));
            assert_eq!(game.cursor(), MenuItem::Info);
        }

        game.update(&Inputs::turn(tracker.update(0)));
        assert_eq!(game.cursor(), MenuItem::StartGame);
    }

    #[test]
    fn fast_spin_moves_car_one_lane() {
        let mut game = playing();
        let mut tracker = EncoderTracker::new();
        tracker.update(0);
        game.update(&Inputs::turn(tracker.update(-6)));
        assert_eq!(game.session().lane, 2);
    }

    #[test]
    fn held_confirm_starts_exactly_one_run() {
        let mut game = in_menu();
        let mut button = EdgeDetector::new();
        let mut entered_play = 0;

        for _ in 0..5 {
            let before = game.ui();
            let inputs = Inputs {
                confirm: button.update(true),
                ..IDLE
            };
            game.update(&inputs);
            if before != Ui::Play && game.ui() == Ui::Play {
                entered_play += 1;
            }
        }

        assert_eq!(entered_play, 1);
        assert_eq!(game.ui(), Ui::Play);
        assert_eq!(game.session().score, 4);
    }

    #[test]
    fn info_scroll_clamps_at_the_floor() {
        let mut game = in_menu();
        game.update(&CW);
        game.update(&PRESS);
        assert_eq!(game.ui(), Ui::Info);
        assert_eq!(game.scroll(), 0);

        for _ in 0..5 {
            game.update(&CW);
        }
        assert_eq!(game.scroll(), -20);

        for _ in 0..40 {
            game.update(&CW);
        }
        assert_eq!(game.scroll(), -112);

        for _ in 0..40 {
            game.update(&CCW);
        }
        assert_eq!(game.scroll(), 0);
    }

    #[test]
    fn leaving_info_resets_scroll_and_cursor() {
        let mut game = in_menu();
        game.update(&CW);
        game.update(&PRESS);
        game.update(&CW);
        game.update(&PRESS);

        assert_eq!(game.ui(), Ui::Menu);
        assert_eq!(game.cursor(), MenuItem::StartGame);
        assert_eq!(game.scroll(), 0);
    }

    #[test]
    fn lose_waits_for_confirm() {
        let mut game = playing();
        game.field.set(PLAYER_ROW, 0, true);
        game.update(&CW);
        assert_eq!(game.ui(), Ui::Lose);

        game.update(&CCW);
        assert_eq!(game.ui(), Ui::Lose);

        game.update(&PRESS);
        assert_eq!(game.ui(), Ui::Menu);
        assert_eq!(game.cursor(), MenuItem::StartGame);
    }
}
