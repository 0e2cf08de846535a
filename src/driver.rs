//! Clock and command forwarding around a [`Game`].
//!
//! The driver owns the gravity timer and the hold-to-repeat timer. Both are
//! advanced by the caller with elapsed wall time, so the same logic runs
//! under a terminal loop or a test.
//!
//! Terminals differ in whether they report key releases. A hold therefore
//! also ends when no press (or auto-repeat) has refreshed it within the
//! release timeout.

use std::time::Duration;

use crate::config::DriverConfig;
use crate::game::{Game, GameEvent, GameSnapshot, GameState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
    Reset,
}

impl Command {
    fn repeats(self) -> bool {
        matches!(self, Command::MoveLeft | Command::MoveRight | Command::SoftDrop)
    }
}

#[derive(Clone, Copy, Debug)]
struct Hold {
    command: Command,
    since_repeat: Duration,
    since_press: Duration,
}

pub struct Driver {
    game: Game,
    config: DriverConfig,
    gravity: Duration,
    hold: Option<Hold>,
    paused: bool,
}

impl Driver {
    pub fn new(game: Game, config: DriverConfig) -> Self {
        Self {
            game,
            config,
            gravity: Duration::ZERO,
            hold: None,
            paused: false,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.game.snapshot()
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.game.take_events()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pausing only applies to a running game.
    pub fn toggle_pause(&mut self) {
        if self.game.state() != GameState::Running {
            return;
        }
        self.paused = !self.paused;
        self.hold = None;
    }

    pub fn press(&mut self, command: Command) {
        if command == Command::Reset {
            self.game.reset();
            self.paused = false;
            self.gravity = Duration::ZERO;
            self.hold = None;
            return;
        }
        if self.paused {
            return;
        }

        // Auto-repeat of the key already held only keeps the hold alive.
        if let Some(hold) = self.hold.as_mut() {
            if hold.command == command {
                hold.since_press = Duration::ZERO;
                return;
            }
        }

        self.apply(command);
        self.hold = command.repeats().then_some(Hold {
            command,
            since_repeat: Duration::ZERO,
            since_press: Duration::ZERO,
        });
    }

    pub fn release(&mut self, command: Command) {
        if self.hold.is_some_and(|hold| hold.command == command) {
            self.hold = None;
        }
    }

    /// Runs held-key repeats and gravity for `elapsed` wall time.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.paused || self.game.state() != GameState::Running {
            self.hold = None;
            return;
        }

        self.advance_hold(elapsed);

        self.gravity += elapsed;
        while self.gravity >= self.config.tick_interval {
            self.gravity -= self.config.tick_interval;
            self.game.tick();
            if self.game.state() != GameState::Running {
                self.gravity = Duration::ZERO;
                break;
            }
        }
    }

    /// Time until the next gravity tick is due.
    pub fn until_next_tick(&self) -> Duration {
        self.config.tick_interval.saturating_sub(self.gravity)
    }

    fn advance_hold(&mut self, elapsed: Duration) {
        let Some(mut hold) = self.hold else {
            return;
        };

        // Repeats only run for the part of `elapsed` before the hold lapses.
        let live = elapsed.min(self.config.release_timeout.saturating_sub(hold.since_press));
        hold.since_repeat += live;
        while hold.since_repeat >= self.config.repeat_interval {
            hold.since_repeat -= self.config.repeat_interval;
            self.apply(hold.command);
        }

        hold.since_press += elapsed;
        self.hold = (hold.since_press < self.config.release_timeout).then_some(hold);
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::MoveLeft => {
                self.game.move_horizontal(-1);
            }
            Command::MoveRight => {
                self.game.move_horizontal(1);
            }
            Command::Rotate => {
                self.game.rotate();
            }
            Command::SoftDrop => self.game.tick(),
            Command::HardDrop => self.game.hard_drop(),
            Command::Reset => self.game.reset(),
        }
    }
}
