//! Driver timing: gravity, pause, and hold-to-repeat.

use std::time::Duration;

use blockfall::config::{DriverConfig, GameConfig};
use blockfall::driver::{Command, Driver};
use blockfall::game::{Game, GameEvent, GameState};
use blockfall::piece::Position;
use blockfall::shape::TetrominoType;
use blockfall::spawner::SequencePieceProvider;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn driver(config: DriverConfig) -> Driver {
    let game = Game::with_provider(
        GameConfig::default(),
        Box::new(SequencePieceProvider::new(vec![TetrominoType::O])),
    );
    Driver::new(game, config)
}

/// Slow gravity so only held keys move the piece.
fn input_config(release_timeout: u64) -> DriverConfig {
    DriverConfig {
        tick_interval: Duration::from_secs(60),
        repeat_interval: ms(100),
        release_timeout: ms(release_timeout),
    }
}

fn started(config: DriverConfig) -> Driver {
    let mut driver = driver(config);
    driver.press(Command::Reset);
    driver.take_events();
    driver
}

fn position(driver: &Driver) -> Position {
    driver.game().active().expect("piece in play").position
}

// ============================================================================
// Gravity
// ============================================================================

mod gravity {
    use super::*;

    #[test]
    fn ticks_once_per_interval() {
        let mut driver = started(DriverConfig::default());

        driver.advance(ms(499));
        assert_eq!(position(&driver).y, 0);

        driver.advance(ms(1));
        assert_eq!(position(&driver).y, 1);

        driver.advance(ms(1500));
        assert_eq!(position(&driver).y, 4);
    }

    #[test]
    fn reports_time_until_next_tick() {
        let mut driver = started(DriverConfig::default());

        driver.advance(ms(200));

        assert_eq!(driver.until_next_tick(), ms(300));
    }

    #[test]
    fn idle_before_start() {
        let mut driver = driver(DriverConfig::default());

        driver.advance(ms(5_000));

        assert_eq!(driver.game().state(), GameState::Ready);
        assert!(driver.take_events().is_empty());
    }

    #[test]
    fn pause_stops_gravity() {
        let mut driver = started(DriverConfig::default());

        driver.toggle_pause();
        driver.advance(ms(2_000));
        assert!(driver.is_paused());
        assert_eq!(position(&driver).y, 0);

        driver.toggle_pause();
        driver.advance(ms(500));
        assert_eq!(position(&driver).y, 1);
    }

    #[test]
    fn commands_ignored_while_paused() {
        let mut driver = started(DriverConfig::default());
        driver.toggle_pause();

        driver.press(Command::MoveLeft);
        driver.press(Command::HardDrop);

        assert_eq!(position(&driver), Position::new(4, 0));
        assert_eq!(driver.game().board().total_filled_cells(), 0);
    }

    #[test]
    fn pause_has_no_effect_before_start() {
        let mut driver = driver(DriverConfig::default());

        driver.toggle_pause();

        assert!(!driver.is_paused());
    }

    #[test]
    fn gravity_stops_at_game_over() {
        let mut driver = started(DriverConfig {
            tick_interval: ms(1),
            ..DriverConfig::default()
        });

        // Plenty of ticks to stack O pieces to the top
        driver.advance(ms(10_000));

        assert_eq!(driver.game().state(), GameState::GameOver);
        let events = driver.take_events();
        assert_eq!(events.last(), Some(&GameEvent::GameOver));

        driver.advance(ms(10_000));
        assert!(driver.take_events().is_empty());
    }

    #[test]
    fn reset_restarts_and_unpauses() {
        let mut driver = started(DriverConfig::default());
        driver.press(Command::HardDrop);
        driver.toggle_pause();

        driver.press(Command::Reset);

        assert!(!driver.is_paused());
        assert_eq!(driver.game().board().total_filled_cells(), 0);
        assert_eq!(driver.game().state(), GameState::Running);
    }
}

// ============================================================================
// Hold-to-repeat
// ============================================================================

mod hold {
    use super::*;

    #[test]
    fn press_moves_once_immediately() {
        let mut driver = started(input_config(1_000));

        driver.press(Command::MoveLeft);

        assert_eq!(position(&driver), Position::new(3, 0));
    }

    #[test]
    fn held_key_repeats_on_its_own_interval() {
        let mut driver = started(input_config(1_000));

        driver.press(Command::MoveLeft);
        driver.advance(ms(250));

        assert_eq!(position(&driver), Position::new(1, 0));
    }

    #[test]
    fn release_stops_repeat() {
        let mut driver = started(input_config(1_000));

        driver.press(Command::MoveRight);
        driver.advance(ms(100));
        driver.release(Command::MoveRight);
        driver.advance(ms(500));

        assert_eq!(position(&driver), Position::new(6, 0));
    }

    #[test]
    fn auto_repeat_press_only_refreshes_hold() {
        let mut driver = started(input_config(1_000));

        driver.press(Command::MoveLeft);
        driver.press(Command::MoveLeft);
        driver.press(Command::MoveLeft);

        assert_eq!(position(&driver), Position::new(3, 0));
    }

    #[test]
    fn hold_lapses_without_refresh() {
        let mut driver = started(input_config(150));

        driver.press(Command::MoveLeft);
        driver.advance(ms(100));
        assert_eq!(position(&driver), Position::new(2, 0));

        driver.advance(ms(100));
        driver.advance(ms(500));
        assert_eq!(position(&driver), Position::new(2, 0));
    }

    #[test]
    fn refreshed_hold_keeps_repeating() {
        let mut driver = started(input_config(150));

        driver.press(Command::MoveLeft);
        for _ in 0..3 {
            driver.advance(ms(100));
            driver.press(Command::MoveLeft);
        }

        assert_eq!(position(&driver), Position::new(0, 0));
    }

    #[test]
    fn held_move_stops_at_wall() {
        let mut driver = started(input_config(10_000));

        driver.press(Command::MoveLeft);
        driver.advance(ms(2_000));

        assert_eq!(position(&driver), Position::new(0, 0));
    }

    #[test]
    fn new_direction_replaces_hold() {
        let mut driver = started(input_config(1_000));

        driver.press(Command::MoveLeft);
        driver.press(Command::MoveRight);
        driver.advance(ms(200));

        // left once, right once, then two right repeats
        assert_eq!(position(&driver), Position::new(6, 0));
    }

    #[test]
    fn held_soft_drop_repeats_ticks() {
        let mut driver = started(input_config(1_000));

        driver.press(Command::SoftDrop);
        driver.advance(ms(300));

        assert_eq!(position(&driver).y, 4);
    }

    #[test]
    fn rotate_does_not_repeat() {
        let mut driver = started(input_config(1_000));
        let before = driver.game().active().copied();

        driver.press(Command::Rotate);
        driver.advance(ms(1_000));

        // O is rotation invariant; only one rotation event was produced
        let rotations = driver
            .take_events()
            .into_iter()
            .filter(|e| *e == GameEvent::PieceRotated)
            .count();
        assert_eq!(rotations, 1);
        assert_eq!(driver.game().active().copied(), before);
    }

    #[test]
    fn hard_drop_locks_immediately() {
        let mut driver = started(input_config(1_000));

        driver.press(Command::HardDrop);

        assert_eq!(driver.game().board().total_filled_cells(), 4);
        assert!(driver.take_events().contains(&GameEvent::PieceLocked));
    }
}
