use serde::{Deserialize, Serialize};

use crate::{
    Direction, Inventory, STARTING_TIME, TIME_WRAP,
    board::{Board, LevelError, MoveOutcome, load_board_from_str},
};

/// Represents the lifecycle of one play session.
///
/// Menu -> Playing <-> Paused; Playing -> GameOver; restart returns to
/// Playing from any in-game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Owns the board, the inventory, and the session counters for one level.
///
/// The front end feeds it discrete directional intents and one
/// [`GameSession::tick_second`] per elapsed wall-clock second; everything
/// else is read-only snapshot access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    level: u32,
    /// Level text retained for restart.
    source: String,
    board: Board,
    inventory: Inventory,
    chips_left: u32,
    time_left: i32,
    phase: Phase,
}

impl GameSession {
    /// Loads a session from level text. The session starts in the menu;
    /// call [`GameSession::start`] to begin play.
    pub fn new(level: u32, source: &str) -> Result<Self, LevelError> {
        let board = load_board_from_str(source)?;
        let chips_left = board.chip_count();
        Ok(GameSession {
            level,
            source: source.to_owned(),
            board,
            inventory: Inventory::new(),
            chips_left,
            time_left: STARTING_TIME,
            phase: Phase::Menu,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn chips_left(&self) -> u32 {
        self.chips_left
    }

    pub fn time_left(&self) -> i32 {
        self.time_left
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// True once every chip has been collected. Tracked for the HUD; the
    /// session deliberately stays in `Playing` (see DESIGN.md).
    pub fn all_chips_collected(&self) -> bool {
        self.chips_left == 0
    }

    /// Leaves the menu and begins play. No-op in any other phase.
    pub fn start(&mut self) {
        if self.phase == Phase::Menu {
            self.phase = Phase::Playing;
        }
    }

    /// Playing <-> Paused. No-op in the menu or after a game over.
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Playing => Phase::Paused,
            Phase::Paused => Phase::Playing,
            other => other,
        };
    }

    /// Forwards one directional intent to the movement engine.
    ///
    /// Returns `None` outside `Playing`: a paused or finished session
    /// absorbs input without ever touching the board.
    pub fn handle_move(&mut self, direction: Direction) -> Option<MoveOutcome> {
        if self.phase != Phase::Playing {
            return None;
        }
        let outcome = self.board.apply_move(direction, &mut self.inventory);
        match outcome {
            MoveOutcome::Moved {
                event: Some(crate::board::MoveEvent::CollectedChip),
            } => {
                self.chips_left = self.chips_left.saturating_sub(1);
            }
            MoveOutcome::Drowned => {
                self.phase = Phase::GameOver;
            }
            _ => {}
        }
        Some(outcome)
    }

    /// Advances the countdown by one elapsed second.
    ///
    /// Only a playing session with chips still uncollected counts down.
    /// A negative value wraps back to [`TIME_WRAP`] instead of ending the
    /// game; the timer pressures the player but never kills them.
    pub fn tick_second(&mut self) {
        if self.phase != Phase::Playing || self.chips_left == 0 {
            return;
        }
        self.time_left -= 1;
        if self.time_left < 0 {
            self.time_left = TIME_WRAP;
        }
    }

    /// Reloads the level from its retained text: board back to its start
    /// layout, inventory emptied, chip and time counters reset, phase
    /// Playing.
    pub fn restart(&mut self) -> Result<(), LevelError> {
        if self.phase == Phase::Menu {
            return Ok(());
        }
        let board = load_board_from_str(&self.source)?;
        self.chips_left = board.chip_count();
        self.board = board;
        self.inventory.clear();
        self.time_left = STARTING_TIME;
        self.phase = Phase::Playing;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Item, KeyColor, Position, board::{BlockReason, MoveEvent}};

    const LEVEL: &str = "#####\n#P*K#\n#.W.#\n#..*#\n#####";

    fn playing_session() -> GameSession {
        let mut session = GameSession::new(1, LEVEL).expect("test level should parse");
        session.start();
        session
    }

    #[test]
    fn starts_in_the_menu_with_level_totals() {
        let session = GameSession::new(1, LEVEL).unwrap();
        assert_eq!(session.phase(), Phase::Menu);
        assert_eq!(session.chips_left(), 2);
        assert_eq!(session.time_left(), STARTING_TIME);
    }

    #[test]
    fn menu_absorbs_moves_until_started() {
        let mut session = GameSession::new(1, LEVEL).unwrap();
        session.handle_move(Direction::Right);
        assert_eq!(session.board().player(), Position::new(1, 1));

        session.start();
        session.handle_move(Direction::Right);
        assert_eq!(session.board().player(), Position::new(2, 1));
    }

    #[test]
    fn collecting_chips_counts_down_to_zero() {
        let mut session = playing_session();
        session.handle_move(Direction::Right);
        assert_eq!(session.chips_left(), 1);
        assert!(!session.all_chips_collected());

        // Around the water to the second chip.
        session.handle_move(Direction::Right);
        session.handle_move(Direction::Down);
        let outcome = session.handle_move(Direction::Down);
        assert_eq!(
            outcome,
            Some(MoveOutcome::Moved {
                event: Some(MoveEvent::CollectedChip)
            })
        );
        assert_eq!(session.chips_left(), 0);
        assert!(session.all_chips_collected());
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn drowning_ends_the_session_without_blocking() {
        let mut session = playing_session();
        session.handle_move(Direction::Right);
        let outcome = session.handle_move(Direction::Down);
        assert_eq!(outcome, Some(MoveOutcome::Drowned));
        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.board().player(), Position::new(2, 2));

        // Further input is absorbed.
        session.handle_move(Direction::Down);
        assert_eq!(session.board().player(), Position::new(2, 2));
    }

    #[test]
    fn pause_gates_moves_and_the_countdown() {
        let mut session = playing_session();
        session.toggle_pause();
        assert!(session.is_paused());

        session.handle_move(Direction::Right);
        session.tick_second();
        assert_eq!(session.board().player(), Position::new(1, 1));
        assert_eq!(session.time_left(), STARTING_TIME);

        session.toggle_pause();
        assert_eq!(session.phase(), Phase::Playing);
        session.tick_second();
        assert_eq!(session.time_left(), STARTING_TIME - 1);
    }

    #[test]
    fn countdown_wraps_instead_of_ending_the_game() {
        let mut session = playing_session();
        for _ in 0..=STARTING_TIME {
            session.tick_second();
        }
        assert_eq!(session.time_left(), TIME_WRAP);
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn countdown_stops_once_every_chip_is_collected() {
        let mut session = playing_session();
        session.handle_move(Direction::Right);
        session.handle_move(Direction::Right);
        session.handle_move(Direction::Down);
        session.handle_move(Direction::Down);
        assert!(session.all_chips_collected());

        let before = session.time_left();
        session.tick_second();
        assert_eq!(session.time_left(), before);
    }

    #[test]
    fn restart_restores_the_level_start_state() {
        let mut session = playing_session();
        session.handle_move(Direction::Right);
        session.handle_move(Direction::Right);
        session.tick_second();
        session.handle_move(Direction::Left);
        session.handle_move(Direction::Down); // into the water
        assert!(session.is_game_over());
        assert_eq!(session.inventory().len(), 1);

        session.restart().unwrap();
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.board().player(), Position::new(1, 1));
        assert!(session.inventory().is_empty());
        assert_eq!(session.chips_left(), 2);
        assert_eq!(session.time_left(), STARTING_TIME);
    }

    #[test]
    fn blocked_moves_leave_counters_untouched() {
        let mut session = playing_session();
        let outcome = session.handle_move(Direction::Up);
        assert_eq!(outcome, Some(MoveOutcome::Blocked(BlockReason::Wall)));
        assert_eq!(session.chips_left(), 2);
        assert!(session.inventory().is_empty());
        assert_eq!(session.board().player(), Position::new(1, 1));
    }

    #[test]
    fn keys_survive_restart_only_as_board_tiles() {
        let mut session = playing_session();
        session.handle_move(Direction::Right);
        session.handle_move(Direction::Right);
        assert!(session.inventory().has_color(KeyColor::Gold));
        assert_eq!(
            session.inventory().iter().last(),
            Some(&Item::Key {
                color: KeyColor::Gold
            })
        );

        session.restart().unwrap();
        assert!(!session.inventory().has_color(KeyColor::Gold));
        assert!(session.board().feature_at(Position::new(3, 1)).is_some());
    }
}
