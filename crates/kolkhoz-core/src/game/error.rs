use crate::game::state::Phase;
use thiserror::Error;

/// Precondition violations reported by engine operations. A rejected
/// operation leaves the game untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("operation requires the {expected} phase but the game is in {actual}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("the game is over")]
    GameOver,
    #[error("expected player {expected} to play next but got player {actual}")]
    OutOfTurn { expected: usize, actual: usize },
    #[error("player {0} is not seated at this table")]
    InvalidPlayer(usize),
    #[error("player {player} has no card at index {index} (hand holds {len})")]
    HandIndexOutOfRange {
        player: usize,
        index: usize,
        len: usize,
    },
    #[error("malformed assignment: {0}")]
    MalformedAssignment(String),
    #[error("unsupported player count {0}")]
    InvalidPlayerCount(usize),
}
