use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle status of a single game.
///
/// A game starts in [`GameStatus::New`] and moves exactly once to one of the
/// terminal statuses. There is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// The game is waiting for a guess.
    New,
    /// The player named the right sayer.
    Won,
    /// The player guessed wrong.
    Lost,
    /// The player gave up before guessing.
    Cancelled,
}

/// Events that can be applied to a game status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The submitted guess matches the sayer.
    CorrectGuess,
    /// The submitted guess does not match the sayer.
    WrongGuess,
    /// The player cancels the game.
    Cancel,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The status the game was in when the event was received.
    pub from: GameStatus,
    /// The event that cannot be applied from this status.
    pub event: GameEvent,
}

impl GameStatus {
    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::New)
    }

    /// Compute the status reached by applying `event`.
    pub fn apply(self, event: GameEvent) -> Result<GameStatus, InvalidTransition> {
        match (self, event) {
            (GameStatus::New, GameEvent::CorrectGuess) => Ok(GameStatus::Won),
            (GameStatus::New, GameEvent::WrongGuess) => Ok(GameStatus::Lost),
            (GameStatus::New, GameEvent::Cancel) => Ok(GameStatus::Cancelled),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }

    /// Stored representation, matching the serde encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::New => "NEW",
            GameStatus::Won => "WON",
            GameStatus::Lost => "LOST",
            GameStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_EVENTS: [GameEvent; 3] = [
        GameEvent::CorrectGuess,
        GameEvent::WrongGuess,
        GameEvent::Cancel,
    ];

    #[test]
    fn new_game_reaches_every_terminal_status() {
        assert_eq!(
            GameStatus::New.apply(GameEvent::CorrectGuess),
            Ok(GameStatus::Won)
        );
        assert_eq!(
            GameStatus::New.apply(GameEvent::WrongGuess),
            Ok(GameStatus::Lost)
        );
        assert_eq!(
            GameStatus::New.apply(GameEvent::Cancel),
            Ok(GameStatus::Cancelled)
        );
    }

    #[test]
    fn terminal_statuses_reject_every_event() {
        for from in [GameStatus::Won, GameStatus::Lost, GameStatus::Cancelled] {
            assert!(from.is_terminal());
            for event in ALL_EVENTS {
                let err = from.apply(event).unwrap_err();
                assert_eq!(err, InvalidTransition { from, event });
            }
        }
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let encoded = serde_json::to_string(&GameStatus::Cancelled).unwrap();
        assert_eq!(encoded, "\"CANCELLED\"");
        let decoded: GameStatus = serde_json::from_str("\"WON\"").unwrap();
        assert_eq!(decoded, GameStatus::Won);
        assert_eq!(GameStatus::Lost.to_string(), "LOST");
    }
}
