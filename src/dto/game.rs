use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::GameEntity,
    dto::{format_system_time, validation::validate_user_name},
    state::{game::SayerCategory, state_machine::GameStatus},
};

/// Payload used to start a new game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct NewGameRequest {
    /// Registered player starting the game.
    #[validate(custom(function = "validate_user_name"))]
    pub user_name: String,
    /// Category to draw the saying from; defaults to `ACTOR`.
    #[serde(default)]
    pub sayer_category: SayerCategory,
    /// Hints to buy up front, each one lowering the reward.
    #[serde(default)]
    #[validate(range(min = 0, max = 5, message = "Number of hints must be between 0 and 5"))]
    pub num_hints: i64,
}

/// A guess naming the sayer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MakeMoveRequest {
    /// Compared verbatim with the answer; anything else loses the game.
    pub guess: String,
}

/// Player-facing view of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GameSnapshot {
    pub game_id: Uuid,
    /// Owner of the game.
    pub user_name: String,
    pub status: GameStatus,
    /// Prompt the player has to attribute.
    pub saying: String,
    /// Revealed hint sentences joined with a space.
    pub hints: String,
    /// Reward credited on a win.
    pub points_possible: u32,
    /// Outcome of the request in plain words.
    pub message: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl GameSnapshot {
    /// Build the view of `game` owned by `user_name`.
    pub fn new(game: &GameEntity, user_name: &str, message: impl Into<String>) -> Self {
        Self {
            game_id: game.id,
            user_name: user_name.to_owned(),
            status: game.status,
            saying: game.saying.clone(),
            hints: game.hints.join(" "),
            points_possible: game.points,
            message: message.into(),
            created_at: format_system_time(game.created_at),
        }
    }
}

/// Several games of one player.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameListResponse {
    /// Matching games.
    pub games: Vec<GameSnapshot>,
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;

    #[test]
    fn snapshot_joins_hints_and_formats_timestamp() {
        let created_at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let game = GameEntity {
            id: Uuid::nil(),
            user_id: Uuid::new_v4(),
            sayer: "Keanu Reeves".into(),
            saying: "I'm thinking they'll know.".into(),
            sayer_category: SayerCategory::Actor,
            status: GameStatus::New,
            num_hints: 2,
            hints: vec![
                "The year it was said: 1999.".into(),
                "The genre or industry in which it was said: Film.".into(),
            ],
            points: 72,
            created_at,
            updated_at: created_at,
        };

        let snapshot = GameSnapshot::new(&game, "alice", "Time to take a guess!");
        assert_eq!(
            snapshot.hints,
            "The year it was said: 1999. The genre or industry in which it was said: Film."
        );
        assert_eq!(snapshot.points_possible, 72);
        assert_eq!(snapshot.created_at, "2023-11-14T22:13:20Z");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "NEW");
        assert!(json.get("sayer").is_none());
    }

    #[test]
    fn new_game_request_defaults() {
        let request: NewGameRequest = serde_json::from_str(r#"{"user_name": "alice"}"#).unwrap();
        assert_eq!(request.sayer_category, SayerCategory::Actor);
        assert_eq!(request.num_hints, 0);
        assert!(request.validate().is_ok());

        let request: NewGameRequest =
            serde_json::from_str(r#"{"user_name": "alice", "num_hints": 6}"#).unwrap();
        assert!(request.validate().is_err());

        let request: NewGameRequest =
            serde_json::from_str(r#"{"user_name": "alice", "num_hints": 10000000000}"#).unwrap();
        assert!(request.validate().is_err());
    }
}
