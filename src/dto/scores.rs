use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::state::{game::SayerCategory, state_machine::GameStatus};

/// Outcome of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ScoreReport {
    /// Owner of the game.
    pub user_name: String,
    pub status: GameStatus,
    /// Reward attached to the game.
    pub points: u32,
}

/// Score reports of several games.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoresResponse {
    pub scores: Vec<ScoreReport>,
}

/// Won games, best first.
#[derive(Debug, Serialize, ToSchema)]
pub struct HighScoresResponse {
    pub high_scores: Vec<ScoreReport>,
}

/// Query string of `/games/highscores`.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct HighScoresQuery {
    /// Maximum number of results; absent or 0 returns every won game.
    #[validate(range(min = 0))]
    pub number_of_results: Option<i64>,
}

/// How a player approached one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GameAnalysis {
    pub user_name: String,
    pub sayer_category: SayerCategory,
    /// Hints bought when the game started.
    pub hints_purchased: u8,
    pub game_status: GameStatus,
}

/// Analysis of every game, grouped by player.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameAnalysisResponse {
    pub analysis: Vec<GameAnalysis>,
}
