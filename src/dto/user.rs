use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dao::models::UserEntity, dto::validation::validate_user_name};

/// Registration payload for a new player.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Unique player name.
    #[validate(custom(function = "validate_user_name"))]
    pub user_name: String,
    /// Address used for reminders about unfinished games.
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
}

/// One line of the user leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserRanking {
    pub name: String,
    /// Points credited by won games.
    pub points_earned: u64,
}

impl From<UserEntity> for UserRanking {
    fn from(user: UserEntity) -> Self {
        Self {
            name: user.name,
            points_earned: user.points_earned,
        }
    }
}

/// Users with points, best first.
#[derive(Debug, Serialize, ToSchema)]
pub struct RankingsResponse {
    pub rankings: Vec<UserRanking>,
}
