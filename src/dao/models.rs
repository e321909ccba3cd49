use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::state::{
    game::{SayerCategory, split_hints},
    state_machine::GameStatus,
};

/// Registered player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Stable identifier for the user.
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    /// Address used for reminders, if the player gave one.
    pub email: Option<String>,
    /// Sum of the points of every game this user won.
    pub points_earned: u64,
    /// Registration timestamp.
    pub created_at: SystemTime,
}

impl UserEntity {
    /// Build a fresh user with no points.
    pub fn new(name: String, email: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            points_earned: 0,
            created_at: SystemTime::now(),
        }
    }

    /// Email address usable for reminders (present and non-blank).
    pub fn reminder_address(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

/// Reference puzzle used to seed new games.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntryEntity {
    /// Stable identifier for the entry.
    pub id: Uuid,
    /// Category the sayer belongs to.
    pub sayer_category: SayerCategory,
    /// Expected answer.
    pub sayer: String,
    /// Prompt shown to the player.
    pub saying: String,
    /// Hints joined with [`crate::state::game::HINT_DELIMITER`].
    pub hints: String,
    /// Import timestamp; the newest entry of a category wins lookups.
    pub created_at: SystemTime,
}

impl CatalogEntryEntity {
    /// Ordered hint list.
    pub fn hint_list(&self) -> Vec<String> {
        split_hints(&self.hints)
    }
}

/// Aggregate game entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Owner of the game.
    pub user_id: Uuid,
    /// Answer copied from the catalog.
    pub sayer: String,
    /// Prompt copied from the catalog.
    pub saying: String,
    /// Category the game was started with.
    pub sayer_category: SayerCategory,
    /// Lifecycle status.
    pub status: GameStatus,
    /// Number of hints bought.
    pub num_hints: u8,
    /// Hint sentences revealed at creation.
    pub hints: Vec<String>,
    /// Points credited on a win.
    pub points: u32,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last status change.
    pub updated_at: SystemTime,
}

/// Sort order applied to game listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameOrder {
    /// Creation order.
    #[default]
    Created,
    /// Highest points first, ties by creation order.
    PointsDesc,
}

/// Filter and ordering for game listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameQuery {
    /// Keep only games in this status.
    pub status: Option<GameStatus>,
    /// Keep only games owned by this user.
    pub user_id: Option<Uuid>,
    /// Sort order.
    pub order: GameOrder,
    /// Maximum number of games returned.
    pub limit: Option<usize>,
}

impl GameQuery {
    /// Games in the given status.
    pub fn with_status(status: GameStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Games owned by the given user.
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// Restrict to a status.
    pub fn status(mut self, status: GameStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Change the sort order.
    pub fn order(mut self, order: GameOrder) -> Self {
        self.order = order;
        self
    }

    /// Cap the number of results.
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Whether `game` passes the filters (ordering and limit aside).
    pub fn matches(&self, game: &GameEntity) -> bool {
        self.status.is_none_or(|status| game.status == status)
            && self.user_id.is_none_or(|user_id| game.user_id == user_id)
    }
}
