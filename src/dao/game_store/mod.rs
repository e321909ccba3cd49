pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{CatalogEntryEntity, GameEntity, GameQuery, UserEntity};
use crate::dao::storage::StorageResult;
use crate::state::{game::SayerCategory, state_machine::GameStatus};
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for users, the catalog and games.
pub trait WhoSaysStore: Send + Sync {
    /// Insert a user; fails with [`StorageError::Conflict`] when the name is taken.
    ///
    /// [`StorageError::Conflict`]: crate::dao::storage::StorageError::Conflict
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// User by identifier.
    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// User by exact name.
    fn find_user_by_name(
        &self,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Users among `ids`; unknown identifiers are skipped.
    fn find_users(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    /// Users holding a non-empty email address.
    fn list_users_with_email(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    /// Users with points, best first and ties by name.
    fn list_ranked_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;

    /// Store an imported catalog entry.
    fn insert_catalog_entry(
        &self,
        entry: CatalogEntryEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Most recently imported entry of the category.
    fn find_catalog_entry(
        &self,
        category: SayerCategory,
    ) -> BoxFuture<'static, StorageResult<Option<CatalogEntryEntity>>>;

    /// Persist a freshly created game.
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Game by identifier.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Games passing `query`, in its order and limit.
    fn list_games(&self, query: GameQuery) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Move a game from `from` to `to` only if it is still in `from`.
    ///
    /// Returns the updated game, or `None` when the game is missing or was
    /// already moved by someone else.
    fn transition_game(
        &self,
        id: Uuid,
        from: GameStatus,
        to: GameStatus,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Atomically mark a NEW game as WON and credit its owner with its points.
    ///
    /// Either both writes happen or neither does. Returns `None` when the game
    /// is missing or no longer NEW.
    fn record_win(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;

    /// Ping the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Rebuild the connection in place.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
