//! In-memory store used by tests and by deployments without a database.

use std::{cmp::Reverse, collections::HashMap, sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    dao::{
        game_store::WhoSaysStore,
        models::{CatalogEntryEntity, GameEntity, GameOrder, GameQuery, UserEntity},
        storage::{StorageError, StorageResult},
    },
    state::{game::SayerCategory, state_machine::GameStatus},
};

/// Store keeping every table in process memory.
///
/// Locks are always taken games first, users second.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<Uuid, UserEntity>>>,
    catalog: Arc<RwLock<Vec<CatalogEntryEntity>>>,
    games: Arc<RwLock<IndexMap<Uuid, GameEntity>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn insert_user(&self, user: UserEntity) -> StorageResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.name == user.name) {
            return Err(StorageError::conflict("user", user.name));
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StorageResult<Option<UserEntity>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_user_by_name(&self, name: &str) -> StorageResult<Option<UserEntity>> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.name == name).cloned())
    }

    async fn find_users(&self, ids: &[Uuid]) -> StorageResult<Vec<UserEntity>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn list_users_with_email(&self) -> StorageResult<Vec<UserEntity>> {
        let users = self.users.read().await;
        let mut result: Vec<UserEntity> = users
            .values()
            .filter(|user| user.reminder_address().is_some())
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn list_ranked_users(&self) -> StorageResult<Vec<UserEntity>> {
        let users = self.users.read().await;
        let mut result: Vec<UserEntity> = users
            .values()
            .filter(|user| user.points_earned > 0)
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            b.points_earned
                .cmp(&a.points_earned)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(result)
    }

    async fn insert_catalog_entry(&self, entry: CatalogEntryEntity) -> StorageResult<()> {
        let mut catalog = self.catalog.write().await;
        catalog.push(entry);
        Ok(())
    }

    async fn find_catalog_entry(
        &self,
        category: SayerCategory,
    ) -> StorageResult<Option<CatalogEntryEntity>> {
        let catalog = self.catalog.read().await;
        Ok(catalog
            .iter()
            .filter(|entry| entry.sayer_category == category)
            .max_by_key(|entry| entry.created_at)
            .cloned())
    }

    async fn insert_game(&self, game: GameEntity) -> StorageResult<()> {
        let mut games = self.games.write().await;
        if games.contains_key(&game.id) {
            return Err(StorageError::conflict("game", game.id.to_string()));
        }
        games.insert(game.id, game);
        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> StorageResult<Option<GameEntity>> {
        let games = self.games.read().await;
        Ok(games.get(&id).cloned())
    }

    async fn list_games(&self, query: &GameQuery) -> StorageResult<Vec<GameEntity>> {
        let games = self.games.read().await;
        let mut result: Vec<GameEntity> = games
            .values()
            .filter(|game| query.matches(game))
            .cloned()
            .collect();

        if query.order == GameOrder::PointsDesc {
            result.sort_by_key(|game| Reverse(game.points));
        }
        if let Some(limit) = query.limit {
            result.truncate(limit);
        }
        Ok(result)
    }

    async fn transition_game(
        &self,
        id: Uuid,
        from: GameStatus,
        to: GameStatus,
    ) -> StorageResult<Option<GameEntity>> {
        let mut games = self.games.write().await;
        let Some(game) = games.get_mut(&id) else {
            return Ok(None);
        };
        if game.status != from {
            return Ok(None);
        }
        game.status = to;
        game.updated_at = SystemTime::now();
        Ok(Some(game.clone()))
    }

    async fn record_win(&self, id: Uuid) -> StorageResult<Option<GameEntity>> {
        let mut games = self.games.write().await;
        let mut users = self.users.write().await;

        let Some(game) = games.get_mut(&id) else {
            return Ok(None);
        };
        if game.status != GameStatus::New {
            return Ok(None);
        }
        // Check the owner before touching the game so a failure leaves both untouched.
        let Some(user) = users.get_mut(&game.user_id) else {
            return Err(StorageError::Integrity {
                message: format!("owner `{}` of game `{id}` is missing", game.user_id),
            });
        };

        user.points_earned += u64::from(game.points);
        game.status = GameStatus::Won;
        game.updated_at = SystemTime::now();
        Ok(Some(game.clone()))
    }
}

impl WhoSaysStore for MemoryStore {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_user(user).await })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user(id).await })
    }

    fn find_user_by_name(
        &self,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user_by_name(&name).await })
    }

    fn find_users(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_users(&ids).await })
    }

    fn list_users_with_email(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_users_with_email().await })
    }

    fn list_ranked_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_ranked_users().await })
    }

    fn insert_catalog_entry(
        &self,
        entry: CatalogEntryEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_catalog_entry(entry).await })
    }

    fn find_catalog_entry(
        &self,
        category: SayerCategory,
    ) -> BoxFuture<'static, StorageResult<Option<CatalogEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_catalog_entry(category).await })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await })
    }

    fn list_games(&self, query: GameQuery) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games(&query).await })
    }

    fn transition_game(
        &self,
        id: Uuid,
        from: GameStatus,
        to: GameStatus,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.transition_game(id, from, to).await })
    }

    fn record_win(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.record_win(id).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn game_for(user_id: Uuid, points: u32) -> GameEntity {
        let now = SystemTime::now();
        GameEntity {
            id: Uuid::new_v4(),
            user_id,
            sayer: "Keanu Reeves".into(),
            saying: "Whoa.".into(),
            sayer_category: SayerCategory::Actor,
            status: GameStatus::New,
            num_hints: 0,
            hints: Vec::new(),
            points,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_user_names_conflict() {
        let store = MemoryStore::new();
        store
            .insert_user(UserEntity::new("alice".into(), None))
            .await
            .unwrap();

        let err = store
            .insert_user(UserEntity::new("alice".into(), Some("a@example.com".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { entity: "user", .. }));
    }

    #[tokio::test]
    async fn newest_catalog_entry_wins_lookup() {
        let store = MemoryStore::new();
        let older = CatalogEntryEntity {
            id: Uuid::new_v4(),
            sayer_category: SayerCategory::Singer,
            sayer: "Old".into(),
            saying: "old saying".into(),
            hints: String::new(),
            created_at: SystemTime::UNIX_EPOCH,
        };
        let newer = CatalogEntryEntity {
            id: Uuid::new_v4(),
            sayer: "New".into(),
            created_at: SystemTime::UNIX_EPOCH + Duration::from_secs(60),
            ..older.clone()
        };
        store.insert_catalog_entry(newer.clone()).await.unwrap();
        store.insert_catalog_entry(older).await.unwrap();

        let found = store.find_catalog_entry(SayerCategory::Singer).await.unwrap();
        assert_eq!(found, Some(newer));
        assert!(
            store
                .find_catalog_entry(SayerCategory::Author)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn record_win_credits_owner_once() {
        let store = MemoryStore::new();
        let user = UserEntity::new("bob".into(), None);
        let game = game_for(user.id, 72);
        store.insert_user(user.clone()).await.unwrap();
        store.insert_game(game.clone()).await.unwrap();

        let won = store.record_win(game.id).await.unwrap().unwrap();
        assert_eq!(won.status, GameStatus::Won);
        assert!(store.record_win(game.id).await.unwrap().is_none());

        let user = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(user.points_earned, 72);
    }

    #[tokio::test]
    async fn record_win_without_owner_leaves_game_untouched() {
        let store = MemoryStore::new();
        let game = game_for(Uuid::new_v4(), 85);
        store.insert_game(game.clone()).await.unwrap();

        assert!(store.record_win(game.id).await.is_err());
        let stored = store.find_game(game.id).await.unwrap().unwrap();
        assert_eq!(stored.status, GameStatus::New);
    }

    #[tokio::test]
    async fn transition_requires_expected_status() {
        let store = MemoryStore::new();
        let game = game_for(Uuid::new_v4(), 85);
        store.insert_game(game.clone()).await.unwrap();

        let lost = store
            .transition_game(game.id, GameStatus::New, GameStatus::Lost)
            .await
            .unwrap();
        assert_eq!(lost.map(|g| g.status), Some(GameStatus::Lost));

        let again = store
            .transition_game(game.id, GameStatus::New, GameStatus::Cancelled)
            .await
            .unwrap();
        assert!(again.is_none());
        assert!(
            store
                .transition_game(Uuid::new_v4(), GameStatus::New, GameStatus::Lost)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn list_games_filters_orders_and_limits() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        for (user, points) in [(owner, 38), (other, 85), (owner, 72), (owner, 4)] {
            store.insert_game(game_for(user, points)).await.unwrap();
        }

        let mine = store.list_games(&GameQuery::for_user(owner)).await.unwrap();
        assert_eq!(
            mine.iter().map(|g| g.points).collect::<Vec<_>>(),
            vec![38, 72, 4]
        );

        let top = store
            .list_games(
                &GameQuery::with_status(GameStatus::New)
                    .order(GameOrder::PointsDesc)
                    .limit(Some(2)),
            )
            .await
            .unwrap();
        assert_eq!(
            top.iter().map(|g| g.points).collect::<Vec<_>>(),
            vec![85, 72]
        );
    }

    #[tokio::test]
    async fn rankings_skip_users_without_points() {
        let store = MemoryStore::new();
        let mut carol = UserEntity::new("carol".into(), None);
        carol.points_earned = 10;
        let mut dave = UserEntity::new("dave".into(), None);
        dave.points_earned = 80;
        let erin = UserEntity::new("erin".into(), Some("   ".into()));
        for user in [carol, dave, erin] {
            store.insert_user(user).await.unwrap();
        }

        let ranked = store.list_ranked_users().await.unwrap();
        assert_eq!(
            ranked.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(),
            vec!["dave", "carol"]
        );
        assert!(store.list_users_with_email().await.unwrap().is_empty());
    }
}
