use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, ClientSession, Collection, Database, IndexModel,
    bson::{DateTime, Document, doc},
    error::Error as MongoError,
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::{establish_connection, ping},
    error::{MongoDaoError, MongoResult, commit_outcome_unknown, is_duplicate_key},
    models::{
        CATALOG_COLLECTION_NAME, GAME_COLLECTION_NAME, MongoCatalogDocument, MongoGameDocument,
        MongoUserDocument, USER_COLLECTION_NAME, doc_id,
    },
};
use crate::{
    dao::{
        game_store::WhoSaysStore,
        models::{CatalogEntryEntity, GameEntity, GameOrder, GameQuery, UserEntity},
        storage::StorageResult,
    },
    state::{game::SayerCategory, state_machine::GameStatus},
};

#[derive(Clone)]
pub struct MongoStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        ping(&database)
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = establish_connection(&self.config).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = establish_connection(&config).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;
        let indexes: [(&'static str, &'static str, Document, bool); 4] = [
            (USER_COLLECTION_NAME, "user_name_idx", doc! {"name": 1}, true),
            (
                CATALOG_COLLECTION_NAME,
                "catalog_category_idx",
                doc! {"sayer_category": 1, "created_at": -1},
                false,
            ),
            (
                GAME_COLLECTION_NAME,
                "game_status_points_idx",
                doc! {"status": 1, "points": -1},
                false,
            ),
            (
                GAME_COLLECTION_NAME,
                "game_user_status_idx",
                doc! {"user_id": 1, "status": 1},
                false,
            ),
        ];

        for (collection, index, keys, unique) in indexes {
            let model = IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(Some(index.to_owned()))
                        .unique(Some(unique))
                        .build(),
                )
                .build();

            database
                .collection::<Document>(collection)
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index,
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn client(&self) -> Client {
        let guard = self.inner.state.read().await;
        guard.client.clone()
    }

    async fn users(&self) -> Collection<MongoUserDocument> {
        self.database().await.collection(USER_COLLECTION_NAME)
    }

    async fn catalog(&self) -> Collection<MongoCatalogDocument> {
        self.database().await.collection(CATALOG_COLLECTION_NAME)
    }

    async fn games(&self) -> Collection<MongoGameDocument> {
        self.database().await.collection(GAME_COLLECTION_NAME)
    }

    async fn insert_user(&self, user: UserEntity) -> MongoResult<()> {
        let name = user.name.clone();
        let document: MongoUserDocument = user.into();

        self.users()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| {
                if is_duplicate_key(&source) {
                    MongoDaoError::DuplicateUser { name }
                } else {
                    MongoDaoError::SaveUser { name, source }
                }
            })?;

        Ok(())
    }

    async fn find_one_user(&self, filter: Document) -> MongoResult<Option<UserEntity>> {
        self.users()
            .await
            .find_one(filter)
            .await
            .map_err(|source| MongoDaoError::LoadUsers { source })?
            .map(UserEntity::try_from)
            .transpose()
    }

    async fn find_many_users(
        &self,
        filter: Document,
        sort: Document,
    ) -> MongoResult<Vec<UserEntity>> {
        let documents: Vec<MongoUserDocument> = self
            .users()
            .await
            .find(filter)
            .sort(sort)
            .await
            .map_err(|source| MongoDaoError::LoadUsers { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadUsers { source })?;

        documents.into_iter().map(UserEntity::try_from).collect()
    }

    async fn list_users_with_email(&self) -> MongoResult<Vec<UserEntity>> {
        let users = self
            .find_many_users(
                doc! {"email": {"$nin": [null, ""]}},
                doc! {"name": 1},
            )
            .await?;

        Ok(users
            .into_iter()
            .filter(|user| user.reminder_address().is_some())
            .collect())
    }

    async fn insert_catalog_entry(&self, entry: CatalogEntryEntity) -> MongoResult<()> {
        let id = entry.id;
        let document: MongoCatalogDocument = entry.into();

        self.catalog()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveCatalogEntry { id, source })?;

        Ok(())
    }

    async fn find_catalog_entry(
        &self,
        category: SayerCategory,
    ) -> MongoResult<Option<CatalogEntryEntity>> {
        let load_err = |source| MongoDaoError::LoadCatalogEntry {
            category: category.as_str(),
            source,
        };

        self.catalog()
            .await
            .find_one(doc! {"sayer_category": category.as_str()})
            .sort(doc! {"created_at": -1})
            .await
            .map_err(load_err)?
            .map(CatalogEntryEntity::try_from)
            .transpose()
    }

    async fn insert_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();

        self.games()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;

        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        self.games()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?
            .map(GameEntity::try_from)
            .transpose()
    }

    async fn list_games(&self, query: GameQuery) -> MongoResult<Vec<GameEntity>> {
        let mut filter = Document::new();
        if let Some(status) = query.status {
            filter.insert("status", status.as_str());
        }
        if let Some(user_id) = query.user_id {
            filter.insert("user_id", user_id.to_string());
        }

        let sort = match query.order {
            GameOrder::Created => doc! {"created_at": 1, "_id": 1},
            GameOrder::PointsDesc => doc! {"points": -1, "created_at": 1},
        };

        let collection = self.games().await;
        let mut find = collection.find(filter).sort(sort);
        if let Some(limit) = query.limit {
            find = find.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let documents: Vec<MongoGameDocument> = find
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        documents.into_iter().map(GameEntity::try_from).collect()
    }

    async fn transition_game(
        &self,
        id: Uuid,
        from: GameStatus,
        to: GameStatus,
    ) -> MongoResult<Option<GameEntity>> {
        self.games()
            .await
            .find_one_and_update(
                doc! {"_id": id.to_string(), "status": from.as_str()},
                doc! {"$set": {"status": to.as_str(), "updated_at": DateTime::now()}},
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::UpdateGame { id, source })?
            .map(GameEntity::try_from)
            .transpose()
    }

    async fn record_win(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let tx_err = |source: MongoError| MongoDaoError::Transaction { id, source };

        let client = self.client().await;
        let games = self.games().await;
        let users = self.users().await;

        let mut session = client.start_session().await.map_err(tx_err)?;
        session.start_transaction().await.map_err(tx_err)?;

        let outcome: MongoResult<Option<GameEntity>> = async {
            let Some(document) = games
                .find_one_and_update(
                    doc! {"_id": id.to_string(), "status": GameStatus::New.as_str()},
                    doc! {"$set": {"status": GameStatus::Won.as_str(), "updated_at": DateTime::now()}},
                )
                .return_document(ReturnDocument::After)
                .session(&mut session)
                .await
                .map_err(tx_err)?
            else {
                return Ok(None);
            };
            let game = GameEntity::try_from(document)?;

            let credited = users
                .update_one(
                    doc_id(game.user_id),
                    doc! {"$inc": {"points_earned": i64::from(game.points)}},
                )
                .session(&mut session)
                .await
                .map_err(tx_err)?;
            if credited.matched_count != 1 {
                return Err(MongoDaoError::MissingOwner {
                    game_id: id,
                    user_id: game.user_id,
                });
            }

            Ok(Some(game))
        }
        .await;

        match outcome {
            Ok(Some(game)) => {
                commit_win(&mut session, id).await?;
                Ok(Some(game))
            }
            Ok(None) => {
                session.abort_transaction().await.map_err(tx_err)?;
                Ok(None)
            }
            Err(err) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    warn!(game_id = %id, error = %abort_err, "failed to abort win transaction");
                }
                Err(err)
            }
        }
    }
}

const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Commit the win, sending the commit again while its outcome is unknown.
async fn commit_win(session: &mut ClientSession, id: Uuid) -> MongoResult<()> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match session.commit_transaction().await {
            Ok(()) => return Ok(()),
            Err(err) if commit_outcome_unknown(&err) && attempts < MAX_COMMIT_ATTEMPTS => {
                warn!(game_id = %id, attempts, error = %err, "win commit outcome unknown; committing again");
            }
            Err(source) => return Err(MongoDaoError::Transaction { id, source }),
        }
    }
}

impl WhoSaysStore for MongoStore {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_user(user).await.map_err(Into::into) })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_one_user(doc_id(id)).await.map_err(Into::into) })
    }

    fn find_user_by_name(
        &self,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one_user(doc! {"name": name})
                .await
                .map_err(Into::into)
        })
    }

    fn find_users(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
            store
                .find_many_users(doc! {"_id": {"$in": ids}}, doc! {"name": 1})
                .await
                .map_err(Into::into)
        })
    }

    fn list_users_with_email(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_users_with_email().await.map_err(Into::into) })
    }

    fn list_ranked_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many_users(
                    doc! {"points_earned": {"$gt": 0}},
                    doc! {"points_earned": -1, "name": 1},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn insert_catalog_entry(
        &self,
        entry: CatalogEntryEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_catalog_entry(entry).await.map_err(Into::into) })
    }

    fn find_catalog_entry(
        &self,
        category: SayerCategory,
    ) -> BoxFuture<'static, StorageResult<Option<CatalogEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_catalog_entry(category).await.map_err(Into::into) })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn list_games(&self, query: GameQuery) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games(query).await.map_err(Into::into) })
    }

    fn transition_game(
        &self,
        id: Uuid,
        from: GameStatus,
        to: GameStatus,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .transition_game(id, from, to)
                .await
                .map_err(Into::into)
        })
    }

    fn record_win(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.record_win(id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
