//! Fixtures shared by the service tests.

use std::{sync::Arc, time::SystemTime};

use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        game_store::{WhoSaysStore, memory::MemoryStore},
        models::{CatalogEntryEntity, UserEntity},
    },
    services::mailer::{Mailer, testing::RecordingMailer},
    state::{
        AppState, SharedState,
        game::{SayerCategory, join_hints},
    },
};

pub const SAYER: &str = "Keanu Reeves";

/// State backed by a fresh in-memory store and a recording mailer.
pub async fn memory_state() -> (SharedState, MemoryStore, RecordingMailer) {
    memory_state_with(AppConfig::default(), RecordingMailer::default()).await
}

pub async fn memory_state_with(
    config: AppConfig,
    mailer: RecordingMailer,
) -> (SharedState, MemoryStore, RecordingMailer) {
    let store = MemoryStore::new();
    let state = AppState::new(config, Arc::new(mailer.clone()) as Arc<dyn Mailer>);
    state
        .install_store(Arc::new(store.clone()) as Arc<dyn WhoSaysStore>)
        .await;
    (state, store, mailer)
}

pub async fn seed_user(store: &MemoryStore, name: &str, email: Option<&str>) -> UserEntity {
    let user = UserEntity::new(name.to_owned(), email.map(str::to_owned));
    WhoSaysStore::insert_user(store, user.clone()).await.unwrap();
    user
}

pub async fn seed_catalog(store: &MemoryStore, category: SayerCategory) {
    let hints: Vec<String> = ["1999", "Film", "Male", "Movie", "K.R."]
        .into_iter()
        .map(String::from)
        .collect();
    let entry = CatalogEntryEntity {
        id: Uuid::new_v4(),
        sayer_category: category,
        sayer: SAYER.into(),
        saying: "I'm thinking they'll know.".into(),
        hints: join_hints(&hints),
        created_at: SystemTime::now(),
    };
    WhoSaysStore::insert_catalog_entry(store, entry)
        .await
        .unwrap();
}
