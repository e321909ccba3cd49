use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dao::models::{CatalogEntryEntity, GameEntity, UserEntity},
    state::{game::SayerCategory, state_machine::GameStatus},
};

use super::error::MongoDaoError;

/// Collection names.
pub const USER_COLLECTION_NAME: &str = "users";
pub const CATALOG_COLLECTION_NAME: &str = "catalog";
pub const GAME_COLLECTION_NAME: &str = "games";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    email: Option<String>,
    points_earned: i64,
    created_at: DateTime,
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            email: value.email,
            points_earned: i64::try_from(value.points_earned).unwrap_or(i64::MAX),
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoUserDocument> for UserEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoUserDocument) -> Result<Self, Self::Error> {
        let id = parse_id(USER_COLLECTION_NAME, &value.id)?;
        let points_earned =
            u64::try_from(value.points_earned).map_err(|_| MongoDaoError::InvalidDocument {
                collection: USER_COLLECTION_NAME,
                id: value.id.clone(),
                reason: format!("negative points_earned {}", value.points_earned),
            })?;

        Ok(Self {
            id,
            name: value.name,
            email: value.email,
            points_earned,
            created_at: value.created_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCatalogDocument {
    #[serde(rename = "_id")]
    id: String,
    sayer_category: SayerCategory,
    sayer: String,
    saying: String,
    hints: String,
    created_at: DateTime,
}

impl From<CatalogEntryEntity> for MongoCatalogDocument {
    fn from(value: CatalogEntryEntity) -> Self {
        Self {
            id: value.id.to_string(),
            sayer_category: value.sayer_category,
            sayer: value.sayer,
            saying: value.saying,
            hints: value.hints,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoCatalogDocument> for CatalogEntryEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoCatalogDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(CATALOG_COLLECTION_NAME, &value.id)?,
            sayer_category: value.sayer_category,
            sayer: value.sayer,
            saying: value.saying,
            hints: value.hints,
            created_at: value.created_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: String,
    user_id: String,
    sayer: String,
    saying: String,
    sayer_category: SayerCategory,
    status: GameStatus,
    num_hints: i32,
    #[serde(default)]
    hints: Vec<String>,
    points: i64,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            sayer: value.sayer,
            saying: value.saying,
            sayer_category: value.sayer_category,
            status: value.status,
            num_hints: i32::from(value.num_hints),
            hints: value.hints,
            points: i64::from(value.points),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoGameDocument> for GameEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoGameDocument) -> Result<Self, Self::Error> {
        let invalid = |reason: String| MongoDaoError::InvalidDocument {
            collection: GAME_COLLECTION_NAME,
            id: value.id.clone(),
            reason,
        };
        let num_hints = u8::try_from(value.num_hints)
            .map_err(|_| invalid(format!("num_hints out of range: {}", value.num_hints)))?;
        let points = u32::try_from(value.points)
            .map_err(|_| invalid(format!("points out of range: {}", value.points)))?;

        Ok(Self {
            id: parse_id(GAME_COLLECTION_NAME, &value.id)?,
            user_id: parse_id(GAME_COLLECTION_NAME, &value.user_id)?,
            sayer: value.sayer,
            saying: value.saying,
            sayer_category: value.sayer_category,
            status: value.status,
            num_hints,
            hints: value.hints,
            points,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

fn parse_id(collection: &'static str, raw: &str) -> Result<Uuid, MongoDaoError> {
    Uuid::parse_str(raw).map_err(|err| MongoDaoError::InvalidDocument {
        collection,
        id: raw.to_owned(),
        reason: err.to_string(),
    })
}

/// Filter matching the document with identifier `id`.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}
