use std::collections::HashSet;

use mongodb::error::{
    Error as MongoError, ErrorKind, TRANSIENT_TRANSACTION_ERROR, UNKNOWN_TRANSACTION_COMMIT_RESULT,
    WriteFailure,
};
use thiserror::Error;
use uuid::Uuid;

/// Server code reported when a unique index rejects a write.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Result alias for MongoDB store operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("user name `{name}` is already taken")]
    DuplicateUser { name: String },
    #[error("failed to save user `{name}`")]
    SaveUser {
        name: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load users")]
    LoadUsers {
        #[source]
        source: MongoError,
    },
    #[error("failed to save catalog entry `{id}`")]
    SaveCatalogEntry {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load catalog entry for `{category}`")]
    LoadCatalogEntry {
        category: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to save game `{id}`")]
    SaveGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load game `{id}`")]
    LoadGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list games")]
    ListGames {
        #[source]
        source: MongoError,
    },
    #[error("failed to update game `{id}`")]
    UpdateGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("win transaction for game `{id}` failed")]
    Transaction {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("owner `{user_id}` of game `{game_id}` is missing")]
    MissingOwner { game_id: Uuid, user_id: Uuid },
    #[error("malformed document `{id}` in collection `{collection}`: {reason}")]
    InvalidDocument {
        collection: &'static str,
        id: String,
        reason: String,
    },
}

impl MongoDaoError {
    /// Whether the failure is a transaction conflict that may pass when the
    /// whole transaction runs again.
    pub fn is_transient(&self) -> bool {
        match self {
            MongoDaoError::Transaction { source, .. } => restarts_transaction(source.labels()),
            _ => false,
        }
    }
}

fn restarts_transaction(labels: &HashSet<String>) -> bool {
    labels.contains(TRANSIENT_TRANSACTION_ERROR)
}

fn retries_commit(labels: &HashSet<String>) -> bool {
    labels.contains(UNKNOWN_TRANSACTION_COMMIT_RESULT)
}

/// Whether the server may have applied a commit that reported an error.
///
/// Only the commit is sent again in that case; rerunning the transaction
/// would miss the writes it already made.
pub fn commit_outcome_unknown(error: &MongoError) -> bool {
    retries_commit(error.labels())
}

/// Whether a write was rejected by a unique index.
pub fn is_duplicate_key(error: &MongoError) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> HashSet<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn unknown_commit_result_only_retries_the_commit() {
        let unknown = labels(&[UNKNOWN_TRANSACTION_COMMIT_RESULT]);
        assert!(retries_commit(&unknown));
        assert!(!restarts_transaction(&unknown));

        let transient = labels(&[TRANSIENT_TRANSACTION_ERROR]);
        assert!(restarts_transaction(&transient));
        assert!(!retries_commit(&transient));

        assert!(!restarts_transaction(&labels(&[])));
    }

    #[test]
    fn only_transaction_failures_are_transient() {
        let err = MongoDaoError::MissingOwner {
            game_id: Uuid::nil(),
            user_id: Uuid::nil(),
        };
        assert!(!err.is_transient());
    }
}
