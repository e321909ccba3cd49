use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::CatalogEntryEntity,
    dto::{catalog::CreateCatalogEntryRequest, common::MessageResponse},
    error::ServiceError,
    state::{
        SharedState,
        game::{HINT_DELIMITER, MAX_HINTS, join_hints},
    },
};

/// Store a new catalog record; it replaces older records of its category for new games.
pub async fn add_entry(
    state: &SharedState,
    request: CreateCatalogEntryRequest,
) -> Result<MessageResponse, ServiceError> {
    let store = state.require_store().await?;

    let CreateCatalogEntryRequest {
        sayer_category,
        sayer,
        saying,
        hints,
    } = request;

    if hints.len() > usize::from(MAX_HINTS) {
        return Err(ServiceError::InvalidInput(format!(
            "At most {MAX_HINTS} hints are allowed"
        )));
    }
    if hints.iter().any(|hint| hint.contains(HINT_DELIMITER)) {
        return Err(ServiceError::InvalidInput(format!(
            "Hints must not contain `{HINT_DELIMITER}`"
        )));
    }

    let entry = CatalogEntryEntity {
        id: Uuid::new_v4(),
        sayer_category,
        sayer,
        saying,
        hints: join_hints(&hints),
        created_at: SystemTime::now(),
    };
    let message = format!("Successfully added {}.", entry.saying);
    let entry_id = entry.id;

    store.insert_catalog_entry(entry).await?;
    info!(entry_id = %entry_id, category = %sayer_category, hints = hints.len(), "catalog entry added");

    Ok(MessageResponse::new(message))
}
