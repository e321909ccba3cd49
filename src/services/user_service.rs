use tracing::info;

use crate::{
    dao::{game_store::WhoSaysStore, models::UserEntity, storage::StorageError},
    dto::{common::MessageResponse, user::CreateUserRequest},
    error::ServiceError,
    state::SharedState,
};

const USER_EXISTS: &str = "A User with that name already exists!";
const USER_MISSING: &str = "A User with that name does not exist!";

/// Register a player under a unique name.
pub async fn create_user(
    state: &SharedState,
    request: CreateUserRequest,
) -> Result<MessageResponse, ServiceError> {
    let store = state.require_store().await?;

    let CreateUserRequest { user_name, email } = request;
    let email = email
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty());
    let user = UserEntity::new(user_name, email);
    let user_name = user.name.clone();

    match store.insert_user(user).await {
        Ok(()) => {
            info!(user = %user_name, "user created");
            Ok(MessageResponse::new(format!("User {user_name} created!")))
        }
        Err(StorageError::Conflict { .. }) => Err(ServiceError::Conflict(USER_EXISTS.into())),
        Err(err) => Err(err.into()),
    }
}

/// Resolve a user by name or fail with the player-facing not-found message.
pub(crate) async fn require_user(
    store: &dyn WhoSaysStore,
    name: &str,
) -> Result<UserEntity, ServiceError> {
    store
        .find_user_by_name(name.to_owned())
        .await?
        .ok_or_else(|| ServiceError::NotFound(USER_MISSING.into()))
}
