use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use axum_valid::{Valid, ValidRejection};

use crate::{
    dto::{
        common::MessageResponse,
        user::{CreateUserRequest, RankingsResponse},
    },
    error::AppError,
    services::{score_service, user_service},
    state::SharedState,
};

/// Player registration and leaderboard.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/user", post(create_user))
        .route("/users/rankings", get(get_user_rankings))
}

/// Register a player under a unique name.
#[utoipa::path(
    post,
    path = "/user",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = MessageResponse),
        (status = 400, description = "Invalid user name or email"),
        (status = 409, description = "User name already taken")
    )
)]
pub async fn create_user(
    State(state): State<SharedState>,
    payload: Result<Valid<Json<CreateUserRequest>>, ValidRejection<JsonRejection>>,
) -> Result<Json<MessageResponse>, AppError> {
    let Valid(Json(payload)) = payload?;
    Ok(Json(user_service::create_user(&state, payload).await?))
}

/// Players with points, best first.
#[utoipa::path(
    get,
    path = "/users/rankings",
    tag = "users",
    responses(
        (status = 200, description = "User rankings", body = RankingsResponse),
        (status = 404, description = "No user has points yet")
    )
)]
pub async fn get_user_rankings(
    State(state): State<SharedState>,
) -> Result<Json<RankingsResponse>, AppError> {
    Ok(Json(score_service::get_user_rankings(&state).await?))
}
