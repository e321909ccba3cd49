use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post, put},
};
use axum_valid::{Valid, ValidRejection};
use uuid::Uuid;

use crate::{
    dto::{
        common::MessageResponse,
        game::{GameListResponse, GameSnapshot, MakeMoveRequest, NewGameRequest},
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes driving a game from creation to its final status.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/game", post(new_game))
        .route("/game/{id}", get(get_game).put(make_move))
        .route("/game/cancel/{id}", put(cancel_game))
        .route("/games/user/{user_name}", get(get_user_games))
}

/// Start a new game for a registered player.
#[utoipa::path(
    post,
    path = "/game",
    tag = "game",
    request_body = NewGameRequest,
    responses(
        (status = 200, description = "Game started", body = GameSnapshot),
        (status = 400, description = "Invalid hint count"),
        (status = 404, description = "Unknown user or sayer category")
    )
)]
pub async fn new_game(
    State(state): State<SharedState>,
    payload: Result<Valid<Json<NewGameRequest>>, ValidRejection<JsonRejection>>,
) -> Result<Json<GameSnapshot>, AppError> {
    let Valid(Json(payload)) = payload?;
    let snapshot = game_service::new_game(&state, payload).await?;
    Ok(Json(snapshot))
}

/// Current state of a game.
#[utoipa::path(
    get,
    path = "/game/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game", body = GameSnapshot),
        (status = 404, description = "Game not found")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSnapshot>, AppError> {
    Ok(Json(game_service::get_game(&state, id).await?))
}

/// Guess who said the saying.
#[utoipa::path(
    put,
    path = "/game/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = MakeMoveRequest,
    responses(
        (status = 200, description = "Guess applied, or game already over", body = GameSnapshot),
        (status = 404, description = "Game not found"),
        (status = 503, description = "Storage unavailable or too much contention")
    )
)]
pub async fn make_move(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<MakeMoveRequest>, JsonRejection>,
) -> Result<Json<GameSnapshot>, AppError> {
    let Json(payload) = payload?;
    let snapshot = game_service::make_move(&state, id, payload).await?;
    Ok(Json(snapshot))
}

/// Cancel a game still waiting for a guess.
#[utoipa::path(
    put,
    path = "/game/cancel/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Cancellation outcome", body = MessageResponse),
        (status = 404, description = "Game not found")
    )
)]
pub async fn cancel_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    Ok(Json(game_service::cancel_game(&state, id).await?))
}

/// Games of a player still waiting for a guess.
#[utoipa::path(
    get,
    path = "/games/user/{user_name}",
    tag = "game",
    params(("user_name" = String, Path, description = "Name of the player")),
    responses(
        (status = 200, description = "Games in progress", body = GameListResponse),
        (status = 404, description = "Unknown user or no game in progress")
    )
)]
pub async fn get_user_games(
    State(state): State<SharedState>,
    Path(user_name): Path<String>,
) -> Result<Json<GameListResponse>, AppError> {
    Ok(Json(game_service::get_user_games(&state, &user_name).await?))
}
