use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::get,
};
use axum_valid::{Valid, ValidRejection};

use crate::{
    dto::{
        common::MessageResponse,
        scores::{GameAnalysisResponse, HighScoresQuery, HighScoresResponse, ScoresResponse},
    },
    error::AppError,
    services::{average_service, score_service},
    state::SharedState,
};

/// Read-only score reports.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/scores", get(get_scores))
        .route("/scores/user/{user_name}", get(get_user_scores))
        .route("/games/highscores", get(get_high_scores))
        .route("/games/analysis", get(get_game_analysis))
        .route("/games/averagepoints", get(get_average_points))
}

/// Every won game.
#[utoipa::path(
    get,
    path = "/scores",
    tag = "scores",
    responses(
        (status = 200, description = "Scores of won games", body = ScoresResponse),
        (status = 404, description = "No game won yet")
    )
)]
pub async fn get_scores(State(state): State<SharedState>) -> Result<Json<ScoresResponse>, AppError> {
    Ok(Json(score_service::get_scores(&state).await?))
}

/// Every game of one player.
#[utoipa::path(
    get,
    path = "/scores/user/{user_name}",
    tag = "scores",
    params(("user_name" = String, Path, description = "Name of the player")),
    responses(
        (status = 200, description = "Scores of the player's games", body = ScoresResponse),
        (status = 404, description = "Unknown user or no game played")
    )
)]
pub async fn get_user_scores(
    State(state): State<SharedState>,
    Path(user_name): Path<String>,
) -> Result<Json<ScoresResponse>, AppError> {
    Ok(Json(score_service::get_user_scores(&state, &user_name).await?))
}

/// Won games, best first.
#[utoipa::path(
    get,
    path = "/games/highscores",
    tag = "scores",
    params(HighScoresQuery),
    responses(
        (status = 200, description = "High scores", body = HighScoresResponse),
        (status = 404, description = "No game won yet")
    )
)]
pub async fn get_high_scores(
    State(state): State<SharedState>,
    query: Result<Valid<Query<HighScoresQuery>>, ValidRejection<QueryRejection>>,
) -> Result<Json<HighScoresResponse>, AppError> {
    let Valid(Query(query)) = query?;
    let response = score_service::get_high_scores(&state, query.number_of_results).await?;
    Ok(Json(response))
}

/// Hints bought and outcome of every game.
#[utoipa::path(
    get,
    path = "/games/analysis",
    tag = "scores",
    responses(
        (status = 200, description = "Game analysis", body = GameAnalysisResponse),
        (status = 404, description = "No game played yet")
    )
)]
pub async fn get_game_analysis(
    State(state): State<SharedState>,
) -> Result<Json<GameAnalysisResponse>, AppError> {
    Ok(Json(score_service::get_game_analysis(&state).await?))
}

/// Cached average points of won games.
#[utoipa::path(
    get,
    path = "/games/averagepoints",
    tag = "scores",
    responses((status = 200, description = "Average points message", body = MessageResponse))
)]
pub async fn get_average_points(State(state): State<SharedState>) -> Json<MessageResponse> {
    Json(average_service::get_average_points(&state))
}
