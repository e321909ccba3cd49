use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    error::AppError,
    routes::admin::require_admin_token,
    services::{average_service, reminder_service},
    state::SharedState,
};

/// Outcome of an on-demand reminder run.
#[derive(Debug, Serialize, ToSchema)]
pub struct RemindersResponse {
    /// Emails handed to the mailer.
    pub reminders_sent: usize,
}

/// Admin-only triggers for the maintenance jobs.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/crons/send_reminder", get(send_reminders))
        .route(
            "/tasks/cache_average_game_points",
            post(cache_average_game_points),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Email every player with unfinished games now.
#[utoipa::path(
    get,
    path = "/crons/send_reminder",
    tag = "tasks",
    params(("X-Admin-Token" = Option<String>, Header, description = "Admin token, required when one is configured")),
    responses(
        (status = 200, description = "Reminders sent", body = RemindersResponse),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn send_reminders(
    State(state): State<SharedState>,
) -> Result<Json<RemindersResponse>, AppError> {
    let reminders_sent = reminder_service::send_reminders(&state).await?;
    Ok(Json(RemindersResponse { reminders_sent }))
}

/// Recompute the cached average points of won games.
#[utoipa::path(
    post,
    path = "/tasks/cache_average_game_points",
    tag = "tasks",
    params(("X-Admin-Token" = Option<String>, Header, description = "Admin token, required when one is configured")),
    responses(
        (status = 204, description = "Average points cache refreshed"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn cache_average_game_points(
    State(state): State<SharedState>,
) -> Result<StatusCode, AppError> {
    if let Some(average) = average_service::refresh_average_points(&state).await? {
        info!(average, "average points cache refreshed on demand");
    }
    Ok(StatusCode::NO_CONTENT)
}
