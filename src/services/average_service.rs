use crate::{
    dao::models::GameQuery,
    dto::common::MessageResponse,
    error::ServiceError,
    state::{SharedState, cache::AVERAGE_POINTS_KEY, state_machine::GameStatus},
};

const AVERAGE_UNAVAILABLE: &str = "Average points are not available.";

/// Recompute the mean points of won games and overwrite the cache entry.
///
/// Returns the new average, or `None` when no game was won yet; the cache is
/// left untouched in that case.
pub async fn refresh_average_points(state: &SharedState) -> Result<Option<f64>, ServiceError> {
    let store = state.require_store().await?;
    let games = store
        .list_games(GameQuery::with_status(GameStatus::Won))
        .await?;
    if games.is_empty() {
        return Ok(None);
    }

    let total: u64 = games.iter().map(|game| u64::from(game.points)).sum();
    let average = total as f64 / games.len() as f64;

    state
        .cache()
        .set(AVERAGE_POINTS_KEY, &average)
        .map_err(|err| ServiceError::InvalidState(format!("failed to cache average: {err}")))?;

    Ok(Some(average))
}

/// Cached average, formatted for players.
pub fn get_average_points(state: &SharedState) -> MessageResponse {
    match state.cache().get::<f64>(AVERAGE_POINTS_KEY) {
        Some(average) => {
            MessageResponse::new(format!("Average points won per game is {average:.2}"))
        }
        None => MessageResponse::new(AVERAGE_UNAVAILABLE),
    }
}
