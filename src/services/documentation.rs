use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Who Says Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::users::create_user,
        crate::routes::users::get_user_rankings,
        crate::routes::catalog::add_catalog_entry,
        crate::routes::game::new_game,
        crate::routes::game::get_game,
        crate::routes::game::make_move,
        crate::routes::game::cancel_game,
        crate::routes::game::get_user_games,
        crate::routes::scores::get_scores,
        crate::routes::scores::get_user_scores,
        crate::routes::scores::get_high_scores,
        crate::routes::scores::get_game_analysis,
        crate::routes::scores::get_average_points,
        crate::routes::tasks::send_reminders,
        crate::routes::tasks::cache_average_game_points,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::common::MessageResponse,
            crate::dto::user::CreateUserRequest,
            crate::dto::user::UserRanking,
            crate::dto::user::RankingsResponse,
            crate::dto::catalog::CreateCatalogEntryRequest,
            crate::dto::game::NewGameRequest,
            crate::dto::game::MakeMoveRequest,
            crate::dto::game::GameSnapshot,
            crate::dto::game::GameListResponse,
            crate::dto::scores::ScoreReport,
            crate::dto::scores::ScoresResponse,
            crate::dto::scores::HighScoresResponse,
            crate::dto::scores::GameAnalysis,
            crate::dto::scores::GameAnalysisResponse,
            crate::routes::tasks::RemindersResponse,
            crate::state::game::SayerCategory,
            crate::state::state_machine::GameStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Player registration and rankings"),
        (name = "catalog", description = "Administrative catalog import"),
        (name = "game", description = "Game lifecycle"),
        (name = "scores", description = "Scores, high scores and analysis"),
        (name = "tasks", description = "Administrative maintenance jobs"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/user",
            "/catalog",
            "/game",
            "/game/{id}",
            "/game/cancel/{id}",
            "/scores",
            "/scores/user/{user_name}",
            "/games/user/{user_name}",
            "/games/highscores",
            "/users/rankings",
            "/games/analysis",
            "/games/averagepoints",
            "/crons/send_reminder",
            "/tasks/cache_average_game_points",
            "/healthcheck",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
