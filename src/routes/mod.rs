use axum::Router;

use crate::state::SharedState;

mod admin;
pub mod catalog;
pub mod docs;
pub mod game;
pub mod health;
pub mod scores;
pub mod tasks;
pub mod users;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(users::router())
        .merge(game::router())
        .merge(scores::router())
        .merge(catalog::router(state.clone()))
        .merge(tasks::router(state.clone()));

    api_router.merge(docs::router()).with_state(state)
}
