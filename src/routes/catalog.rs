use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    middleware,
    routing::post,
};
use axum_valid::{Valid, ValidRejection};

use crate::{
    dto::{catalog::CreateCatalogEntryRequest, common::MessageResponse},
    error::AppError,
    routes::admin::require_admin_token,
    services::catalog_service,
    state::SharedState,
};

/// Admin-only catalog import.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/catalog", post(add_catalog_entry))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Import a catalog record used to seed new games of its category.
#[utoipa::path(
    post,
    path = "/catalog",
    tag = "catalog",
    params(("X-Admin-Token" = Option<String>, Header, description = "Admin token, required when one is configured")),
    request_body = CreateCatalogEntryRequest,
    responses(
        (status = 200, description = "Catalog entry stored", body = MessageResponse),
        (status = 400, description = "Invalid catalog entry"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn add_catalog_entry(
    State(state): State<SharedState>,
    payload: Result<Valid<Json<CreateCatalogEntryRequest>>, ValidRejection<JsonRejection>>,
) -> Result<Json<MessageResponse>, AppError> {
    let Valid(Json(payload)) = payload?;
    Ok(Json(catalog_service::add_entry(&state, payload).await?))
}
