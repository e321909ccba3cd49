use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{error::AppError, state::SharedState};

pub(crate) const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Reject requests whose `X-Admin-Token` header does not match the configured token.
///
/// When no token is configured the admin routes are open.
pub(crate) async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config().admin_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    if provided != expected {
        warn!(path = %req.uri().path(), "rejected request with invalid admin token");
        return Err(AppError::Unauthorized("invalid admin token".into()));
    }

    Ok(next.run(req).await)
}
