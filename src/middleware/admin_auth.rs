use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use crate::db::AppState;
use crate::util::extract_bearer_token;

/// Gate admin routes behind the configured bearer token.
///
/// No token configured means the admin surface is disabled entirely, which
/// is the safe default for a fresh deployment.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(StatusCode::NOT_FOUND);
    };

    let token = extract_bearer_token(request.headers()).ok_or(StatusCode::UNAUTHORIZED)?;
    if token != expected {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}
