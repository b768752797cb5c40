pub mod admin;
pub mod public;

use axum::{Router, middleware::from_fn_with_state};

use crate::db::AppState;
use crate::middleware::require_admin;

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    let admin = admin::router().layer(from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public::router())
        .merge(admin)
        .with_state(state)
}
