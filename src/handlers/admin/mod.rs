mod appeals;
mod state_delays;

pub use appeals::*;
pub use state_delays::*;

use axum::{
    Router,
    routing::{delete, get, put},
};

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/appeals", get(list_appeals))
        .route("/admin/appeals/{appeal_id}", put(review_appeal))
        .route(
            "/admin/state-delays",
            get(list_state_delays).put(upsert_state_delay),
        )
        .route(
            "/admin/state-delays/{state_name}",
            delete(delete_state_delay),
        )
}
