mod appeal;
mod redeem;
mod verify;

pub use appeal::*;
pub use redeem::*;
pub use verify::*;

use axum::{Json, Router, routing::{get, post}};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/activate/verify", post(verify_order))
        .route("/activate/redeem", post(redeem_order))
        .route("/activate/appeal", post(submit_appeal))
        .route("/activate/feedback-appeal", post(submit_feedback_appeal))
}
