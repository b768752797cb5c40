use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;

use crate::db::AppState;
use crate::error::Result;
use crate::redemption::{self, VerifyOutcome};

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub order_id: String,
}

/// Read-only precheck before the customer commits to redemption. Never
/// allocates; an ineligible order comes back as a structured denial.
pub async fn verify_order(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyOutcome>> {
    let conn = state.db.get()?;
    let outcome = redemption::verify(&conn, &request.order_id, Utc::now().timestamp())?;
    Ok(Json(outcome))
}
