use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::appeals::{self, SubmitAppeal};
use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::models::{AppealStatus, AppealType};

#[derive(Debug, Deserialize)]
pub struct SubmitAppealRequest {
    pub order_id: String,
    pub email: String,
    pub whatsapp: String,
    /// Reference to the uploaded proof material (upload itself is handled
    /// by the media layer, not this engine).
    pub proof_reference: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitAppealResponse {
    pub appeal_id: String,
    pub status: AppealStatus,
    pub message: &'static str,
}

/// Early-delivery appeal against the FBA delay window.
pub async fn submit_appeal(
    State(state): State<AppState>,
    Json(request): Json<SubmitAppealRequest>,
) -> Result<Json<SubmitAppealResponse>> {
    submit(&state, AppealType::EarlyDelivery, request)
}

/// Feedback-removal appeal against a fraud/abuse hold.
pub async fn submit_feedback_appeal(
    State(state): State<AppState>,
    Json(request): Json<SubmitAppealRequest>,
) -> Result<Json<SubmitAppealResponse>> {
    submit(&state, AppealType::FeedbackRemoval, request)
}

fn submit(
    state: &AppState,
    appeal_type: AppealType,
    request: SubmitAppealRequest,
) -> Result<Json<SubmitAppealResponse>> {
    if request.email.trim().is_empty() || request.whatsapp.trim().is_empty() {
        return Err(AppError::InvalidFormat(
            "Email and WhatsApp number are required.".to_string(),
        ));
    }
    if request.proof_reference.trim().is_empty() {
        return Err(AppError::InvalidFormat(
            "Proof material is required.".to_string(),
        ));
    }

    let conn = state.db.get()?;
    let appeal = appeals::submit(
        &conn,
        appeal_type,
        &SubmitAppeal {
            order_identifier: request.order_id,
            contact_email: request.email,
            contact_phone: request.whatsapp,
            proof_reference: request.proof_reference,
        },
        Utc::now().timestamp(),
    )?;

    Ok(Json(SubmitAppealResponse {
        appeal_id: appeal.id,
        status: appeal.status,
        message: "Appeal submitted successfully. We will review it shortly.",
    }))
}
