use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};

#[derive(Debug, Serialize, Deserialize)]
pub struct StateDelay {
    pub state_name: String,
    pub delay_hours: i64,
}

pub async fn list_state_delays(
    State(state): State<AppState>,
) -> Result<Json<Vec<StateDelay>>> {
    let conn = state.db.get()?;
    let mut delays: Vec<StateDelay> = queries::get_state_delays(&conn)?
        .into_iter()
        .map(|(state_name, delay_hours)| StateDelay {
            state_name,
            delay_hours,
        })
        .collect();
    delays.sort_by(|a, b| a.state_name.cmp(&b.state_name));
    Ok(Json(delays))
}

pub async fn upsert_state_delay(
    State(state): State<AppState>,
    Json(request): Json<StateDelay>,
) -> Result<Json<StateDelay>> {
    if request.state_name.trim().is_empty() {
        return Err(AppError::InvalidFormat("State name is required.".to_string()));
    }
    if request.delay_hours < 0 {
        return Err(AppError::InvalidFormat(
            "Delay hours must be non-negative.".to_string(),
        ));
    }

    let conn = state.db.get()?;
    queries::upsert_state_delay(&conn, &request.state_name, request.delay_hours)?;
    Ok(Json(StateDelay {
        state_name: request.state_name.trim().to_uppercase(),
        delay_hours: request.delay_hours,
    }))
}

pub async fn delete_state_delay(
    State(state): State<AppState>,
    Path(state_name): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    if !queries::delete_state_delay(&conn, &state_name)? {
        return Err(AppError::NotFound(format!(
            "No delay configured for state: {state_name}"
        )));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
