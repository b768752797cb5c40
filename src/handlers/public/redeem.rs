use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::redemption::{self, RedeemedKey};

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub order_id: String,
}

#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub already_redeemed: bool,
    pub keys: Vec<RedeemedKey>,
}

pub async fn redeem_order(
    State(state): State<AppState>,
    Json(request): Json<RedeemRequest>,
) -> Result<Json<RedeemResponse>> {
    let mut conn = state.db.get()?;
    let result = redemption::redeem(&mut conn, &request.order_id, Utc::now().timestamp());
    drop(conn);

    match result {
        Ok(outcome) => {
            // Best-effort restock signal; must never delay or fail the
            // response the customer is waiting on.
            if !outcome.claimed_components.is_empty() {
                spawn_inventory_checks(&state, outcome.claimed_components.clone());
            }
            Ok(Json(RedeemResponse {
                already_redeemed: outcome.already_redeemed,
                keys: outcome.keys,
            }))
        }
        Err(err) => {
            if let AppError::InsufficientInventory { component_id, .. } = &err {
                spawn_inventory_checks(&state, vec![component_id.clone()]);
            }
            Err(err)
        }
    }
}

fn spawn_inventory_checks(state: &AppState, components: Vec<String>) {
    let alerter = state.alerter.clone();
    let db = state.db.clone();
    tokio::spawn(async move {
        for component in components {
            alerter.check_component(&db, &component).await;
        }
    });
}
