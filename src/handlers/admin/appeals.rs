use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::appeals;
use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::identifier::OrderIdentifier;
use crate::models::{Appeal, AppealDecision, AppealStatus, FulfillmentType};

#[derive(Debug, Deserialize)]
pub struct ListAppealsQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Order context attached to each appeal so reviewers see the shipment
/// situation without a second lookup.
#[derive(Debug, Serialize)]
pub struct AppealOrderSummary {
    pub product_component: Option<String>,
    pub fulfillment_type: FulfillmentType,
    pub ship_state: Option<String>,
    pub order_timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct AppealListItem {
    #[serde(flatten)]
    pub appeal: Appeal,
    pub order: Option<AppealOrderSummary>,
}

#[derive(Debug, Serialize)]
pub struct ListAppealsResponse {
    pub items: Vec<AppealListItem>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

pub async fn list_appeals(
    State(state): State<AppState>,
    Query(query): Query<ListAppealsQuery>,
) -> Result<Json<ListAppealsResponse>> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(AppealStatus::from_str(raw).ok_or_else(|| {
            AppError::InvalidFormat(format!("Unknown appeal status: {raw}"))
        })?),
    };
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let conn = state.db.get()?;
    let (appeals, total) = queries::list_appeals(&conn, status, limit, offset)?;

    let mut items = Vec::with_capacity(appeals.len());
    for appeal in appeals {
        let order = OrderIdentifier::parse(&appeal.order_identifier)
            .ok()
            .and_then(|id| queries::get_order(&conn, &id).transpose())
            .transpose()?
            .map(|order| AppealOrderSummary {
                product_component: order.product_component,
                fulfillment_type: order.fulfillment_type,
                ship_state: order.ship_state,
                order_timestamp: order.order_timestamp,
            });
        items.push(AppealListItem { appeal, order });
    }

    Ok(Json(ListAppealsResponse {
        items,
        total,
        limit,
        offset,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReviewAppealRequest {
    pub action: String,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

pub async fn review_appeal(
    State(state): State<AppState>,
    Path(appeal_id): Path<String>,
    Json(request): Json<ReviewAppealRequest>,
) -> Result<Json<Appeal>> {
    let decision = AppealDecision::from_str(&request.action).ok_or_else(|| {
        AppError::InvalidFormat("Action must be approve, reject, or resubmit.".to_string())
    })?;

    let conn = state.db.get()?;
    let appeal = appeals::review(
        &conn,
        &appeal_id,
        decision,
        request.admin_notes.as_deref(),
        request.rejection_reason.as_deref(),
    )?;
    Ok(Json(appeal))
}
