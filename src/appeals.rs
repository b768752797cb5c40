//! Customer appeal sub-flows.
//!
//! Two appeal kinds share one state machine, one record per order and kind:
//!
//! ```text
//! (customer) submit ─────► pending ──► approved   (admin; unlocks the order)
//!        ▲                        └──► rejected   (admin; terminal for customer)
//!        │                        └──► resubmit   (admin; proof cleared)
//!        └── resubmit allows a fresh customer submission
//! ```
//!
//! - `early_delivery` contests the FBA delivery-delay window; approval makes
//!   the delay rule pass for that order permanently.
//! - `feedback_removal` contests a fraud/abuse hold; approval clears the
//!   order's `block_status` as well.
//!
//! The order's per-kind appeal-status column mirrors the record so the
//! eligibility gate can read it without a join: `pending` blocks duplicate
//! submissions, and an admin `resubmit` verdict resets the column to `none`.

use chrono::Utc;
use rusqlite::Connection;

use crate::db::queries;
use crate::eligibility;
use crate::error::{AppError, Result};
use crate::identifier::OrderIdentifier;
use crate::models::{Appeal, AppealDecision, AppealStatus, AppealType, BlockStatus, FulfillmentType};

#[derive(Debug, Clone)]
pub struct SubmitAppeal {
    pub order_identifier: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub proof_reference: String,
}

/// Customer submission: `none`/`resubmit` -> `pending`.
pub fn submit(
    conn: &Connection,
    appeal_type: AppealType,
    input: &SubmitAppeal,
    now: i64,
) -> Result<Appeal> {
    let identifier = OrderIdentifier::parse(&input.order_identifier)?;
    let order = queries::get_order(conn, &identifier)?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    match appeal_type {
        AppealType::EarlyDelivery => {
            if order.fulfillment_type != FulfillmentType::AmazonFba {
                return Err(AppError::Conflict(
                    "Early-delivery appeals apply to FBA orders only.".to_string(),
                ));
            }
        }
        AppealType::FeedbackRemoval => {
            if order.block_status != BlockStatus::Blocked {
                return Err(AppError::Conflict(
                    "Feedback-removal appeals apply to orders on hold.".to_string(),
                ));
            }
        }
    }
    if order.refunded {
        return Err(AppError::ineligible(eligibility::refunded_denial()));
    }

    let appeal = match queries::get_appeal_for_order(conn, &order.order_identifier, appeal_type)? {
        None => queries::create_appeal(
            conn,
            &order.order_identifier,
            appeal_type,
            &input.contact_email,
            &input.contact_phone,
            &input.proof_reference,
            now,
        )?,
        Some(existing) => match existing.status {
            AppealStatus::Pending => {
                return Err(AppError::Conflict(
                    "You already have a pending appeal for this order.".to_string(),
                ));
            }
            AppealStatus::Approved => {
                return Err(AppError::Conflict(
                    "Your appeal has already been approved.".to_string(),
                ));
            }
            AppealStatus::Rejected => {
                return Err(AppError::Conflict(
                    "Your appeal was rejected. Please contact support.".to_string(),
                ));
            }
            // Admin asked for fresh proof: reuse the row, back to pending.
            AppealStatus::Resubmit | AppealStatus::None => {
                queries::reset_appeal_to_pending(
                    conn,
                    &existing.id,
                    &input.contact_email,
                    &input.contact_phone,
                    &input.proof_reference,
                    now,
                )?;
                queries::get_appeal_by_id(conn, &existing.id)?.ok_or_else(|| {
                    AppError::Internal("appeal vanished during resubmission".to_string())
                })?
            }
        },
    };

    queries::set_order_appeal_status(
        conn,
        &order.order_identifier,
        appeal_type,
        AppealStatus::Pending,
    )?;

    tracing::info!(
        order_identifier = %order.order_identifier,
        appeal_id = %appeal.id,
        appeal_type = appeal_type.as_str(),
        "appeal submitted"
    );

    Ok(appeal)
}

/// Admin review of a pending appeal.
pub fn review(
    conn: &Connection,
    appeal_id: &str,
    decision: AppealDecision,
    admin_notes: Option<&str>,
    rejection_reason: Option<&str>,
) -> Result<Appeal> {
    let appeal = queries::get_appeal_by_id(conn, appeal_id)?
        .ok_or_else(|| AppError::NotFound("Appeal not found".to_string()))?;

    if appeal.status != AppealStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Appeal has already been {}.",
            appeal.status.as_str()
        )));
    }

    let now = Utc::now().timestamp();
    let (appeal_status, order_status, clear_proof) = match decision {
        AppealDecision::Approve => (AppealStatus::Approved, AppealStatus::Approved, false),
        AppealDecision::Reject => (AppealStatus::Rejected, AppealStatus::Rejected, false),
        // Proof is cleared and the order goes back to appealable.
        AppealDecision::Resubmit => (AppealStatus::Resubmit, AppealStatus::None, true),
    };

    queries::update_appeal_review(
        conn,
        appeal_id,
        appeal_status,
        admin_notes,
        if decision == AppealDecision::Reject {
            rejection_reason
        } else {
            None
        },
        clear_proof,
        now,
    )?;
    queries::set_order_appeal_status(
        conn,
        &appeal.order_identifier,
        appeal.appeal_type,
        order_status,
    )?;

    // A feedback-removal approval lifts the hold itself; the mirror column
    // alone would leave the block rule denying.
    if decision == AppealDecision::Approve && appeal.appeal_type == AppealType::FeedbackRemoval {
        queries::set_order_block_status(conn, &appeal.order_identifier, BlockStatus::None)?;
    }

    tracing::info!(
        appeal_id,
        order_identifier = %appeal.order_identifier,
        appeal_type = appeal.appeal_type.as_str(),
        decision = decision.as_str(),
        "appeal reviewed"
    );

    queries::get_appeal_by_id(conn, appeal_id)?
        .ok_or_else(|| AppError::Internal("appeal vanished during review".to_string()))
}
