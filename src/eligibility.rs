//! Eligibility gate for redemption.
//!
//! Rules run in strict precedence order; the first match wins. Later rules
//! assume earlier ones passed (the delay rule does not re-check refunds),
//! so the ordering is a correctness requirement, not a style choice:
//!
//! 1. blocked order
//! 2. refunded order (terminal)
//! 3. FBA delivery-delay window (with appeal and delivered-state escapes)
//! 4. allow
//!
//! Only FBA orders are subject to rule 3: a physical shipment can be claimed
//! digitally before the parcel arrives and then disputed, so redemption
//! waits out a per-destination-state delivery window unless an approved
//! early-delivery appeal or an admin delivered mark overrides it.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{AppealStatus, BlockStatus, FulfillmentState, FulfillmentType, Order};

/// Fallback delay when neither the destination state nor a DEFAULT row is
/// configured (4 days).
pub const DEFAULT_DELAY_HOURS: i64 = 96;

const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_DAY: i64 = 86400;

/// Per-destination-state delivery delay table, loaded from `state_delays`.
#[derive(Debug, Clone)]
pub struct DelayPolicy {
    delays: HashMap<String, i64>,
    default_hours: i64,
}

impl DelayPolicy {
    pub fn new(delays: HashMap<String, i64>) -> Self {
        Self {
            delays,
            default_hours: DEFAULT_DELAY_HOURS,
        }
    }

    /// Delay in hours for a destination state. Falls back to the table's
    /// DEFAULT row, then the hardcoded default.
    pub fn delay_hours(&self, state: Option<&str>) -> i64 {
        if let Some(state) = state {
            let normalized = state.trim().to_uppercase();
            if let Some(hours) = self.delays.get(&normalized) {
                return *hours;
            }
        }
        self.delays
            .get("DEFAULT")
            .copied()
            .unwrap_or(self.default_hours)
    }

    /// When the order becomes redeemable.
    pub fn redeemable_at(&self, order: &Order) -> i64 {
        order.order_timestamp + self.delay_hours(order.ship_state.as_deref()) * SECONDS_PER_HOUR
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DenialReason {
    Blocked,
    Refunded,
    TooEarly,
    Cancelled,
    NotShipped,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::Blocked => "BLOCKED",
            DenialReason::Refunded => "REFUNDED",
            DenialReason::TooEarly => "TOO_EARLY",
            DenialReason::Cancelled => "CANCELLED",
            DenialReason::NotShipped => "NOT_SHIPPED",
        }
    }
}

/// Structured denial: enough data for the caller to render a retry time or
/// an appeal path instead of a dead end.
#[derive(Debug, Clone, Serialize)]
pub struct Denial {
    pub reason: DenialReason,
    pub message: String,
    pub retry_at: Option<i64>,
    pub days_remaining: Option<i64>,
    pub can_appeal: bool,
    pub appeal_status: Option<AppealStatus>,
}

#[derive(Debug, Clone)]
pub enum Eligibility {
    Allow,
    Deny(Denial),
}

impl Eligibility {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Eligibility::Allow)
    }
}

pub fn check(order: &Order, policy: &DelayPolicy, now: i64) -> Eligibility {
    // Rule 1: fraud/abuse hold, set by admin workflows. The unblock path is
    // the feedback-removal appeal: admin approval clears the hold.
    if order.block_status == BlockStatus::Blocked {
        let pending = order.feedback_appeal_status == AppealStatus::Pending;
        let rejected = order.feedback_appeal_status == AppealStatus::Rejected;
        let message = if pending {
            "Your feedback-removal appeal is being reviewed by our team. We will notify you once it is processed."
        } else {
            "This order is currently on hold. If you believe this is a mistake, you can submit a feedback-removal appeal."
        };
        return Eligibility::Deny(Denial {
            reason: DenialReason::Blocked,
            message: message.to_string(),
            retry_at: None,
            days_remaining: None,
            can_appeal: !pending && !rejected,
            appeal_status: Some(order.feedback_appeal_status),
        });
    }

    // Rule 2: refunds are terminal, no appeal path.
    if order.refunded {
        return Eligibility::Deny(refunded_denial());
    }

    // Rule 3: delivery-delay window, FBA only.
    if order.fulfillment_type == FulfillmentType::AmazonFba {
        return check_fba_delay(order, policy, now);
    }

    Eligibility::Allow
}

pub fn refunded_denial() -> Denial {
    Denial {
        reason: DenialReason::Refunded,
        message: "This order has been refunded. Activation is not available for refunded orders."
            .to_string(),
        retry_at: None,
        days_remaining: None,
        can_appeal: false,
        appeal_status: None,
    }
}

fn check_fba_delay(order: &Order, policy: &DelayPolicy, now: i64) -> Eligibility {
    // An approved early-delivery appeal overrides the window permanently.
    if order.early_appeal_status == AppealStatus::Approved {
        return Eligibility::Allow;
    }

    match order.fulfillment_state {
        // Admin confirmed the parcel arrived; no reason to hold the key back.
        Some(FulfillmentState::Delivered) => return Eligibility::Allow,
        Some(FulfillmentState::Cancelled) => {
            return Eligibility::Deny(Denial {
                reason: DenialReason::Cancelled,
                message: "This order has been cancelled. Please contact Amazon support for assistance."
                    .to_string(),
                retry_at: None,
                days_remaining: None,
                can_appeal: false,
                appeal_status: None,
            });
        }
        // Unshipped orders can never be "delivered early", so no appeal and
        // no retry time: the window starts making sense once it ships.
        Some(FulfillmentState::Pending) | Some(FulfillmentState::Unshipped) => {
            return Eligibility::Deny(Denial {
                reason: DenialReason::NotShipped,
                message: "Your order is being prepared for shipment. You will be able to activate once it has shipped and the delivery period has passed."
                    .to_string(),
                retry_at: None,
                days_remaining: None,
                can_appeal: false,
                appeal_status: None,
            });
        }
        _ => {}
    }

    let redeemable_at = policy.redeemable_at(order);
    if now >= redeemable_at {
        return Eligibility::Allow;
    }

    let pending = order.early_appeal_status == AppealStatus::Pending;
    let rejected = order.early_appeal_status == AppealStatus::Rejected;
    let message = if pending {
        "Your early delivery appeal is being reviewed by our team. We will notify you once it is processed."
            .to_string()
    } else {
        "Your order is still on the way. If you have already received your package, you can submit proof of delivery to activate early."
            .to_string()
    };

    Eligibility::Deny(Denial {
        reason: DenialReason::TooEarly,
        message,
        retry_at: Some(redeemable_at),
        days_remaining: Some(days_remaining(redeemable_at - now)),
        can_appeal: !pending && !rejected,
        appeal_status: Some(order.early_appeal_status),
    })
}

fn days_remaining(seconds: i64) -> i64 {
    // Ceiling division; `seconds` is always positive on this path.
    (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}
