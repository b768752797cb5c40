use serde::{Deserialize, Serialize};

use super::AppealStatus;

/// A customer dispute attached to an order: early-delivery (contests the FBA
/// delay window) or feedback-removal (contests a fraud/abuse hold).
///
/// One row per order and kind, transitioned in place so the order keeps a
/// single audit trail: pending -> approved | rejected | resubmit, and
/// resubmit -> pending when the customer provides fresh proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appeal {
    pub id: String,
    pub order_identifier: String,
    pub appeal_type: AppealType,
    pub status: AppealStatus,
    pub contact_email: String,
    pub contact_phone: String,
    /// Reference to the customer's delivery proof (cleared on resubmit).
    pub proof_reference: Option<String>,
    pub rejection_reason: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: i64,
    pub reviewed_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppealType {
    EarlyDelivery,
    FeedbackRemoval,
}

impl AppealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppealType::EarlyDelivery => "early_delivery",
            AppealType::FeedbackRemoval => "feedback_removal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "early_delivery" => Some(AppealType::EarlyDelivery),
            "feedback_removal" => Some(AppealType::FeedbackRemoval),
            _ => None,
        }
    }
}

/// Admin verdict on a pending appeal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppealDecision {
    Approve,
    Reject,
    Resubmit,
}

impl AppealDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppealDecision::Approve => "approve",
            AppealDecision::Reject => "reject",
            AppealDecision::Resubmit => "resubmit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "approve" => Some(AppealDecision::Approve),
            "reject" => Some(AppealDecision::Reject),
            "resubmit" => Some(AppealDecision::Resubmit),
            _ => None,
        }
    }
}
