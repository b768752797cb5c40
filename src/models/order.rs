use serde::{Deserialize, Serialize};

/// One logical purchase, deposited by the external order-ingestion feed.
///
/// The engine never creates or deletes orders; it only mutates the
/// appeal-related columns through the appeal sub-flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Website order UUID, Amazon order id (NNN-NNNNNNN-NNNNNNN), or
    /// 14-17 digit secret code. Unique, matched case-insensitively.
    pub order_identifier: String,
    /// Catalog identifier (FSN) of the sold product; may denote a combo.
    /// Missing means the product was never mapped and redemption must fail
    /// with a configuration error.
    pub product_component: Option<String>,
    /// Keys owed per component. Invalid values are clamped to 1 at load.
    pub quantity: i64,
    pub fulfillment_type: FulfillmentType,
    pub block_status: BlockStatus,
    /// Once true, redemption is permanently denied.
    pub refunded: bool,
    /// Carrier/admin shipment state, free-form in the feed; unrecognized
    /// values are treated as unknown rather than an error.
    pub fulfillment_state: Option<FulfillmentState>,
    /// Destination state, drives the per-state delivery-delay table.
    pub ship_state: Option<String>,
    pub order_timestamp: i64,
    /// Mirror of the early-delivery appeal record, read by the delay rule.
    pub early_appeal_status: AppealStatus,
    /// Mirror of the feedback-removal appeal record, read by the block rule.
    pub feedback_appeal_status: AppealStatus,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentType {
    Website,
    AmazonFba,
    AmazonMfn,
}

impl FulfillmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentType::Website => "website",
            FulfillmentType::AmazonFba => "amazon_fba",
            FulfillmentType::AmazonMfn => "amazon_mfn",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "website" => Some(FulfillmentType::Website),
            "amazon_fba" | "afn" => Some(FulfillmentType::AmazonFba),
            "amazon_mfn" | "mfn" => Some(FulfillmentType::AmazonMfn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStatus {
    None,
    Blocked,
}

impl BlockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockStatus::None => "none",
            BlockStatus::Blocked => "blocked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(BlockStatus::None),
            "blocked" => Some(BlockStatus::Blocked),
            _ => None,
        }
    }
}

/// Shipment progress as reported by the order feed. The feed is not fully
/// normalized ("Canceled" vs "Cancelled"), so parsing is lenient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentState {
    Pending,
    Unshipped,
    Shipped,
    Delivered,
    Cancelled,
}

impl FulfillmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentState::Pending => "pending",
            FulfillmentState::Unshipped => "unshipped",
            FulfillmentState::Shipped => "shipped",
            FulfillmentState::Delivered => "delivered",
            FulfillmentState::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(FulfillmentState::Pending),
            "unshipped" => Some(FulfillmentState::Unshipped),
            "shipped" => Some(FulfillmentState::Shipped),
            "delivered" => Some(FulfillmentState::Delivered),
            "cancelled" | "canceled" => Some(FulfillmentState::Cancelled),
            _ => None,
        }
    }
}

/// Status of the early-delivery appeal attached to an order or appeal record.
///
/// `Resubmit` only ever appears on appeal records: the admin cleared the
/// submitted proof and is waiting for the customer to try again. The order's
/// own column goes back to `None` at that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppealStatus {
    None,
    Pending,
    Approved,
    Rejected,
    Resubmit,
}

impl AppealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppealStatus::None => "none",
            AppealStatus::Pending => "pending",
            AppealStatus::Approved => "approved",
            AppealStatus::Rejected => "rejected",
            AppealStatus::Resubmit => "resubmit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(AppealStatus::None),
            "pending" => Some(AppealStatus::Pending),
            "approved" => Some(AppealStatus::Approved),
            "rejected" => Some(AppealStatus::Rejected),
            "resubmit" => Some(AppealStatus::Resubmit),
            _ => None,
        }
    }
}

/// Input for depositing an order record (used by the ingestion feed shim and
/// test fixtures; the production feed is an external collaborator).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub order_identifier: String,
    #[serde(default)]
    pub product_component: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    pub fulfillment_type: FulfillmentType,
    #[serde(default)]
    pub fulfillment_state: Option<FulfillmentState>,
    #[serde(default)]
    pub ship_state: Option<String>,
    pub order_timestamp: i64,
}
