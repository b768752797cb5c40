use serde::{Deserialize, Serialize};

/// One redeemable credential in the shared inventory pool.
///
/// A key with `redeemed = true` has exactly one non-null
/// `bound_order_identifier`, permanently. The claim primitive in
/// `db::inventory` is the only code path that flips these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseKey {
    pub id: String,
    /// The opaque secret handed to the customer.
    pub key: String,
    /// FSN this key activates.
    pub component_id: String,
    pub bound_order_identifier: Option<String>,
    pub redeemed: bool,
    pub redeemed_at: Option<i64>,
    pub created_at: i64,
}

/// Input for bulk inventory loading (admin import and test fixtures).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLicenseKey {
    pub key: String,
    pub component_id: String,
}
