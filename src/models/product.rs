use serde::{Deserialize, Serialize};

/// Display metadata for a component FSN.
///
/// Purely cosmetic: a missing row degrades the redemption response to null
/// fields, it never fails the redemption itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInfo {
    pub fsn: String,
    pub display_name: String,
    pub download_url: Option<String>,
    pub install_guide: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertProduct {
    pub fsn: String,
    pub display_name: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub install_guide: Option<String>,
}
