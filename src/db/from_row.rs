//! Row-to-struct mapping and small query helpers.
//!
//! Each model carries a `*_COLS` constant so every SELECT names its columns
//! in one place and `from_row` can index them positionally.

use rusqlite::types::Type;
use rusqlite::{Connection, Params, Row};

use crate::error::Result;
use crate::models::{
    Appeal, AppealStatus, AppealType, BlockStatus, FulfillmentState, FulfillmentType, LicenseKey,
    Order, ProductInfo,
};

pub const ORDER_COLS: &str = "id, order_identifier, product_component, quantity, \
    fulfillment_type, block_status, refunded, fulfillment_state, ship_state, \
    order_timestamp, early_appeal_status, feedback_appeal_status, created_at";

pub const LICENSE_KEY_COLS: &str =
    "id, key, component_id, bound_order_identifier, redeemed, redeemed_at, created_at";

pub const APPEAL_COLS: &str = "id, order_identifier, appeal_type, status, contact_email, \
    contact_phone, proof_reference, rejection_reason, admin_notes, created_at, reviewed_at";

pub const PRODUCT_COLS: &str = "fsn, display_name, download_url, install_guide, created_at";

pub trait FromRow: Sized {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

fn bad_enum(idx: usize, value: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("unrecognized enum value: {value}").into(),
    )
}

impl FromRow for Order {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let fulfillment_type: String = row.get(4)?;
        let block_status: String = row.get(5)?;
        let fulfillment_state: Option<String> = row.get(7)?;
        let early_appeal: String = row.get(10)?;
        let feedback_appeal: String = row.get(11)?;
        let quantity: i64 = row.get(3)?;

        Ok(Order {
            id: row.get(0)?,
            order_identifier: row.get(1)?,
            product_component: row.get(2)?,
            // Invalid quantities from the feed default to 1.
            quantity: quantity.max(1),
            fulfillment_type: FulfillmentType::from_str(&fulfillment_type)
                .ok_or_else(|| bad_enum(4, fulfillment_type))?,
            block_status: BlockStatus::from_str(&block_status)
                .ok_or_else(|| bad_enum(5, block_status))?,
            refunded: row.get(6)?,
            // Unrecognized shipment states from the feed map to unknown.
            fulfillment_state: fulfillment_state
                .as_deref()
                .and_then(FulfillmentState::from_str),
            ship_state: row.get(8)?,
            order_timestamp: row.get(9)?,
            early_appeal_status: AppealStatus::from_str(&early_appeal)
                .ok_or_else(|| bad_enum(10, early_appeal))?,
            feedback_appeal_status: AppealStatus::from_str(&feedback_appeal)
                .ok_or_else(|| bad_enum(11, feedback_appeal))?,
            created_at: row.get(12)?,
        })
    }
}

impl FromRow for LicenseKey {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(LicenseKey {
            id: row.get(0)?,
            key: row.get(1)?,
            component_id: row.get(2)?,
            bound_order_identifier: row.get(3)?,
            redeemed: row.get(4)?,
            redeemed_at: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

impl FromRow for Appeal {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let appeal_type: String = row.get(2)?;
        let status: String = row.get(3)?;
        Ok(Appeal {
            id: row.get(0)?,
            order_identifier: row.get(1)?,
            appeal_type: AppealType::from_str(&appeal_type)
                .ok_or_else(|| bad_enum(2, appeal_type))?,
            status: AppealStatus::from_str(&status).ok_or_else(|| bad_enum(3, status))?,
            contact_email: row.get(4)?,
            contact_phone: row.get(5)?,
            proof_reference: row.get(6)?,
            rejection_reason: row.get(7)?,
            admin_notes: row.get(8)?,
            created_at: row.get(9)?,
            reviewed_at: row.get(10)?,
        })
    }
}

impl FromRow for ProductInfo {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ProductInfo {
            fsn: row.get(0)?,
            display_name: row.get(1)?,
            download_url: row.get(2)?,
            install_guide: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

pub fn query_one<T: FromRow, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query_map(params, |row| T::from_row(row))?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn query_all<T: FromRow, P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| T::from_row(row))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
