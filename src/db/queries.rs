use std::collections::HashMap;

use chrono::Utc;
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::error::Result;
use crate::identifier::OrderIdentifier;
use crate::models::*;

use super::from_row::{APPEAL_COLS, ORDER_COLS, PRODUCT_COLS, query_all, query_one};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Orders ============

/// Deposit an order record (ingestion-feed shim and test fixtures).
pub fn create_order(conn: &Connection, input: &CreateOrder) -> Result<Order> {
    let id = gen_id();
    let now = now();
    let quantity = input.quantity.unwrap_or(1).max(1);

    conn.execute(
        "INSERT INTO orders (id, order_identifier, product_component, quantity,
            fulfillment_type, block_status, refunded, fulfillment_state, ship_state,
            order_timestamp, early_appeal_status, feedback_appeal_status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 'none', 0, ?6, ?7, ?8, 'none', 'none', ?9)",
        params![
            &id,
            &input.order_identifier,
            &input.product_component,
            quantity,
            input.fulfillment_type.as_str(),
            input.fulfillment_state.map(|s| s.as_str()),
            &input.ship_state,
            input.order_timestamp,
            now,
        ],
    )?;

    Ok(Order {
        id,
        order_identifier: input.order_identifier.clone(),
        product_component: input.product_component.clone(),
        quantity,
        fulfillment_type: input.fulfillment_type,
        block_status: BlockStatus::None,
        refunded: false,
        fulfillment_state: input.fulfillment_state,
        ship_state: input.ship_state.clone(),
        order_timestamp: input.order_timestamp,
        early_appeal_status: AppealStatus::None,
        feedback_appeal_status: AppealStatus::None,
        created_at: now,
    })
}

/// Resolve a validated identifier to an order.
///
/// Exact match first (case-insensitive via the column collation), then the
/// dashed rendering of a 17-digit bare code.
pub fn get_order(conn: &Connection, identifier: &OrderIdentifier) -> Result<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLS} FROM orders WHERE order_identifier = ?1");

    if let Some(order) = query_one(conn, &sql, [identifier.as_str()])? {
        return Ok(Some(order));
    }
    if let Some(dashed) = identifier.dashed_fallback() {
        return query_one(conn, &sql, [dashed]);
    }
    Ok(None)
}

pub fn set_order_block_status(
    conn: &Connection,
    order_identifier: &str,
    status: BlockStatus,
) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE orders SET block_status = ?1 WHERE order_identifier = ?2",
        params![status.as_str(), order_identifier],
    )?;
    Ok(updated > 0)
}

pub fn set_order_refunded(conn: &Connection, order_identifier: &str, refunded: bool) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE orders SET refunded = ?1 WHERE order_identifier = ?2",
        params![refunded, order_identifier],
    )?;
    Ok(updated > 0)
}

/// Mirror an appeal's status onto the order column its eligibility rule
/// reads, keyed by appeal kind.
pub fn set_order_appeal_status(
    conn: &Connection,
    order_identifier: &str,
    appeal_type: AppealType,
    status: AppealStatus,
) -> Result<bool> {
    let sql = match appeal_type {
        AppealType::EarlyDelivery => {
            "UPDATE orders SET early_appeal_status = ?1 WHERE order_identifier = ?2"
        }
        AppealType::FeedbackRemoval => {
            "UPDATE orders SET feedback_appeal_status = ?1 WHERE order_identifier = ?2"
        }
    };
    let updated = conn.execute(sql, params![status.as_str(), order_identifier])?;
    Ok(updated > 0)
}

// ============ License keys ============

/// Load a key into the inventory pool (bulk import and test fixtures).
pub fn create_license_key(conn: &Connection, input: &CreateLicenseKey) -> Result<LicenseKey> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO license_keys (id, key, component_id, bound_order_identifier,
            redeemed, redeemed_at, created_at)
         VALUES (?1, ?2, ?3, NULL, 0, NULL, ?4)",
        params![&id, &input.key, &input.component_id, now],
    )?;

    Ok(LicenseKey {
        id,
        key: input.key.clone(),
        component_id: input.component_id.clone(),
        bound_order_identifier: None,
        redeemed: false,
        redeemed_at: None,
        created_at: now,
    })
}

// ============ Products ============

pub fn get_product(conn: &Connection, fsn: &str) -> Result<Option<ProductInfo>> {
    query_one(
        conn,
        &format!("SELECT {PRODUCT_COLS} FROM products WHERE fsn = ?1"),
        [fsn],
    )
}

pub fn upsert_product(conn: &Connection, input: &UpsertProduct) -> Result<ProductInfo> {
    let now = now();
    conn.execute(
        "INSERT INTO products (fsn, display_name, download_url, install_guide, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (fsn) DO UPDATE SET
            display_name = excluded.display_name,
            download_url = excluded.download_url,
            install_guide = excluded.install_guide",
        params![
            &input.fsn,
            &input.display_name,
            &input.download_url,
            &input.install_guide,
            now,
        ],
    )?;

    Ok(ProductInfo {
        fsn: input.fsn.clone(),
        display_name: input.display_name.clone(),
        download_url: input.download_url.clone(),
        install_guide: input.install_guide.clone(),
        created_at: now,
    })
}

// ============ State delays ============

pub fn get_state_delays(conn: &Connection) -> Result<HashMap<String, i64>> {
    let mut stmt = conn.prepare("SELECT state_name, delay_hours FROM state_delays")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?.to_uppercase(), row.get(1)?))
        })?
        .collect::<std::result::Result<HashMap<_, _>, _>>()?;
    Ok(rows)
}

pub fn upsert_state_delay(conn: &Connection, state_name: &str, delay_hours: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO state_delays (state_name, delay_hours) VALUES (?1, ?2)
         ON CONFLICT (state_name) DO UPDATE SET delay_hours = excluded.delay_hours",
        params![state_name.trim().to_uppercase(), delay_hours],
    )?;
    Ok(())
}

pub fn delete_state_delay(conn: &Connection, state_name: &str) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM state_delays WHERE state_name = ?1",
        params![state_name.trim().to_uppercase()],
    )?;
    Ok(deleted > 0)
}

// ============ Appeals ============

pub fn get_appeal_by_id(conn: &Connection, id: &str) -> Result<Option<Appeal>> {
    query_one(
        conn,
        &format!("SELECT {APPEAL_COLS} FROM appeals WHERE id = ?1"),
        [id],
    )
}

pub fn get_appeal_for_order(
    conn: &Connection,
    order_identifier: &str,
    appeal_type: AppealType,
) -> Result<Option<Appeal>> {
    query_one(
        conn,
        &format!(
            "SELECT {APPEAL_COLS} FROM appeals
             WHERE order_identifier = ?1 AND appeal_type = ?2"
        ),
        params![order_identifier, appeal_type.as_str()],
    )
}

pub fn create_appeal(
    conn: &Connection,
    order_identifier: &str,
    appeal_type: AppealType,
    contact_email: &str,
    contact_phone: &str,
    proof_reference: &str,
    created_at: i64,
) -> Result<Appeal> {
    let id = gen_id();
    conn.execute(
        "INSERT INTO appeals (id, order_identifier, appeal_type, status, contact_email,
            contact_phone, proof_reference, rejection_reason, admin_notes, created_at,
            reviewed_at)
         VALUES (?1, ?2, ?3, 'pending', ?4, ?5, ?6, NULL, NULL, ?7, NULL)",
        params![
            &id,
            order_identifier,
            appeal_type.as_str(),
            contact_email,
            contact_phone,
            proof_reference,
            created_at,
        ],
    )?;

    Ok(Appeal {
        id,
        order_identifier: order_identifier.to_string(),
        appeal_type,
        status: AppealStatus::Pending,
        contact_email: contact_email.to_string(),
        contact_phone: contact_phone.to_string(),
        proof_reference: Some(proof_reference.to_string()),
        rejection_reason: None,
        admin_notes: None,
        created_at,
        reviewed_at: None,
    })
}

/// Reset an existing appeal row back to pending with fresh proof and
/// contacts (the resubmit path). Keeps the row id so the order has a single
/// appeal audit trail.
pub fn reset_appeal_to_pending(
    conn: &Connection,
    id: &str,
    contact_email: &str,
    contact_phone: &str,
    proof_reference: &str,
    created_at: i64,
) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE appeals SET status = 'pending', contact_email = ?1, contact_phone = ?2,
            proof_reference = ?3, rejection_reason = NULL, reviewed_at = NULL, created_at = ?4
         WHERE id = ?5",
        params![contact_email, contact_phone, proof_reference, created_at, id],
    )?;
    Ok(updated > 0)
}

pub fn update_appeal_review(
    conn: &Connection,
    id: &str,
    status: AppealStatus,
    admin_notes: Option<&str>,
    rejection_reason: Option<&str>,
    clear_proof: bool,
    reviewed_at: i64,
) -> Result<bool> {
    let sql = if clear_proof {
        "UPDATE appeals SET status = ?1, admin_notes = ?2, rejection_reason = ?3,
            proof_reference = NULL, reviewed_at = ?4 WHERE id = ?5"
    } else {
        "UPDATE appeals SET status = ?1, admin_notes = ?2, rejection_reason = ?3,
            reviewed_at = ?4 WHERE id = ?5"
    };
    let updated = conn.execute(
        sql,
        params![status.as_str(), admin_notes, rejection_reason, reviewed_at, id],
    )?;
    Ok(updated > 0)
}

pub fn list_appeals(
    conn: &Connection,
    status: Option<AppealStatus>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Appeal>, i64)> {
    match status {
        Some(status) => {
            let total: i64 = conn.query_row(
                "SELECT COUNT(*) FROM appeals WHERE status = ?1",
                [status.as_str()],
                |row| row.get(0),
            )?;
            let items = query_all(
                conn,
                &format!(
                    "SELECT {APPEAL_COLS} FROM appeals WHERE status = ?1
                     ORDER BY created_at DESC LIMIT ?2 OFFSET ?3"
                ),
                params![status.as_str(), limit, offset],
            )?;
            Ok((items, total))
        }
        None => {
            let total: i64 =
                conn.query_row("SELECT COUNT(*) FROM appeals", [], |row| row.get(0))?;
            let items = query_all(
                conn,
                &format!(
                    "SELECT {APPEAL_COLS} FROM appeals
                     ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
                ),
                params![limit, offset],
            )?;
            Ok((items, total))
        }
    }
}
