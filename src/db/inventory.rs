//! Atomic claim primitive over the license key pool.
//!
//! The pool is contended by every concurrent redemption, so claiming must be
//! a single conditional UPDATE: select-then-update in separate statements
//! would let two callers read the same unredeemed rows before either writes.
//! `claim_keys` runs one `UPDATE ... WHERE id IN (SELECT ...) RETURNING`
//! inside the caller's IMMEDIATE transaction; SQLite's writer lock serializes
//! competing claims, and an uncommitted transaction rolls the marks back,
//! which is the compensating action for cross-component shortfalls.

use rusqlite::{Connection, Transaction, params};

use crate::error::Result;
use crate::models::LicenseKey;

use super::from_row::{FromRow, LICENSE_KEY_COLS, query_all};

/// Claim up to `count` unredeemed keys for a component and bind them to an
/// order, oldest first.
///
/// Claim order is the total order `(created_at, key)`: `created_at` has
/// one-second resolution so bulk-imported keys tie, and the key text is the
/// unique tie-break. Replay (`keys_bound_to_order`) sorts the same way, so a
/// re-checked order sees its keys in the original allocation sequence.
///
/// Returns the claimed rows; fewer than `count` means the pool is short and
/// the caller must abort its transaction so nothing stays bound. Within one
/// committed transaction no other claim can observe or take the same rows.
pub fn claim_keys(
    tx: &Transaction,
    component_id: &str,
    order_identifier: &str,
    count: i64,
    now: i64,
) -> Result<Vec<LicenseKey>> {
    let mut stmt = tx.prepare(
        "UPDATE license_keys
         SET redeemed = 1, bound_order_identifier = ?1, redeemed_at = ?2
         WHERE id IN (
             SELECT id FROM license_keys
             WHERE component_id = ?3 AND redeemed = 0
             ORDER BY created_at, key
             LIMIT ?4
         )
         RETURNING id, key, component_id, bound_order_identifier, redeemed, redeemed_at, created_at",
    )?;
    let mut claimed = stmt
        .query_map(params![order_identifier, now, component_id, count], |row| {
            LicenseKey::from_row(row)
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    // RETURNING emits rows in no guaranteed order.
    sort_claim_order(&mut claimed);
    Ok(claimed)
}

/// The one total order used for claims and replays.
pub fn sort_claim_order(keys: &mut [LicenseKey]) {
    keys.sort_by(|a, b| (a.created_at, a.key.as_str()).cmp(&(b.created_at, b.key.as_str())));
}

/// Explicitly return claimed keys to the pool. Only used when a claim was
/// committed and must be undone outside its original transaction (admin
/// correction); in-flight shortfalls roll back instead.
pub fn release_keys(conn: &Connection, ids: &[String]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let placeholders = (1..=ids.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE license_keys
         SET redeemed = 0, bound_order_identifier = NULL, redeemed_at = NULL
         WHERE id IN ({placeholders}) AND redeemed = 1"
    );
    let released = conn.execute(&sql, rusqlite::params_from_iter(ids))?;
    Ok(released)
}

pub fn count_available(conn: &Connection, component_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM license_keys WHERE component_id = ?1 AND redeemed = 0",
        [component_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// The stable key set bound to an order, in claim order. This is what replay
/// returns instead of allocating again.
pub fn keys_bound_to_order(conn: &Connection, order_identifier: &str) -> Result<Vec<LicenseKey>> {
    query_all(
        conn,
        &format!(
            "SELECT {LICENSE_KEY_COLS} FROM license_keys
             WHERE bound_order_identifier = ?1
             ORDER BY created_at, key"
        ),
        [order_identifier],
    )
}
