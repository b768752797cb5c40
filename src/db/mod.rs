//! SQLite-backed storage: connection pool, schema, and query modules.

pub mod from_row;
pub mod inventory;
pub mod queries;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::alerts::InventoryAlerter;
use crate::error::Result;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub alerter: InventoryAlerter,
    pub admin_token: Option<String>,
}

/// Open a pooled connection to the database file.
///
/// Every connection runs in WAL mode with a busy timeout so concurrent
/// redemption transactions queue instead of failing with SQLITE_BUSY.
pub fn open_pool(path: &str, max_size: u32) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
    });
    Ok(Pool::builder().max_size(max_size).build(manager)?)
}

/// Create tables and indexes. Idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            order_identifier TEXT NOT NULL UNIQUE COLLATE NOCASE,
            product_component TEXT,
            quantity INTEGER NOT NULL DEFAULT 1,
            fulfillment_type TEXT NOT NULL,
            block_status TEXT NOT NULL DEFAULT 'none',
            refunded INTEGER NOT NULL DEFAULT 0,
            fulfillment_state TEXT,
            ship_state TEXT,
            order_timestamp INTEGER NOT NULL,
            early_appeal_status TEXT NOT NULL DEFAULT 'none',
            feedback_appeal_status TEXT NOT NULL DEFAULT 'none',
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS license_keys (
            id TEXT PRIMARY KEY,
            key TEXT NOT NULL UNIQUE,
            component_id TEXT NOT NULL,
            bound_order_identifier TEXT COLLATE NOCASE,
            redeemed INTEGER NOT NULL DEFAULT 0,
            redeemed_at INTEGER,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_license_keys_pool
            ON license_keys (component_id, redeemed);
        CREATE INDEX IF NOT EXISTS idx_license_keys_bound
            ON license_keys (bound_order_identifier);

        CREATE TABLE IF NOT EXISTS appeals (
            id TEXT PRIMARY KEY,
            order_identifier TEXT NOT NULL COLLATE NOCASE,
            appeal_type TEXT NOT NULL,
            status TEXT NOT NULL,
            contact_email TEXT NOT NULL,
            contact_phone TEXT NOT NULL,
            proof_reference TEXT,
            rejection_reason TEXT,
            admin_notes TEXT,
            created_at INTEGER NOT NULL,
            reviewed_at INTEGER,
            UNIQUE (order_identifier, appeal_type)
        );

        CREATE TABLE IF NOT EXISTS products (
            fsn TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            download_url TEXT,
            install_guide TEXT,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS state_delays (
            state_name TEXT PRIMARY KEY,
            delay_hours INTEGER NOT NULL
        );",
    )?;
    Ok(())
}
