#![allow(dead_code)]

use std::collections::HashMap;

use chrono::Utc;
use rusqlite::Connection;
use tempfile::TempDir;

use keydepot::alerts::InventoryAlerter;
use keydepot::db::{self, AppState, DbPool, queries};
use keydepot::models::{
    CreateLicenseKey, CreateOrder, FulfillmentState, FulfillmentType, Order,
};

pub const DAY: i64 = 86400;
pub const ADMIN_TOKEN: &str = "test-admin-token";

pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Single in-memory connection with the schema applied, for library-level
/// tests that do not need pool concurrency.
pub fn mem_conn() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    db::init_db(&conn).expect("init schema");
    conn
}

/// File-backed pool so multiple connections (and threads) see one database.
/// The TempDir must outlive the pool.
pub fn file_pool(max_size: u32) -> (DbPool, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("keydepot-test.db");
    let pool = db::open_pool(path.to_str().expect("utf-8 temp path"), max_size)
        .expect("open pool");
    {
        let conn = pool.get().expect("get connection");
        db::init_db(&conn).expect("init schema");
    }
    (pool, dir)
}

pub fn test_state(pool: DbPool) -> AppState {
    AppState {
        db: pool,
        alerter: InventoryAlerter::new(None, HashMap::new(), 3600),
        admin_token: Some(ADMIN_TOKEN.to_string()),
    }
}

pub fn website_order(conn: &Connection, identifier: &str, fsn: &str, quantity: i64) -> Order {
    queries::create_order(
        conn,
        &CreateOrder {
            order_identifier: identifier.to_string(),
            product_component: Some(fsn.to_string()),
            quantity: Some(quantity),
            fulfillment_type: FulfillmentType::Website,
            fulfillment_state: None,
            ship_state: None,
            order_timestamp: now() - DAY,
        },
    )
    .expect("create website order")
}

pub fn fba_order(
    conn: &Connection,
    identifier: &str,
    fsn: &str,
    quantity: i64,
    age_days: i64,
    state: Option<FulfillmentState>,
) -> Order {
    queries::create_order(
        conn,
        &CreateOrder {
            order_identifier: identifier.to_string(),
            product_component: Some(fsn.to_string()),
            quantity: Some(quantity),
            fulfillment_type: FulfillmentType::AmazonFba,
            fulfillment_state: state,
            ship_state: None,
            order_timestamp: now() - age_days * DAY,
        },
    )
    .expect("create fba order")
}

/// Load `count` fresh keys for a component. Key strings are unique per
/// component and index so cross-test collisions cannot happen within a db.
pub fn seed_keys(conn: &Connection, component_id: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let key = format!("{component_id}-AAAAA-BBBBB-{i:05}");
            queries::create_license_key(
                conn,
                &CreateLicenseKey {
                    key: key.clone(),
                    component_id: component_id.to_string(),
                },
            )
            .expect("create license key");
            key
        })
        .collect()
}

pub fn seed_product(conn: &Connection, fsn: &str, display_name: &str) {
    queries::upsert_product(
        conn,
        &keydepot::models::UpsertProduct {
            fsn: fsn.to_string(),
            display_name: display_name.to_string(),
            download_url: Some(format!("https://downloads.example.com/{fsn}")),
            install_guide: None,
        },
    )
    .expect("upsert product");
}

pub fn set_delay(conn: &Connection, state_name: &str, hours: i64) {
    queries::upsert_state_delay(conn, state_name, hours).expect("upsert state delay");
}
