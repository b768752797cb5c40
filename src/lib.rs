//! License key allocation and redemption engine.
//!
//! Given a customer-presented order identifier (website order, Amazon order
//! id, or secret code), resolve it to exactly one purchase, gate it through
//! eligibility rules, and atomically allocate the owed license keys from a
//! shared inventory pool with exactly-once, replay-safe semantics.

pub mod alerts;
pub mod appeals;
pub mod catalog;
pub mod config;
pub mod db;
pub mod eligibility;
pub mod error;
pub mod handlers;
pub mod identifier;
pub mod middleware;
pub mod models;
pub mod redemption;
pub mod util;
