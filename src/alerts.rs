//! Low-inventory alerting.
//!
//! After a successful allocation (and on pool exhaustion) the coordinator's
//! caller checks each touched component against a configured threshold and
//! POSTs an alert payload to a webhook so operators can restock. Alerts are
//! best-effort: failures are logged and never affect the redemption
//! response. A per-component cooldown keeps repeat redemptions from spamming
//! the same alert.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Serialize;

use crate::db::{DbPool, inventory};

pub const DEFAULT_COOLDOWN_SECS: u64 = 3600;

/// Outcome of a single component check, mostly for tests and debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertResult {
    /// Alert was delivered to the webhook (or logged when no webhook is set).
    Sent,
    /// Below threshold but alerted within the cooldown window.
    Suppressed,
    /// Component has no configured threshold.
    NotTracked,
    /// Pool is healthy.
    AboveThreshold,
    /// The check itself failed (logged, never propagated).
    Failed,
}

/// Webhook payload for a low-inventory alert.
#[derive(Debug, Serialize)]
struct AlertPayload<'a> {
    event: &'static str,
    component_id: &'a str,
    available: i64,
    threshold: i64,
}

struct AlerterInner {
    client: Client,
    webhook_url: Option<String>,
    thresholds: HashMap<String, i64>,
    cooldown: Duration,
    last_alert: Mutex<HashMap<String, Instant>>,
}

#[derive(Clone)]
pub struct InventoryAlerter {
    inner: Arc<AlerterInner>,
}

impl InventoryAlerter {
    pub fn new(
        webhook_url: Option<String>,
        thresholds: HashMap<String, i64>,
        cooldown_secs: u64,
    ) -> Self {
        Self {
            inner: Arc::new(AlerterInner {
                client: Client::new(),
                webhook_url,
                thresholds,
                cooldown: Duration::from_secs(cooldown_secs),
                last_alert: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Count the component's remaining keys and alert if the pool dipped
    /// below its threshold. Errors are swallowed into logs by design.
    pub async fn check_component(&self, db: &DbPool, component_id: &str) -> AlertResult {
        let Some(&threshold) = self.inner.thresholds.get(component_id) else {
            return AlertResult::NotTracked;
        };

        let available = {
            let conn = match db.get() {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!("inventory alert: pool error: {e}");
                    return AlertResult::Failed;
                }
            };
            match inventory::count_available(&conn, component_id) {
                Ok(count) => count,
                Err(e) => {
                    tracing::error!("inventory alert: count failed: {e}");
                    return AlertResult::Failed;
                }
            }
        };

        if available >= threshold {
            return AlertResult::AboveThreshold;
        }

        if !self.take_cooldown_slot(component_id) {
            return AlertResult::Suppressed;
        }

        tracing::warn!(
            component_id,
            available,
            threshold,
            "license key inventory below threshold"
        );

        if let Some(url) = self.inner.webhook_url.as_deref() {
            let payload = AlertPayload {
                event: "low_inventory",
                component_id,
                available,
                threshold,
            };
            if let Err(e) = self.inner.client.post(url).json(&payload).send().await {
                tracing::error!("inventory alert webhook failed: {e}");
            }
        }

        AlertResult::Sent
    }

    /// Record an alert for the component unless one fired within the
    /// cooldown window. Returns whether the caller should alert.
    fn take_cooldown_slot(&self, component_id: &str) -> bool {
        let mut last_alert = match self.inner.last_alert.lock() {
            Ok(guard) => guard,
            // A poisoned cooldown map only risks a duplicate alert.
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        if let Some(last) = last_alert.get(component_id) {
            if now.duration_since(*last) < self.inner.cooldown {
                return false;
            }
        }
        last_alert.insert(component_id.to_string(), now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alerter(cooldown_secs: u64) -> InventoryAlerter {
        InventoryAlerter::new(
            None,
            [("WIN11HOME".to_string(), 3)].into(),
            cooldown_secs,
        )
    }

    #[test]
    fn cooldown_suppresses_back_to_back_alerts() {
        let alerter = alerter(3600);
        assert!(alerter.take_cooldown_slot("WIN11HOME"));
        assert!(!alerter.take_cooldown_slot("WIN11HOME"));
        // Other components keep their own window.
        assert!(alerter.take_cooldown_slot("PP2016"));
    }

    #[test]
    fn zero_cooldown_always_alerts() {
        let alerter = alerter(0);
        assert!(alerter.take_cooldown_slot("WIN11HOME"));
        assert!(alerter.take_cooldown_slot("WIN11HOME"));
    }
}
