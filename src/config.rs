use std::collections::HashMap;
use std::env;

use crate::alerts::DEFAULT_COOLDOWN_SECS;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Bearer token for the admin routes. Unset disables them.
    pub admin_token: Option<String>,
    pub dev_mode: bool,
    /// Webhook that receives low-inventory alert payloads.
    pub alert_webhook_url: Option<String>,
    /// Per-FSN alert thresholds, e.g. "WIN11HOME=3,PP2016=5".
    pub alert_thresholds: HashMap<String, i64>,
    /// Seconds between repeat alerts for the same component.
    pub alert_cooldown_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("KEYDEPOT_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let alert_cooldown_secs: u64 = env::var("ALERT_COOLDOWN_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_COOLDOWN_SECS);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "keydepot.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
            dev_mode,
            alert_webhook_url: env::var("ALERT_WEBHOOK_URL").ok().filter(|u| !u.is_empty()),
            alert_thresholds: parse_thresholds(
                &env::var("ALERT_THRESHOLDS").unwrap_or_default(),
            ),
            alert_cooldown_secs,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse "FSN=COUNT,FSN=COUNT". Malformed entries are skipped with a warning
/// rather than failing startup.
fn parse_thresholds(raw: &str) -> HashMap<String, i64> {
    let mut thresholds = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.split_once('=') {
            Some((fsn, count)) => match count.trim().parse::<i64>() {
                Ok(count) if count > 0 && !fsn.trim().is_empty() => {
                    thresholds.insert(fsn.trim().to_string(), count);
                }
                _ => tracing::warn!("ignoring alert threshold entry: {entry}"),
            },
            None => tracing::warn!("ignoring alert threshold entry: {entry}"),
        }
    }
    thresholds
}
