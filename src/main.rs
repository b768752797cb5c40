use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use keydepot::alerts::InventoryAlerter;
use keydepot::config::Config;
use keydepot::db::{self, AppState};
use keydepot::handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("keydepot=info,tower_http=info")),
        )
        .init();

    let pool = db::open_pool(&config.database_path, 8)
        .with_context(|| format!("opening database at {}", config.database_path))?;
    {
        let conn = pool.get()?;
        db::init_db(&conn).context("initializing database schema")?;
    }

    if config.admin_token.is_none() && !config.dev_mode {
        tracing::warn!("ADMIN_TOKEN not set; admin routes are disabled");
    }

    let alerter = InventoryAlerter::new(
        config.alert_webhook_url.clone(),
        config.alert_thresholds.clone(),
        config.alert_cooldown_secs,
    );

    let state = AppState {
        db: pool,
        alerter,
        admin_token: config.admin_token.clone(),
    };

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("binding {}", config.addr()))?;
    tracing::info!("listening on {}", config.addr());
    axum::serve(listener, app).await?;

    Ok(())
}
