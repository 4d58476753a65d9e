//! Cinema Storefront - online cinema shop backend

use anyhow::Result;
use cinema_storefront::config::AppConfig;
use cinema_storefront::http::{router, AppState};
use cinema_storefront::notify::LogNotifier;
use cinema_storefront::store::{InMemoryStore, PgStore, Store};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = AppConfig::from_env()?;
    let store: Arc<dyn Store> = match cfg.database_url.as_deref() {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(cfg.database_max_connections).connect(url).await?;
            if cfg.run_migrations {
                sqlx::migrate!("./migrations").run(&pool).await?;
            }
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, keeping data in memory");
            Arc::new(InMemoryStore::new())
        }
    };
    let notifier = Arc::new(LogNotifier::new(cfg.notification_sender.clone()));
    let app = router(AppState::new(store, notifier));

    let addr = cfg.bind_addr();
    tracing::info!("Cinema Storefront listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
