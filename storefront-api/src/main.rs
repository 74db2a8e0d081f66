use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use storefront_api::{app, AppState, InitDbGuard};
use storefront_core::MemoryStore;
use storefront_store::app_config::{Config, StorageBackend};
use storefront_store::{DbClient, StoreOrderRepository, StoreProductRepository, StoreUserRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "storefront_api=debug,storefront_core=debug,storefront_store=debug,tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Storefront API on port {}", config.server.port);

    let guard = InitDbGuard {
        debug: config.server.debug,
        token: config.init_db.token.clone(),
    };

    let app_state = match config.database.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on exit");
            AppState::in_memory(Arc::new(MemoryStore::new()), guard)
        }
        StorageBackend::Postgres => {
            let db = DbClient::from_config(&config.database)
                .await
                .context("Failed to connect to PostgreSQL")?;
            if config.database.migrate_on_start {
                db.migrate().await.context("Failed to run migrations")?;
            }
            AppState::new(
                Arc::new(StoreUserRepository::new(db.pool.clone())),
                Arc::new(StoreProductRepository::new(db.pool.clone())),
                Arc::new(StoreOrderRepository::new(db.pool.clone())),
                Arc::new(db),
                guard,
            )
        }
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
