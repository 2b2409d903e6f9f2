use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderName, HeaderValue, Method};
use common::store::{CodeStore, SqlCodeStore, init_db};
use mq::{RedisStreamBroker, StreamBroker};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use server::build_router;
use server::config::AppConfig;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    let store: Arc<dyn CodeStore> = Arc::new(SqlCodeStore::new(db.clone()));

    let broker = RedisStreamBroker::connect(&config.mq)
        .await
        .context("Failed to connect to message broker")?;
    broker
        .ensure_group()
        .await
        .context("Failed to create consumer group")?;
    let broker: Arc<dyn StreamBroker> = Arc::new(broker);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let mut app = build_router(AppState {
        db,
        store,
        broker: Some(broker),
        config: config.clone(),
    });

    if let Some(cors) = &config.server.cors {
        let origins: Vec<HeaderValue> = cors
            .allow_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([
                    HeaderName::from_static("content-type"),
                    HeaderName::from_static("authorization"),
                ])
                .max_age(Duration::from_secs(cors.max_age)),
        );
    }

    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind listener")?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
