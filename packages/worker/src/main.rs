use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::store::{CodeStore, RedisCache, SqlCodeStore, init_db};
use mq::{RedisStreamBroker, StreamBroker};
use redis::aio::ConnectionManager;
use tracing::info;

use worker::WorkerAppConfig;
use worker::models::runner::CodeRunner;
use worker::models::sandbox::DockerSandbox;
use worker::models::worker::CodeWorkerPool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = WorkerAppConfig::load().context("Failed to load config")?;
    info!(
        num_workers = config.worker.num_of_workers,
        stream = %config.mq.stream,
        group = %config.mq.group,
        "Worker starting"
    );

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    let redis_client =
        redis::Client::open(config.mq.url.as_str()).context("Failed to open Redis client")?;
    let cache_conn = ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;
    let store: Arc<dyn CodeStore> =
        Arc::new(SqlCodeStore::with_cache(db, Arc::new(RedisCache::new(cache_conn))));

    let broker: Arc<dyn StreamBroker> = Arc::new(
        RedisStreamBroker::connect(&config.mq)
            .await
            .context("Failed to connect to message broker")?,
    );

    let sandbox = DockerSandbox::new(config.worker.docker_bin.clone());
    let runner = CodeRunner::new(
        sandbox,
        config.worker.work_dir.clone(),
        Duration::from_secs(config.worker.run_timeout_secs),
    )
    .context("Failed to create code runner")?;

    let mut pool = CodeWorkerPool::new(config.worker.num_of_workers, broker, store, runner);
    pool.start().await.context("Failed to start worker pool")?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("shutdown signal received");

    pool.stop().await;

    Ok(())
}
