use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Connect with production pool settings and sync the schema.
pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .sqlx_logging(true);

    init_db_with(opt).await
}

/// Connect with caller-supplied options and sync the schema. Tests use this
/// with a single-connection in-memory SQLite pool.
pub async fn init_db_with(opt: ConnectOptions) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(opt).await?;
    db.get_schema_registry("common::store::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}
