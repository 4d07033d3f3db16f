use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::common::{RetryConfig, retry_with_backoff};

/// Opens a pool with the settings in `config`.
pub async fn connect(config: &PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.to_connect_options()).await?;
    info!(
        max_connections = config.max_connections,
        "Connected to PostgreSQL"
    );
    Ok(db)
}

/// [`connect`] with exponential backoff, for databases that start alongside
/// the service. `config.connect_retries` overrides `retry.max_retries`.
pub async fn connect_with_retry(
    config: PostgresConfig,
    retry: RetryConfig,
) -> Result<DatabaseConnection, DbErr> {
    let retry = retry.with_max_retries(config.connect_retries);
    retry_with_backoff(|| connect(&config), retry).await
}

/// Applies every pending migration of `M`.
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> Result<(), DbErr> {
    info!("Running {} database migrations...", app_name);
    M::up(db, None).await?;
    info!("Migrations completed successfully for {}", app_name);
    Ok(())
}
