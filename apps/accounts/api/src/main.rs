use axum_helpers::{
    CleanupCoordinator, ShutdownCoordinator, close_postgres, cors_layer_from_env, create_production_app,
    create_router, health_router,
};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use domain_notifications::{AccountMailer, SmtpProvider};
use domain_users::{FileImageStore, PgTokenRepository, PgUserRepository, TokenCleanupTask, UserService};
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible operation
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.app, &config.environment);

    let db = database::postgres::connect_with_retry(config.database.clone(), RetryConfig::new())
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;
    database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name).await?;

    let provider = SmtpProvider::new(config.smtp.clone())?;
    info!(host = %config.smtp.host, port = config.smtp.port, "SMTP provider configured");
    let mailer = AccountMailer::new(Arc::new(provider), &config.users.frontend_url)?;

    let profile_dir = config.users.profile_path();
    let images = FileImageStore::new(&profile_dir).await?;

    let users = UserService::new(
        PgUserRepository::new(db.clone()),
        PgTokenRepository::new(db.clone()),
        mailer,
        Arc::new(images),
    )
    .with_reset_token_ttl(config.users.password_reset_token_ttl);

    let (coordinator, _shutdown_rx) = ShutdownCoordinator::new();

    let sweep = TokenCleanupTask::new(
        Arc::new(PgTokenRepository::new(db.clone())),
        config.users.token_cleanup_interval,
    )
    .spawn(coordinator.subscribe());

    let mut cleanup = CleanupCoordinator::new();
    cleanup.add_handle("token-sweep", sweep);

    let state = AppState {
        config: config.clone(),
        db: db.clone(),
        users,
    };

    let cors = cors_layer_from_env(&config.environment)?;
    let router = create_router::<openapi::ApiDoc>(api::routes(&state), cors, config.server.request_timeout);

    // - /health: liveness with app name/version
    // - /ready: database ping
    // - /images: stored profile images
    let app = router
        .merge(health_router(config.app))
        .merge(api::ready_router(state))
        .merge(api::images_router(&profile_dir));

    info!(
        "Starting accounts API ({}s shutdown timeout)",
        config.server.shutdown_timeout.as_secs()
    );

    create_production_app(app, &config.server, coordinator, async move {
        // The sweep exits on the shutdown broadcast; the pool closes after it.
        cleanup.run().await;
        close_postgres(db, "accounts").await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Accounts API shutdown complete");
    Ok(())
}
