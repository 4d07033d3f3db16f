//! Server infrastructure: router assembly, health endpoints, graceful
//! shutdown and connection cleanup.
//!
//! ```ignore
//! let (coordinator, _) = ShutdownCoordinator::new();
//! let router = create_router::<ApiDoc>(api_routes, cors, timeout)
//!     .merge(health_router(app_info!()));
//! create_production_app(router, &server_config, coordinator, cleanup).await?;
//! ```

pub mod app;
pub mod cleanup;
pub mod health;
pub mod shutdown;

pub use app::{create_app, create_production_app, create_router};
pub use cleanup::{CleanupCoordinator, close_postgres};
pub use health::{HealthCheckFuture, HealthResponse, health_router, run_health_checks};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
