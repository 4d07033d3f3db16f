use sea_orm::DatabaseConnection;
use tracing::debug;

use crate::common::DatabaseError;

/// Pings the pool; used by the readiness endpoint.
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    debug!("Running PostgreSQL health check");
    db.ping()
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("PostgreSQL ping failed: {e}")))
}
