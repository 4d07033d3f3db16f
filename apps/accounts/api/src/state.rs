//! Shared application state.

use domain_users::{PgTokenRepository, PgUserRepository, UserService};

pub type AccountsService = UserService<PgUserRepository, PgTokenRepository>;

/// Cloned into routers; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: database::postgres::DatabaseConnection,
    pub users: AccountsService,
}
