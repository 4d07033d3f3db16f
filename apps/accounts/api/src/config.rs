use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_notifications::SmtpConfig;
use domain_users::UsersConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config components.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub smtp: SmtpConfig,
    pub users: UsersConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // DATABASE_URL is required
        let server = ServerConfig::from_env()?;
        let smtp = SmtpConfig::from_env()?;
        let users = UsersConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            smtp,
            users,
            environment,
        })
    }
}
