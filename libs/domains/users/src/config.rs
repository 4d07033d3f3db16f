use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the users domain.
#[derive(Debug, Clone)]
pub struct UsersConfig {
    /// Root directory for uploaded files
    pub upload_dir: PathBuf,
    /// Subdirectory of `upload_dir` holding profile images
    pub profile_dir: String,
    pub password_reset_token_ttl: Duration,
    pub token_cleanup_interval: Duration,
    /// Base URL used for links in account emails
    pub frontend_url: String,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            profile_dir: "profile".to_string(),
            password_reset_token_ttl: Duration::from_secs(24 * 60 * 60),
            token_cleanup_interval: Duration::from_secs(60 * 60),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

impl UsersConfig {
    pub fn profile_path(&self) -> PathBuf {
        self.upload_dir.join(&self.profile_dir)
    }
}

impl FromEnv for UsersConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let ttl_minutes: u64 = env_parse_or("PASSWORD_RESET_TOKEN_TTL_MINUTES", 1440)?;
        let cleanup_secs: u64 = env_parse_or("TOKEN_CLEANUP_INTERVAL_SECS", 3600)?;

        let ttl_secs = ttl_minutes.checked_mul(60).ok_or_else(|| ConfigError::ParseError {
            key: "PASSWORD_RESET_TOKEN_TTL_MINUTES".to_string(),
            details: format!("{ttl_minutes} minutes does not fit in seconds"),
        })?;

        if cleanup_secs == 0 {
            return Err(ConfigError::ParseError {
                key: "TOKEN_CLEANUP_INTERVAL_SECS".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            upload_dir: PathBuf::from(env_or_default("UPLOAD_DIR", "uploads")),
            profile_dir: env_or_default("PROFILE_DIR", "profile"),
            password_reset_token_ttl: Duration::from_secs(ttl_secs),
            token_cleanup_interval: Duration::from_secs(cleanup_secs),
            frontend_url: env_or_default("FRONTEND_URL", "http://localhost:3000"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 5] = [
        "UPLOAD_DIR",
        "PROFILE_DIR",
        "PASSWORD_RESET_TOKEN_TTL_MINUTES",
        "TOKEN_CLEANUP_INTERVAL_SECS",
        "FRONTEND_URL",
    ];

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(VARS, || {
            let config = UsersConfig::from_env().unwrap();
            assert_eq!(config.profile_path(), PathBuf::from("uploads/profile"));
            assert_eq!(config.password_reset_token_ttl, Duration::from_secs(86_400));
            assert_eq!(config.token_cleanup_interval, Duration::from_secs(3600));
            assert_eq!(config.frontend_url, "http://localhost:3000");
        });
    }

    #[test]
    fn test_custom_values() {
        temp_env::with_vars(
            [
                ("UPLOAD_DIR", Some("/var/lib/accounts")),
                ("PROFILE_DIR", Some("avatars")),
                ("PASSWORD_RESET_TOKEN_TTL_MINUTES", Some("30")),
                ("TOKEN_CLEANUP_INTERVAL_SECS", Some("60")),
            ],
            || {
                let config = UsersConfig::from_env().unwrap();
                assert_eq!(config.profile_path(), PathBuf::from("/var/lib/accounts/avatars"));
                assert_eq!(config.password_reset_token_ttl, Duration::from_secs(1800));
                assert_eq!(config.token_cleanup_interval, Duration::from_secs(60));
            },
        );
    }

    #[test]
    fn test_zero_cleanup_interval_is_rejected() {
        temp_env::with_var("TOKEN_CLEANUP_INTERVAL_SECS", Some("0"), || {
            assert!(UsersConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_overflowing_reset_ttl_is_rejected() {
        let minutes = u64::MAX.to_string();
        temp_env::with_var("PASSWORD_RESET_TOKEN_TTL_MINUTES", Some(minutes.as_str()), || {
            match UsersConfig::from_env() {
                Err(ConfigError::ParseError { key, .. }) => assert_eq!(key, "PASSWORD_RESET_TOKEN_TTL_MINUTES"),
                other => panic!("expected parse error, got {other:?}"),
            }
        });
    }
}
