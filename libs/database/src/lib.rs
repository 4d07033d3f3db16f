//! PostgreSQL connection management for the accounts service.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//! use database::common::RetryConfig;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_with_retry(config, RetryConfig::new().with_max_retries(5)).await?;
//! postgres::run_migrations::<migration::Migrator>(&db, "accounts").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
