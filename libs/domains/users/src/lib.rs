//! Users Domain
//!
//! Registration with email activation, bearer-token login, paginated user
//! listing, profile updates with images and password reset.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, bearer-token resolution
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business rules, password hashing, emails, images
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Users and tokens (trait + in-memory and Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Domain types, request bodies, responses
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_notifications::{AccountMailer, MemoryEmailProvider};
//! use domain_users::{FileImageStore, InMemoryTokenRepository, InMemoryUserRepository, UserService, handlers};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mailer = AccountMailer::new(Arc::new(MemoryEmailProvider::new()), "http://localhost:3000")?;
//! let images = FileImageStore::new("uploads/profile").await?;
//! let service = UserService::new(
//!     InMemoryUserRepository::new(),
//!     InMemoryTokenRepository::new(),
//!     mailer,
//!     Arc::new(images),
//! );
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod cleanup;
pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod images;
pub mod messages;
pub mod models;
pub mod pagination;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod token;
pub mod validation;

pub use cleanup::TokenCleanupTask;
pub use config::UsersConfig;
pub use error::{UserError, UserResult};
pub use images::{FileImageStore, ImageStore};
pub use messages::MessageKey;
pub use models::{
    AuthResponse, Credentials, MessageResponse, PasswordResetRequest, PasswordUpdate, RegisterUser, UpdateUser,
    User, UserProfile, UserSummary,
};
pub use pagination::{Page, PageRequest};
pub use postgres::{PgTokenRepository, PgUserRepository};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
pub use token::{AuthToken, InMemoryTokenRepository, TokenRepository};
