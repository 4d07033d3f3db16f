//! Notifications Domain
//!
//! Account emails (activation and password reset) rendered with Handlebars
//! and delivered synchronously through an [`EmailProvider`].
//!
//! ```rust,ignore
//! use domain_notifications::{AccountMailer, SmtpConfig, SmtpProvider};
//!
//! let provider = SmtpProvider::new(SmtpConfig::from_env()?)?;
//! let mailer = AccountMailer::new(Arc::new(provider), "http://localhost:3000")?;
//! mailer.send_password_reset("user1@mail.com", &token).await?;
//! ```

pub mod error;
pub mod providers;
pub mod service;
pub mod templates;

pub use error::{NotificationError, NotificationResult};
pub use providers::{EmailContent, EmailProvider, MemoryEmailProvider, SentEmail, SmtpConfig, SmtpProvider};
pub use service::AccountMailer;
pub use templates::TemplateEngine;
