//! Sea-ORM entities for the `users` and `auth_tokens` tables.

pub mod auth_token;
pub mod user;
