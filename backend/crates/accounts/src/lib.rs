//! Accounts Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Redis/Postgres/SMTP implementations
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Email + password login with server-side sessions (Redis-backed)
//! - Sliding-window session renewal on every authenticated request
//! - Role-based access (Parent, Child, Manager, Admin)
//! - Parent self-signup with email verification tokens
//! - Manager provisioning by admins
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Session ids are 32 random bytes, expiry enforced by Redis TTL
//! - Verification tokens are AES-192-CFB-encrypted email addresses
//!   (obfuscation only, no authentication tag)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AccountsConfig;
pub use error::{AccountError, AccountResult};
pub use infra::postgres::PgAccountStore;
pub use infra::redis::RedisSessionStore;
pub use infra::smtp::SmtpMailer;
pub use presentation::router::accounts_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
