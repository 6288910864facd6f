//! Domain Layer
//!
//! Entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{account::Account, account::NewAccount, child::Child, parent::Parent};
pub use repository::{AccountStore, Mailer, SessionStore, TokenCodec};
pub use value_object::{email::Email, role::Role};
