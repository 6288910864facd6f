//! Account Entity
//!
//! One row per registered person, regardless of role. Role-specific data
//! (parent passport, child birth date) lives in the profile entities.

use kernel::id::AccountId;

use crate::domain::value_object::{Email, Role};

/// A registered account
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub role: Role,
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Email,
    pub email_verified: bool,
    /// Argon2id hash in PHC string format
    pub password_hash: String,
}

impl Account {
    /// Full display name, used in outbound mail
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Account data before persistence assigns an id
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub role: Role,
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Email,
    pub email_verified: bool,
    pub password_hash: String,
}
