//! Parent Profile Entity

use kernel::id::{AccountId, ParentId};

/// Parent profile joined with its account fields
#[derive(Debug, Clone)]
pub struct Parent {
    pub id: ParentId,
    pub account_id: AccountId,
    /// Passport data, filled in later through the registration flow
    pub passport: Option<String>,
    pub passport_verified: bool,
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub email_verified: bool,
}
