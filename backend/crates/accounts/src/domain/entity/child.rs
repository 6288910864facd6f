//! Child Profile Entity

use chrono::NaiveDate;
use kernel::id::{AccountId, ChildId};

/// Child profile joined with its account fields
#[derive(Debug, Clone)]
pub struct Child {
    pub id: ChildId,
    pub account_id: AccountId,
    pub birth_date: Option<NaiveDate>,
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub email_verified: bool,
}
