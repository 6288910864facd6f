//! API DTOs (Data Transfer Objects)
//!
//! The wire format is snake_case JSON, unchanged from the previous
//! version of this API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::entity::{Account, Child, Parent};

// ============================================================================
// Sessions
// ============================================================================

/// Login / credentials-check request
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// ============================================================================
// Sign Up
// ============================================================================

/// Parent or manager signup request
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Account response (never carries the password hash)
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub role: String,
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub email_verified: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.into(),
            role: account.role.code().to_string(),
            first_name: account.first_name,
            second_name: account.second_name,
            last_name: account.last_name,
            phone: account.phone,
            email: account.email.into_db(),
            email_verified: account.email_verified,
        }
    }
}

/// Parent profile response
#[derive(Debug, Clone, Serialize)]
pub struct ParentResponse {
    pub id: i64,
    pub account_id: i64,
    pub passport: Option<String>,
    pub passport_verified: bool,
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub email_verified: bool,
}

impl From<Parent> for ParentResponse {
    fn from(parent: Parent) -> Self {
        Self {
            id: parent.id.into(),
            account_id: parent.account_id.into(),
            passport: parent.passport,
            passport_verified: parent.passport_verified,
            first_name: parent.first_name,
            second_name: parent.second_name,
            last_name: parent.last_name,
            phone: parent.phone,
            email: parent.email,
            email_verified: parent.email_verified,
        }
    }
}

/// Child profile response
#[derive(Debug, Clone, Serialize)]
pub struct ChildResponse {
    pub id: i64,
    pub account_id: i64,
    pub birth_date: Option<NaiveDate>,
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub email_verified: bool,
}

impl From<Child> for ChildResponse {
    fn from(child: Child) -> Self {
        Self {
            id: child.id.into(),
            account_id: child.account_id.into(),
            birth_date: child.birth_date,
            first_name: child.first_name,
            second_name: child.second_name,
            last_name: child.last_name,
            phone: child.phone,
            email: child.email,
            email_verified: child.email_verified,
        }
    }
}

// ============================================================================
// Query parameters
// ============================================================================

/// GET /email query
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

/// GET /manager/child query (account id of the child)
#[derive(Debug, Clone, Deserialize)]
pub struct ChildQuery {
    pub child: i64,
}

/// GET /manager/parent query (account id of the parent)
#[derive(Debug, Clone, Deserialize)]
pub struct ParentQuery {
    pub parent: i64,
}
