use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AccountError, AccountResult};

/// Account role, stored as text in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Child,
    Manager,
    Admin,
}

impl Role {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use Role::*;
        match self {
            Parent => "parent",
            Child => "child",
            Manager => "manager",
            Admin => "admin",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> AccountResult<Self> {
        use Role::*;
        match code {
            "parent" => Ok(Parent),
            "child" => Ok(Child),
            "manager" => Ok(Manager),
            "admin" => Ok(Admin),
            other => Err(AccountError::Internal(format!("Invalid role code: {other}"))),
        }
    }

    #[inline]
    pub const fn is_parent(&self) -> bool {
        matches!(self, Role::Parent)
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
