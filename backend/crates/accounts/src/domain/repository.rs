//! Repository Traits
//!
//! Interfaces for session storage, account persistence, token
//! encoding, and outbound mail. Implementations live in the
//! infrastructure layer.

use std::time::Duration;

use kernel::id::{AccountId, ParentId};

use crate::domain::entity::{Account, Child, NewAccount, Parent};
use crate::domain::value_object::Email;
use crate::error::AccountResult;

/// Server-side session store trait
///
/// Expiry is enforced by the store itself (Redis TTL); callers never
/// compare timestamps.
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Create a session for an account key and return a fresh session id
    async fn create(&self, account_key: &str, ttl: Duration) -> AccountResult<String>;

    /// Resolve a session id to its account key
    ///
    /// `SessionNotFound` if the session is absent or already expired.
    async fn get(&self, session_id: &str) -> AccountResult<String>;

    /// Reset the session TTL (sliding-window renewal)
    ///
    /// `SessionNotFound` if the key no longer exists: renewing an
    /// expired session does not resurrect it.
    async fn renew(&self, session_id: &str, ttl: Duration) -> AccountResult<()>;

    /// Delete a session; absence is not an error
    async fn delete(&self, session_id: &str) -> AccountResult<()>;
}

/// Account persistence trait
#[trait_variant::make(AccountStore: Send)]
pub trait LocalAccountStore {
    /// Find account by email
    async fn get_by_email(&self, email: &Email) -> AccountResult<Option<Account>>;

    /// Find account by id
    async fn get_by_id(&self, id: AccountId) -> AccountResult<Option<Account>>;

    /// Create a new account (`EmailTaken` on unique violation)
    async fn create(&self, account: &NewAccount) -> AccountResult<Account>;

    /// Flip email_verified for the account with this email
    ///
    /// Returns the account id; `AccountNotFound` if no such email.
    async fn mark_email_verified(&self, email: &Email) -> AccountResult<AccountId>;

    /// Parent profile for an account, if one exists
    async fn parent_profile(&self, account_id: AccountId) -> AccountResult<Option<Parent>>;

    /// Child profile for an account, if one exists
    async fn child_profile(&self, account_id: AccountId) -> AccountResult<Option<Child>>;

    /// Create a parent profile for an account (idempotent)
    async fn create_parent_profile(&self, account_id: AccountId) -> AccountResult<Parent>;

    /// Children linked to a parent profile
    async fn children_of(&self, parent_id: ParentId) -> AccountResult<Vec<Child>>;

    /// All manager accounts
    async fn managers(&self) -> AccountResult<Vec<Account>>;
}

/// Outbound mail trait
#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    /// Send a verification email carrying the token link
    async fn send_verification_email(
        &self,
        to: &Email,
        name: &str,
        token: &str,
    ) -> AccountResult<()>;
}

/// Opaque token codec trait
///
/// Sync and dyn-safe: handlers hold it as `Arc<dyn TokenCodec>`.
pub trait TokenCodec: Send + Sync {
    /// Encrypt a payload into an opaque token
    fn encrypt(&self, plaintext: &[u8]) -> AccountResult<String>;

    /// Decrypt an opaque token back into its payload
    fn decrypt(&self, token: &str) -> AccountResult<Vec<u8>>;
}
