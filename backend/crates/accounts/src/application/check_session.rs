//! Check Session Use Case
//!
//! Verifies and renews sessions, resolving them back to their account.

use std::sync::Arc;

use crate::application::config::AccountsConfig;
use crate::domain::entity::Account;
use crate::domain::repository::{AccountStore, SessionStore};
use crate::domain::value_object::Email;
use crate::error::{AccountError, AccountResult};

/// Check session use case
pub struct CheckSessionUseCase<S, A>
where
    S: SessionStore,
    A: AccountStore,
{
    sessions: Arc<S>,
    accounts: Arc<A>,
    config: Arc<AccountsConfig>,
}

impl<S, A> CheckSessionUseCase<S, A>
where
    S: SessionStore,
    A: AccountStore,
{
    pub fn new(sessions: Arc<S>, accounts: Arc<A>, config: Arc<AccountsConfig>) -> Self {
        Self {
            sessions,
            accounts,
            config,
        }
    }

    /// Validate a session without renewing it, returning the account key
    pub async fn check(&self, session_id: &str) -> AccountResult<String> {
        self.sessions.get(session_id).await
    }

    /// Renew a session and resolve it to its account
    ///
    /// Runs on every authenticated request: the renewal gives sessions
    /// sliding-window expiry. All store calls are awaited inline, so
    /// nothing outlives the request.
    pub async fn prolong(&self, session_id: &str) -> AccountResult<Account> {
        self.sessions
            .renew(session_id, self.config.session_ttl)
            .await?;

        let account_key = self.sessions.get(session_id).await?;
        let email = Email::from_db(account_key);

        match self.accounts.get_by_email(&email).await? {
            Some(account) => Ok(account),
            None => {
                // The account behind this session is gone; the session
                // must not keep working
                tracing::warn!(%email, "Session points at a deleted account, dropping it");
                self.sessions.delete(session_id).await?;
                Err(AccountError::Unauthenticated)
            }
        }
    }
}
