//! Sign In Use Case
//!
//! Authenticates an account and creates a session.

use std::sync::Arc;

use crate::application::config::AccountsConfig;
use crate::domain::entity::Account;
use crate::domain::repository::{AccountStore, SessionStore};
use crate::domain::value_object::{Email, Role};
use crate::error::{AccountError, AccountResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
pub struct SignInOutput {
    /// Session id for the cookie
    pub session_id: String,
    /// Authenticated account
    pub account: Account,
}

/// Sign in use case
pub struct SignInUseCase<S, A>
where
    S: SessionStore,
    A: AccountStore,
{
    sessions: Arc<S>,
    accounts: Arc<A>,
    config: Arc<AccountsConfig>,
}

impl<S, A> SignInUseCase<S, A>
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

    pub async fn execute(&self, input: SignInInput) -> AccountResult<SignInOutput> {
        // A malformed email cannot belong to any account
        let email = Email::new(&input.email).map_err(|_| AccountError::InvalidCredentials)?;

        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let password_valid =
            platform::password::verify_password(&input.password, &account.password_hash)
                .map_err(|e| AccountError::Internal(e.to_string()))?;

        if !password_valid {
            return Err(AccountError::InvalidCredentials);
        }

        // Parents must confirm their email before the first login
        if account.role == Role::Parent && !account.email_verified {
            return Err(AccountError::EmailNotVerified);
        }

        let session_id = self
            .sessions
            .create(account.email.as_str(), self.config.session_ttl)
            .await?;

        tracing::info!(
            account_id = %account.id,
            role = %account.role,
            "Account signed in"
        );

        Ok(SignInOutput {
            session_id,
            account,
        })
    }
}
