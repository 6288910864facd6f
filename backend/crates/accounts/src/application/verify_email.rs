//! Verify Email Use Case
//!
//! Issues and redeems email-verification tokens. A token is the
//! account's email address run through the token codec, so redeeming
//! is decrypt-then-lookup with no server-side token state.

use std::sync::Arc;

use kernel::id::AccountId;

use crate::domain::repository::{AccountStore, TokenCodec};
use crate::domain::value_object::Email;
use crate::error::{AccountError, AccountResult};

/// Verify email use case
pub struct VerifyEmailUseCase<A>
where
    A: AccountStore,
{
    accounts: Arc<A>,
    codec: Arc<dyn TokenCodec>,
}

impl<A> VerifyEmailUseCase<A>
where
    A: AccountStore,
{
    pub fn new(accounts: Arc<A>, codec: Arc<dyn TokenCodec>) -> Self {
        Self { accounts, codec }
    }

    /// Issue a verification token for an email address
    pub fn issue(&self, email: &Email) -> AccountResult<String> {
        self.codec.encrypt(email.as_str().as_bytes())
    }

    /// Redeem a token, flipping `email_verified` for its account
    ///
    /// Forged or corrupted tokens fail as `InvalidToken`: they either
    /// do not decode, decrypt to non-UTF-8 bytes, or decrypt to an
    /// email no account has. Redeeming twice is a no-op success.
    pub async fn redeem(&self, token: &str) -> AccountResult<AccountId> {
        let plaintext = self
            .codec
            .decrypt(token)
            .map_err(|_| AccountError::InvalidToken)?;

        let email = String::from_utf8(plaintext).map_err(|_| AccountError::InvalidToken)?;
        let email = Email::new(email).map_err(|_| AccountError::InvalidToken)?;

        let account_id = self
            .accounts
            .mark_email_verified(&email)
            .await
            .map_err(|e| match e {
                AccountError::AccountNotFound => AccountError::InvalidToken,
                other => other,
            })?;

        tracing::info!(%account_id, "Email address verified");

        Ok(account_id)
    }
}
