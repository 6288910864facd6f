//! Sign Up Use Case
//!
//! Parent self-registration (with email verification) and manager
//! provisioning by admins.

use std::sync::Arc;

use crate::domain::entity::{Account, NewAccount};
use crate::domain::repository::{AccountStore, Mailer, TokenCodec};
use crate::domain::value_object::{Email, Role};
use crate::error::{AccountError, AccountResult};

/// Sign up input
pub struct SignUpInput {
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

/// Sign up use case
pub struct SignUpUseCase<A, M>
where
    A: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    accounts: Arc<A>,
    mailer: Arc<M>,
    codec: Arc<dyn TokenCodec>,
}

impl<A, M> SignUpUseCase<A, M>
where
    A: AccountStore,
    M: Mailer + Send + Sync + 'static,
{
    pub fn new(accounts: Arc<A>, mailer: Arc<M>, codec: Arc<dyn TokenCodec>) -> Self {
        Self {
            accounts,
            mailer,
            codec,
        }
    }

    /// Register a parent account and send the verification email
    pub async fn sign_up_parent(&self, input: SignUpInput) -> AccountResult<Account> {
        let account = self.create_account(input, Role::Parent, false).await?;

        self.send_verification(&account)?;

        tracing::info!(account_id = %account.id, "Parent account registered");

        Ok(account)
    }

    /// Register a manager account (admin-only route)
    ///
    /// Managers are provisioned by a trusted admin, so their email is
    /// considered verified from the start.
    pub async fn sign_up_manager(&self, input: SignUpInput) -> AccountResult<Account> {
        let account = self.create_account(input, Role::Manager, true).await?;

        tracing::info!(account_id = %account.id, "Manager account created");

        Ok(account)
    }

    /// Re-send the verification email after a credentials check
    ///
    /// No-op success if the email is already verified.
    pub async fn resend_verification(&self, email: &str, password: &str) -> AccountResult<()> {
        let email = Email::new(email).map_err(|_| AccountError::InvalidCredentials)?;

        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let password_valid = platform::password::verify_password(password, &account.password_hash)
            .map_err(|e| AccountError::Internal(e.to_string()))?;

        if !password_valid {
            return Err(AccountError::InvalidCredentials);
        }

        if account.email_verified {
            return Ok(());
        }

        self.send_verification(&account)
    }

    async fn create_account(
        &self,
        input: SignUpInput,
        role: Role,
        email_verified: bool,
    ) -> AccountResult<Account> {
        let email = Email::new(&input.email)?;

        platform::password::validate_password(&input.password)
            .map_err(|e| AccountError::Validation(e.to_string()))?;

        let password_hash = platform::password::hash_password(&input.password)
            .map_err(|e| AccountError::Internal(e.to_string()))?;

        self.accounts
            .create(&NewAccount {
                role,
                first_name: input.first_name,
                second_name: input.second_name,
                last_name: input.last_name,
                phone: input.phone,
                email,
                email_verified,
                password_hash,
            })
            .await
    }

    /// Issue a token and send the mail fire-and-forget
    ///
    /// Delivery failures are logged, never surfaced: the account exists
    /// either way and the client can request a resend.
    fn send_verification(&self, account: &Account) -> AccountResult<()> {
        let token = self.codec.encrypt(account.email.as_str().as_bytes())?;

        let mailer = self.mailer.clone();
        let email = account.email.clone();
        let name = account.full_name();

        tokio::spawn(async move {
            if let Err(e) = mailer.send_verification_email(&email, &name, &token).await {
                tracing::error!(%email, error = %e, "Failed to send verification email");
            }
        });

        Ok(())
    }
}
