//! Sign Out Use Case

use std::sync::Arc;

use crate::domain::repository::SessionStore;
use crate::error::AccountResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionStore,
{
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }

    /// Delete the session; idempotent, deleting an absent session succeeds
    pub async fn execute(&self, session_id: &str) -> AccountResult<()> {
        self.sessions.delete(session_id).await
    }
}
