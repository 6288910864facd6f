//! Redis Session Store
//!
//! Sessions live under `session:{id}` with the account key as the
//! value. Expiry is Redis TTL; no timestamps are stored or compared.

use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::domain::repository::SessionStore;
use crate::error::{AccountError, AccountResult};

/// Random bytes per session id (43 base64url characters)
const SESSION_ID_BYTES: usize = 32;

/// Redis-backed session store
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(session_id: &str) -> String {
        format!("session:{session_id}")
    }
}

impl SessionStore for RedisSessionStore {
    async fn create(&self, account_key: &str, ttl: Duration) -> AccountResult<String> {
        let session_id = platform::crypt::random_token(SESSION_ID_BYTES);

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(&session_id), account_key, ttl.as_secs())
            .await?;

        Ok(session_id)
    }

    async fn get(&self, session_id: &str) -> AccountResult<String> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(Self::key(session_id)).await?;

        value.ok_or(AccountError::SessionNotFound)
    }

    async fn renew(&self, session_id: &str, ttl: Duration) -> AccountResult<()> {
        let mut conn = self.conn.clone();
        let renewed: bool = conn.expire(Self::key(session_id), ttl.as_secs() as i64).await?;

        // EXPIRE on a missing key is 0: an expired session stays expired
        if !renewed {
            return Err(AccountError::SessionNotFound);
        }

        Ok(())
    }

    async fn delete(&self, session_id: &str) -> AccountResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(session_id)).await?;

        Ok(())
    }
}
