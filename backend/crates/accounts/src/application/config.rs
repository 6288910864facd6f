//! Application Configuration
//!
//! Configuration for the accounts application layer. Assembled once at
//! startup and passed by `Arc`; nothing in this crate reads the
//! environment directly.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::crypt::{IV_LEN, KEY_LEN};

/// Session TTL in seconds (16 days), matched by the cookie Max-Age
pub const SESSION_TTL_SECS: u64 = 1_382_400;

/// Accounts application configuration
#[derive(Debug, Clone)]
pub struct AccountsConfig {
    /// Session cookie settings (name, path, Max-Age)
    pub cookie: CookieConfig,
    /// Server-side session TTL; renewal resets it to this value
    pub session_ttl: Duration,
    /// Verification token cipher key (AES-192)
    pub token_key: [u8; KEY_LEN],
    /// Verification token cipher IV
    pub token_iv: [u8; IV_LEN],
    /// Base URL the verification link points at
    pub verification_url: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            cookie: CookieConfig {
                max_age_secs: SESSION_TTL_SECS as i64,
                ..CookieConfig::default()
            },
            session_ttl: Duration::from_secs(SESSION_TTL_SECS),
            token_key: [0u8; KEY_LEN],
            token_iv: [0u8; IV_LEN],
            verification_url: String::new(),
        }
    }
}

impl AccountsConfig {
    /// Session TTL in whole seconds
    pub fn session_ttl_secs(&self) -> i64 {
        self.session_ttl.as_secs() as i64
    }
}
