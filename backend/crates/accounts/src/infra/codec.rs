//! Token Codec Implementation
//!
//! Binds the configured cipher key/IV to the `TokenCodec` trait.

use platform::crypt::{self, IV_LEN, KEY_LEN};

use crate::domain::repository::TokenCodec;
use crate::error::AccountResult;

/// AES-192-CFB token codec with a fixed key and IV
pub struct CfbTokenCodec {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl CfbTokenCodec {
    pub fn new(key: [u8; KEY_LEN], iv: [u8; IV_LEN]) -> Self {
        Self { key, iv }
    }
}

impl TokenCodec for CfbTokenCodec {
    fn encrypt(&self, plaintext: &[u8]) -> AccountResult<String> {
        Ok(crypt::encrypt(&self.key, &self.iv, plaintext)?)
    }

    fn decrypt(&self, token: &str) -> AccountResult<Vec<u8>> {
        Ok(crypt::decrypt(&self.key, &self.iv, token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_roundtrip() {
        let codec = CfbTokenCodec::new(*b"abc&1*~#^2^#s0^=)^^7%b34", [7u8; IV_LEN]);

        let token = codec.encrypt(b"user@example.com").unwrap();
        assert_eq!(codec.decrypt(&token).unwrap(), b"user@example.com");
    }
}
