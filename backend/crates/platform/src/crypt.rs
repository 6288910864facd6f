//! Token Cipher
//!
//! Symmetric obfuscation of short opaque payloads (session ids,
//! email-verification tokens): AES-192 in full-block CFB mode with a
//! fixed IV, base64-encoded. Deterministic for a given key/IV pair, so
//! token uniqueness must come from the plaintext, never from the cipher.
//!
//! ## Security Model
//! Confidentiality/obfuscation only. There is no authentication tag: a
//! forged or bit-flipped token decrypts to garbage with no failure
//! signal beyond encoding/UTF-8 errors downstream. Kept as-is to stay
//! wire-compatible with previously issued tokens.

use aes::Aes192;
use base64::{Engine, engine::general_purpose};
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use rand::{RngCore, rngs::OsRng};
use thiserror::Error;

type Aes192CfbEnc = cfb_mode::Encryptor<Aes192>;
type Aes192CfbDec = cfb_mode::Decryptor<Aes192>;

/// Cipher key length in bytes (AES-192)
pub const KEY_LEN: usize = 24;

/// Initialization vector length in bytes (AES block size)
pub const IV_LEN: usize = 16;

/// Token cipher errors
#[derive(Debug, Error)]
pub enum CipherError {
    /// Key or IV could not initialize the cipher
    #[error("Cipher setup failed: invalid key or IV")]
    InvalidKey,

    /// Token is not valid base64
    #[error("Token is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
}

/// Encrypt a payload into an opaque base64 token
pub fn encrypt(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<String, CipherError> {
    let cipher = Aes192CfbEnc::new_from_slices(key, iv).map_err(|_| CipherError::InvalidKey)?;

    let mut buf = plaintext.to_vec();
    cipher.encrypt(&mut buf);

    Ok(general_purpose::STANDARD.encode(buf))
}

/// Decrypt an opaque base64 token back into its payload
pub fn decrypt(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], token: &str) -> Result<Vec<u8>, CipherError> {
    let cipher = Aes192CfbDec::new_from_slices(key, iv).map_err(|_| CipherError::InvalidKey)?;

    let mut buf = general_purpose::STANDARD.decode(token)?;
    cipher.decrypt(&mut buf);

    Ok(buf)
}

/// Generate an unguessable URL-safe token from `len` random bytes
///
/// Used for session ids. 32 bytes gives a 43-character token.
pub fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
