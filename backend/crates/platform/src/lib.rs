//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Token cipher (AES-192-CFB) and random token generation
//! - Password hashing (Argon2id)
//! - Cookie management
//! - Outbound SMTP mail with a fallback relay

pub mod cookie;
pub mod crypt;
pub mod mailer;
pub mod password;
