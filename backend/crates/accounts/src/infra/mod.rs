//! Infrastructure Layer
//!
//! Redis session store, Postgres account store, token codec, SMTP mailer.

pub mod codec;
pub mod postgres;
pub mod redis;
pub mod smtp;

pub use codec::CfbTokenCodec;
pub use postgres::PgAccountStore;
pub use redis::RedisSessionStore;
pub use smtp::SmtpMailer;
