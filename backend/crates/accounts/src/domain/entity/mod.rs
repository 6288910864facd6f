//! Domain Entities

pub mod account;
pub mod child;
pub mod parent;

pub use account::{Account, NewAccount};
pub use child::Child;
pub use parent::Parent;
