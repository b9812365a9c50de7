//! `stashbook-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the ledger
//! (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;
pub mod version;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, TransactionId};
pub use value_object::{Money, ValueObject};
pub use version::{ExpectedVersion, Versioned};
