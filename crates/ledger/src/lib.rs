//! Ledger engine: accounts, the transactions that move money between them, and
//! the apply / reverse / re-apply rules that keep balances consistent.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod account;
pub mod command;
pub mod effect;
pub mod ledger;
pub mod registry;
pub mod shared;
pub mod transaction;

pub use account::{
    Account, AccountKind, AccountStatus, AccountUpdate, Goal, GoalFrequency, NewAccount, StashType,
};
pub use command::{LedgerCommand, LedgerEvent};
pub use effect::{BalanceDelta, Effect};
pub use ledger::{BalanceDiscrepancy, Ledger, LedgerConfig};
pub use registry::AccountRegistry;
pub use shared::{LedgerSnapshot, SharedLedger};
pub use transaction::{Transaction, TransactionKind, TransactionRecord, TransactionType};
