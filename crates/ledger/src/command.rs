//! Commands accepted by the ledger and events it reports back.

use serde::{Deserialize, Serialize};

use stashbook_core::TransactionId;

use crate::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCommand {
    Apply(Transaction),
    Edit {
        id: TransactionId,
        replacement: Transaction,
    },
    Delete(TransactionId),
}

impl LedgerCommand {
    pub fn transaction_id(&self) -> TransactionId {
        match self {
            LedgerCommand::Apply(tx) => tx.id,
            LedgerCommand::Edit { id, .. } => *id,
            LedgerCommand::Delete(id) => *id,
        }
    }
}

/// What a successful ledger mutation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    TransactionApplied(Transaction),
    TransactionEdited {
        previous: Transaction,
        current: Transaction,
    },
    TransactionDeleted(Transaction),
}

impl LedgerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::TransactionApplied(_) => "ledger.transaction.applied",
            LedgerEvent::TransactionEdited { .. } => "ledger.transaction.edited",
            LedgerEvent::TransactionDeleted(_) => "ledger.transaction.deleted",
        }
    }

    pub fn transaction_id(&self) -> TransactionId {
        match self {
            LedgerEvent::TransactionApplied(tx) => tx.id,
            LedgerEvent::TransactionEdited { current, .. } => current.id,
            LedgerEvent::TransactionDeleted(tx) => tx.id,
        }
    }

    /// Command that undoes this event.
    ///
    /// A submission layer applies locally first and calls this when the
    /// remote write is not confirmed. Deletions have no compensation: a
    /// deleted id can never be applied again.
    pub fn compensation(&self) -> Option<LedgerCommand> {
        match self {
            LedgerEvent::TransactionApplied(tx) => Some(LedgerCommand::Delete(tx.id)),
            LedgerEvent::TransactionEdited { previous, .. } => Some(LedgerCommand::Edit {
                id: previous.id,
                replacement: previous.clone(),
            }),
            LedgerEvent::TransactionDeleted(_) => None,
        }
    }
}
