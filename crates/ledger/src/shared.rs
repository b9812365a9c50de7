//! Thread-safe handle around a [`Ledger`].
//!
//! One `RwLock` guards accounts and history together. Writers hold the write
//! lock for a whole operation (an edit's reverse, validate and re-apply steps
//! included); readers hold the read lock and copy out what they need, so they
//! only ever see the state between two operations.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use stashbook_core::{
    AccountId, DomainError, DomainResult, Entity, ExpectedVersion, Money, TransactionId,
    Versioned,
};

use crate::account::{Account, AccountUpdate, NewAccount};
use crate::command::{LedgerCommand, LedgerEvent};
use crate::ledger::Ledger;
use crate::transaction::Transaction;

/// Consistent copy of ledger state at one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u64,
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

impl LedgerSnapshot {
    pub fn account(&self, id: AccountId) -> Option<&Account> {
        find(&self.accounts, &id)
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        find(&self.transactions, &id)
    }
}

fn find<'a, E: Entity>(items: &'a [E], id: &E::Id) -> Option<&'a E> {
    items.iter().find(|item| item.id() == id)
}

#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, Ledger>> {
        self.inner
            .read()
            .map_err(|_| DomainError::invariant("ledger lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, Ledger>> {
        self.inner
            .write()
            .map_err(|_| DomainError::invariant("ledger lock poisoned"))
    }

    /// Run `f` with shared access.
    pub fn with_ledger<T>(&self, f: impl FnOnce(&Ledger) -> T) -> DomainResult<T> {
        Ok(f(&*self.read()?))
    }

    pub fn apply(&self, tx: Transaction) -> DomainResult<LedgerEvent> {
        self.write()?.apply(tx)
    }

    pub fn edit(&self, id: TransactionId, replacement: Transaction) -> DomainResult<LedgerEvent> {
        self.write()?.edit(id, replacement)
    }

    pub fn delete(&self, id: TransactionId) -> DomainResult<LedgerEvent> {
        self.write()?.delete(id)
    }

    pub fn execute(
        &self,
        command: LedgerCommand,
        expected: ExpectedVersion,
    ) -> DomainResult<LedgerEvent> {
        self.write()?.execute(command, expected)
    }

    pub fn open_account(&self, new: NewAccount) -> DomainResult<Account> {
        self.write()?.open_account(new).cloned()
    }

    pub fn update_account(&self, id: AccountId, update: AccountUpdate) -> DomainResult<Account> {
        self.write()?.update_account(id, update).cloned()
    }

    pub fn close_account(&self, id: AccountId, reason: Option<String>) -> DomainResult<Account> {
        self.write()?.close_account(id, reason).cloned()
    }

    pub fn restore_account(&self, id: AccountId) -> DomainResult<Account> {
        self.write()?.restore_account(id).cloned()
    }

    pub fn correct_balance(&self, id: AccountId, new_balance: Money) -> DomainResult<Money> {
        self.write()?.correct_balance(id, new_balance)
    }

    pub fn remove_account(&self, id: AccountId) -> DomainResult<Account> {
        self.write()?.remove_account(id)
    }

    pub fn remove_account_cascade(
        &self,
        id: AccountId,
    ) -> DomainResult<(Account, Vec<Transaction>)> {
        self.write()?.remove_account_cascade(id)
    }

    pub fn balance(&self, id: AccountId) -> DomainResult<Money> {
        let ledger = self.read()?;
        Ok(ledger.accounts().require(id)?.balance())
    }

    pub fn total_balance(&self) -> DomainResult<Money> {
        self.read()?.accounts().total_balance()
    }

    pub fn version(&self) -> DomainResult<u64> {
        Ok(self.read()?.version())
    }

    pub fn snapshot(&self) -> DomainResult<LedgerSnapshot> {
        let ledger = self.read()?;
        Ok(LedgerSnapshot {
            version: ledger.version(),
            accounts: ledger.accounts().list().cloned().collect(),
            transactions: ledger.transactions().to_vec(),
        })
    }
}
