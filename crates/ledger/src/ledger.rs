//! Transaction ledger: the single writer of balance deltas.
//!
//! Every mutation keeps a journal of the balances it has touched, as they
//! were before the first adjustment. When a later step fails those balances
//! are written back, so callers only ever see the state before the call or
//! the state after it.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stashbook_core::{
    AccountId, DomainError, DomainResult, ExpectedVersion, Money, TransactionId, Versioned,
};

use crate::account::{Account, AccountUpdate, NewAccount};
use crate::command::{LedgerCommand, LedgerEvent};
use crate::effect::Effect;
use crate::registry::AccountRegistry;
use crate::transaction::{Transaction, TransactionKind};

/// Ledger tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Maximum fractional digits accepted in a transaction amount.
    pub money_scale: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { money_scale: 2 }
    }
}

/// Account whose running balance disagrees with `opening + Σ effects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDiscrepancy {
    pub account: AccountId,
    pub expected: Money,
    pub actual: Money,
}

/// Balances an in-flight operation has touched, as they were before it.
#[derive(Debug, Default)]
struct Journal {
    saved: Vec<(AccountId, Money)>,
}

impl Journal {
    /// Only the first sighting of an account is kept.
    fn remember(&mut self, account: AccountId, balance: Money) {
        if !self.saved.iter().any(|(id, _)| *id == account) {
            self.saved.push((account, balance));
        }
    }
}

/// Accounts plus the ordered transaction history that moves their balances.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    config: LedgerConfig,
    registry: AccountRegistry,
    /// Live transactions in submission order.
    history: Vec<Transaction>,
    /// Ids of deleted transactions; never accepted again.
    retired: HashSet<TransactionId>,
    version: u64,
}

impl Versioned for Ledger {
    fn version(&self) -> u64 {
        self.version
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> LedgerConfig {
        self.config
    }

    // ---- reads ----------------------------------------------------------

    pub fn accounts(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.registry.get(id)
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.history.iter().find(|tx| tx.id == id)
    }

    /// Live transactions in submission order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.history
    }

    pub fn transactions_for(&self, account: AccountId) -> impl Iterator<Item = &Transaction> + '_ {
        self.history.iter().filter(move |tx| tx.references(account))
    }

    pub fn is_retired(&self, id: TransactionId) -> bool {
        self.retired.contains(&id)
    }

    /// Recompute `opening + Σ effects` per account and report mismatches.
    pub fn audit(&self) -> DomainResult<Vec<BalanceDiscrepancy>> {
        let mut discrepancies = Vec::new();
        for account in self.registry.list() {
            let id = account.account_id();
            let mut expected = account.opening_balance();
            for tx in self.transactions_for(id) {
                for d in Effect::of(tx).deltas().iter().filter(|d| d.account == id) {
                    expected = expected.checked_add(d.delta)?;
                }
            }
            if expected != account.balance() {
                discrepancies.push(BalanceDiscrepancy {
                    account: id,
                    expected,
                    actual: account.balance(),
                });
            }
        }
        Ok(discrepancies)
    }

    // ---- transactions ---------------------------------------------------

    /// Validate `tx`, apply its effect and append it to the history.
    pub fn apply(&mut self, tx: Transaction) -> DomainResult<LedgerEvent> {
        if let Err(err) = self.apply_inner(&tx) {
            tracing::warn!("rejected transaction {}: {}", tx.id, err);
            return Err(err);
        }

        self.history.push(tx.clone());
        self.refresh_last_tx_dates(tx.kind.accounts());
        self.version += 1;
        tracing::debug!(
            "applied {} {} of {}",
            tx.kind.transaction_type(),
            tx.id,
            tx.amount
        );
        Ok(LedgerEvent::TransactionApplied(tx))
    }

    fn apply_inner(&mut self, tx: &Transaction) -> DomainResult<()> {
        self.ensure_unused_id(tx.id)?;
        self.validate(tx, None)?;

        let mut journal = Journal::default();
        if let Err(err) = self.adjust(&Effect::of(tx), &mut journal) {
            self.roll_back(journal);
            return Err(err);
        }
        Ok(())
    }

    /// Replace transaction `id` with `replacement`.
    ///
    /// The old effect is reversed, the replacement validated and applied. If
    /// anything after the reversal fails, the reversal is undone and the
    /// error returned with balances and history exactly as before.
    pub fn edit(&mut self, id: TransactionId, replacement: Transaction) -> DomainResult<LedgerEvent> {
        let position = self.position(id)?;
        let previous = self.history[position].clone();

        let mut journal = Journal::default();
        if let Err(err) = self.edit_inner(&previous, &replacement, &mut journal) {
            tracing::warn!(
                "edit of transaction {} abandoned, restoring {} account(s): {}",
                id,
                journal.saved.len(),
                err
            );
            self.roll_back(journal);
            return Err(err);
        }

        let mut touched = previous.kind.accounts();
        touched.extend(replacement.kind.accounts());
        self.history[position] = replacement.clone();
        self.refresh_last_tx_dates(touched);
        self.version += 1;
        tracing::debug!("edited transaction {}", id);

        Ok(LedgerEvent::TransactionEdited {
            previous,
            current: replacement,
        })
    }

    fn edit_inner(
        &mut self,
        previous: &Transaction,
        replacement: &Transaction,
        journal: &mut Journal,
    ) -> DomainResult<()> {
        self.adjust(&Effect::of(previous).inverse(), journal)?;

        if replacement.id != previous.id {
            return Err(DomainError::validation(format!(
                "replacement id {} does not match edited transaction {}",
                replacement.id, previous.id
            )));
        }
        self.validate(replacement, Some(previous))?;

        self.adjust(&Effect::of(replacement), journal)
    }

    /// Reverse the transaction's effect and drop it from the history.
    pub fn delete(&mut self, id: TransactionId) -> DomainResult<LedgerEvent> {
        let position = self.position(id)?;
        let effect = Effect::of(&self.history[position]).inverse();

        let mut journal = Journal::default();
        if let Err(err) = self.adjust(&effect, &mut journal) {
            tracing::warn!("delete of transaction {} rolled back: {}", id, err);
            self.roll_back(journal);
            return Err(err);
        }

        let tx = self.history.remove(position);
        self.retired.insert(id);
        self.refresh_last_tx_dates(tx.kind.accounts());
        self.version += 1;
        tracing::debug!("deleted transaction {}", id);

        Ok(LedgerEvent::TransactionDeleted(tx))
    }

    /// Run a command if the ledger is at the expected version.
    pub fn execute(
        &mut self,
        command: LedgerCommand,
        expected: ExpectedVersion,
    ) -> DomainResult<LedgerEvent> {
        expected.check(self.version)?;
        match command {
            LedgerCommand::Apply(tx) => self.apply(tx),
            LedgerCommand::Edit { id, replacement } => self.edit(id, replacement),
            LedgerCommand::Delete(id) => self.delete(id),
        }
    }

    // ---- accounts -------------------------------------------------------

    pub fn open_account(&mut self, new: NewAccount) -> DomainResult<&Account> {
        let id = new.id;
        self.registry.create(new)?;
        self.version += 1;
        tracing::debug!("opened account {}", id);
        self.registry.require(id)
    }

    pub fn update_account(&mut self, id: AccountId, update: AccountUpdate) -> DomainResult<&Account> {
        self.registry.update(id, update)?;
        self.version += 1;
        self.registry.require(id)
    }

    /// Closed accounts keep their balance and history but accept no new
    /// transactions.
    pub fn close_account(&mut self, id: AccountId, reason: Option<String>) -> DomainResult<&Account> {
        self.registry.close(id, reason)?;
        self.version += 1;
        tracing::debug!("closed account {}", id);
        self.registry.require(id)
    }

    pub fn restore_account(&mut self, id: AccountId) -> DomainResult<&Account> {
        self.registry.restore(id)?;
        self.version += 1;
        tracing::debug!("restored account {}", id);
        self.registry.require(id)
    }

    /// Manual balance correction; see [`AccountRegistry::correct_balance`].
    pub fn correct_balance(&mut self, id: AccountId, new_balance: Money) -> DomainResult<Money> {
        let difference = self.registry.correct_balance(id, new_balance)?;
        self.version += 1;
        tracing::info!("corrected balance of account {} by {}", id, difference);
        Ok(difference)
    }

    /// Remove an account no live transaction references.
    pub fn remove_account(&mut self, id: AccountId) -> DomainResult<Account> {
        self.registry.require(id)?;
        let referencing = self.transactions_for(id).count();
        if referencing > 0 {
            return Err(DomainError::conflict(format!(
                "account {id} is referenced by {referencing} transaction(s)"
            )));
        }
        let account = self.registry.remove(id)?;
        self.version += 1;
        tracing::debug!("removed account {}", id);
        Ok(account)
    }

    /// Delete every transaction referencing the account, then remove it.
    ///
    /// Each deletion reverses its effect, so counterpart accounts of transfers
    /// get their money back. All or nothing.
    pub fn remove_account_cascade(
        &mut self,
        id: AccountId,
    ) -> DomainResult<(Account, Vec<Transaction>)> {
        self.registry.require(id)?;

        let doomed: Vec<Transaction> = self.transactions_for(id).cloned().collect();
        let mut journal = Journal::default();
        for tx in &doomed {
            if let Err(err) = self.adjust(&Effect::of(tx).inverse(), &mut journal) {
                tracing::warn!("cascade removal of account {} rolled back: {}", id, err);
                self.roll_back(journal);
                return Err(err);
            }
        }

        let doomed_ids: HashSet<TransactionId> = doomed.iter().map(|tx| tx.id).collect();
        self.history.retain(|tx| !doomed_ids.contains(&tx.id));
        self.retired.extend(doomed_ids);

        let account = self.registry.remove(id)?;
        self.refresh_last_tx_dates(doomed.iter().flat_map(|tx| tx.kind.accounts()));
        self.version += 1;
        tracing::info!(
            "removed account {} along with {} transaction(s)",
            id,
            doomed.len()
        );
        Ok((account, doomed))
    }

    // ---- internals ------------------------------------------------------

    fn position(&self, id: TransactionId) -> DomainResult<usize> {
        self.history
            .iter()
            .position(|tx| tx.id == id)
            .ok_or_else(|| DomainError::not_found(format!("transaction {id}")))
    }

    fn ensure_unused_id(&self, id: TransactionId) -> DomainResult<()> {
        if self.retired.contains(&id) {
            return Err(DomainError::conflict(format!("transaction id {id} was deleted")));
        }
        if self.get(id).is_some() {
            return Err(DomainError::conflict(format!("transaction {id} already exists")));
        }
        Ok(())
    }

    /// `previous` is the transaction being edited, if any; its endpoints may
    /// stay referenced even when the account has since been closed.
    fn validate(&self, tx: &Transaction, previous: Option<&Transaction>) -> DomainResult<()> {
        if !tx.amount.is_positive() {
            return Err(DomainError::validation(format!(
                "amount must be positive, got {}",
                tx.amount
            )));
        }
        if !tx.amount.fits_scale(self.config.money_scale) {
            return Err(DomainError::validation(format!(
                "amount {} has more than {} decimal places",
                tx.amount, self.config.money_scale
            )));
        }
        if let TransactionKind::Transfer { from, to } = tx.kind {
            if from == to {
                return Err(DomainError::validation(
                    "transfer source and destination must differ",
                ));
            }
        }

        for account_id in tx.kind.accounts() {
            let account = self.registry.require(account_id)?;
            let grandfathered = previous.is_some_and(|p| p.references(account_id));
            if !account.is_active() && !grandfathered {
                return Err(DomainError::validation(format!(
                    "account {account_id} is closed"
                )));
            }
        }
        Ok(())
    }

    fn adjust(&mut self, effect: &Effect, journal: &mut Journal) -> DomainResult<()> {
        for delta in effect.deltas() {
            let before = self.registry.require(delta.account)?.balance();
            self.registry.adjust_balance(delta.account, delta.delta)?;
            journal.remember(delta.account, before);
        }
        Ok(())
    }

    /// Write the saved balances back verbatim, scale included.
    fn roll_back(&mut self, journal: Journal) {
        for (account, balance) in journal.saved.into_iter().rev() {
            self.registry.restore_balance(account, balance);
        }
    }

    fn refresh_last_tx_dates(&mut self, accounts: impl IntoIterator<Item = AccountId>) {
        let accounts: HashSet<AccountId> = accounts.into_iter().collect();
        for account in accounts {
            let latest: Option<DateTime<Utc>> =
                self.transactions_for(account).map(|tx| tx.date).max();
            self.registry.set_last_tx_date(account, latest);
        }
    }
}
