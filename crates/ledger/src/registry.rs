//! Account registry: authoritative store of account identity and balance.
//!
//! Balances are running totals. They are never recomputed from transaction
//! history on read; `adjust_balance` is the only primitive the ledger uses to
//! move them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use stashbook_core::{AccountId, DomainError, DomainResult, Money};

use crate::account::{Account, AccountStatus, AccountUpdate, NewAccount};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountRegistry {
    accounts: HashMap<AccountId, Account>,
    /// Creation order, for stable listing.
    order: Vec<AccountId>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: AccountId) -> bool {
        self.accounts.contains_key(&id)
    }

    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// Like [`get`](Self::get), but a missing account is `NotFound`.
    pub fn require(&self, id: AccountId) -> DomainResult<&Account> {
        self.accounts
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("account {id}")))
    }

    fn require_mut(&mut self, id: AccountId) -> DomainResult<&mut Account> {
        self.accounts
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("account {id}")))
    }

    /// All accounts in creation order.
    pub fn list(&self) -> impl Iterator<Item = &Account> + '_ {
        self.order.iter().filter_map(|id| self.accounts.get(id))
    }

    pub fn active(&self) -> impl Iterator<Item = &Account> + '_ {
        self.list().filter(|a| a.is_active())
    }

    pub fn closed(&self) -> impl Iterator<Item = &Account> + '_ {
        self.list().filter(|a| !a.is_active())
    }

    /// Sum of balances over active accounts.
    pub fn total_balance(&self) -> DomainResult<Money> {
        self.active()
            .try_fold(Money::ZERO, |total, a| total.checked_add(a.balance()))
    }

    pub fn create(&mut self, new: NewAccount) -> DomainResult<&Account> {
        if self.accounts.contains_key(&new.id) {
            return Err(DomainError::conflict(format!(
                "account {} already exists",
                new.id
            )));
        }
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("account name cannot be empty"));
        }

        let id = new.id;
        self.order.push(id);
        Ok(self.accounts.entry(id).or_insert(Account::open(new)))
    }

    /// Rename, reclassify, or change goal metadata. Never touches balance.
    pub fn update(&mut self, id: AccountId, update: AccountUpdate) -> DomainResult<&Account> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("account name cannot be empty"));
            }
        }
        let account = self.require_mut(id)?;
        account.apply_update(update);
        Ok(account)
    }

    pub fn close(&mut self, id: AccountId, reason: Option<String>) -> DomainResult<&Account> {
        let account = self.require_mut(id)?;
        if !account.is_active() {
            return Err(DomainError::conflict(format!("account {id} already closed")));
        }
        account.set_status(AccountStatus::Closed { reason });
        Ok(account)
    }

    pub fn restore(&mut self, id: AccountId) -> DomainResult<&Account> {
        let account = self.require_mut(id)?;
        if account.is_active() {
            return Err(DomainError::conflict(format!("account {id} already active")));
        }
        account.set_status(AccountStatus::Active);
        Ok(account)
    }

    /// Drop an account. Callers decide what happens to transactions that
    /// reference it; the registry does not know about them.
    pub fn remove(&mut self, id: AccountId) -> DomainResult<Account> {
        let account = self
            .accounts
            .remove(&id)
            .ok_or_else(|| DomainError::not_found(format!("account {id}")))?;
        self.order.retain(|other| *other != id);
        Ok(account)
    }

    /// Add `delta` (possibly negative) to the account's balance and return the
    /// new balance. Calling it twice applies the delta twice.
    pub fn adjust_balance(&mut self, id: AccountId, delta: Money) -> DomainResult<Money> {
        let account = self.require_mut(id)?;
        let balance = account.balance().checked_add(delta)?;
        account.set_balance(balance);
        Ok(balance)
    }

    /// Manual correction outside transaction activity.
    ///
    /// The opening balance shifts by the same difference, so
    /// `balance == opening + effects` keeps holding. Returns the difference.
    pub fn correct_balance(&mut self, id: AccountId, new_balance: Money) -> DomainResult<Money> {
        let account = self.require_mut(id)?;
        let difference = new_balance.checked_sub(account.balance())?;
        let opening = account.opening_balance().checked_add(difference)?;
        account.set_opening_balance(opening);
        account.set_balance(new_balance);
        Ok(difference)
    }

    /// Put back a balance saved before an abandoned operation.
    pub(crate) fn restore_balance(&mut self, id: AccountId, balance: Money) {
        if let Some(account) = self.accounts.get_mut(&id) {
            account.set_balance(balance);
        }
    }

    pub(crate) fn set_last_tx_date(&mut self, id: AccountId, date: Option<DateTime<Utc>>) {
        if let Some(account) = self.accounts.get_mut(&id) {
            account.set_last_tx_date(date);
        }
    }
}
