use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stashbook_core::{AccountId, Entity, Money};

/// Account classification. Descriptive only: no kind changes how balances move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    Checking,
    Savings,
    #[serde(rename = "Credit Card")]
    CreditCard,
    Cash,
    Investment,
    Other,
}

/// Where the money physically sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StashType {
    Cash,
    #[default]
    Bank,
    #[serde(rename = "Crypto Wallet")]
    CryptoWallet,
    Investment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalFrequency {
    Daily,
    Weekly,
    Monthly,
}

/// Savings goal attached to an account.
///
/// Stored and returned as-is; the ledger never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(default)]
    pub frequency: Option<GoalFrequency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Closed {
        #[serde(default)]
        reason: Option<String>,
    },
}

impl AccountStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }
}

/// Request to open an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub id: AccountId,
    pub name: String,
    pub kind: AccountKind,
    #[serde(default)]
    pub stash_type: StashType,
    /// Balance at creation, not backed by any transaction.
    #[serde(default)]
    pub opening_balance: Money,
    #[serde(default)]
    pub goal: Option<Goal>,
}

impl NewAccount {
    pub fn new(id: AccountId, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            stash_type: StashType::default(),
            opening_balance: Money::ZERO,
            goal: None,
        }
    }

    pub fn with_opening_balance(mut self, balance: Money) -> Self {
        self.opening_balance = balance;
        self
    }

    pub fn with_stash_type(mut self, stash_type: StashType) -> Self {
        self.stash_type = stash_type;
        self
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goal = Some(goal);
        self
    }
}

/// Identity-level edit. Fields left as `None` are kept.
///
/// Balance is not editable here; see `Ledger::correct_balance`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub stash_type: Option<StashType>,
    /// `Some(None)` clears the goal.
    pub goal: Option<Option<Goal>>,
}

/// An account and its running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    name: String,
    kind: AccountKind,
    stash_type: StashType,
    balance: Money,
    opening_balance: Money,
    #[serde(flatten)]
    status: AccountStatus,
    goal: Option<Goal>,
    last_tx_date: Option<DateTime<Utc>>,
}

impl Account {
    pub(crate) fn open(new: NewAccount) -> Self {
        Self {
            id: new.id,
            name: new.name,
            kind: new.kind,
            stash_type: new.stash_type,
            balance: new.opening_balance,
            opening_balance: new.opening_balance,
            status: AccountStatus::Active,
            goal: new.goal,
            last_tx_date: None,
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn stash_type(&self) -> StashType {
        self.stash_type
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Opening balance, re-based by manual corrections.
    pub fn opening_balance(&self) -> Money {
        self.opening_balance
    }

    pub fn status(&self) -> &AccountStatus {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    /// Date of the latest live transaction touching this account.
    pub fn last_tx_date(&self) -> Option<DateTime<Utc>> {
        self.last_tx_date
    }

    pub(crate) fn set_balance(&mut self, balance: Money) {
        self.balance = balance;
    }

    pub(crate) fn set_opening_balance(&mut self, balance: Money) {
        self.opening_balance = balance;
    }

    pub(crate) fn set_status(&mut self, status: AccountStatus) {
        self.status = status;
    }

    pub(crate) fn set_last_tx_date(&mut self, date: Option<DateTime<Utc>>) {
        self.last_tx_date = date;
    }

    pub(crate) fn apply_update(&mut self, update: AccountUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(stash_type) = update.stash_type {
            self.stash_type = stash_type;
        }
        if let Some(goal) = update.goal {
            self.goal = goal;
        }
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
