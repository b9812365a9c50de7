use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stashbook_core::{AccountId, DomainError, Entity, Money, TransactionId};

/// Transaction shape together with its endpoints.
///
/// Encoding the endpoints in the variant makes "a deposit with two accounts"
/// unrepresentable once a transaction is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit { account: AccountId },
    Withdrawal { account: AccountId },
    Transfer { from: AccountId, to: AccountId },
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionKind::Deposit { .. } => TransactionType::Deposit,
            TransactionKind::Withdrawal { .. } => TransactionType::Withdrawal,
            TransactionKind::Transfer { .. } => TransactionType::Transfer,
        }
    }

    /// Accounts touched, in effect order (`from` before `to`).
    pub fn accounts(&self) -> Vec<AccountId> {
        match *self {
            TransactionKind::Deposit { account } | TransactionKind::Withdrawal { account } => {
                vec![account]
            }
            TransactionKind::Transfer { from, to } => vec![from, to],
        }
    }

    pub fn references(&self, account: AccountId) -> bool {
        match *self {
            TransactionKind::Deposit { account: a } | TransactionKind::Withdrawal { account: a } => {
                a == account
            }
            TransactionKind::Transfer { from, to } => from == account || to == account,
        }
    }
}

/// Bare transaction type tag, as carried by flat records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Transfer => "transfer",
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(flatten)]
    pub kind: TransactionKind,
    /// Magnitude; the ledger rejects anything not strictly positive.
    pub amount: Money,
    /// Informational only. Application order is submission order.
    pub date: DateTime<Utc>,
    pub description: String,
}

impl Transaction {
    pub fn new(id: TransactionId, kind: TransactionKind, amount: Money) -> Self {
        Self {
            id,
            kind,
            amount,
            date: Utc::now(),
            description: String::new(),
        }
    }

    pub fn deposit(account: AccountId, amount: Money) -> Self {
        Self::new(TransactionId::new(), TransactionKind::Deposit { account }, amount)
    }

    pub fn withdrawal(account: AccountId, amount: Money) -> Self {
        Self::new(TransactionId::new(), TransactionKind::Withdrawal { account }, amount)
    }

    pub fn transfer(from: AccountId, to: AccountId, amount: Money) -> Self {
        Self::new(TransactionId::new(), TransactionKind::Transfer { from, to }, amount)
    }

    pub fn with_id(mut self, id: TransactionId) -> Self {
        self.id = id;
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn references(&self, account: AccountId) -> bool {
        self.kind.references(account)
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Flat transaction record with optional endpoint fields.
///
/// This is the shape submission layers typically receive; converting it into a
/// [`Transaction`] checks that exactly the endpoints the type needs are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Money,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub account_id: Option<AccountId>,
    #[serde(default)]
    pub from_account_id: Option<AccountId>,
    #[serde(default)]
    pub to_account_id: Option<AccountId>,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = DomainError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let ty = record.transaction_type;
        let kind = match (
            ty,
            record.account_id,
            record.from_account_id,
            record.to_account_id,
        ) {
            (TransactionType::Deposit, Some(account), None, None) => {
                TransactionKind::Deposit { account }
            }
            (TransactionType::Withdrawal, Some(account), None, None) => {
                TransactionKind::Withdrawal { account }
            }
            (TransactionType::Transfer, None, Some(from), Some(to)) => {
                TransactionKind::Transfer { from, to }
            }
            (TransactionType::Deposit | TransactionType::Withdrawal, None, _, _) => {
                return Err(DomainError::validation(format!("account_id required for {ty}")));
            }
            (TransactionType::Deposit | TransactionType::Withdrawal, Some(_), _, _) => {
                return Err(DomainError::validation(format!(
                    "{ty} must not set from_account_id/to_account_id"
                )));
            }
            (TransactionType::Transfer, Some(_), _, _) => {
                return Err(DomainError::validation("transfer must not set account_id"));
            }
            (TransactionType::Transfer, None, _, _) => {
                return Err(DomainError::validation(
                    "from_account_id and to_account_id required for transfer",
                ));
            }
        };

        Ok(Transaction {
            id: record.id,
            kind,
            amount: record.amount,
            date: record.date.unwrap_or_else(Utc::now),
            description: record.description,
        })
    }
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        let (account_id, from_account_id, to_account_id) = match tx.kind {
            TransactionKind::Deposit { account } | TransactionKind::Withdrawal { account } => {
                (Some(account), None, None)
            }
            TransactionKind::Transfer { from, to } => (None, Some(from), Some(to)),
        };
        TransactionRecord {
            id: tx.id,
            transaction_type: tx.kind.transaction_type(),
            amount: tx.amount,
            date: Some(tx.date),
            description: tx.description.clone(),
            account_id,
            from_account_id,
            to_account_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(ty: TransactionType) -> TransactionRecord {
        TransactionRecord {
            id: TransactionId::new(),
            transaction_type: ty,
            amount: Money::new(dec!(12.00)),
            date: None,
            description: "groceries".to_string(),
            account_id: None,
            from_account_id: None,
            to_account_id: None,
        }
    }

    #[test]
    fn deposit_record_converts() {
        let account = AccountId::new();
        let tx = Transaction::try_from(TransactionRecord {
            account_id: Some(account),
            ..record(TransactionType::Deposit)
        })
        .unwrap();
        assert_eq!(tx.kind, TransactionKind::Deposit { account });
        assert_eq!(tx.description, "groceries");
    }

    #[test]
    fn withdrawal_without_account_is_rejected() {
        let err = Transaction::try_from(record(TransactionType::Withdrawal)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn transfer_needs_both_endpoints() {
        let err = Transaction::try_from(TransactionRecord {
            from_account_id: Some(AccountId::new()),
            ..record(TransactionType::Transfer)
        })
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn stray_endpoint_fields_are_rejected() {
        let err = Transaction::try_from(TransactionRecord {
            account_id: Some(AccountId::new()),
            to_account_id: Some(AccountId::new()),
            ..record(TransactionType::Deposit)
        })
        .unwrap_err();
        assert!(err.is_validation());

        let err = Transaction::try_from(TransactionRecord {
            account_id: Some(AccountId::new()),
            from_account_id: Some(AccountId::new()),
            to_account_id: Some(AccountId::new()),
            ..record(TransactionType::Transfer)
        })
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn record_from_transfer_keeps_endpoints() {
        let (from, to) = (AccountId::new(), AccountId::new());
        let tx = Transaction::transfer(from, to, Money::new(dec!(30.00)));
        let record = TransactionRecord::from(&tx);
        assert_eq!(record.transaction_type, TransactionType::Transfer);
        assert_eq!(record.from_account_id, Some(from));
        assert_eq!(record.to_account_id, Some(to));
        assert_eq!(record.account_id, None);
        assert_eq!(Transaction::try_from(record).unwrap(), tx);
    }

    #[test]
    fn wire_record_parses_from_json() {
        let account = AccountId::new();
        let json = serde_json::json!({
            "id": TransactionId::new(),
            "type": "withdrawal",
            "amount": "19.99",
            "description": "book",
            "account_id": account,
        });
        let record: TransactionRecord = serde_json::from_value(json).unwrap();
        let tx = Transaction::try_from(record).unwrap();
        assert_eq!(tx.kind, TransactionKind::Withdrawal { account });
        assert_eq!(tx.amount, Money::new(dec!(19.99)));
    }

    #[test]
    fn references_checks_every_endpoint() {
        let (a, b, c) = (AccountId::new(), AccountId::new(), AccountId::new());
        let kind = TransactionKind::Transfer { from: a, to: b };
        assert!(kind.references(a));
        assert!(kind.references(b));
        assert!(!kind.references(c));
        assert_eq!(kind.accounts(), vec![a, b]);
    }
}
