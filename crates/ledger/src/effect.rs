//! Balance effects implied by transactions.

use serde::{Deserialize, Serialize};

use stashbook_core::{AccountId, Money};

use crate::transaction::{Transaction, TransactionKind};

/// One signed balance change against one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub account: AccountId,
    pub delta: Money,
}

impl BalanceDelta {
    pub fn new(account: AccountId, delta: Money) -> Self {
        Self { account, delta }
    }

    pub fn negated(self) -> Self {
        Self {
            account: self.account,
            delta: self.delta.negated(),
        }
    }
}

/// Ordered list of deltas a transaction applies.
///
/// - deposit: `[(account, +amount)]`
/// - withdrawal: `[(account, -amount)]`
/// - transfer: `[(from, -amount), (to, +amount)]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    deltas: Vec<BalanceDelta>,
}

impl Effect {
    pub fn of(tx: &Transaction) -> Self {
        let amount = tx.amount;
        let deltas = match tx.kind {
            TransactionKind::Deposit { account } => vec![BalanceDelta::new(account, amount)],
            TransactionKind::Withdrawal { account } => {
                vec![BalanceDelta::new(account, amount.negated())]
            }
            TransactionKind::Transfer { from, to } => vec![
                BalanceDelta::new(from, amount.negated()),
                BalanceDelta::new(to, amount),
            ],
        };
        Self { deltas }
    }

    /// Exact inverse: every delta negated, order kept.
    pub fn inverse(&self) -> Self {
        Self {
            deltas: self.deltas.iter().map(|d| d.negated()).collect(),
        }
    }

    pub fn deltas(&self) -> &[BalanceDelta] {
        &self.deltas
    }

    pub fn accounts(&self) -> impl Iterator<Item = AccountId> + '_ {
        self.deltas.iter().map(|d| d.account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn transfer_debits_source_before_crediting_target() {
        let (a, b) = (AccountId::new(), AccountId::new());
        let tx = Transaction::transfer(a, b, Money::new(dec!(30.00)));
        assert_eq!(
            Effect::of(&tx).deltas(),
            &[
                BalanceDelta::new(a, Money::new(dec!(-30.00))),
                BalanceDelta::new(b, Money::new(dec!(30.00))),
            ]
        );
    }

    #[test]
    fn withdrawal_is_negative() {
        let a = AccountId::new();
        let tx = Transaction::withdrawal(a, Money::new(dec!(7.25)));
        assert_eq!(
            Effect::of(&tx).deltas(),
            &[BalanceDelta::new(a, Money::new(dec!(-7.25)))]
        );
    }

    #[test]
    fn inverse_of_inverse_is_identity() {
        let a = AccountId::new();
        let effect = Effect::of(&Transaction::deposit(a, Money::new(dec!(50.00))));
        assert_eq!(effect.inverse().inverse(), effect);
        assert_eq!(
            effect.inverse().deltas(),
            &[BalanceDelta::new(a, Money::new(dec!(-50.00)))]
        );
    }
}
