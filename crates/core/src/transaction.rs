//! Imported transactions.

use budgetcast_shared::CashCommodity;
use budgetcast_shared::types::TransactionId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which way money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Non-negative amount: funds coming in.
    Incoming,
    /// Negative amount: funds going out.
    Outgoing,
}

/// A single imported transaction record. Read-only once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable identifier.
    pub id: TransactionId,
    /// Posting date.
    pub date: NaiveDate,
    /// Counterparty.
    pub payee: String,
    /// Free-form note.
    #[serde(default)]
    pub memo: String,
    /// Signed amount; negative for money leaving the account.
    pub amount: CashCommodity,
    /// Account the money came out of.
    #[serde(default)]
    pub withdrawal_account: String,
    /// Account the money went into.
    #[serde(default)]
    pub deposit_account: String,
}

impl Transaction {
    /// Creates a transaction with a fresh id and empty memo and accounts.
    #[must_use]
    pub fn new(date: NaiveDate, payee: impl Into<String>, amount: CashCommodity) -> Self {
        Self {
            id: TransactionId::new(),
            date,
            payee: payee.into(),
            memo: String::new(),
            amount,
            withdrawal_account: String::new(),
            deposit_account: String::new(),
        }
    }

    /// Replaces the generated id.
    #[must_use]
    pub fn with_id(mut self, id: TransactionId) -> Self {
        self.id = id;
        self
    }

    /// Sets the memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Sets the withdrawal and deposit accounts.
    #[must_use]
    pub fn with_accounts(
        mut self,
        withdrawal_account: impl Into<String>,
        deposit_account: impl Into<String>,
    ) -> Self {
        self.withdrawal_account = withdrawal_account.into();
        self.deposit_account = deposit_account.into();
        self
    }

    /// Direction of the money flow, taken from the amount's sign.
    #[must_use]
    pub fn direction(&self) -> Direction {
        if self.amount.is_negative() {
            Direction::Outgoing
        } else {
            Direction::Incoming
        }
    }
}
