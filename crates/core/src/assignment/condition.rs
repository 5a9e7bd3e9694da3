//! Text conditions over transaction fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::RuleError;
use crate::transaction::Transaction;

/// Transaction attribute a condition inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Counterparty name.
    Payee,
    /// Free-form note.
    Memo,
    /// Account money went into.
    DepositAccount,
    /// Account money came out of.
    WithdrawalAccount,
    /// Any of the above.
    Any,
}

impl Field {
    const TEXT_FIELDS: [Self; 4] = [
        Self::Payee,
        Self::Memo,
        Self::DepositAccount,
        Self::WithdrawalAccount,
    ];

    fn text(self, transaction: &Transaction) -> &str {
        match self {
            Self::Payee => &transaction.payee,
            Self::Memo => &transaction.memo,
            Self::DepositAccount => &transaction.deposit_account,
            Self::WithdrawalAccount => &transaction.withdrawal_account,
            Self::Any => "",
        }
    }
}

impl FromStr for Field {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "payee" => Ok(Self::Payee),
            "memo" => Ok(Self::Memo),
            "depositaccount" | "deposit" => Ok(Self::DepositAccount),
            "withdrawalaccount" | "withdrawal" => Ok(Self::WithdrawalAccount),
            "any" => Ok(Self::Any),
            _ => Err(RuleError::UnknownField(s.to_string())),
        }
    }
}

/// How a condition compares a field against its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Field starts with the value, ignoring case.
    BeginsWith,
    /// Field equals the value, ignoring case.
    Equals,
    /// Field equals the value exactly.
    EqualsCase,
    /// Field contains the value, ignoring case.
    Contains,
    /// Field ends with the value, ignoring case.
    EndsWith,
    /// Never matches.
    None,
}

impl Operator {
    /// Rank used by operator-precedence rule ordering; lower is tried first.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::EqualsCase => 0,
            Self::Equals => 1,
            Self::BeginsWith => 2,
            Self::EndsWith => 3,
            Self::Contains => 4,
            Self::None => 5,
        }
    }

    /// Applies the comparison to `text`.
    #[must_use]
    pub fn compare(self, text: &str, value: &str) -> bool {
        match self {
            Self::None => false,
            Self::EqualsCase => text == value,
            Self::Equals => text.to_lowercase() == value.to_lowercase(),
            Self::BeginsWith => text.to_lowercase().starts_with(&value.to_lowercase()),
            Self::EndsWith => text.to_lowercase().ends_with(&value.to_lowercase()),
            Self::Contains => text.to_lowercase().contains(&value.to_lowercase()),
        }
    }
}

impl FromStr for Operator {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "beginswith" | "startswith" => Ok(Self::BeginsWith),
            "equals" => Ok(Self::Equals),
            "equalscase" => Ok(Self::EqualsCase),
            "contains" => Ok(Self::Contains),
            "endswith" => Ok(Self::EndsWith),
            "none" => Ok(Self::None),
            _ => Err(RuleError::UnknownOperator(s.to_string())),
        }
    }
}

/// Lowercases and strips separators so `"BeginsWith"`, `"begins_with"` and
/// `"begins-with"` all read the same.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// One `field operator value` test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    /// Inspected field.
    pub field: Field,
    /// Comparison.
    pub operator: Operator,
    /// Text compared against.
    pub value: String,
}

impl Condition {
    /// Creates a condition.
    #[must_use]
    pub fn new(field: Field, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }

    /// Returns true if the transaction satisfies this condition.
    ///
    /// With [`Field::Any`], one matching text field is enough.
    #[must_use]
    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self.field {
            Field::Any => Field::TEXT_FIELDS
                .iter()
                .any(|field| self.operator.compare(field.text(transaction), &self.value)),
            field => self.operator.compare(field.text(transaction), &self.value),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {:?}", self.field, self.operator, self.value)
    }
}
