//! Estimate data types.

use budgetcast_shared::types::EstimateId;
use budgetcast_shared::{CashCommodity, CurrencyCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of an estimate's effect on the ending balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateType {
    /// Money coming in; increases the balance.
    Income,
    /// Money going out; decreases the balance.
    Expense,
    /// Money moved between the user's own accounts; no balance effect.
    Transfer,
    /// Aggregation of child estimates; never contributes directly.
    Category,
}

impl EstimateType {
    /// Returns true for Income, Expense and Transfer.
    #[must_use]
    pub const fn is_leaf(self) -> bool {
        !matches!(self, Self::Category)
    }

    /// Orients a signed transaction amount into this estimate's frame, so
    /// that ordinary activity yields a positive actual figure.
    ///
    /// Incoming money counts toward income, outgoing money toward expenses,
    /// and transfers count the amount moved regardless of direction.
    #[must_use]
    pub fn orient(self, amount: &CashCommodity) -> CashCommodity {
        match self {
            Self::Income => amount.clone(),
            Self::Expense => amount.negate(),
            Self::Transfer => amount.abs(),
            // Rules never target categories, so nothing is matched to one.
            Self::Category => amount.clone(),
        }
    }
}

/// A budget line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    /// Stable identifier.
    pub id: EstimateId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Direct estimated amount. Always zero for categories.
    pub amount: CashCommodity,
    /// Estimate type.
    pub estimate_type: EstimateType,
    /// Date by which the estimated amount is owed, if any.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// No more transactions are expected for this estimate.
    #[serde(default)]
    pub is_final: bool,
}

impl Estimate {
    /// Creates a leaf or category estimate with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>, estimate_type: EstimateType, amount: CashCommodity) -> Self {
        Self {
            id: EstimateId::new(),
            name: name.into(),
            description: String::new(),
            amount,
            estimate_type,
            due_date: None,
            is_final: false,
        }
    }

    /// Creates a category with a zero direct amount.
    #[must_use]
    pub fn category(name: impl Into<String>, currency: CurrencyCode) -> Self {
        Self::new(name, EstimateType::Category, CashCommodity::zero(currency))
    }

    /// Creates an income estimate.
    #[must_use]
    pub fn income(name: impl Into<String>, amount: CashCommodity) -> Self {
        Self::new(name, EstimateType::Income, amount)
    }

    /// Creates an expense estimate.
    #[must_use]
    pub fn expense(name: impl Into<String>, amount: CashCommodity) -> Self {
        Self::new(name, EstimateType::Expense, amount)
    }

    /// Creates a transfer estimate.
    #[must_use]
    pub fn transfer(name: impl Into<String>, amount: CashCommodity) -> Self {
        Self::new(name, EstimateType::Transfer, amount)
    }

    /// Replaces the generated id.
    #[must_use]
    pub fn with_id(mut self, id: EstimateId) -> Self {
        self.id = id;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Marks the estimate as final.
    #[must_use]
    pub const fn finalized(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Returns true unless this is a category.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.estimate_type.is_leaf()
    }
}

/// A single modification to an existing estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EstimateChange {
    /// Change the name.
    Rename(String),
    /// Change the description.
    Describe(String),
    /// Change the direct amount.
    SetAmount(CashCommodity),
    /// Change the estimate type.
    SetType(EstimateType),
    /// Change or clear the due date.
    SetDueDate(Option<NaiveDate>),
    /// Change the final flag.
    SetFinal(bool),
}

/// Nested, serializable form of an estimate tree.
///
/// This is the shape budget-file readers produce and writers consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateSnapshot {
    /// The estimate at this position.
    #[serde(flatten)]
    pub estimate: Estimate,
    /// Child estimates, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EstimateSnapshot>,
}

impl EstimateSnapshot {
    /// Creates a snapshot node without children.
    #[must_use]
    pub const fn leaf(estimate: Estimate) -> Self {
        Self {
            estimate,
            children: Vec::new(),
        }
    }

    /// Creates a snapshot node with children.
    #[must_use]
    pub const fn with_children(estimate: Estimate, children: Vec<Self>) -> Self {
        Self { estimate, children }
    }
}
