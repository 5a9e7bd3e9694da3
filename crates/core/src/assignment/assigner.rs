//! Transaction assignment.
//!
//! Matching and assignment are separate steps: rules are pure predicates,
//! and this module alone decides where each transaction ends up.

use std::collections::{BTreeMap, BTreeSet};

use budgetcast_shared::types::{EstimateId, RuleId, TransactionId};
use budgetcast_shared::{CashCommodity, CurrencyCode, RuleOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::AnalysisWarning;
use super::rule::{AssignmentRule, RuleSet};
use crate::analysis::error::AnalysisError;
use crate::analysis::progress::{CancellationToken, ProgressSpan};
use crate::currency::{CurrencyCalculator, CurrencyError};
use crate::estimate::{Estimate, EstimateTree};
use crate::transaction::{Direction, Transaction};

/// The two buckets for transactions no rule claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnbudgetedKind {
    /// Unclaimed incoming funds.
    Income,
    /// Unclaimed outgoing funds.
    Expense,
}

impl UnbudgetedKind {
    /// Bucket for a transaction, chosen by its direction.
    #[must_use]
    pub fn for_transaction(transaction: &Transaction) -> Self {
        match transaction.direction() {
            Direction::Incoming => Self::Income,
            Direction::Outgoing => Self::Expense,
        }
    }

    /// Display name of the bucket.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Income => "Unbudgeted income",
            Self::Expense => "Unbudgeted expenses",
        }
    }

    /// Orients a transaction amount so the bucket total is positive for
    /// ordinary activity.
    fn orient(self, amount: &CashCommodity) -> CashCommodity {
        match self {
            Self::Income => amount.clone(),
            Self::Expense => amount.negate(),
        }
    }
}

/// Where one transaction was assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", content = "id", rename_all = "snake_case")]
pub enum AssignmentTarget {
    /// A leaf estimate, through a matching rule.
    Estimate(EstimateId),
    /// One of the unbudgeted buckets.
    Unbudgeted(UnbudgetedKind),
}

/// Per-estimate actual totals in one currency.
///
/// Leaf totals are oriented by the leaf's type: incoming money counts up for
/// income, outgoing money counts up for expenses, transfers count the amount
/// moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualFigures {
    currency: CurrencyCode,
    totals: BTreeMap<EstimateId, CashCommodity>,
    unbudgeted_income: CashCommodity,
    unbudgeted_expense: CashCommodity,
}

impl ActualFigures {
    /// Creates empty figures.
    #[must_use]
    pub fn new(currency: CurrencyCode) -> Self {
        Self {
            unbudgeted_income: CashCommodity::zero(currency.clone()),
            unbudgeted_expense: CashCommodity::zero(currency.clone()),
            totals: BTreeMap::new(),
            currency,
        }
    }

    /// Currency every total is expressed in.
    #[must_use]
    pub const fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Zero in this currency.
    #[must_use]
    pub fn zero(&self) -> CashCommodity {
        CashCommodity::zero(self.currency.clone())
    }

    /// Sets an estimate's total, replacing any previous value.
    pub fn insert(&mut self, estimate: EstimateId, total: CashCommodity) {
        self.totals.insert(estimate, total);
    }

    /// Matched total for an estimate; zero if nothing matched.
    #[must_use]
    pub fn total_for(&self, estimate: EstimateId) -> CashCommodity {
        self.totals
            .get(&estimate)
            .cloned()
            .unwrap_or_else(|| self.zero())
    }

    /// Sets an unbudgeted bucket's total.
    pub fn set_unbudgeted(&mut self, kind: UnbudgetedKind, total: CashCommodity) {
        match kind {
            UnbudgetedKind::Income => self.unbudgeted_income = total,
            UnbudgetedKind::Expense => self.unbudgeted_expense = total,
        }
    }

    /// Total of an unbudgeted bucket.
    #[must_use]
    pub const fn unbudgeted(&self, kind: UnbudgetedKind) -> &CashCommodity {
        match kind {
            UnbudgetedKind::Income => &self.unbudgeted_income,
            UnbudgetedKind::Expense => &self.unbudgeted_expense,
        }
    }

    /// Estimates with at least one matched transaction.
    pub fn iter(&self) -> impl Iterator<Item = (EstimateId, &CashCommodity)> {
        self.totals.iter().map(|(id, total)| (*id, total))
    }
}

/// Outcome of one assignment pass.
///
/// Every input transaction appears exactly once: under the estimate of the
/// rule that claimed it, or in one unbudgeted bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignments {
    matched: BTreeMap<EstimateId, Vec<Transaction>>,
    unbudgeted_income: Vec<Transaction>,
    unbudgeted_expense: Vec<Transaction>,
    targets: BTreeMap<TransactionId, AssignmentTarget>,
    rules: BTreeMap<TransactionId, RuleId>,
    warnings: Vec<AnalysisWarning>,
}

impl Assignments {
    /// Transactions claimed for an estimate, in input order.
    #[must_use]
    pub fn transactions_for(&self, estimate: EstimateId) -> &[Transaction] {
        self.matched.get(&estimate).map_or(&[], Vec::as_slice)
    }

    /// Rule that claimed a transaction; `None` for unbudgeted transactions.
    #[must_use]
    pub fn rule_for(&self, transaction: TransactionId) -> Option<RuleId> {
        self.rules.get(&transaction).copied()
    }

    /// Transactions in an unbudgeted bucket, in input order.
    #[must_use]
    pub fn unbudgeted(&self, kind: UnbudgetedKind) -> &[Transaction] {
        match kind {
            UnbudgetedKind::Income => &self.unbudgeted_income,
            UnbudgetedKind::Expense => &self.unbudgeted_expense,
        }
    }

    /// Where a transaction went; `None` if it was not part of the pass.
    #[must_use]
    pub fn target_of(&self, transaction: TransactionId) -> Option<AssignmentTarget> {
        self.targets.get(&transaction).copied()
    }

    /// Number of transactions assigned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if no transactions were assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Rules skipped during the pass.
    #[must_use]
    pub fn warnings(&self) -> &[AnalysisWarning] {
        &self.warnings
    }

    /// Totals per estimate and per unbudgeted bucket, in the calculator's
    /// currency.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyMismatch` if a transaction's currency cannot be
    /// converted.
    pub fn actual_figures(
        &self,
        calculator: &CurrencyCalculator,
        tree: &EstimateTree,
    ) -> Result<ActualFigures, CurrencyError> {
        let mut figures = ActualFigures::new(calculator.target().clone());
        for (estimate_id, transactions) in &self.matched {
            let Some(estimate) = tree.get(*estimate_id) else {
                continue;
            };
            let oriented = transactions
                .iter()
                .map(|tx| {
                    calculator
                        .convert(&tx.amount)
                        .map(|amount| estimate.estimate_type.orient(&amount))
                })
                .collect::<Result<Vec<_>, _>>()?;
            figures.insert(*estimate_id, calculator.sum(&oriented)?);
        }
        for kind in [UnbudgetedKind::Income, UnbudgetedKind::Expense] {
            let total = bucket_total(calculator, kind, self.unbudgeted(kind))?;
            figures.set_unbudgeted(kind, total);
        }
        Ok(figures)
    }
}

fn bucket_total(
    calculator: &CurrencyCalculator,
    kind: UnbudgetedKind,
    transactions: &[Transaction],
) -> Result<CashCommodity, CurrencyError> {
    let oriented = transactions
        .iter()
        .map(|tx| calculator.convert(&tx.amount).map(|amount| kind.orient(&amount)))
        .collect::<Result<Vec<_>, _>>()?;
    calculator.sum(&oriented)
}

/// Assigns transactions to estimates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionAssigner;

impl TransactionAssigner {
    /// Runs one assignment pass.
    ///
    /// Rules are tried in `order`; the first rule that matches claims the
    /// transaction. Rules whose target is missing from `tree` or is a
    /// category are left out, with one `UnresolvedEstimateReference` warning
    /// each. Unclaimed transactions go to the unbudgeted bucket for their
    /// direction.
    ///
    /// # Errors
    ///
    /// - `DuplicateTransaction` if two transactions share an id
    /// - `Cancelled` if `cancel` is set before a transaction is processed
    ///
    /// Nothing is returned from a failed pass.
    pub fn assign(
        tree: &EstimateTree,
        rules: &RuleSet,
        order: RuleOrder,
        transactions: &[Transaction],
        progress: &mut ProgressSpan<'_>,
        cancel: &CancellationToken,
    ) -> Result<Assignments, AnalysisError> {
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = transactions.iter().find(|tx| !seen.insert(tx.id)) {
            warn!(transaction_id = %duplicate.id, "Duplicate transaction id");
            return Err(AnalysisError::DuplicateTransaction(duplicate.id));
        }

        let mut assignments = Assignments::default();
        let usable = Self::resolve(tree, rules, order, &mut assignments.warnings);
        let total = transactions.len();
        progress.advance(0, total);

        for (index, transaction) in transactions.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(processed = index, total, "Assignment cancelled");
                return Err(AnalysisError::Cancelled);
            }

            match usable.iter().find(|rule| rule.matches(transaction)) {
                Some(rule) => {
                    debug!(
                        transaction_id = %transaction.id,
                        rule_id = %rule.id,
                        estimate_id = %rule.estimate_id,
                        "Transaction matched rule"
                    );
                    assignments
                        .matched
                        .entry(rule.estimate_id)
                        .or_default()
                        .push(transaction.clone());
                    assignments.rules.insert(transaction.id, rule.id);
                    assignments
                        .targets
                        .insert(transaction.id, AssignmentTarget::Estimate(rule.estimate_id));
                }
                None => {
                    let kind = UnbudgetedKind::for_transaction(transaction);
                    debug!(
                        transaction_id = %transaction.id,
                        bucket = kind.label(),
                        "Transaction unbudgeted"
                    );
                    let bucket = match kind {
                        UnbudgetedKind::Income => &mut assignments.unbudgeted_income,
                        UnbudgetedKind::Expense => &mut assignments.unbudgeted_expense,
                    };
                    bucket.push(transaction.clone());
                    assignments
                        .targets
                        .insert(transaction.id, AssignmentTarget::Unbudgeted(kind));
                }
            }
            progress.advance(index + 1, total);
        }

        Ok(assignments)
    }

    /// Keeps the rules whose target is a leaf of `tree`, in evaluation order.
    fn resolve<'r>(
        tree: &EstimateTree,
        rules: &'r RuleSet,
        order: RuleOrder,
        warnings: &mut Vec<AnalysisWarning>,
    ) -> Vec<&'r AssignmentRule> {
        rules
            .ordered(order)
            .into_iter()
            .filter(|rule| {
                let resolved = tree.get(rule.estimate_id).is_some_and(Estimate::is_leaf);
                if !resolved {
                    warn!(
                        rule_id = %rule.id,
                        estimate_id = %rule.estimate_id,
                        "Rule targets an estimate that is not a leaf of the budget"
                    );
                    warnings.push(AnalysisWarning::UnresolvedEstimateReference {
                        rule: rule.id,
                        estimate: rule.estimate_id,
                    });
                }
                resolved
            })
            .collect()
    }
}
