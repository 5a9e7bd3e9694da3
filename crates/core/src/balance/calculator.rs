//! Balance calculation over an estimate tree.

use std::cmp::Ordering;

use budgetcast_shared::CashCommodity;
use budgetcast_shared::types::EstimateId;
use tracing::debug;

use super::ending::EndingBalances;
use super::types::{
    BalanceContribution, BalanceImpact, BalanceOptions, BalanceSummary, BudgetDifference,
    ExpectedRationale,
};
use crate::assignment::{ActualFigures, UnbudgetedKind};
use crate::behavior::{EstimateBehavior, Progress};
use crate::currency::CurrencyCalculator;
use crate::estimate::{EstimateTree, EstimateType, TreeError};
use crate::report::{NoticeSubject, Report};

/// Folds a tree and its actual figures into ending balances.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceCalculator;

/// Mutable state threaded through one walk.
struct Walk<'a> {
    tree: &'a EstimateTree,
    actuals: &'a ActualFigures,
    calculator: &'a CurrencyCalculator,
    options: BalanceOptions,
    report: &'a mut dyn Report,
    balances: EndingBalances,
    contributions: Vec<BalanceContribution>,
    over_budget: Vec<BudgetDifference>,
    under_budget: Vec<BudgetDifference>,
}

impl BalanceCalculator {
    /// Computes estimated, actual and expected ending balances.
    ///
    /// Walks the tree once in post-order; only leaves contribute. Each leaf
    /// sends its behavior notice, then its progress, then its expected
    /// amount to `report`. The two unbudgeted buckets are applied last, with
    /// nothing estimated and the actual total as the expected amount; both
    /// are reported even when empty.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount cannot be brought into the calculator's
    /// currency.
    pub fn calculate(
        tree: &EstimateTree,
        actuals: &ActualFigures,
        calculator: &CurrencyCalculator,
        initial: &CashCommodity,
        options: BalanceOptions,
        report: &mut dyn Report,
    ) -> Result<BalanceSummary, TreeError> {
        let initial = calculator.convert(initial)?;
        let mut walk = Walk {
            tree,
            actuals,
            calculator,
            options,
            report,
            balances: EndingBalances::new(&initial),
            contributions: Vec::new(),
            over_budget: Vec::new(),
            under_budget: Vec::new(),
        };

        walk.visit(tree.root())?;
        walk.apply_unbudgeted(UnbudgetedKind::Income)?;
        walk.apply_unbudgeted(UnbudgetedKind::Expense)?;

        let Walk {
            balances,
            contributions,
            mut over_budget,
            mut under_budget,
            ..
        } = walk;
        sort_by_difference(&mut over_budget);
        sort_by_difference(&mut under_budget);

        Ok(BalanceSummary {
            balances,
            contributions,
            over_budget,
            under_budget,
        })
    }
}

impl Walk<'_> {
    fn visit(&mut self, id: EstimateId) -> Result<(), TreeError> {
        let tree = self.tree;
        for child in tree.children(id) {
            self.visit(*child)?;
        }
        let estimate = tree.get(id).ok_or(TreeError::UnknownEstimate(id))?;
        if estimate.is_leaf() {
            self.apply_leaf(id)?;
        }
        Ok(())
    }

    fn apply_leaf(&mut self, id: EstimateId) -> Result<(), TreeError> {
        let tree = self.tree;
        let estimate = tree.get(id).ok_or(TreeError::UnknownEstimate(id))?;
        let subject = NoticeSubject::estimate(estimate);
        let estimated = tree.amount(id, self.calculator)?;
        let actual = self.calculator.convert(&self.actuals.total_for(id))?;
        let is_final = estimate.is_final || self.options.all_final;

        let (expected, rationale) = ExpectedRationale::choose(&estimated, &actual, is_final)?;
        let impact = BalanceImpact::for_type(estimate.estimate_type, &estimated, &actual, &expected);
        self.balances.apply(&impact)?;
        debug!(
            estimate_id = %id,
            estimated = %impact.estimated,
            actual = %impact.actual,
            expected = %impact.expected,
            rationale = ?rationale,
            "Applied balance impact"
        );

        let progress = EstimateBehavior::for_estimate(estimate).classify(
            &estimated,
            &actual,
            self.options.today,
        )?;
        progress.report(&subject, &estimated, &actual, self.report);
        self.report
            .record_progress(&subject, &estimated, &actual, progress);
        self.report.record_expected(&subject, &expected, rationale);

        if estimate.estimate_type != EstimateType::Transfer {
            self.record_difference(&subject, &estimated, &actual)?;
        }
        self.contributions.push(BalanceContribution {
            subject,
            impact,
            rationale,
            progress,
        });
        Ok(())
    }

    fn apply_unbudgeted(&mut self, kind: UnbudgetedKind) -> Result<(), TreeError> {
        let actual = self.calculator.convert(self.actuals.unbudgeted(kind))?;
        let subject = NoticeSubject::Unbudgeted { kind };
        let estimated = self.calculator.zero();
        let (expected, rationale) = ExpectedRationale::choose(&estimated, &actual, true)?;
        let estimate_type = match kind {
            UnbudgetedKind::Income => EstimateType::Income,
            UnbudgetedKind::Expense => EstimateType::Expense,
        };
        let impact = BalanceImpact::for_type(estimate_type, &estimated, &actual, &expected);
        self.balances.apply(&impact)?;
        debug!(
            bucket = kind.label(),
            actual = %impact.actual,
            "Applied unbudgeted impact"
        );

        let progress =
            EstimateBehavior::Unbudgeted.classify(&estimated, &actual, self.options.today)?;
        progress.report(&subject, &estimated, &actual, self.report);
        self.report
            .record_progress(&subject, &estimated, &actual, progress);
        self.report.record_expected(&subject, &expected, rationale);

        // An empty bucket is still reported but leaves the balances alone.
        if !actual.is_zero() {
            self.contributions.push(BalanceContribution {
                subject,
                impact,
                rationale,
                progress,
            });
        }
        Ok(())
    }

    fn record_difference(
        &mut self,
        subject: &NoticeSubject,
        estimated: &CashCommodity,
        actual: &CashCommodity,
    ) -> Result<(), TreeError> {
        let difference = self.calculator.subtract(actual, estimated)?;
        let target = match difference.value.cmp(&rust_decimal::Decimal::ZERO) {
            Ordering::Greater => &mut self.over_budget,
            Ordering::Less => &mut self.under_budget,
            Ordering::Equal => return Ok(()),
        };
        target.push(BudgetDifference {
            subject: subject.clone(),
            difference: difference.abs(),
        });
        Ok(())
    }
}

/// Largest difference first; the sort is stable so ties keep tree order.
fn sort_by_difference(differences: &mut [BudgetDifference]) {
    differences.sort_by(|a, b| b.difference.value.cmp(&a.difference.value));
}
