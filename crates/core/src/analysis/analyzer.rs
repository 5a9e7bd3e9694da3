//! Analysis runs.

use budgetcast_shared::{AnalysisConfig, CashCommodity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::AnalysisError;
use super::progress::{CancellationToken, ProgressReporter, ProgressSpan};
use crate::assignment::{
    AnalysisWarning, Assignments, RuleDefinition, RuleSet, TransactionAssigner,
};
use crate::balance::{
    BalanceCalculator, BalanceContribution, BalanceOptions, BudgetDifference, EndingBalances,
};
use crate::currency::{CurrencyCalculator, ExchangeRate};
use crate::estimate::EstimateTree;
use crate::period::BudgetingPeriod;
use crate::report::Report;
use crate::transaction::Transaction;

/// Share of the progress range given to assignment; balances get the rest.
const ASSIGNMENT_SHARE: u32 = 60;

/// Everything one run reads. Borrowed for the duration of the run.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    /// The budget.
    pub tree: EstimateTree,
    /// Rule definitions in list order.
    pub rules: Vec<RuleDefinition>,
    /// Imported transactions.
    pub transactions: Vec<Transaction>,
    /// Only transactions dated inside this period are analyzed.
    pub period: Option<BudgetingPeriod>,
    /// Balance before the period.
    pub initial_balance: CashCommodity,
    /// "Now" for due dates and period finalization.
    pub today: NaiveDate,
}

impl AnalysisInput {
    /// Input with no rules, transactions or period, starting from zero.
    #[must_use]
    pub fn new(tree: EstimateTree, today: NaiveDate) -> Self {
        let initial_balance = CashCommodity::zero(tree.currency().clone());
        Self {
            tree,
            rules: Vec::new(),
            transactions: Vec::new(),
            period: None,
            initial_balance,
            today,
        }
    }

    /// Sets the rule definitions.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<RuleDefinition>) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the transactions.
    #[must_use]
    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = transactions;
        self
    }

    /// Restricts the run to a budgeting period.
    #[must_use]
    pub fn with_period(mut self, period: BudgetingPeriod) -> Self {
        self.period = Some(period);
        self
    }

    /// Sets the starting balance.
    #[must_use]
    pub fn with_initial_balance(mut self, initial_balance: CashCommodity) -> Self {
        self.initial_balance = initial_balance;
        self
    }
}

/// Output of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Where every analyzed transaction went.
    pub assignments: Assignments,
    /// Estimated, actual and expected ending balances.
    pub balances: EndingBalances,
    /// Per-leaf contributions, unbudgeted buckets last.
    pub contributions: Vec<BalanceContribution>,
    /// Leaves over budget, largest difference first.
    pub over_budget: Vec<BudgetDifference>,
    /// Leaves under budget, largest difference first.
    pub under_budget: Vec<BudgetDifference>,
    /// Rules skipped during the run.
    pub warnings: Vec<AnalysisWarning>,
}

/// Runs analyses under one configuration.
#[derive(Debug, Clone)]
pub struct BudgetAnalyzer {
    config: AnalysisConfig,
    rates: Vec<ExchangeRate>,
}

impl BudgetAnalyzer {
    /// Creates an analyzer with no exchange rates.
    #[must_use]
    pub const fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            rates: Vec::new(),
        }
    }

    /// Adds exchange rates into the configured currency.
    #[must_use]
    pub fn with_rates(mut self, rates: Vec<ExchangeRate>) -> Self {
        self.rates.extend(rates);
        self
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes one budget.
    ///
    /// Assignment takes the first part of the progress range and balance
    /// calculation the rest. Notices go to `report` as balances are
    /// calculated. When the configuration finalizes past periods and the
    /// period ended before `today`, every estimate is treated as final.
    ///
    /// # Errors
    ///
    /// - `InvalidTreeStructure` if the tree is malformed
    /// - `InvalidPeriod` if the period has invalid bounds
    /// - `DuplicateTransaction` if two analyzed transactions share an id
    /// - `Currency` if an amount cannot be converted or overflows
    /// - `Cancelled` if `cancel` is set during assignment
    pub fn analyze(
        &self,
        input: &AnalysisInput,
        report: &mut dyn Report,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        info!(
            estimates = input.tree.estimate_count(),
            rules = input.rules.len(),
            transactions = input.transactions.len(),
            currency = %self.config.currency,
            "Starting analysis"
        );

        let calculator =
            CurrencyCalculator::with_rates(self.config.currency.clone(), self.rates.clone());
        input.tree.validate(&calculator)?;

        let transactions: Vec<Transaction> = match &input.period {
            Some(period) => {
                period.bounds()?;
                input
                    .transactions
                    .iter()
                    .filter(|tx| period.contains(tx.date))
                    .cloned()
                    .collect()
            }
            None => input.transactions.clone(),
        };

        let (rules, mut warnings) = RuleSet::from_definitions(&input.rules);
        let steps = self.config.progress_steps;
        let mut assign_span = ProgressSpan::new(progress, 0, ASSIGNMENT_SHARE, steps);
        let assignments = TransactionAssigner::assign(
            &input.tree,
            &rules,
            self.config.rule_order,
            &transactions,
            &mut assign_span,
            cancel,
        )?;
        warnings.extend_from_slice(assignments.warnings());

        let mut balance_span =
            ProgressSpan::new(progress, ASSIGNMENT_SHARE, 100 - ASSIGNMENT_SHARE, steps);
        balance_span.advance(0, 1);
        let actuals = assignments.actual_figures(&calculator, &input.tree)?;
        let all_final = self.config.finalize_past_periods
            && input
                .period
                .as_ref()
                .is_some_and(|period| period.has_ended(input.today));
        let options = BalanceOptions {
            today: input.today,
            all_final,
        };
        let summary = BalanceCalculator::calculate(
            &input.tree,
            &actuals,
            &calculator,
            &input.initial_balance,
            options,
            report,
        )?;
        balance_span.advance(1, 1);

        info!(
            analyzed = transactions.len(),
            warnings = warnings.len(),
            estimated = %summary.balances.estimated.value(),
            actual = %summary.balances.actual.value(),
            expected = %summary.balances.expected.value(),
            "Analysis finished"
        );

        Ok(AnalysisResult {
            assignments,
            balances: summary.balances,
            contributions: summary.contributions,
            over_budget: summary.over_budget,
            under_budget: summary.under_budget,
            warnings,
        })
    }
}
