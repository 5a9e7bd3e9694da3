//! End-to-end analysis runs.
//!
//! Each test builds a small budget, feeds it through `BudgetAnalyzer` and
//! checks balances, notices and warnings together.

use std::cell::RefCell;

use budgetcast_core::analysis::{
    AnalysisError, AnalysisInput, AnalysisResult, BudgetAnalyzer, CancellationToken, NoProgress,
    ProgressReporter,
};
use budgetcast_core::assignment::{
    AnalysisWarning, AssignmentTarget, ConditionDefinition, RuleDefinition, RuleError,
    UnbudgetedKind,
};
use budgetcast_core::balance::ExpectedRationale;
use budgetcast_core::behavior::{DueStatus, Progress};
use budgetcast_core::currency::{CurrencyError, ExchangeRate};
use budgetcast_core::estimate::{Estimate, EstimateTree};
use budgetcast_core::period::BudgetingPeriod;
use budgetcast_core::report::{Notice, NoticeLog, NoticeSubject};
use budgetcast_core::transaction::Transaction;
use budgetcast_shared::types::{EstimateId, RuleId, TransactionId};
use budgetcast_shared::{AnalysisConfig, CashCommodity, CurrencyCode, RuleOrder};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn usd(value: Decimal) -> CashCommodity {
    CashCommodity::new(value, CurrencyCode::usd())
}

fn eur(value: Decimal) -> CashCommodity {
    CashCommodity::new(value, CurrencyCode::new("EUR").unwrap())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn payee_rule(n: u128, estimate: EstimateId, payee: &str) -> RuleDefinition {
    RuleDefinition {
        id: RuleId::from_u128(n),
        estimate_id: estimate,
        conditions: vec![ConditionDefinition::new("payee", "contains", payee)],
    }
}

fn tx(n: u128, day: NaiveDate, payee: &str, amount: CashCommodity) -> Transaction {
    Transaction::new(day, payee, amount).with_id(TransactionId::from_u128(n))
}

/// Budget with one groceries expense under a "Home" category.
fn groceries_budget() -> (EstimateTree, EstimateId) {
    let mut tree = EstimateTree::new("Budget", CurrencyCode::usd());
    let home = tree
        .add_child(tree.root(), Estimate::category("Home", CurrencyCode::usd()))
        .unwrap();
    let groceries = tree
        .add_child(home, Estimate::expense("Groceries", usd(dec!(100))))
        .unwrap();
    (tree, groceries)
}

fn run(input: &AnalysisInput) -> (AnalysisResult, NoticeLog) {
    let mut log = NoticeLog::new();
    let result = BudgetAnalyzer::new(AnalysisConfig::default())
        .analyze(input, &mut log, &NoProgress, &CancellationToken::new())
        .unwrap();
    (result, log)
}

#[test]
fn test_expense_under_budget() {
    let (tree, groceries) = groceries_budget();
    let input = AnalysisInput::new(tree, date(2024, 3, 15))
        .with_rules(vec![payee_rule(1, groceries, "market")])
        .with_transactions(vec![tx(1, date(2024, 3, 2), "Corner Market", usd(dec!(-80)))]);

    let (result, log) = run(&input);

    let contribution = &result.contributions[0];
    assert_eq!(contribution.progress, Progress::UnderBudget);
    assert_eq!(contribution.impact.estimated, usd(dec!(-100)));
    assert_eq!(contribution.impact.actual, usd(dec!(-80)));
    assert_eq!(contribution.impact.expected, usd(dec!(-100)));
    assert!(matches!(
        &log.notices()[0],
        Notice::UnderBudget { estimated, actual, .. }
            if *estimated == usd(dec!(100)) && *actual == usd(dec!(80))
    ));
    assert_eq!(
        result.assignments.target_of(TransactionId::from_u128(1)),
        Some(AssignmentTarget::Estimate(groceries))
    );
}

#[test]
fn test_expense_over_budget() {
    let (tree, groceries) = groceries_budget();
    let input = AnalysisInput::new(tree, date(2024, 3, 15))
        .with_rules(vec![payee_rule(1, groceries, "market")])
        .with_transactions(vec![
            tx(1, date(2024, 3, 2), "Corner Market", usd(dec!(-90))),
            tx(2, date(2024, 3, 9), "Corner Market", usd(dec!(-40))),
        ]);

    let (result, log) = run(&input);

    let contribution = &result.contributions[0];
    assert_eq!(contribution.progress, Progress::OverBudget);
    assert_eq!(contribution.impact.estimated, usd(dec!(-100)));
    assert_eq!(contribution.impact.actual, usd(dec!(-130)));
    assert_eq!(contribution.impact.expected, usd(dec!(-130)));
    assert_eq!(contribution.rationale, ExpectedRationale::ActualExceedsEstimated);
    assert!(matches!(log.notices()[0], Notice::OverBudget { .. }));
    assert_eq!(result.over_budget[0].difference, usd(dec!(30)));
    assert_eq!(result.balances.expected.value(), &usd(dec!(-130)));
}

#[test]
fn test_owed_estimate_due_date() {
    let mut tree = EstimateTree::new("Budget", CurrencyCode::usd());
    let rent = tree
        .add_child(
            tree.root(),
            Estimate::expense("Rent", usd(dec!(900))).with_due_date(date(2024, 3, 5)),
        )
        .unwrap();

    for (today, status) in [
        (date(2024, 3, 1), DueStatus::Pending),
        (date(2024, 3, 10), DueStatus::Overdue),
    ] {
        let input = AnalysisInput::new(tree.clone(), today);
        let (_, log) = run(&input);
        let due_notices: Vec<_> = log
            .for_estimate(rent)
            .filter_map(|notice| match notice {
                Notice::DueDate { due, status, .. } => Some((*due, *status)),
                _ => None,
            })
            .collect();
        assert_eq!(due_notices, [(date(2024, 3, 5), status)]);
    }
}

#[test]
fn test_unmatched_income_is_unbudgeted() {
    let (tree, groceries) = groceries_budget();
    let input = AnalysisInput::new(tree, date(2024, 3, 15))
        .with_rules(vec![payee_rule(1, groceries, "market")])
        .with_transactions(vec![tx(7, date(2024, 3, 4), "Tax refund", usd(dec!(50)))]);

    let (result, log) = run(&input);

    assert_eq!(
        result.assignments.target_of(TransactionId::from_u128(7)),
        Some(AssignmentTarget::Unbudgeted(UnbudgetedKind::Income))
    );
    assert_eq!(result.assignments.unbudgeted(UnbudgetedKind::Income).len(), 1);
    assert!(log.notices().iter().any(|notice| matches!(
        notice,
        Notice::Unbudgeted {
            subject: NoticeSubject::Unbudgeted { kind: UnbudgetedKind::Income },
            actual,
        } if *actual == usd(dec!(50))
    )));
    // Groceries still counts against the estimate; the refund only moves actual.
    assert_eq!(result.balances.estimated.value(), &usd(dec!(-100)));
    assert_eq!(result.balances.actual.value(), &usd(dec!(50)));
}

#[test]
fn test_malformed_and_unresolved_rules_become_warnings() {
    let (tree, groceries) = groceries_budget();
    let missing = EstimateId::from_u128(404);
    let input = AnalysisInput::new(tree, date(2024, 3, 15))
        .with_rules(vec![
            RuleDefinition {
                id: RuleId::from_u128(1),
                estimate_id: groceries,
                conditions: vec![ConditionDefinition::new("payee", "sounds_like", "mark")],
            },
            payee_rule(2, missing, "market"),
            payee_rule(3, groceries, "market"),
        ])
        .with_transactions(vec![tx(1, date(2024, 3, 2), "Corner Market", usd(dec!(-80)))]);

    let (result, _) = run(&input);

    assert_eq!(
        result.warnings,
        [
            AnalysisWarning::MalformedRule {
                rule: RuleId::from_u128(1),
                reason: RuleError::UnknownOperator("sounds_like".to_string()),
            },
            AnalysisWarning::UnresolvedEstimateReference {
                rule: RuleId::from_u128(2),
                estimate: missing,
            },
        ]
    );
    assert_eq!(
        result.assignments.rule_for(TransactionId::from_u128(1)),
        Some(RuleId::from_u128(3))
    );
}

#[test]
fn test_operator_precedence_order_changes_winner() {
    let mut tree = EstimateTree::new("Budget", CurrencyCode::usd());
    let coffee = tree
        .add_child(tree.root(), Estimate::expense("Coffee", usd(dec!(20))))
        .unwrap();
    let groceries = tree
        .add_child(tree.root(), Estimate::expense("Groceries", usd(dec!(100))))
        .unwrap();
    let rules = vec![
        payee_rule(1, groceries, "Market"),
        RuleDefinition {
            id: RuleId::from_u128(2),
            estimate_id: coffee,
            conditions: vec![ConditionDefinition::new("payee", "equals", "market cafe")],
        },
    ];
    let input = AnalysisInput::new(tree, date(2024, 3, 15))
        .with_rules(rules)
        .with_transactions(vec![tx(1, date(2024, 3, 2), "Market Cafe", usd(dec!(-4)))]);

    let (listed, _) = run(&input);
    assert_eq!(
        listed.assignments.target_of(TransactionId::from_u128(1)),
        Some(AssignmentTarget::Estimate(groceries))
    );

    let config = AnalysisConfig {
        rule_order: RuleOrder::OperatorPrecedence,
        ..AnalysisConfig::default()
    };
    let ranked = BudgetAnalyzer::new(config)
        .analyze(&input, &mut NoticeLog::new(), &NoProgress, &CancellationToken::new())
        .unwrap();
    assert_eq!(
        ranked.assignments.target_of(TransactionId::from_u128(1)),
        Some(AssignmentTarget::Estimate(coffee))
    );
}

#[test]
fn test_period_filters_transactions() {
    let (tree, groceries) = groceries_budget();
    let input = AnalysisInput::new(tree, date(2024, 3, 15))
        .with_period(BudgetingPeriod::calendar_month(2024, 3).unwrap())
        .with_rules(vec![payee_rule(1, groceries, "market")])
        .with_transactions(vec![
            tx(1, date(2024, 2, 29), "Corner Market", usd(dec!(-30))),
            tx(2, date(2024, 3, 1), "Corner Market", usd(dec!(-20))),
            tx(3, date(2024, 3, 31), "Corner Market", usd(dec!(-10))),
            tx(4, date(2024, 4, 1), "Corner Market", usd(dec!(-40))),
        ]);

    let (result, _) = run(&input);

    assert_eq!(result.assignments.len(), 2);
    assert_eq!(result.assignments.target_of(TransactionId::from_u128(1)), None);
    assert_eq!(result.balances.actual.value(), &usd(dec!(-30)));
}

#[test]
fn test_foreign_transactions_convert_with_rates() {
    let (tree, groceries) = groceries_budget();
    let rate = ExchangeRate::new(CurrencyCode::new("EUR").unwrap(), CurrencyCode::usd(), dec!(1.10))
        .unwrap();
    let input = AnalysisInput::new(tree, date(2024, 3, 15))
        .with_rules(vec![payee_rule(1, groceries, "market")])
        .with_transactions(vec![tx(1, date(2024, 3, 2), "Marché Market", eur(dec!(-50)))]);

    let result = BudgetAnalyzer::new(AnalysisConfig::default())
        .with_rates(vec![rate])
        .analyze(&input, &mut NoticeLog::new(), &NoProgress, &CancellationToken::new())
        .unwrap();

    assert_eq!(result.balances.actual.value(), &usd(dec!(-55.00)));
}

#[test]
fn test_currency_mismatch_is_fatal() {
    let (tree, groceries) = groceries_budget();
    let input = AnalysisInput::new(tree, date(2024, 3, 15))
        .with_rules(vec![payee_rule(1, groceries, "market")])
        .with_transactions(vec![tx(1, date(2024, 3, 2), "Marché Market", eur(dec!(-50)))]);
    let mut log = NoticeLog::new();

    let err = BudgetAnalyzer::new(AnalysisConfig::default())
        .analyze(&input, &mut log, &NoProgress, &CancellationToken::new())
        .unwrap_err();

    assert_eq!(
        err,
        AnalysisError::Currency(CurrencyError::CurrencyMismatch {
            expected: CurrencyCode::usd(),
            got: CurrencyCode::new("EUR").unwrap(),
        })
    );
    assert!(log.notices().is_empty());
}

#[test]
fn test_cancelled_run_returns_no_result() {
    let (tree, groceries) = groceries_budget();
    let input = AnalysisInput::new(tree, date(2024, 3, 15))
        .with_rules(vec![payee_rule(1, groceries, "market")])
        .with_transactions(vec![tx(1, date(2024, 3, 2), "Corner Market", usd(dec!(-80)))]);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut log = NoticeLog::new();

    let err = BudgetAnalyzer::new(AnalysisConfig::default())
        .analyze(&input, &mut log, &NoProgress, &cancel)
        .unwrap_err();

    assert_eq!(err, AnalysisError::Cancelled);
    assert!(log.notices().is_empty());
}

#[derive(Default)]
struct Recorder(RefCell<Vec<u32>>);

impl ProgressReporter for Recorder {
    fn report(&self, percent: u32) {
        self.0.borrow_mut().push(percent);
    }
}

#[test]
fn test_progress_rises_to_completion() {
    let (tree, groceries) = groceries_budget();
    let transactions = (0..20)
        .map(|n| tx(n, date(2024, 3, 2), "Corner Market", usd(dec!(-1))))
        .collect();
    let input = AnalysisInput::new(tree, date(2024, 3, 15))
        .with_rules(vec![payee_rule(1, groceries, "market")])
        .with_transactions(transactions);
    let recorder = Recorder::default();

    BudgetAnalyzer::new(AnalysisConfig::default())
        .analyze(&input, &mut NoticeLog::new(), &recorder, &CancellationToken::new())
        .unwrap();

    let reported = recorder.0.borrow();
    assert!(reported.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(reported.first(), Some(&0));
    assert_eq!(reported.last(), Some(&100));
}

#[test]
fn test_duplicate_transaction_ids_are_fatal() {
    let tree = EstimateTree::new("Budget", CurrencyCode::usd());
    let input = AnalysisInput::new(tree, date(2024, 3, 15)).with_transactions(vec![
        tx(1, date(2024, 3, 2), "Payroll", usd(dec!(50))),
        tx(1, date(2024, 3, 3), "Kiosk", usd(dec!(-5))),
    ]);
    let mut log = NoticeLog::new();

    let err = BudgetAnalyzer::new(AnalysisConfig::default())
        .analyze(&input, &mut log, &NoProgress, &CancellationToken::new())
        .unwrap_err();

    assert_eq!(err, AnalysisError::DuplicateTransaction(TransactionId::from_u128(1)));
    assert!(log.notices().is_empty());
}

#[test]
fn test_balance_overflow_is_fatal() {
    let mut tree = EstimateTree::new("Budget", CurrencyCode::usd());
    for name in ["Salary", "Bonus"] {
        tree.add_child(tree.root(), Estimate::income(name, usd(Decimal::MAX)))
            .unwrap();
    }
    let input = AnalysisInput::new(tree, date(2024, 3, 15));

    let err = BudgetAnalyzer::new(AnalysisConfig::default())
        .analyze(&input, &mut NoticeLog::new(), &NoProgress, &CancellationToken::new())
        .unwrap_err();

    assert_eq!(err, AnalysisError::Currency(CurrencyError::Overflow(CurrencyCode::usd())));
}
