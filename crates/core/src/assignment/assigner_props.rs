//! Property-based tests for transaction assignment.

use budgetcast_shared::types::{EstimateId, RuleId, TransactionId};
use budgetcast_shared::{CashCommodity, CurrencyCode, RuleOrder};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::assigner::{AssignmentTarget, Assignments, TransactionAssigner, UnbudgetedKind};
use super::condition::{Condition, Field, Operator};
use super::rule::{AssignmentRule, RuleSet};
use crate::analysis::progress::{CancellationToken, NoProgress, ProgressSpan};
use crate::estimate::{Estimate, EstimateTree};
use crate::transaction::Transaction;

const WORDS: [&str; 6] = ["coffee", "market", "rent", "fuel", "gift", "salary"];

fn usd(value: Decimal) -> CashCommodity {
    CashCommodity::new(value, CurrencyCode::usd())
}

fn operator() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::BeginsWith),
        Just(Operator::Equals),
        Just(Operator::EqualsCase),
        Just(Operator::Contains),
        Just(Operator::EndsWith),
        Just(Operator::None),
    ]
}

fn field() -> impl Strategy<Value = Field> {
    prop_oneof![Just(Field::Payee), Just(Field::Memo), Just(Field::Any)]
}

/// (payee word index, memo word index, cents)
fn raw_transaction() -> impl Strategy<Value = (usize, usize, i64)> {
    (0..WORDS.len(), 0..WORDS.len(), -500_000i64..500_000)
}

/// (target slot, field, operator, word index); slot 3 points at a missing estimate.
fn raw_rule() -> impl Strategy<Value = (usize, Field, Operator, usize)> {
    (0usize..4, field(), operator(), 0..WORDS.len())
}

fn fixture(
    raw_rules: &[(usize, Field, Operator, usize)],
    raw_transactions: &[(usize, usize, i64)],
) -> (EstimateTree, RuleSet, Vec<Transaction>) {
    let mut tree = EstimateTree::new("Budget", CurrencyCode::usd());
    let root = tree.root();
    let mut targets = vec![
        tree.add_child(root, Estimate::income("Income", usd(Decimal::ONE_HUNDRED)))
            .unwrap(),
        tree.add_child(root, Estimate::expense("Spending", usd(Decimal::ONE_HUNDRED)))
            .unwrap(),
        tree.add_child(root, Estimate::transfer("Savings", usd(Decimal::ONE_HUNDRED)))
            .unwrap(),
    ];
    targets.push(EstimateId::from_u128(u128::MAX));

    let rules = raw_rules
        .iter()
        .enumerate()
        .map(|(n, (slot, field, operator, word))| {
            AssignmentRule::new(
                targets[*slot],
                vec![Condition::new(*field, *operator, WORDS[*word])],
            )
            .with_id(RuleId::from_u128(n as u128))
        })
        .collect();

    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let transactions = raw_transactions
        .iter()
        .enumerate()
        .map(|(n, (payee, memo, cents))| {
            Transaction::new(date, format!("{} store", WORDS[*payee]), usd(Decimal::new(*cents, 2)))
                .with_memo(WORDS[*memo])
                .with_id(TransactionId::from_u128(n as u128))
        })
        .collect();

    (tree, rules, transactions)
}

fn run(
    tree: &EstimateTree,
    rules: &RuleSet,
    order: RuleOrder,
    transactions: &[Transaction],
) -> Assignments {
    let mut progress = ProgressSpan::new(&NoProgress, 0, 100, 100);
    TransactionAssigner::assign(
        tree,
        rules,
        order,
        transactions,
        &mut progress,
        &CancellationToken::new(),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Two passes over identical inputs give identical results.
    #[test]
    fn prop_assignment_is_deterministic(
        raw_rules in prop::collection::vec(raw_rule(), 0..12),
        raw_transactions in prop::collection::vec(raw_transaction(), 0..40),
        precedence in any::<bool>(),
    ) {
        let (tree, rules, transactions) = fixture(&raw_rules, &raw_transactions);
        let order = if precedence { RuleOrder::OperatorPrecedence } else { RuleOrder::List };

        let first = run(&tree, &rules, order, &transactions);
        let second = run(&tree, &rules, order, &transactions);

        prop_assert_eq!(first, second);
    }

    /// Every transaction lands in exactly one place, and that place agrees
    /// with the rule that claimed it.
    #[test]
    fn prop_every_transaction_assigned_once(
        raw_rules in prop::collection::vec(raw_rule(), 0..12),
        raw_transactions in prop::collection::vec(raw_transaction(), 0..40),
    ) {
        let (tree, rules, transactions) = fixture(&raw_rules, &raw_transactions);
        let result = run(&tree, &rules, RuleOrder::List, &transactions);

        prop_assert_eq!(result.len(), transactions.len());
        let mut placed = result.unbudgeted(UnbudgetedKind::Income).len()
            + result.unbudgeted(UnbudgetedKind::Expense).len();
        for leaf in tree.leaves() {
            placed += result.transactions_for(leaf).len();
        }
        prop_assert_eq!(placed, transactions.len());

        for tx in &transactions {
            match result.target_of(tx.id) {
                Some(AssignmentTarget::Estimate(estimate)) => {
                    let rule_id = result.rule_for(tx.id);
                    let rule = rules.rules().iter().find(|r| Some(r.id) == rule_id);
                    prop_assert!(rule.is_some_and(|r| r.estimate_id == estimate && r.matches(tx)));
                    prop_assert!(tree.get(estimate).is_some_and(Estimate::is_leaf));
                }
                Some(AssignmentTarget::Unbudgeted(kind)) => {
                    prop_assert_eq!(kind, UnbudgetedKind::for_transaction(tx));
                    prop_assert!(result.rule_for(tx.id).is_none());
                }
                None => prop_assert!(false, "transaction {} not assigned", tx.id),
            }
        }
    }

    /// The winning rule is the first resolvable rule in list order that
    /// matches.
    #[test]
    fn prop_first_match_wins(
        raw_rules in prop::collection::vec(raw_rule(), 0..12),
        raw_transactions in prop::collection::vec(raw_transaction(), 0..20),
    ) {
        let (tree, rules, transactions) = fixture(&raw_rules, &raw_transactions);
        let result = run(&tree, &rules, RuleOrder::List, &transactions);

        for tx in &transactions {
            let expected = rules
                .rules()
                .iter()
                .filter(|r| tree.get(r.estimate_id).is_some_and(Estimate::is_leaf))
                .find(|r| r.matches(tx))
                .map(|r| r.id);
            prop_assert_eq!(result.rule_for(tx.id), expected);
        }
    }
}
