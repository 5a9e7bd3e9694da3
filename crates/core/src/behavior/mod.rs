//! Estimate behaviors and progress classification.
//!
//! Each estimate is classified by one of a fixed set of behaviors. The set is
//! closed: a new behavior means a new variant and a new match arm in
//! [`EstimateBehavior::classify`].

use std::cmp::Ordering;

use budgetcast_shared::CashCommodity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyError;
use crate::estimate::{Estimate, EstimateType};
use crate::report::{NoticeSubject, Report};

/// How an estimate's progress is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "behavior", content = "due", rename_all = "snake_case")]
pub enum EstimateBehavior {
    /// Aggregation only; never classified on its own.
    Category,
    /// Compare actual against estimated.
    Generic,
    /// Track the due date until activity shows up, then behave as Generic.
    Owed(NaiveDate),
    /// No estimate to compare against; report the actual amount.
    Unbudgeted,
}

/// Due-date state of an owed estimate without activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    /// Due date is still ahead.
    Pending,
    /// Due date has arrived or passed.
    Overdue,
}

/// Classification of one estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "progress", content = "due", rename_all = "snake_case")]
pub enum Progress {
    /// A category.
    Aggregate,
    /// Actual equals estimated.
    OnBudget,
    /// Actual is below estimated.
    UnderBudget,
    /// Actual is above estimated.
    OverBudget,
    /// Owed, no activity, due date ahead.
    Pending(NaiveDate),
    /// Owed, no activity, due date reached.
    Overdue(NaiveDate),
    /// Unbudgeted bucket.
    Unbudgeted,
}

impl EstimateBehavior {
    /// Picks the behavior for an estimate: categories aggregate, leaves with
    /// a due date are owed, other leaves are generic.
    #[must_use]
    pub fn for_estimate(estimate: &Estimate) -> Self {
        match (estimate.estimate_type, estimate.due_date) {
            (EstimateType::Category, _) => Self::Category,
            (_, Some(due)) => Self::Owed(due),
            (_, None) => Self::Generic,
        }
    }

    /// Classifies an estimate from its oriented estimated and actual amounts.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyMismatch` if the two amounts are in different
    /// currencies.
    pub fn classify(
        self,
        estimated: &CashCommodity,
        actual: &CashCommodity,
        today: NaiveDate,
    ) -> Result<Progress, CurrencyError> {
        let progress = match self {
            Self::Category => Progress::Aggregate,
            Self::Unbudgeted => Progress::Unbudgeted,
            Self::Owed(due) if actual.is_zero() => {
                if due > today {
                    Progress::Pending(due)
                } else {
                    Progress::Overdue(due)
                }
            }
            Self::Owed(_) | Self::Generic => match actual.compare(estimated)? {
                Ordering::Less => Progress::UnderBudget,
                Ordering::Equal => Progress::OnBudget,
                Ordering::Greater => Progress::OverBudget,
            },
        };
        Ok(progress)
    }
}

impl Progress {
    /// Returns true if actual exceeded estimated.
    #[must_use]
    pub const fn is_over_budget(self) -> bool {
        matches!(self, Self::OverBudget)
    }

    /// Sends the notice for this classification to `report`.
    ///
    /// Aggregates and on-budget estimates produce no notice.
    pub fn report(
        self,
        subject: &NoticeSubject,
        estimated: &CashCommodity,
        actual: &CashCommodity,
        report: &mut dyn Report,
    ) {
        match self {
            Self::Aggregate | Self::OnBudget => {}
            Self::UnderBudget => report.record_under_budget(subject, estimated, actual),
            Self::OverBudget => report.record_over_budget(subject, estimated, actual),
            Self::Pending(due) => report.record_due_date(subject, due, DueStatus::Pending),
            Self::Overdue(due) => report.record_due_date(subject, due, DueStatus::Overdue),
            Self::Unbudgeted => report.record_unbudgeted(subject, actual),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Notice, NoticeLog};
    use budgetcast_shared::CurrencyCode;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn usd(value: Decimal) -> CashCommodity {
        CashCommodity::new(value, CurrencyCode::usd())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_for_estimate() {
        let due = date(2024, 3, 5);
        assert_eq!(
            EstimateBehavior::for_estimate(&Estimate::category("Home", CurrencyCode::usd())),
            EstimateBehavior::Category
        );
        assert_eq!(
            EstimateBehavior::for_estimate(&Estimate::expense("Rent", usd(dec!(900)))),
            EstimateBehavior::Generic
        );
        assert_eq!(
            EstimateBehavior::for_estimate(
                &Estimate::expense("Rent", usd(dec!(900))).with_due_date(due)
            ),
            EstimateBehavior::Owed(due)
        );
    }

    #[rstest]
    #[case(dec!(80), Progress::UnderBudget)]
    #[case(dec!(100), Progress::OnBudget)]
    #[case(dec!(100.00), Progress::OnBudget)]
    #[case(dec!(100.01), Progress::OverBudget)]
    #[case(dec!(130), Progress::OverBudget)]
    #[case(dec!(-10), Progress::UnderBudget)]
    fn test_generic_classification(#[case] actual: Decimal, #[case] expected: Progress) {
        let progress = EstimateBehavior::Generic
            .classify(&usd(dec!(100)), &usd(actual), date(2024, 3, 1))
            .unwrap();
        assert_eq!(progress, expected);
    }

    #[rstest]
    #[case(date(2024, 3, 1), Progress::Pending(date(2024, 3, 5)))]
    #[case(date(2024, 3, 5), Progress::Overdue(date(2024, 3, 5)))]
    #[case(date(2024, 3, 10), Progress::Overdue(date(2024, 3, 5)))]
    fn test_owed_without_activity(#[case] today: NaiveDate, #[case] expected: Progress) {
        let behavior = EstimateBehavior::Owed(date(2024, 3, 5));
        let progress = behavior
            .classify(&usd(dec!(100)), &usd(dec!(0)), today)
            .unwrap();
        assert_eq!(progress, expected);
    }

    #[test]
    fn test_owed_with_activity_behaves_as_generic() {
        let behavior = EstimateBehavior::Owed(date(2024, 3, 5));
        let today = date(2024, 3, 10);
        assert_eq!(
            behavior.classify(&usd(dec!(100)), &usd(dec!(40)), today).unwrap(),
            Progress::UnderBudget
        );
        assert_eq!(
            behavior.classify(&usd(dec!(100)), &usd(dec!(100)), today).unwrap(),
            Progress::OnBudget
        );
    }

    #[test]
    fn test_category_and_unbudgeted_ignore_amounts() {
        let today = date(2024, 3, 1);
        assert_eq!(
            EstimateBehavior::Category
                .classify(&usd(dec!(1)), &usd(dec!(5)), today)
                .unwrap(),
            Progress::Aggregate
        );
        assert_eq!(
            EstimateBehavior::Unbudgeted
                .classify(&usd(dec!(0)), &usd(dec!(5)), today)
                .unwrap(),
            Progress::Unbudgeted
        );
    }

    #[test]
    fn test_classify_rejects_mixed_currencies() {
        let yen = CashCommodity::new(dec!(5), CurrencyCode::new("JPY").unwrap());
        assert!(
            EstimateBehavior::Generic
                .classify(&usd(dec!(5)), &yen, date(2024, 3, 1))
                .is_err()
        );
    }

    #[test]
    fn test_report_dispatch() {
        let rent = Estimate::expense("Rent", usd(dec!(100)));
        let subject = NoticeSubject::estimate(&rent);
        let mut log = NoticeLog::new();
        let (estimated, actual) = (usd(dec!(100)), usd(dec!(0)));

        for progress in [
            Progress::Aggregate,
            Progress::OnBudget,
            Progress::UnderBudget,
            Progress::OverBudget,
            Progress::Pending(date(2024, 3, 5)),
            Progress::Overdue(date(2024, 3, 5)),
            Progress::Unbudgeted,
        ] {
            progress.report(&subject, &estimated, &actual, &mut log);
        }

        let notices = log.notices();
        assert_eq!(notices.len(), 5);
        assert!(matches!(notices[0], Notice::UnderBudget { .. }));
        assert!(matches!(notices[1], Notice::OverBudget { .. }));
        assert!(matches!(notices[2], Notice::DueDate { status: DueStatus::Pending, .. }));
        assert!(matches!(notices[3], Notice::DueDate { status: DueStatus::Overdue, .. }));
        assert!(matches!(notices[4], Notice::Unbudgeted { .. }));
    }
}
