//! Report sink for per-estimate notices.
//!
//! The engine calls into a [`Report`] while it computes balances; rendering is
//! up to the implementation. [`NoticeLog`] collects every call as a value.

use budgetcast_shared::CashCommodity;
use budgetcast_shared::types::EstimateId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assignment::UnbudgetedKind;
use crate::balance::ExpectedRationale;
use crate::behavior::{DueStatus, Progress};
use crate::estimate::Estimate;

/// What a notice is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "subject", rename_all = "snake_case")]
pub enum NoticeSubject {
    /// A leaf estimate.
    Estimate {
        /// Estimate id.
        id: EstimateId,
        /// Estimate name at the time of the run.
        name: String,
    },
    /// An unbudgeted bucket.
    Unbudgeted {
        /// Which bucket.
        kind: UnbudgetedKind,
    },
}

impl NoticeSubject {
    /// Subject for an estimate.
    #[must_use]
    pub fn estimate(estimate: &Estimate) -> Self {
        Self::Estimate {
            id: estimate.id,
            name: estimate.name.clone(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Estimate { name, .. } => name,
            Self::Unbudgeted { kind } => kind.label(),
        }
    }
}

/// Receives notices from a run. Every method defaults to doing nothing.
pub trait Report {
    /// Actual exceeded estimated.
    fn record_over_budget(
        &mut self,
        _subject: &NoticeSubject,
        _estimated: &CashCommodity,
        _actual: &CashCommodity,
    ) {
    }

    /// Actual is still below estimated.
    fn record_under_budget(
        &mut self,
        _subject: &NoticeSubject,
        _estimated: &CashCommodity,
        _actual: &CashCommodity,
    ) {
    }

    /// An owed estimate has no activity yet.
    fn record_due_date(&mut self, _subject: &NoticeSubject, _due: NaiveDate, _status: DueStatus) {}

    /// Money moved that no estimate accounts for.
    fn record_unbudgeted(&mut self, _subject: &NoticeSubject, _actual: &CashCommodity) {}

    /// Classification of a leaf, sent after its behavior notice.
    fn record_progress(
        &mut self,
        _subject: &NoticeSubject,
        _estimated: &CashCommodity,
        _actual: &CashCommodity,
        _progress: Progress,
    ) {
    }

    /// Amount assumed for the expected balance, and why.
    fn record_expected(
        &mut self,
        _subject: &NoticeSubject,
        _expected: &CashCommodity,
        _rationale: ExpectedRationale,
    ) {
    }
}

/// One recorded [`Report`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    /// See [`Report::record_over_budget`].
    OverBudget {
        /// Estimate concerned.
        subject: NoticeSubject,
        /// Estimated amount.
        estimated: CashCommodity,
        /// Actual amount.
        actual: CashCommodity,
    },
    /// See [`Report::record_under_budget`].
    UnderBudget {
        /// Estimate concerned.
        subject: NoticeSubject,
        /// Estimated amount.
        estimated: CashCommodity,
        /// Actual amount.
        actual: CashCommodity,
    },
    /// See [`Report::record_due_date`].
    DueDate {
        /// Estimate concerned.
        subject: NoticeSubject,
        /// Due date.
        due: NaiveDate,
        /// Pending or overdue.
        status: DueStatus,
    },
    /// See [`Report::record_unbudgeted`].
    Unbudgeted {
        /// Bucket concerned.
        subject: NoticeSubject,
        /// Bucket total.
        actual: CashCommodity,
    },
    /// See [`Report::record_progress`].
    Progress {
        /// Estimate concerned.
        subject: NoticeSubject,
        /// Estimated amount.
        estimated: CashCommodity,
        /// Actual amount.
        actual: CashCommodity,
        /// Classification.
        progress: Progress,
    },
    /// See [`Report::record_expected`].
    Expected {
        /// Estimate concerned.
        subject: NoticeSubject,
        /// Expected amount.
        expected: CashCommodity,
        /// Why this amount.
        rationale: ExpectedRationale,
    },
}

impl Notice {
    /// Subject of the notice.
    #[must_use]
    pub const fn subject(&self) -> &NoticeSubject {
        match self {
            Self::OverBudget { subject, .. }
            | Self::UnderBudget { subject, .. }
            | Self::DueDate { subject, .. }
            | Self::Unbudgeted { subject, .. }
            | Self::Progress { subject, .. }
            | Self::Expected { subject, .. } => subject,
        }
    }
}

/// A [`Report`] that keeps every notice in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeLog {
    notices: Vec<Notice>,
}

impl NoticeLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices in call order.
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Consumes the log.
    #[must_use]
    pub fn into_notices(self) -> Vec<Notice> {
        self.notices
    }

    /// Notices about one estimate.
    pub fn for_estimate(&self, id: EstimateId) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(move |notice| {
            matches!(notice.subject(), NoticeSubject::Estimate { id: subject, .. } if *subject == id)
        })
    }
}

impl Report for NoticeLog {
    fn record_over_budget(
        &mut self,
        subject: &NoticeSubject,
        estimated: &CashCommodity,
        actual: &CashCommodity,
    ) {
        self.notices.push(Notice::OverBudget {
            subject: subject.clone(),
            estimated: estimated.clone(),
            actual: actual.clone(),
        });
    }

    fn record_under_budget(
        &mut self,
        subject: &NoticeSubject,
        estimated: &CashCommodity,
        actual: &CashCommodity,
    ) {
        self.notices.push(Notice::UnderBudget {
            subject: subject.clone(),
            estimated: estimated.clone(),
            actual: actual.clone(),
        });
    }

    fn record_due_date(&mut self, subject: &NoticeSubject, due: NaiveDate, status: DueStatus) {
        self.notices.push(Notice::DueDate {
            subject: subject.clone(),
            due,
            status,
        });
    }

    fn record_unbudgeted(&mut self, subject: &NoticeSubject, actual: &CashCommodity) {
        self.notices.push(Notice::Unbudgeted {
            subject: subject.clone(),
            actual: actual.clone(),
        });
    }

    fn record_progress(
        &mut self,
        subject: &NoticeSubject,
        estimated: &CashCommodity,
        actual: &CashCommodity,
        progress: Progress,
    ) {
        self.notices.push(Notice::Progress {
            subject: subject.clone(),
            estimated: estimated.clone(),
            actual: actual.clone(),
            progress,
        });
    }

    fn record_expected(
        &mut self,
        subject: &NoticeSubject,
        expected: &CashCommodity,
        rationale: ExpectedRationale,
    ) {
        self.notices.push(Notice::Expected {
            subject: subject.clone(),
            expected: expected.clone(),
            rationale,
        });
    }
}
