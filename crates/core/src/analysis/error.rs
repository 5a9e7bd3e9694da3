//! Fatal analysis errors.

use budgetcast_shared::types::TransactionId;
use thiserror::Error;

use crate::currency::CurrencyError;
use crate::estimate::TreeError;
use crate::period::PeriodError;

/// Errors that stop a run. A run that fails returns no partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    // ========== Input Errors ==========
    /// The estimate tree is not well formed.
    #[error("Invalid tree structure: {0}")]
    InvalidTreeStructure(TreeError),

    /// The budgeting period has invalid bounds.
    #[error("Invalid budgeting period: {0}")]
    InvalidPeriod(#[from] PeriodError),

    /// Two input transactions share an id.
    #[error("Duplicate transaction id: {0}")]
    DuplicateTransaction(TransactionId),

    // ========== Calculation Errors ==========
    /// An amount could not be brought into the analysis currency.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    // ========== Control ==========
    /// The caller cancelled the run.
    #[error("Analysis cancelled")]
    Cancelled,
}

impl From<TreeError> for AnalysisError {
    /// Currency failures met while walking the tree keep their own variant.
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::Currency(err) => Self::Currency(err),
            other => Self::InvalidTreeStructure(other),
        }
    }
}
