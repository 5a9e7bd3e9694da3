//! Rule parsing errors and the warnings an assignment pass collects.

use std::fmt;

use budgetcast_shared::types::{EstimateId, RuleId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a rule definition cannot be turned into a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RuleError {
    /// Field name is not a known transaction attribute.
    #[error("Unknown condition field: {0:?}")]
    UnknownField(String),

    /// Operator name is not a known comparison.
    #[error("Unknown condition operator: {0:?}")]
    UnknownOperator(String),

    /// Rule has no conditions and could never match.
    #[error("Rule has no conditions")]
    NoConditions,
}

/// A recoverable problem found during a run.
///
/// Warnings never stop analysis; the rule concerned is left out and the
/// warning is returned alongside the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// A rule definition could not be parsed and was skipped.
    MalformedRule {
        /// Rule that was skipped.
        rule: RuleId,
        /// What was wrong with it.
        reason: RuleError,
    },
    /// A rule targets an estimate that is not a leaf of the current tree.
    UnresolvedEstimateReference {
        /// Rule that was skipped.
        rule: RuleId,
        /// Missing or non-leaf target.
        estimate: EstimateId,
    },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRule { rule, reason } => {
                write!(f, "Rule {rule} skipped: {reason}")
            }
            Self::UnresolvedEstimateReference { rule, estimate } => {
                write!(f, "Rule {rule} skipped: estimate {estimate} is not a leaf of the budget")
            }
        }
    }
}
