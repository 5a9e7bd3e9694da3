//! Rule-based assignment of imported transactions to estimates.

pub mod assigner;
pub mod condition;
pub mod error;
pub mod rule;

#[cfg(test)]
mod assigner_props;

pub use assigner::{ActualFigures, AssignmentTarget, Assignments, TransactionAssigner, UnbudgetedKind};
pub use condition::{Condition, Field, Operator};
pub use error::{AnalysisWarning, RuleError};
pub use rule::{AssignmentRule, ConditionDefinition, RuleDefinition, RuleSet};
