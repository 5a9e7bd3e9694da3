//! Assignment rules and rule sets.

use budgetcast_shared::RuleOrder;
use budgetcast_shared::types::{EstimateId, RuleId};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::condition::{Condition, Field, Operator};
use super::error::{AnalysisWarning, RuleError};
use crate::transaction::Transaction;

/// Routes matching transactions to one estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRule {
    /// Stable identifier.
    pub id: RuleId,
    /// Estimate that receives matching transactions.
    pub estimate_id: EstimateId,
    /// Conditions, all of which must hold.
    pub conditions: Vec<Condition>,
}

impl AssignmentRule {
    /// Creates a rule with a fresh id.
    #[must_use]
    pub fn new(estimate_id: EstimateId, conditions: Vec<Condition>) -> Self {
        Self {
            id: RuleId::new(),
            estimate_id,
            conditions,
        }
    }

    /// Replaces the generated id.
    #[must_use]
    pub fn with_id(mut self, id: RuleId) -> Self {
        self.id = id;
        self
    }

    /// Returns true if every condition matches. A rule without conditions
    /// matches nothing.
    #[must_use]
    pub fn matches(&self, transaction: &Transaction) -> bool {
        !self.conditions.is_empty()
            && self
                .conditions
                .iter()
                .all(|condition| condition.matches(transaction))
    }

    /// Sort key for [`RuleOrder::OperatorPrecedence`].
    fn precedence(&self) -> (u8, bool) {
        self.conditions.first().map_or((u8::MAX, true), |first| {
            (first.operator.precedence(), first.field == Field::Any)
        })
    }
}

/// A condition as read from a budget file, names not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionDefinition {
    /// Field name, e.g. `"payee"`.
    pub field: String,
    /// Operator name, e.g. `"BeginsWith"`.
    pub operator: String,
    /// Text compared against.
    pub value: String,
}

impl ConditionDefinition {
    /// Creates a definition.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Parses the field and operator names.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` or `UnknownOperator` for unrecognized names.
    pub fn parse(&self) -> Result<Condition, RuleError> {
        let field: Field = self.field.parse()?;
        let operator: Operator = self.operator.parse()?;
        Ok(Condition::new(field, operator, self.value.clone()))
    }
}

/// A rule as read from a budget file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Stable identifier.
    pub id: RuleId,
    /// Target estimate.
    pub estimate_id: EstimateId,
    /// Unparsed conditions.
    #[serde(default)]
    pub conditions: Vec<ConditionDefinition>,
}

impl RuleDefinition {
    /// Parses every condition.
    ///
    /// # Errors
    ///
    /// Returns the first parse failure, or `NoConditions` for an empty rule.
    pub fn parse(&self) -> Result<AssignmentRule, RuleError> {
        if self.conditions.is_empty() {
            return Err(RuleError::NoConditions);
        }
        let conditions = self
            .conditions
            .iter()
            .map(ConditionDefinition::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AssignmentRule {
            id: self.id,
            estimate_id: self.estimate_id,
            conditions,
        })
    }
}

/// All of a budget's rules, in list order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<AssignmentRule>,
}

impl RuleSet {
    /// Creates a rule set from parsed rules.
    #[must_use]
    pub const fn new(rules: Vec<AssignmentRule>) -> Self {
        Self { rules }
    }

    /// Parses definitions, skipping the malformed ones.
    ///
    /// Each skipped definition yields one `MalformedRule` warning; the
    /// remaining rules keep their relative order.
    #[must_use]
    pub fn from_definitions(definitions: &[RuleDefinition]) -> (Self, Vec<AnalysisWarning>) {
        let mut rules = Vec::with_capacity(definitions.len());
        let mut warnings = Vec::new();
        for definition in definitions {
            match definition.parse() {
                Ok(rule) => rules.push(rule),
                Err(reason) => {
                    warn!(rule_id = %definition.id, error = %reason, "Skipping malformed rule");
                    warnings.push(AnalysisWarning::MalformedRule {
                        rule: definition.id,
                        reason,
                    });
                }
            }
        }
        (Self { rules }, warnings)
    }

    /// Appends a rule.
    pub fn push(&mut self, rule: AssignmentRule) {
        self.rules.push(rule);
    }

    /// Rules in list order.
    #[must_use]
    pub fn rules(&self) -> &[AssignmentRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in the order the assigner tries them.
    ///
    /// [`RuleOrder::OperatorPrecedence`] groups rules by their first
    /// condition's operator (exact-case equality first, `None` last) and puts
    /// any-field rules after single-field rules in each group. The sort is
    /// stable, so ties keep list order.
    #[must_use]
    pub fn ordered(&self, order: RuleOrder) -> Vec<&AssignmentRule> {
        let mut ordered: Vec<_> = self.rules.iter().collect();
        if order == RuleOrder::OperatorPrecedence {
            ordered.sort_by_key(|rule| rule.precedence());
        }
        ordered
    }
}

impl FromIterator<AssignmentRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = AssignmentRule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
