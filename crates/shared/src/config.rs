//! Analysis configuration management.

use serde::{Deserialize, Serialize};

use crate::types::CurrencyCode;

/// Order in which assignment rules are evaluated against a transaction.
///
/// The first matching rule wins, so this decides which estimate receives a
/// transaction that several rules would accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOrder {
    /// Rules are evaluated in the order of the rule list.
    #[default]
    List,
    /// Rules are grouped by operator, most specific first
    /// (equals-case, equals, begins-with, ends-with, contains), keeping list
    /// order within each group and placing any-field rules after
    /// single-field rules.
    OperatorPrecedence,
}

/// Analysis configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Currency every balance is reported in.
    #[serde(default)]
    pub currency: CurrencyCode,
    /// Rule evaluation order.
    #[serde(default)]
    pub rule_order: RuleOrder,
    /// Treat every estimate as final once the budgeting period has ended.
    #[serde(default = "default_finalize_past_periods")]
    pub finalize_past_periods: bool,
    /// Number of progress notifications emitted over a full run.
    #[serde(default = "default_progress_steps")]
    pub progress_steps: u32,
}

fn default_finalize_past_periods() -> bool {
    true
}

fn default_progress_steps() -> u32 {
    100
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::default(),
            rule_order: RuleOrder::default(),
            finalize_past_periods: default_finalize_past_periods(),
            progress_steps: default_progress_steps(),
        }
    }
}

impl AnalysisConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default`, `config/{RUN_MODE}`, then `BUDGETCAST__*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or a value is invalid.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("BUDGETCAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
