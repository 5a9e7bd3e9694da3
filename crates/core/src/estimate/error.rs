//! Estimate tree error types.
//!
//! Every variant is a structural problem: a run cannot proceed on a tree
//! that produces one of these.

use budgetcast_shared::types::EstimateId;
use thiserror::Error;

use crate::currency::CurrencyError;

/// Errors raised while building, mutating or validating an estimate tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    // ========== Structure Errors ==========
    /// A leaf estimate has children.
    #[error("Leaf estimate '{name}' ({id}) cannot have children")]
    LeafWithChildren {
        /// Offending estimate.
        id: EstimateId,
        /// Its name.
        name: String,
    },

    /// A category carries a direct amount.
    #[error("Category '{name}' ({id}) must not have a direct amount")]
    CategoryWithAmount {
        /// Offending estimate.
        id: EstimateId,
        /// Its name.
        name: String,
    },

    /// The root estimate is not a category.
    #[error("Root estimate '{0}' must be a category")]
    RootNotCategory(String),

    /// An estimate cannot be reached from the root, or is part of a cycle.
    #[error("Estimate {0} is not reachable from the root")]
    Unreachable(EstimateId),

    /// A child's parent link does not point back at the node listing it.
    #[error("Estimate {child} is listed under {parent} but links elsewhere")]
    BrokenParentLink {
        /// The listing node.
        parent: EstimateId,
        /// The listed child.
        child: EstimateId,
    },

    // ========== Lookup Errors ==========
    /// No estimate with this id exists in the tree.
    #[error("Estimate not found: {0}")]
    UnknownEstimate(EstimateId),

    /// An estimate with this id is already in the tree.
    #[error("Estimate {0} already exists in the tree")]
    DuplicateEstimate(EstimateId),

    /// The root cannot be detached.
    #[error("The root estimate cannot be removed")]
    CannotRemoveRoot,

    // ========== Currency Errors ==========
    /// An amount could not be brought into the tree's currency.
    #[error(transparent)]
    Currency(#[from] CurrencyError),
}
