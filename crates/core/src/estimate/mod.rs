//! Estimate hierarchy: budget line items and the categories grouping them.

pub mod error;
pub mod events;
pub mod tree;
pub mod types;


pub use error::TreeError;
pub use events::TreeEvent;
pub use tree::{EstimateNode, EstimateTree};
pub use types::{Estimate, EstimateChange, EstimateSnapshot, EstimateType};
