pub mod identification;
pub mod models;
pub mod realization;
pub mod valuation;

pub use identification::{PriorityWeights, SynergyIdentificationEngine, SynergyParameters};
pub use models::*;
pub use realization::{TrackerConfig, ValueRealizationTracker};
pub use valuation::SynergyValuationEngine;
