pub mod components;
pub mod engine;

pub use components::ScoreComponentCalculator;
pub use engine::{DealScoringEngine, ScoringWeights};
