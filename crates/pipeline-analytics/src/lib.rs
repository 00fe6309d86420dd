pub mod forecast;
pub mod models;
pub mod transitions;
pub mod velocity;

pub use forecast::RevenueForecastEngine;
pub use models::*;
pub use transitions::{PredictorConfig, StageTransitionPredictor};
pub use velocity::PipelineVelocityAnalyzer;
