//! Stage Transition Predictor
//!
//! Forecasts the next pipeline move for every active deal: successor stage,
//! transition probability, expected days, and a confidence bucket. The
//! near-terminal optimism override is a named policy switch, not a law.

use chrono::Utc;

use crate::models::{
    ConfidenceBucket, DealSummary, PipelineStage, PipelineVelocity, StageTransitionPrediction,
};

/// Predictor policy knobs.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    /// When set, deals in the last two stages before the terminals predict
    /// a won close directly instead of the literal successor.
    pub optimistic_close_override: bool,
    /// Probability multiplier applied when a deal has dwelt in its current
    /// stage longer than the analyzed average.
    pub overdue_damping: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            optimistic_close_override: true,
            overdue_damping: 0.85,
        }
    }
}

pub struct StageTransitionPredictor {
    config: PredictorConfig,
}

impl StageTransitionPredictor {
    pub fn new() -> Self {
        Self {
            config: PredictorConfig::default(),
        }
    }

    pub fn with_config(config: PredictorConfig) -> Self {
        Self { config }
    }

    /// Predictions for every non-terminal deal, in input order.
    pub fn predict_all(
        &self,
        deals: &[DealSummary],
        velocity: &PipelineVelocity,
    ) -> Vec<StageTransitionPrediction> {
        deals
            .iter()
            .filter(|d| !d.stage.is_terminal())
            .map(|d| self.predict(d, velocity))
            .collect()
    }

    fn predict(&self, deal: &DealSummary, velocity: &PipelineVelocity) -> StageTransitionPrediction {
        let current = deal.stage;
        let predicted_next_stage = self.next_stage(current);

        let mut probability = current.baseline_transition_probability();
        let estimated_days = velocity.duration_for(current);
        let mut key_factors = vec![format!(
            "Historical average of {:.0} days in {}",
            estimated_days,
            current.as_str()
        )];

        if velocity.bottleneck_stages.contains(&current) {
            key_factors.push(format!("{} is a pipeline bottleneck", current.as_str()));
        }

        if let Some(entered) = deal.stage_entered_at {
            let dwell_days = (Utc::now() - entered).num_seconds() as f64 / 86_400.0;
            if dwell_days > estimated_days {
                probability *= self.config.overdue_damping;
                key_factors.push(format!(
                    "In stage {:.0} days, past the {:.0}-day average",
                    dwell_days, estimated_days
                ));
            }
        }

        if self.config.optimistic_close_override && self.near_terminal(current) {
            key_factors.push("Late-stage deal expected to close".to_string());
        }

        let probability = probability.clamp(0.0, 1.0);

        StageTransitionPrediction {
            deal_id: deal.deal_id.clone(),
            current_stage: current,
            predicted_next_stage,
            probability,
            estimated_days,
            confidence: ConfidenceBucket::from_probability(probability),
            key_factors,
        }
    }

    /// Successor in stage order, with the optimism override collapsing the
    /// last two pre-terminal stages straight to a won close.
    fn next_stage(&self, current: PipelineStage) -> PipelineStage {
        if self.config.optimistic_close_override && self.near_terminal(current) {
            return PipelineStage::ClosedWon;
        }
        // predict_all filters terminal stages, so a successor always exists
        current.next().unwrap_or(PipelineStage::ClosedWon)
    }

    fn near_terminal(&self, stage: PipelineStage) -> bool {
        matches!(stage, PipelineStage::Negotiation | PipelineStage::Closing)
    }
}

impl Default for StageTransitionPredictor {
    fn default() -> Self {
        Self::new()
    }
}
