use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use deal_core::DealError;

/// Pipeline stages in their fixed total order. The two closed variants are
/// terminal absorbing states; predictions never originate from them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PipelineStage {
    Sourcing,
    Screening,
    Valuation,
    DueDiligence,
    Negotiation,
    Closing,
    ClosedWon,
    ClosedLost,
}

impl PipelineStage {
    pub const ACTIVE: [PipelineStage; 6] = [
        PipelineStage::Sourcing,
        PipelineStage::Screening,
        PipelineStage::Valuation,
        PipelineStage::DueDiligence,
        PipelineStage::Negotiation,
        PipelineStage::Closing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Sourcing => "sourcing",
            PipelineStage::Screening => "screening",
            PipelineStage::Valuation => "valuation",
            PipelineStage::DueDiligence => "due_diligence",
            PipelineStage::Negotiation => "negotiation",
            PipelineStage::Closing => "closing",
            PipelineStage::ClosedWon => "closed_won",
            PipelineStage::ClosedLost => "closed_lost",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::ClosedWon | PipelineStage::ClosedLost)
    }

    /// Immediate successor in the stage order. Terminal stages have none.
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Sourcing => Some(PipelineStage::Screening),
            PipelineStage::Screening => Some(PipelineStage::Valuation),
            PipelineStage::Valuation => Some(PipelineStage::DueDiligence),
            PipelineStage::DueDiligence => Some(PipelineStage::Negotiation),
            PipelineStage::Negotiation => Some(PipelineStage::Closing),
            PipelineStage::Closing => Some(PipelineStage::ClosedWon),
            PipelineStage::ClosedWon | PipelineStage::ClosedLost => None,
        }
    }

    /// Baseline average dwell time in days, used when no historical
    /// transitions cover the stage.
    pub fn baseline_duration_days(&self) -> f64 {
        match self {
            PipelineStage::Sourcing => 14.0,
            PipelineStage::Screening => 10.0,
            PipelineStage::Valuation => 21.0,
            PipelineStage::DueDiligence => 45.0,
            PipelineStage::Negotiation => 30.0,
            PipelineStage::Closing => 21.0,
            PipelineStage::ClosedWon | PipelineStage::ClosedLost => 0.0,
        }
    }

    /// Baseline probability of advancing to the next stage.
    pub fn baseline_transition_probability(&self) -> f64 {
        match self {
            PipelineStage::Sourcing => 0.50,
            PipelineStage::Screening => 0.60,
            PipelineStage::Valuation => 0.65,
            PipelineStage::DueDiligence => 0.70,
            PipelineStage::Negotiation => 0.75,
            PipelineStage::Closing => 0.85,
            PipelineStage::ClosedWon | PipelineStage::ClosedLost => 0.0,
        }
    }

    /// Empirical probability that a deal currently in this stage eventually
    /// closes won. Drives the probability-weighted revenue forecast.
    pub fn close_probability(&self) -> f64 {
        match self {
            PipelineStage::Sourcing => 0.10,
            PipelineStage::Screening => 0.15,
            PipelineStage::Valuation => 0.25,
            PipelineStage::DueDiligence => 0.40,
            PipelineStage::Negotiation => 0.60,
            PipelineStage::Closing => 0.80,
            PipelineStage::ClosedWon => 1.0,
            PipelineStage::ClosedLost => 0.0,
        }
    }
}

impl FromStr for PipelineStage {
    type Err = DealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sourcing" => Ok(PipelineStage::Sourcing),
            "screening" => Ok(PipelineStage::Screening),
            "valuation" => Ok(PipelineStage::Valuation),
            "due_diligence" | "due diligence" => Ok(PipelineStage::DueDiligence),
            "negotiation" => Ok(PipelineStage::Negotiation),
            "closing" => Ok(PipelineStage::Closing),
            "closed_won" | "closed won" => Ok(PipelineStage::ClosedWon),
            "closed_lost" | "closed lost" => Ok(PipelineStage::ClosedLost),
            other => Err(DealError::UnknownValue(format!("pipeline stage '{}'", other))),
        }
    }
}

/// Minimal view of a deal for pipeline-level analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealSummary {
    pub deal_id: String,
    pub stage: PipelineStage,
    /// Proposed transaction value, dollars
    #[serde(default)]
    pub deal_value: Option<f64>,
    /// When the deal entered its current stage
    #[serde(default)]
    pub stage_entered_at: Option<DateTime<Utc>>,
}

/// One stage-entry timestamp in a deal's history
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StageEntry {
    pub stage: PipelineStage,
    pub entered_at: DateTime<Utc>,
}

/// Ordered stage-entry history of one (usually completed) deal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageHistory {
    pub deal_id: String,
    /// Entries in chronological order
    pub entries: Vec<StageEntry>,
}

/// Cycle-time direction over recently completed deals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VelocityTrend {
    Accelerating,
    Stable,
    Slowing,
}

impl VelocityTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            VelocityTrend::Accelerating => "accelerating",
            VelocityTrend::Stable => "stable",
            VelocityTrend::Slowing => "slowing",
        }
    }
}

/// Per-stage velocity picture of the pipeline. Recomputed per analysis call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineVelocity {
    /// Average dwell time per active stage, days
    pub stage_durations: BTreeMap<PipelineStage, f64>,
    /// Sum of the per-stage averages, days
    pub total_duration_days: f64,
    pub trend: VelocityTrend,
    /// Stages whose dwell time exceeds 1.5x the cross-stage mean
    pub bottleneck_stages: Vec<PipelineStage>,
    /// [50,100]; shorter total cycles score higher
    pub efficiency_score: f64,
    pub analyzed_at: DateTime<Utc>,
}

impl PipelineVelocity {
    /// Average duration for a stage, falling back to the static baseline.
    pub fn duration_for(&self, stage: PipelineStage) -> f64 {
        self.stage_durations
            .get(&stage)
            .copied()
            .unwrap_or_else(|| stage.baseline_duration_days())
    }
}

/// Confidence bucket for a transition prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
}

impl ConfidenceBucket {
    /// >0.8 is high, >0.6 medium, else low.
    pub fn from_probability(p: f64) -> Self {
        if p > 0.8 {
            ConfidenceBucket::High
        } else if p > 0.6 {
            ConfidenceBucket::Medium
        } else {
            ConfidenceBucket::Low
        }
    }
}

/// Forecast of one deal's next pipeline move
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTransitionPrediction {
    pub deal_id: String,
    pub current_stage: PipelineStage,
    pub predicted_next_stage: PipelineStage,
    pub probability: f64,
    pub estimated_days: f64,
    pub confidence: ConfidenceBucket,
    pub key_factors: Vec<String>,
}

/// One month of projected revenue
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MonthlyProjection {
    /// 1-based month offset from the forecast date
    pub month: u32,
    pub base: f64,
    pub best_case: f64,
    pub worst_case: f64,
}

/// One quarter of projected revenue
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuarterlyProjection {
    /// 1-based quarter offset from the forecast date
    pub quarter: u32,
    pub base: f64,
    pub best_case: f64,
    pub worst_case: f64,
}

/// Probability-weighted revenue projection over the coming year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueForecast {
    /// Unweighted sum of active-deal values
    pub total_pipeline_value: f64,
    /// Probability-weighted expected revenue over the horizon
    pub expected_revenue: f64,
    pub monthly: Vec<MonthlyProjection>,
    pub quarterly: Vec<QuarterlyProjection>,
    pub annual_base: f64,
    pub annual_best_case: f64,
    pub annual_worst_case: f64,
    pub active_deal_count: usize,
    pub generated_at: DateTime<Utc>,
}
