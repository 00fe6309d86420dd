//! Pipeline Velocity Analyzer
//!
//! Computes per-stage average dwell times from historical stage transitions
//! (falling back to the static baseline table), flags bottleneck stages, and
//! derives an efficiency score and cycle-time trend.

use std::collections::BTreeMap;

use chrono::Utc;
use statrs::statistics::Statistics;

use deal_core::math::ols_slope;

use crate::models::{DealSummary, PipelineStage, PipelineVelocity, StageHistory, VelocityTrend};

/// Relative OLS slope beyond which cycle times count as trending
const TREND_SLOPE_THRESHOLD: f64 = 0.05;

pub struct PipelineVelocityAnalyzer;

impl PipelineVelocityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze pipeline velocity over the active deals, using historical
    /// stage-entry timestamps where available.
    ///
    /// Per-stage duration is the mean dwell time across all historical deals
    /// that passed through the stage; stages with no history fall back to the
    /// baseline table. A stage is a bottleneck when its duration strictly
    /// exceeds 1.5x the cross-stage mean.
    pub fn analyze(
        &self,
        active_deals: &[DealSummary],
        history: Option<&[StageHistory]>,
    ) -> PipelineVelocity {
        let observed = history.map(Self::observed_durations).unwrap_or_default();

        let mut stage_durations = BTreeMap::new();
        for stage in PipelineStage::ACTIVE {
            let duration = observed
                .get(&stage)
                .map(|d| d.as_slice().mean())
                .unwrap_or_else(|| stage.baseline_duration_days());
            stage_durations.insert(stage, duration);
        }

        let total_duration_days: f64 = stage_durations.values().sum();
        let mean_duration = total_duration_days / stage_durations.len() as f64;

        let bottleneck_stages: Vec<PipelineStage> = stage_durations
            .iter()
            .filter(|(_, &d)| d > mean_duration * 1.5)
            .map(|(&s, _)| s)
            .collect();

        let efficiency_score = (150.0 - total_duration_days / 7.0).clamp(50.0, 100.0);
        let trend = history.map(Self::cycle_trend).unwrap_or(VelocityTrend::Stable);

        tracing::debug!(
            active = active_deals.len(),
            total_duration_days,
            bottlenecks = bottleneck_stages.len(),
            efficiency_score,
            "analyzed pipeline velocity"
        );

        PipelineVelocity {
            stage_durations,
            total_duration_days,
            trend,
            bottleneck_stages,
            efficiency_score,
            analyzed_at: Utc::now(),
        }
    }

    /// Dwell times per stage: the gap between each stage entry and the next
    /// entry in the same deal's chronological history.
    fn observed_durations(history: &[StageHistory]) -> BTreeMap<PipelineStage, Vec<f64>> {
        let mut durations: BTreeMap<PipelineStage, Vec<f64>> = BTreeMap::new();
        for deal in history {
            for pair in deal.entries.windows(2) {
                let days = (pair[1].entered_at - pair[0].entered_at).num_seconds() as f64
                    / 86_400.0;
                if days >= 0.0 {
                    durations.entry(pair[0].stage).or_default().push(days);
                }
            }
        }
        durations
    }

    /// Trend over completed deals' total cycle times, ordered by completion.
    /// The OLS slope is compared to the mean cycle time: rising cycle times
    /// mean the pipeline is slowing.
    fn cycle_trend(history: &[StageHistory]) -> VelocityTrend {
        let mut completed: Vec<(chrono::DateTime<Utc>, f64)> = history
            .iter()
            .filter_map(|deal| {
                let first = deal.entries.first()?;
                let last = deal.entries.last()?;
                if !last.stage.is_terminal() {
                    return None;
                }
                let days =
                    (last.entered_at - first.entered_at).num_seconds() as f64 / 86_400.0;
                Some((last.entered_at, days))
            })
            .collect();
        completed.sort_by_key(|(finished, _)| *finished);

        let cycle_times: Vec<f64> = completed.into_iter().map(|(_, days)| days).collect();
        let mean = if cycle_times.is_empty() {
            0.0
        } else {
            cycle_times.as_slice().mean()
        };
        if mean <= 0.0 {
            return VelocityTrend::Stable;
        }

        let (slope, _) = ols_slope(&cycle_times);
        if slope < -TREND_SLOPE_THRESHOLD * mean {
            VelocityTrend::Accelerating
        } else if slope > TREND_SLOPE_THRESHOLD * mean {
            VelocityTrend::Slowing
        } else {
            VelocityTrend::Stable
        }
    }
}

impl Default for PipelineVelocityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
