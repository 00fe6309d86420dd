//! Value Realization Tracker
//!
//! Append-only period history of realized-vs-planned synergy value per
//! synergy id, with the cumulative realization rate recomputed from the full
//! history on every append, plus portfolio-level roll-up metrics.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;

use deal_core::math::{npv_monthly, safe_ratio};
use deal_core::DealError;

use crate::models::{
    MeasurementWindow, PaybackPeriod, RealizationPeriod, SynergyOpportunity, SynergyRealization,
    SynergyStatus, ValueCreationMetrics,
};

/// Tracker heuristics, all overridable.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// One-time integration cost as a fraction of total identified value
    pub integration_cost_rate: f64,
    /// Annual discount rate for portfolio NPV
    pub annual_discount_rate: f64,
    /// Payback periods longer than this are reported at the cap
    pub payback_cap_months: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            integration_cost_rate: 0.15,
            annual_discount_rate: 0.10,
            payback_cap_months: 120.0,
        }
    }
}

pub struct ValueRealizationTracker {
    config: TrackerConfig,
    history: HashMap<String, Vec<SynergyRealization>>,
}

impl ValueRealizationTracker {
    pub fn new() -> Self {
        Self {
            config: TrackerConfig::default(),
            history: HashMap::new(),
        }
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            config,
            history: HashMap::new(),
        }
    }

    /// Append one period of actuals for a synergy.
    ///
    /// Periods must arrive in order: a new period may not start before the
    /// previous one ends. The cumulative rate is recomputed from the complete
    /// history rather than incrementally averaged.
    pub fn record(
        &mut self,
        synergy_id: &str,
        period: RealizationPeriod,
    ) -> Result<SynergyRealization, DealError> {
        if period.period_end < period.period_start {
            return Err(DealError::InvalidInput(format!(
                "period for '{}' ends {} before it starts {}",
                synergy_id, period.period_end, period.period_start
            )));
        }

        let records = self.history.entry(synergy_id.to_string()).or_default();
        if let Some(last) = records.last() {
            if period.period_start < last.period_end {
                return Err(DealError::InvalidInput(format!(
                    "period starting {} for '{}' overlaps the previous period ending {}",
                    period.period_start, synergy_id, last.period_end
                )));
            }
        }

        let cumulative_realized: f64 =
            records.iter().map(|r| r.realized_value).sum::<f64>() + period.realized_value;
        let cumulative_planned: f64 =
            records.iter().map(|r| r.planned_value).sum::<f64>() + period.planned_value;

        let variance = period.realized_value - period.planned_value;
        let variance_percentage = safe_ratio(variance * 100.0, period.planned_value).unwrap_or(0.0);
        let cumulative_realization_rate =
            safe_ratio(cumulative_realized, cumulative_planned).unwrap_or(0.0);

        let record = SynergyRealization {
            synergy_id: synergy_id.to_string(),
            period_start: period.period_start,
            period_end: period.period_end,
            planned_value: period.planned_value,
            realized_value: period.realized_value,
            variance,
            variance_percentage,
            cumulative_realization_rate,
            recorded_at: Utc::now(),
        };

        tracing::debug!(
            synergy_id,
            realized = period.realized_value,
            planned = period.planned_value,
            rate = cumulative_realization_rate,
            "recorded realization period"
        );

        records.push(record.clone());
        Ok(record)
    }

    /// Full period history for a synergy, oldest first.
    pub fn history(&self, synergy_id: &str) -> &[SynergyRealization] {
        self.history
            .get(synergy_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Portfolio roll-up across the supplied opportunities, restricted to
    /// periods whose end falls inside the measurement window.
    ///
    /// Cancelled opportunities are excluded from the identified total; their
    /// recorded history still counts toward realized value.
    pub fn portfolio_metrics(
        &self,
        synergies: &[SynergyOpportunity],
        window: MeasurementWindow,
    ) -> ValueCreationMetrics {
        let mut total_identified = 0.0;
        let mut portfolio_npv = 0.0;
        let mut identified_by_type: BTreeMap<String, f64> = BTreeMap::new();

        for syn in synergies {
            if syn.status == SynergyStatus::Cancelled {
                continue;
            }
            total_identified += syn.estimated_value;
            // Discount the same risk/confidence-adjusted base the valuation
            // engine uses for its NPV.
            portfolio_npv += npv_monthly(
                syn.risk_adjusted_value(),
                syn.realization_timeline_months,
                self.config.annual_discount_rate,
            );
            *identified_by_type
                .entry(syn.synergy_type.as_str().to_string())
                .or_insert(0.0) += syn.estimated_value;
        }

        let mut total_planned = 0.0;
        let mut total_realized = 0.0;
        let mut realized_by_type: BTreeMap<String, f64> = BTreeMap::new();

        for syn in synergies {
            for record in self.history(&syn.id) {
                if !window.contains(record.period_end) {
                    continue;
                }
                total_planned += record.planned_value;
                total_realized += record.realized_value;
                *realized_by_type
                    .entry(syn.synergy_type.as_str().to_string())
                    .or_insert(0.0) += record.realized_value;
            }
        }

        let realization_rate = safe_ratio(total_realized, total_planned).unwrap_or(0.0);
        let integration_cost = total_identified * self.config.integration_cost_rate;
        let roi_percentage =
            safe_ratio((total_realized - integration_cost) * 100.0, integration_cost)
                .unwrap_or(0.0);
        let net_present_value = portfolio_npv - integration_cost;

        let payback_period = if total_realized <= 0.0 {
            PaybackPeriod::Unbounded
        } else {
            let months = integration_cost / (total_realized / 12.0);
            PaybackPeriod::Months(months.min(self.config.payback_cap_months))
        };

        ValueCreationMetrics {
            total_identified_value: total_identified,
            total_planned_value: total_planned,
            total_realized_value: total_realized,
            realization_rate,
            integration_cost,
            roi_percentage,
            net_present_value,
            payback_period,
            identified_by_type,
            realized_by_type,
            synergy_count: synergies
                .iter()
                .filter(|s| s.status != SynergyStatus::Cancelled)
                .count(),
        }
    }
}

impl Default for ValueRealizationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SynergyType;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(start: NaiveDate, end: NaiveDate, planned: f64, realized: f64) -> RealizationPeriod {
        RealizationPeriod {
            period_start: start,
            period_end: end,
            planned_value: planned,
            realized_value: realized,
        }
    }

    fn opportunity(id: &str, value: f64, status: SynergyStatus) -> SynergyOpportunity {
        SynergyOpportunity {
            id: id.to_string(),
            deal_id: "D-1".to_string(),
            synergy_type: SynergyType::Cost,
            category: "economies_of_scale".to_string(),
            description: String::new(),
            estimated_value: value,
            realization_timeline_months: 12,
            confidence_level: 0.7,
            status,
            owner: None,
            dependencies: Vec::new(),
            risks: Vec::new(),
            priority_score: 0.0,
            identified_at: Utc::now(),
        }
    }

    #[test]
    fn test_cumulative_rate_from_full_history() {
        // 80k/100k then 120k/100k: cumulative rate lands at exactly 1.0
        let mut tracker = ValueRealizationTracker::new();
        let first = tracker
            .record(
                "S-1",
                period(date(2025, 1, 1), date(2025, 1, 31), 100_000.0, 80_000.0),
            )
            .unwrap();
        assert_relative_eq!(first.cumulative_realization_rate, 0.8, epsilon = 1e-12);
        assert_relative_eq!(first.variance, -20_000.0);
        assert_relative_eq!(first.variance_percentage, -20.0, epsilon = 1e-12);

        let second = tracker
            .record(
                "S-1",
                period(date(2025, 2, 1), date(2025, 2, 28), 100_000.0, 120_000.0),
            )
            .unwrap();
        assert_relative_eq!(second.cumulative_realization_rate, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_order_period_rejected() {
        let mut tracker = ValueRealizationTracker::new();
        tracker
            .record(
                "S-1",
                period(date(2025, 3, 1), date(2025, 3, 31), 50_000.0, 40_000.0),
            )
            .unwrap();
        let err = tracker
            .record(
                "S-1",
                period(date(2025, 2, 1), date(2025, 2, 28), 50_000.0, 60_000.0),
            )
            .unwrap_err();
        assert!(matches!(err, DealError::InvalidInput(_)));
        // Rejected appends leave the history untouched
        assert_eq!(tracker.history("S-1").len(), 1);
    }

    #[test]
    fn test_inverted_period_rejected() {
        let mut tracker = ValueRealizationTracker::new();
        let err = tracker
            .record(
                "S-1",
                period(date(2025, 3, 31), date(2025, 3, 1), 50_000.0, 40_000.0),
            )
            .unwrap_err();
        assert!(matches!(err, DealError::InvalidInput(_)));
    }

    #[test]
    fn test_zero_planned_value_is_guarded() {
        let mut tracker = ValueRealizationTracker::new();
        let record = tracker
            .record(
                "S-1",
                period(date(2025, 1, 1), date(2025, 1, 31), 0.0, 10_000.0),
            )
            .unwrap();
        assert_relative_eq!(record.variance_percentage, 0.0);
        assert_relative_eq!(record.cumulative_realization_rate, 0.0);
    }

    #[test]
    fn test_portfolio_metrics_roll_up() {
        let mut tracker = ValueRealizationTracker::new();
        let synergies = vec![
            opportunity("S-1", 1_000_000.0, SynergyStatus::InProgress),
            opportunity("S-2", 500_000.0, SynergyStatus::Planned),
        ];
        tracker
            .record(
                "S-1",
                period(date(2025, 1, 1), date(2025, 3, 31), 250_000.0, 200_000.0),
            )
            .unwrap();
        tracker
            .record(
                "S-2",
                period(date(2025, 1, 1), date(2025, 3, 31), 125_000.0, 150_000.0),
            )
            .unwrap();

        let window = MeasurementWindow {
            start: date(2025, 1, 1),
            end: date(2025, 12, 31),
        };
        let metrics = tracker.portfolio_metrics(&synergies, window);

        assert_relative_eq!(metrics.total_identified_value, 1_500_000.0);
        assert_relative_eq!(metrics.total_planned_value, 375_000.0);
        assert_relative_eq!(metrics.total_realized_value, 350_000.0);
        // integration cost = 15% of 1.5M = 225k
        assert_relative_eq!(metrics.integration_cost, 225_000.0);
        // ROI = (350k - 225k) / 225k * 100
        assert_relative_eq!(metrics.roi_percentage, 125_000.0 / 225_000.0 * 100.0, epsilon = 1e-9);
        // Payback = 225k / (350k/12) ~ 7.7 months
        match metrics.payback_period {
            PaybackPeriod::Months(m) => assert_relative_eq!(m, 225_000.0 / (350_000.0 / 12.0), epsilon = 1e-9),
            PaybackPeriod::Unbounded => panic!("expected bounded payback"),
        }
        assert_relative_eq!(metrics.identified_by_type["cost"], 1_500_000.0);
        assert_relative_eq!(metrics.realized_by_type["cost"], 350_000.0);
        assert_eq!(metrics.synergy_count, 2);
    }

    #[test]
    fn test_payback_unbounded_without_realized_value() {
        let tracker = ValueRealizationTracker::new();
        let synergies = vec![opportunity("S-1", 1_000_000.0, SynergyStatus::Identified)];
        let window = MeasurementWindow {
            start: date(2025, 1, 1),
            end: date(2025, 12, 31),
        };
        let metrics = tracker.portfolio_metrics(&synergies, window);
        assert_eq!(metrics.payback_period, PaybackPeriod::Unbounded);
        assert_relative_eq!(metrics.realization_rate, 0.0);
    }

    #[test]
    fn test_payback_caps_at_configured_months() {
        let mut tracker = ValueRealizationTracker::new();
        let synergies = vec![opportunity("S-1", 10_000_000.0, SynergyStatus::InProgress)];
        tracker
            .record(
                "S-1",
                period(date(2025, 1, 1), date(2025, 1, 31), 100_000.0, 1_000.0),
            )
            .unwrap();
        let window = MeasurementWindow {
            start: date(2025, 1, 1),
            end: date(2025, 12, 31),
        };
        let metrics = tracker.portfolio_metrics(&synergies, window);
        assert_eq!(metrics.payback_period, PaybackPeriod::Months(120.0));
    }

    #[test]
    fn test_cancelled_synergies_excluded_from_identified() {
        let tracker = ValueRealizationTracker::new();
        let synergies = vec![
            opportunity("S-1", 1_000_000.0, SynergyStatus::InProgress),
            opportunity("S-2", 9_000_000.0, SynergyStatus::Cancelled),
        ];
        let window = MeasurementWindow {
            start: date(2025, 1, 1),
            end: date(2025, 12, 31),
        };
        let metrics = tracker.portfolio_metrics(&synergies, window);
        assert_relative_eq!(metrics.total_identified_value, 1_000_000.0);
        assert_eq!(metrics.synergy_count, 1);
    }

    #[test]
    fn test_window_filters_periods() {
        let mut tracker = ValueRealizationTracker::new();
        let synergies = vec![opportunity("S-1", 1_000_000.0, SynergyStatus::InProgress)];
        tracker
            .record(
                "S-1",
                period(date(2024, 10, 1), date(2024, 12, 31), 100_000.0, 90_000.0),
            )
            .unwrap();
        tracker
            .record(
                "S-1",
                period(date(2025, 1, 1), date(2025, 3, 31), 100_000.0, 70_000.0),
            )
            .unwrap();
        let window = MeasurementWindow {
            start: date(2025, 1, 1),
            end: date(2025, 12, 31),
        };
        let metrics = tracker.portfolio_metrics(&synergies, window);
        // Only the 2025 period is inside the window
        assert_relative_eq!(metrics.total_realized_value, 70_000.0);
        assert_relative_eq!(metrics.total_planned_value, 100_000.0);
    }
}
