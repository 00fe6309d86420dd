//! Revenue Forecast Engine
//!
//! Probability-weighted revenue projection over the active pipeline: each
//! deal contributes its value scaled by the stage-close probability, spread
//! evenly across a 12-month base forecast with best/worst cases at +/-30%.

use chrono::Utc;

use crate::models::{DealSummary, MonthlyProjection, QuarterlyProjection, RevenueForecast};

/// Best/worst case band around the base forecast
const CASE_SPREAD: f64 = 0.30;

pub struct RevenueForecastEngine;

impl RevenueForecastEngine {
    pub fn new() -> Self {
        Self
    }

    /// Forecast expected revenue from the active deals. Terminal deals and
    /// deals without a value contribute nothing; an empty pipeline produces
    /// an all-zero forecast rather than an error.
    pub fn forecast(&self, deals: &[DealSummary]) -> RevenueForecast {
        let active: Vec<&DealSummary> = deals.iter().filter(|d| !d.stage.is_terminal()).collect();

        let total_pipeline_value: f64 =
            active.iter().filter_map(|d| d.deal_value).sum();
        let expected_revenue: f64 = active
            .iter()
            .filter_map(|d| {
                d.deal_value
                    .map(|v| v * d.stage.close_probability())
            })
            .sum();

        let monthly_base = expected_revenue / 12.0;
        let monthly: Vec<MonthlyProjection> = (1..=12)
            .map(|month| MonthlyProjection {
                month,
                base: monthly_base,
                best_case: monthly_base * (1.0 + CASE_SPREAD),
                worst_case: monthly_base * (1.0 - CASE_SPREAD),
            })
            .collect();

        let quarterly: Vec<QuarterlyProjection> = (1..=4)
            .map(|quarter| QuarterlyProjection {
                quarter,
                base: monthly_base * 3.0,
                best_case: monthly_base * 3.0 * (1.0 + CASE_SPREAD),
                worst_case: monthly_base * 3.0 * (1.0 - CASE_SPREAD),
            })
            .collect();

        tracing::debug!(
            active = active.len(),
            total_pipeline_value,
            expected_revenue,
            "generated revenue forecast"
        );

        RevenueForecast {
            total_pipeline_value,
            expected_revenue,
            monthly,
            quarterly,
            annual_base: expected_revenue,
            annual_best_case: expected_revenue * (1.0 + CASE_SPREAD),
            annual_worst_case: expected_revenue * (1.0 - CASE_SPREAD),
            active_deal_count: active.len(),
            generated_at: Utc::now(),
        }
    }
}

impl Default for RevenueForecastEngine {
    fn default() -> Self {
        Self::new()
    }
}
