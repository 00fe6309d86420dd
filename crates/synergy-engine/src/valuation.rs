//! Synergy Valuation Engine
//!
//! Quantifies a synergy opportunity into a conservative / most-likely /
//! optimistic value distribution and a monthly-discounted NPV.

use deal_core::math::npv_monthly;

use crate::models::{MarketData, SynergyOpportunity, ValueDistribution};

pub struct SynergyValuationEngine;

impl SynergyValuationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Quantify an opportunity against the supplied market context.
    ///
    /// Adjustment factors:
    /// - risk: 1 - 0.05 per named risk, floored at 0.7
    /// - timeline: 1 - (months/60)*0.2, floored at 0.8
    /// - market: 1 + market growth rate
    pub fn quantify(&self, opp: &SynergyOpportunity, market: &MarketData) -> ValueDistribution {
        let base = opp.estimated_value;
        let risk_adjustment = opp.risk_adjustment();
        let timeline_adjustment =
            (1.0 - opp.realization_timeline_months as f64 / 60.0 * 0.2).max(0.8);
        let market_adjustment = 1.0 + market.market_growth_rate;

        let most_likely = opp.risk_adjusted_value();
        let conservative = most_likely * timeline_adjustment;
        let optimistic = base * market_adjustment * 1.2;

        // Discount the most-likely value over the realization horizon
        let net_present_value = npv_monthly(
            most_likely,
            opp.realization_timeline_months,
            market.annual_discount_rate,
        );

        tracing::debug!(
            synergy_id = %opp.id,
            most_likely,
            net_present_value,
            "quantified synergy"
        );

        ValueDistribution {
            synergy_id: opp.id.clone(),
            conservative,
            most_likely,
            optimistic,
            net_present_value,
            risk_adjustment,
            timeline_adjustment,
            market_adjustment,
        }
    }
}

impl Default for SynergyValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}
