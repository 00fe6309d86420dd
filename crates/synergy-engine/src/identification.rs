//! Synergy Identification Engine
//!
//! Generates candidate synergy opportunities from a pair of company profiles
//! using closed-form category estimators, then ranks them by a composite
//! priority score. Every multiplier is a named parameter; nothing is learned.

use chrono::Utc;

use deal_core::CompanyProfile;

use crate::models::{SynergyOpportunity, SynergyStatus, SynergyType};

/// Named estimation multipliers for each synergy category.
///
/// Defaults reproduce the documented heuristics: cross-sell captures 10% of
/// combined revenue scaled by non-overlapping customers, economies of scale
/// save 5% of combined operating cost, tax optimization recovers 2% of
/// combined pretax income.
#[derive(Debug, Clone)]
pub struct SynergyParameters {
    /// Share of combined revenue reachable through cross-selling
    pub cross_sell_rate: f64,
    /// Share of the smaller company's revenue unlocked in new geographies
    pub geographic_expansion_rate: f64,
    /// Share of combined operating cost saved through scale
    pub economies_of_scale_rate: f64,
    /// Share of combined operating cost saved by consolidating duplicated functions
    pub duplicate_function_rate: f64,
    /// Share of combined pretax income recovered through tax structuring
    pub tax_optimization_rate: f64,
    /// Annual interest saved per dollar of combined debt after refinancing
    pub debt_refinancing_rate: f64,
    /// Fraction of the operating-margin gap transferable to the weaker company
    pub margin_transfer_rate: f64,
    /// Opportunities at or below this estimated value are not emitted
    pub min_estimated_value: f64,
}

impl Default for SynergyParameters {
    fn default() -> Self {
        Self {
            cross_sell_rate: 0.10,
            geographic_expansion_rate: 0.08,
            economies_of_scale_rate: 0.05,
            duplicate_function_rate: 0.03,
            tax_optimization_rate: 0.02,
            debt_refinancing_rate: 0.01,
            margin_transfer_rate: 0.25,
            min_estimated_value: 0.0,
        }
    }
}

/// Weights for the composite priority score. Sub-scores are bounded [0,100]
/// transforms of raw value, confidence, timeline and risk count.
#[derive(Debug, Clone)]
pub struct PriorityWeights {
    pub value_weight: f64,
    pub confidence_weight: f64,
    pub timeline_weight: f64,
    pub risk_weight: f64,
    /// Dollars of estimated value per priority point; $50M saturates the axis
    pub value_per_point: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            value_weight: 0.4,
            confidence_weight: 0.3,
            timeline_weight: 0.2,
            risk_weight: 0.1,
            value_per_point: 500_000.0,
        }
    }
}

pub struct SynergyIdentificationEngine {
    params: SynergyParameters,
    priority: PriorityWeights,
}

impl SynergyIdentificationEngine {
    pub fn new() -> Self {
        Self {
            params: SynergyParameters::default(),
            priority: PriorityWeights::default(),
        }
    }

    pub fn with_parameters(params: SynergyParameters, priority: PriorityWeights) -> Self {
        Self { params, priority }
    }

    /// Identify synergy opportunities for a deal, ordered by descending
    /// priority (stable for ties). Categories whose inputs are absent or whose
    /// estimated value does not clear the minimum threshold are skipped.
    pub fn identify(
        &self,
        deal_id: &str,
        target: &CompanyProfile,
        acquirer: &CompanyProfile,
    ) -> Vec<SynergyOpportunity> {
        let mut opportunities = Vec::new();

        self.cross_sell(deal_id, target, acquirer, &mut opportunities);
        self.geographic_expansion(deal_id, target, acquirer, &mut opportunities);
        self.economies_of_scale(deal_id, target, acquirer, &mut opportunities);
        self.duplicate_functions(deal_id, target, acquirer, &mut opportunities);
        self.tax_optimization(deal_id, target, acquirer, &mut opportunities);
        self.debt_refinancing(deal_id, target, acquirer, &mut opportunities);
        self.margin_transfer(deal_id, target, acquirer, &mut opportunities);

        for opp in opportunities.iter_mut() {
            opp.priority_score = self.priority_score(opp);
        }
        // Stable descending sort preserves estimator order on ties
        opportunities.sort_by(|a, b| {
            b.priority_score
                .partial_cmp(&a.priority_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!(
            deal_id,
            count = opportunities.len(),
            "identified synergy opportunities"
        );

        opportunities
    }

    fn cross_sell(
        &self,
        deal_id: &str,
        target: &CompanyProfile,
        acquirer: &CompanyProfile,
        out: &mut Vec<SynergyOpportunity>,
    ) {
        let (Some(t_rev), Some(a_rev)) = (target.annual_revenue, acquirer.annual_revenue) else {
            return;
        };
        let overlap = target.customer_overlap.unwrap_or(0.3).clamp(0.0, 1.0);
        let value = (t_rev + a_rev) * self.params.cross_sell_rate * (1.0 - overlap);
        self.push(
            out,
            deal_id,
            SynergyType::Revenue,
            "cross_sell",
            format!(
                "Cross-sell {} products into {}'s customer base",
                target.name, acquirer.name
            ),
            value,
            18,
            0.6,
            vec![
                "Customer churn during integration".to_string(),
                "Sales team alignment".to_string(),
            ],
        );
    }

    fn geographic_expansion(
        &self,
        deal_id: &str,
        target: &CompanyProfile,
        acquirer: &CompanyProfile,
        out: &mut Vec<SynergyOpportunity>,
    ) {
        let (Some(t_rev), Some(a_rev)) = (target.annual_revenue, acquirer.annual_revenue) else {
            return;
        };
        let overlap = target.geographic_overlap.unwrap_or(0.5).clamp(0.0, 1.0);
        let value = t_rev.min(a_rev) * self.params.geographic_expansion_rate * (1.0 - overlap);
        self.push(
            out,
            deal_id,
            SynergyType::Revenue,
            "geographic_expansion",
            "Distribute into geographies only one party serves today".to_string(),
            value,
            24,
            0.5,
            vec![
                "Local regulatory approvals".to_string(),
                "Channel partner conflicts".to_string(),
                "Localization cost overruns".to_string(),
            ],
        );
    }

    fn economies_of_scale(
        &self,
        deal_id: &str,
        target: &CompanyProfile,
        acquirer: &CompanyProfile,
        out: &mut Vec<SynergyOpportunity>,
    ) {
        let (Some(t_cost), Some(a_cost)) = (target.operating_costs, acquirer.operating_costs)
        else {
            return;
        };
        let value = (t_cost + a_cost) * self.params.economies_of_scale_rate;
        self.push(
            out,
            deal_id,
            SynergyType::Cost,
            "economies_of_scale",
            "Combined purchasing power and shared infrastructure".to_string(),
            value,
            12,
            0.75,
            vec!["Supplier contract renegotiation timelines".to_string()],
        );
    }

    fn duplicate_functions(
        &self,
        deal_id: &str,
        target: &CompanyProfile,
        acquirer: &CompanyProfile,
        out: &mut Vec<SynergyOpportunity>,
    ) {
        let (Some(t_cost), Some(a_cost)) = (target.operating_costs, acquirer.operating_costs)
        else {
            return;
        };
        let overlap = target.product_overlap.unwrap_or(0.0).clamp(0.0, 1.0);
        let value = (t_cost + a_cost) * self.params.duplicate_function_rate * overlap;
        self.push(
            out,
            deal_id,
            SynergyType::Operational,
            "duplicate_functions",
            "Consolidate duplicated back-office and product functions".to_string(),
            value,
            9,
            0.7,
            vec![
                "Severance and transition costs".to_string(),
                "Knowledge loss from departing staff".to_string(),
            ],
        );
    }

    fn tax_optimization(
        &self,
        deal_id: &str,
        target: &CompanyProfile,
        acquirer: &CompanyProfile,
        out: &mut Vec<SynergyOpportunity>,
    ) {
        let (Some(t_income), Some(a_income)) = (target.pretax_income, acquirer.pretax_income)
        else {
            return;
        };
        let value = (t_income + a_income) * self.params.tax_optimization_rate;
        self.push(
            out,
            deal_id,
            SynergyType::Tax,
            "tax_optimization",
            "Optimized combined tax structure".to_string(),
            value,
            12,
            0.8,
            vec!["Tax authority challenge".to_string()],
        );
    }

    fn debt_refinancing(
        &self,
        deal_id: &str,
        target: &CompanyProfile,
        acquirer: &CompanyProfile,
        out: &mut Vec<SynergyOpportunity>,
    ) {
        let (Some(t_debt), Some(a_debt)) = (target.total_debt, acquirer.total_debt) else {
            return;
        };
        let value = (t_debt + a_debt) * self.params.debt_refinancing_rate;
        self.push(
            out,
            deal_id,
            SynergyType::Financial,
            "debt_refinancing",
            "Refinance combined debt at the stronger credit profile".to_string(),
            value,
            6,
            0.7,
            vec!["Prepayment penalties".to_string(), "Rate environment".to_string()],
        );
    }

    /// Best-practice transfer: the higher-margin company lifts a fraction of
    /// the margin gap on the lower-margin company's revenue.
    fn margin_transfer(
        &self,
        deal_id: &str,
        target: &CompanyProfile,
        acquirer: &CompanyProfile,
        out: &mut Vec<SynergyOpportunity>,
    ) {
        let (Some(t_margin), Some(a_margin)) = (target.operating_margin, acquirer.operating_margin)
        else {
            return;
        };
        let (weaker_rev, gap) = if t_margin < a_margin {
            (target.annual_revenue, a_margin - t_margin)
        } else {
            (acquirer.annual_revenue, t_margin - a_margin)
        };
        let Some(revenue) = weaker_rev else {
            return;
        };
        let value = revenue * (gap / 100.0) * self.params.margin_transfer_rate;
        self.push(
            out,
            deal_id,
            SynergyType::Operational,
            "margin_transfer",
            "Transfer operating best practices to the lower-margin business".to_string(),
            value,
            18,
            0.55,
            vec![
                "Operating model differences".to_string(),
                "Management bandwidth".to_string(),
                "Cultural resistance to process change".to_string(),
            ],
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &self,
        out: &mut Vec<SynergyOpportunity>,
        deal_id: &str,
        synergy_type: SynergyType,
        category: &str,
        description: String,
        value: f64,
        timeline_months: u32,
        confidence: f64,
        risks: Vec<String>,
    ) {
        if value <= self.params.min_estimated_value {
            return;
        }
        out.push(SynergyOpportunity {
            id: format!("{}-{}", deal_id, category),
            deal_id: deal_id.to_string(),
            synergy_type,
            category: category.to_string(),
            description,
            estimated_value: value,
            realization_timeline_months: timeline_months,
            confidence_level: confidence,
            status: SynergyStatus::Identified,
            owner: None,
            dependencies: Vec::new(),
            risks,
            priority_score: 0.0,
            identified_at: Utc::now(),
        });
    }

    /// Composite priority: value 40%, confidence 30%, timeline 20%, risk 10%.
    /// Each sub-score is bounded [0,100].
    fn priority_score(&self, opp: &SynergyOpportunity) -> f64 {
        let w = &self.priority;
        let value_score = (opp.estimated_value / w.value_per_point).min(100.0);
        let confidence_score = (opp.confidence_level * 100.0).clamp(0.0, 100.0);
        let timeline_score =
            (100.0 - 2.0 * opp.realization_timeline_months as f64).max(0.0);
        let risk_score = (100.0 - 20.0 * opp.risks.len() as f64).max(0.0);

        value_score * w.value_weight
            + confidence_score * w.confidence_weight
            + timeline_score * w.timeline_weight
            + risk_score * w.risk_weight
    }
}

impl Default for SynergyIdentificationEngine {
    fn default() -> Self {
        Self::new()
    }
}
