//! Deal Intelligence Orchestrator
//!
//! Facade over the scoring, synergy and pipeline engines. Engines are
//! constructed once and injected here; there are no global singletons.
//! Scoring reports are cached per deal id with a short TTL so dashboard
//! callers can re-request them cheaply.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use deal_core::{CompanyProfile, DealAttributes, DealError, DealScore};
use deal_scoring::{DealScoringEngine, ScoringWeights};
use pipeline_analytics::{
    DealSummary, PipelineVelocity, PipelineVelocityAnalyzer, RevenueForecast,
    RevenueForecastEngine, StageHistory, StageTransitionPrediction, StageTransitionPredictor,
};
use synergy_engine::{
    MarketData, MeasurementWindow, RealizationPeriod, SynergyIdentificationEngine,
    SynergyOpportunity, SynergyRealization, SynergyValuationEngine, ValueCreationMetrics,
    ValueDistribution, ValueRealizationTracker,
};

const CACHE_TTL_SECS: i64 = 300; // 5 minutes

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Combined scoring and synergy view of one deal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealReport {
    pub score: DealScore,
    pub synergies: Vec<SynergyOpportunity>,
    pub valuations: Vec<ValueDistribution>,
    pub total_synergy_value: f64,
}

pub struct DealIntelligence {
    scoring_engine: DealScoringEngine,
    identification_engine: SynergyIdentificationEngine,
    valuation_engine: SynergyValuationEngine,
    realization_tracker: ValueRealizationTracker,
    velocity_analyzer: PipelineVelocityAnalyzer,
    transition_predictor: StageTransitionPredictor,
    forecast_engine: RevenueForecastEngine,
    /// Cache scoring reports per deal id (5-min TTL)
    score_cache: DashMap<String, CacheEntry<DealScore>>,
}

impl DealIntelligence {
    pub fn new() -> Self {
        Self {
            scoring_engine: DealScoringEngine::new(),
            identification_engine: SynergyIdentificationEngine::new(),
            valuation_engine: SynergyValuationEngine::new(),
            realization_tracker: ValueRealizationTracker::new(),
            velocity_analyzer: PipelineVelocityAnalyzer::new(),
            transition_predictor: StageTransitionPredictor::new(),
            forecast_engine: RevenueForecastEngine::new(),
            score_cache: DashMap::new(),
        }
    }

    /// Construct with an explicit scoring weight configuration. Invalid
    /// weights fail here, before any scoring happens.
    pub fn with_weights(weights: ScoringWeights) -> Result<Self, DealError> {
        let scoring_engine = DealScoringEngine::with_weights(weights)?;
        Ok(Self {
            scoring_engine,
            ..Self::new()
        })
    }

    /// Score a deal, serving a cached report when one is fresh enough.
    /// The cache is keyed by deal id; changed attributes under the same id
    /// are only re-scored once the entry expires.
    pub fn score_deal(&self, attrs: &DealAttributes) -> DealScore {
        if let Some(entry) = self.score_cache.get(&attrs.deal_id) {
            let age = (Utc::now() - entry.cached_at).num_seconds();
            if age < CACHE_TTL_SECS {
                tracing::debug!(deal_id = %attrs.deal_id, age, "serving cached deal score");
                return entry.data.clone();
            }
        }

        let score = self.scoring_engine.score(attrs);
        self.score_cache.insert(
            attrs.deal_id.clone(),
            CacheEntry {
                data: score.clone(),
                cached_at: Utc::now(),
            },
        );
        score
    }

    /// Drop any cached report for a deal, forcing the next score to recompute.
    pub fn invalidate_score(&self, deal_id: &str) {
        self.score_cache.remove(deal_id);
    }

    pub fn identify_synergies(
        &self,
        deal_id: &str,
        target: &CompanyProfile,
        acquirer: &CompanyProfile,
    ) -> Vec<SynergyOpportunity> {
        self.identification_engine.identify(deal_id, target, acquirer)
    }

    pub fn quantify_synergy(
        &self,
        opportunity: &SynergyOpportunity,
        market: &MarketData,
    ) -> ValueDistribution {
        self.valuation_engine.quantify(opportunity, market)
    }

    pub fn record_realization(
        &mut self,
        synergy_id: &str,
        period: RealizationPeriod,
    ) -> Result<SynergyRealization, DealError> {
        self.realization_tracker.record(synergy_id, period)
    }

    pub fn realization_history(&self, synergy_id: &str) -> &[SynergyRealization] {
        self.realization_tracker.history(synergy_id)
    }

    pub fn portfolio_metrics(
        &self,
        synergies: &[SynergyOpportunity],
        window: MeasurementWindow,
    ) -> ValueCreationMetrics {
        self.realization_tracker.portfolio_metrics(synergies, window)
    }

    pub fn analyze_pipeline(
        &self,
        active_deals: &[DealSummary],
        history: Option<&[StageHistory]>,
    ) -> PipelineVelocity {
        self.velocity_analyzer.analyze(active_deals, history)
    }

    pub fn predict_transitions(
        &self,
        deals: &[DealSummary],
        velocity: &PipelineVelocity,
    ) -> Vec<StageTransitionPrediction> {
        self.transition_predictor.predict_all(deals, velocity)
    }

    pub fn forecast_revenue(&self, deals: &[DealSummary]) -> RevenueForecast {
        self.forecast_engine.forecast(deals)
    }

    /// Score a deal and run the full synergy pass against the paired company
    /// profiles in one call.
    pub fn full_report(
        &self,
        attrs: &DealAttributes,
        target: &CompanyProfile,
        acquirer: &CompanyProfile,
        market: &MarketData,
    ) -> DealReport {
        let score = self.score_deal(attrs);
        let synergies = self.identify_synergies(&attrs.deal_id, target, acquirer);
        let valuations: Vec<ValueDistribution> = synergies
            .iter()
            .map(|s| self.quantify_synergy(s, market))
            .collect();
        let total_synergy_value = synergies.iter().map(|s| s.estimated_value).sum();

        tracing::info!(
            deal_id = %attrs.deal_id,
            overall = score.overall_score,
            synergies = synergies.len(),
            total_synergy_value,
            "built full deal report"
        );

        DealReport {
            score,
            synergies,
            valuations,
            total_synergy_value,
        }
    }
}

impl Default for DealIntelligence {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pipeline_analytics::PipelineStage;

    fn attrs(deal_id: &str) -> DealAttributes {
        let mut a = DealAttributes::new(deal_id);
        a.revenue_growth_rate = Some(15.0);
        a.ebitda_margin = Some(12.0);
        a
    }

    fn profiles() -> (CompanyProfile, CompanyProfile) {
        let mut target = CompanyProfile::new("TargetCo");
        target.annual_revenue = Some(40_000_000.0);
        target.operating_costs = Some(30_000_000.0);
        let mut acquirer = CompanyProfile::new("AcquirerCo");
        acquirer.annual_revenue = Some(120_000_000.0);
        acquirer.operating_costs = Some(90_000_000.0);
        (target, acquirer)
    }

    #[test]
    fn test_cached_score_served_within_ttl() {
        let intel = DealIntelligence::new();
        let first = intel.score_deal(&attrs("D-1"));

        // Same id with different attributes inside the TTL: cached report wins
        let mut changed = attrs("D-1");
        changed.revenue_growth_rate = Some(-50.0);
        let second = intel.score_deal(&changed);
        assert_eq!(first.overall_score, second.overall_score);
        assert_eq!(first.scored_at, second.scored_at);

        // Invalidation forces a fresh report
        intel.invalidate_score("D-1");
        let third = intel.score_deal(&changed);
        assert!(third.overall_score < first.overall_score);
    }

    #[test]
    fn test_distinct_deals_do_not_share_cache() {
        let intel = DealIntelligence::new();
        let a = intel.score_deal(&attrs("D-1"));
        let mut weaker = attrs("D-2");
        weaker.revenue_growth_rate = Some(-10.0);
        let b = intel.score_deal(&weaker);
        assert!(a.overall_score > b.overall_score);
    }

    #[test]
    fn test_invalid_weights_rejected_at_construction() {
        let weights = ScoringWeights {
            financial: 0.9,
            strategic: 0.9,
            market: 0.0,
            risk: 0.0,
            execution: 0.0,
            team: 0.0,
        };
        assert!(DealIntelligence::with_weights(weights).is_err());
    }

    #[test]
    fn test_full_report_quantifies_every_synergy() {
        let intel = DealIntelligence::new();
        let (target, acquirer) = profiles();
        let report = intel.full_report(
            &attrs("D-1"),
            &target,
            &acquirer,
            &MarketData::default(),
        );
        assert!(!report.synergies.is_empty());
        assert_eq!(report.synergies.len(), report.valuations.len());
        for (syn, val) in report.synergies.iter().zip(&report.valuations) {
            assert_eq!(syn.id, val.synergy_id);
        }
        assert!(report.total_synergy_value > 0.0);
    }

    #[test]
    fn test_realization_flows_through_facade() {
        let mut intel = DealIntelligence::new();
        let (target, acquirer) = profiles();
        let synergies = intel.identify_synergies("D-1", &target, &acquirer);
        let id = synergies[0].id.clone();

        let record = intel
            .record_realization(
                &id,
                RealizationPeriod {
                    period_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                    period_end: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
                    planned_value: 100_000.0,
                    realized_value: 80_000.0,
                },
            )
            .unwrap();
        assert_eq!(record.synergy_id, id);
        assert_eq!(intel.realization_history(&id).len(), 1);

        let window = MeasurementWindow {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        };
        let metrics = intel.portfolio_metrics(&synergies, window);
        assert_eq!(metrics.total_realized_value, 80_000.0);
    }

    #[test]
    fn test_pipeline_surface_wired() {
        let intel = DealIntelligence::new();
        let deals = vec![DealSummary {
            deal_id: "D-1".to_string(),
            stage: PipelineStage::Negotiation,
            deal_value: Some(25_000_000.0),
            stage_entered_at: None,
        }];
        let velocity = intel.analyze_pipeline(&deals, None);
        let predictions = intel.predict_transitions(&deals, &velocity);
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].predicted_next_stage, PipelineStage::ClosedWon);

        let forecast = intel.forecast_revenue(&deals);
        assert_eq!(forecast.active_deal_count, 1);
        // Negotiation closes at 0.60
        assert!((forecast.expected_revenue - 15_000_000.0).abs() < 1e-6);
    }
}
