//! Deal Scoring Engine
//!
//! Combines component scores into a weighted overall score, derives the
//! recommendation from a threshold ladder, and computes confidence from data
//! completeness. Weight configurations are validated at construction; scoring
//! itself never fails for incomplete input.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use deal_core::{
    ComponentScores, DealAttributes, DealError, DealScore, Recommendation, RiskLevel,
};

use crate::components::ScoreComponentCalculator;

/// Weights for combining component scores into the overall score.
/// Must sum to 1.0; the risk component is weighted as (100 - risk) * risk_weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub financial: f64,
    pub strategic: f64,
    pub market: f64,
    pub risk: f64,
    pub execution: f64,
    pub team: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            financial: 0.25,
            strategic: 0.20,
            market: 0.15,
            risk: 0.20,
            execution: 0.10,
            team: 0.10,
        }
    }
}

impl ScoringWeights {
    /// Alternative preset that leans harder on financial and strategic factors
    /// and folds team assessment into execution.
    pub fn fundamentals_heavy() -> Self {
        Self {
            financial: 0.30,
            strategic: 0.25,
            market: 0.20,
            risk: 0.15,
            execution: 0.10,
            team: 0.0,
        }
    }

    /// Validate that weights are non-negative and sum to 1.0 (within 1e-6).
    pub fn validate(&self) -> Result<(), DealError> {
        let entries = [
            ("financial", self.financial),
            ("strategic", self.strategic),
            ("market", self.market),
            ("risk", self.risk),
            ("execution", self.execution),
            ("team", self.team),
        ];
        for (name, w) in entries {
            if w < 0.0 {
                return Err(DealError::InvalidConfiguration(format!(
                    "weight '{}' is negative: {}",
                    name, w
                )));
            }
        }
        let sum: f64 = entries.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(DealError::InvalidConfiguration(format!(
                "weights must sum to 1.0, got {:.6}",
                sum
            )));
        }
        Ok(())
    }
}

pub struct DealScoringEngine {
    calculator: ScoreComponentCalculator,
    weights: ScoringWeights,
}

impl DealScoringEngine {
    /// Engine with the default weight scheme.
    pub fn new() -> Self {
        Self {
            calculator: ScoreComponentCalculator::new(),
            weights: ScoringWeights::default(),
        }
    }

    /// Engine with an explicit weight configuration. Invalid weights are a
    /// configuration error here, never a silent fallback at scoring time.
    pub fn with_weights(weights: ScoringWeights) -> Result<Self, DealError> {
        weights.validate()?;
        Ok(Self {
            calculator: ScoreComponentCalculator::new(),
            weights,
        })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score a deal. Missing attributes degrade confidence, not correctness.
    pub fn score(&self, attrs: &DealAttributes) -> DealScore {
        let components = self.calculator.all_scores(attrs);
        let overall = self.combine(&components);
        let confidence = self.confidence(attrs);
        let risk_level = RiskLevel::from_risk_score(components.risk);
        let recommendation = self.recommend(overall, risk_level, confidence);
        let (key_strengths, key_concerns) = self.narrative(attrs, &components);

        tracing::debug!(
            deal_id = %attrs.deal_id,
            overall,
            confidence,
            recommendation = recommendation.to_label(),
            "scored deal"
        );

        let metrics = json!({
            "financial_score": components.financial,
            "strategic_score": components.strategic,
            "market_score": components.market,
            "risk_score": components.risk,
            "execution_score": components.execution,
            "team_score": components.team,
            "data_completeness": self.data_completeness(attrs),
        });

        DealScore {
            deal_id: attrs.deal_id.clone(),
            components,
            overall_score: overall,
            confidence,
            risk_level,
            recommendation,
            key_strengths,
            key_concerns,
            metrics,
            scored_at: Utc::now(),
        }
    }

    /// Weighted combination. Risk is inverted so that low risk raises the
    /// overall score. Rounded to one decimal.
    fn combine(&self, c: &ComponentScores) -> f64 {
        let w = &self.weights;
        let raw = c.financial * w.financial
            + c.strategic * w.strategic
            + c.market * w.market
            + (100.0 - c.risk) * w.risk
            + c.execution * w.execution
            + c.team * w.team;
        (raw.clamp(0.0, 100.0) * 10.0).round() / 10.0
    }

    /// Strict threshold ladder, evaluated in order. A score of exactly 80 or
    /// 65 or 50 falls into the higher bracket.
    fn recommend(&self, overall: f64, risk: RiskLevel, confidence: f64) -> Recommendation {
        if overall >= 80.0 && matches!(risk, RiskLevel::Low | RiskLevel::Medium) {
            Recommendation::Proceed
        } else if overall >= 65.0 && risk != RiskLevel::Critical {
            Recommendation::ProceedWithCaution
        } else if overall >= 50.0 {
            Recommendation::InvestigateFurther
        } else if overall < 40.0 && confidence > 0.7 {
            Recommendation::Decline
        } else {
            Recommendation::NegotiateTerms
        }
    }

    /// Fraction of analytical fields present, plus 0.1 each for completed due
    /// diligence and third-party validation, capped at 1.0.
    fn confidence(&self, attrs: &DealAttributes) -> f64 {
        let mut confidence = self.data_completeness(attrs);
        if attrs.due_diligence_complete {
            confidence += 0.1;
        }
        if attrs.third_party_validated {
            confidence += 0.1;
        }
        confidence.min(1.0)
    }

    fn data_completeness(&self, attrs: &DealAttributes) -> f64 {
        let present = [
            attrs.revenue_growth_rate.is_some(),
            attrs.ebitda_margin.is_some(),
            attrs.debt_to_equity.is_some(),
            attrs.recurring_revenue_pct.is_some(),
            attrs.customer_concentration_pct.is_some(),
            attrs.technology_overlap.is_some(),
            attrs.product_synergy.is_some(),
            attrs.market_expansion_potential.is_some(),
            attrs.cultural_alignment.is_some(),
            attrs.market_position.is_some(),
            attrs.market_growth_rate.is_some(),
            attrs.competitive_intensity.is_some(),
            attrs.market_share_pct.is_some(),
            attrs.integration_complexity.is_some(),
            attrs.regulatory_exposure.is_some(),
            attrs.key_person_dependency.is_some(),
            attrs.litigation_pending.is_some(),
            attrs.integration_team_experience.is_some(),
            attrs.management_strength.is_some(),
            attrs.change_readiness.is_some(),
            attrs.leadership_depth.is_some(),
            attrs.key_talent_retention_risk.is_some(),
        ];
        let count = present.iter().filter(|&&p| p).count();
        count as f64 / present.len() as f64
    }

    fn narrative(
        &self,
        attrs: &DealAttributes,
        c: &ComponentScores,
    ) -> (Vec<String>, Vec<String>) {
        let mut strengths = Vec::new();
        let mut concerns = Vec::new();

        let dimensions = [
            ("financial profile", c.financial),
            ("strategic fit", c.strategic),
            ("market position", c.market),
            ("execution readiness", c.execution),
            ("leadership team", c.team),
        ];
        for (label, score) in dimensions {
            if score >= 75.0 {
                strengths.push(format!("Strong {}", label));
            } else if score <= 40.0 {
                concerns.push(format!("Weak {}", label));
            }
        }

        if c.risk >= 60.0 {
            concerns.push("Elevated overall risk exposure".to_string());
        }
        if attrs.revenue_growth_rate.unwrap_or(0.0) > 20.0 {
            strengths.push("High revenue growth".to_string());
        }
        if attrs.debt_to_equity.unwrap_or(1.0) > 2.0 {
            concerns.push("High leverage".to_string());
        }
        if attrs.litigation_pending.unwrap_or(false) {
            concerns.push("Pending litigation".to_string());
        }
        if attrs.customer_concentration_pct.unwrap_or(0.0) > 50.0 {
            concerns.push("Concentrated customer base".to_string());
        }
        if attrs.recurring_revenue_pct.unwrap_or(0.0) > 60.0 {
            strengths.push("Predominantly recurring revenue".to_string());
        }

        (strengths, concerns)
    }
}

impl Default for DealScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deal_core::Complexity;

    fn strong_deal() -> DealAttributes {
        let mut attrs = DealAttributes::new("D-100");
        attrs.revenue_growth_rate = Some(25.0);
        attrs.ebitda_margin = Some(18.0);
        attrs.debt_to_equity = Some(0.2);
        attrs.technology_overlap = Some(0.8);
        attrs.product_synergy = Some(0.8);
        attrs.management_strength = Some(0.8);
        attrs.integration_complexity = Some(Complexity::Low);
        attrs
    }

    #[test]
    fn test_weight_validation_rejects_bad_sum() {
        let weights = ScoringWeights {
            financial: 0.5,
            strategic: 0.5,
            market: 0.5,
            risk: 0.0,
            execution: 0.0,
            team: 0.0,
        };
        assert!(weights.validate().is_err());
        assert!(DealScoringEngine::with_weights(weights).is_err());
    }

    #[test]
    fn test_weight_validation_rejects_negative() {
        let weights = ScoringWeights {
            financial: 1.2,
            strategic: -0.2,
            market: 0.0,
            risk: 0.0,
            execution: 0.0,
            team: 0.0,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_both_presets_are_valid() {
        assert!(ScoringWeights::default().validate().is_ok());
        assert!(ScoringWeights::fundamentals_heavy().validate().is_ok());
    }

    #[test]
    fn test_overall_score_in_band() {
        let engine = DealScoringEngine::new();
        let score = engine.score(&strong_deal());
        assert!((0.0..=100.0).contains(&score.overall_score));

        let empty = engine.score(&DealAttributes::new("D-101"));
        assert!((0.0..=100.0).contains(&empty.overall_score));
    }

    #[test]
    fn test_financial_component_scenario() {
        // growth 25, margin 18, d2e 0.2: financial component lands at 95+
        let engine = DealScoringEngine::new();
        let mut attrs = DealAttributes::new("D-102");
        attrs.revenue_growth_rate = Some(25.0);
        attrs.ebitda_margin = Some(18.0);
        attrs.debt_to_equity = Some(0.2);
        let score = engine.score(&attrs);
        assert!(score.components.financial >= 95.0);
        assert!(score.components.financial <= 100.0);
    }

    #[test]
    fn test_recommendation_boundary_scores() {
        let engine = DealScoringEngine::new();
        // Exactly 65 with non-critical risk lands in the higher bracket
        assert_eq!(
            engine.recommend(65.0, RiskLevel::Medium, 0.8),
            Recommendation::ProceedWithCaution
        );
        assert_eq!(
            engine.recommend(80.0, RiskLevel::Low, 0.8),
            Recommendation::Proceed
        );
        assert_eq!(
            engine.recommend(50.0, RiskLevel::High, 0.8),
            Recommendation::InvestigateFurther
        );
        // Critical risk blocks Proceed even at high scores
        assert_eq!(
            engine.recommend(90.0, RiskLevel::Critical, 0.8),
            Recommendation::NegotiateTerms
        );
        // Low score with high confidence declines; low confidence negotiates
        assert_eq!(
            engine.recommend(30.0, RiskLevel::Medium, 0.9),
            Recommendation::Decline
        );
        assert_eq!(
            engine.recommend(30.0, RiskLevel::Medium, 0.5),
            Recommendation::NegotiateTerms
        );
    }

    #[test]
    fn test_recommendation_monotonic_in_score() {
        // With risk and confidence fixed, a rising score never yields a less
        // favorable bucket.
        fn favorability(r: Recommendation) -> i32 {
            match r {
                Recommendation::Decline => 0,
                Recommendation::NegotiateTerms => 1,
                Recommendation::InvestigateFurther => 2,
                Recommendation::ProceedWithCaution => 3,
                Recommendation::Proceed => 4,
            }
        }
        let engine = DealScoringEngine::new();
        let mut last = -1;
        for step in 0..=200 {
            let score = step as f64 / 2.0;
            let rank = favorability(engine.recommend(score, RiskLevel::Medium, 0.9));
            assert!(
                rank >= last,
                "recommendation regressed at score {}",
                score
            );
            last = rank;
        }
    }

    #[test]
    fn test_confidence_reflects_completeness_and_flags() {
        let engine = DealScoringEngine::new();
        let sparse = engine.score(&DealAttributes::new("D-103"));
        let full = engine.score(&strong_deal());
        assert!(full.confidence > sparse.confidence);

        let mut validated = strong_deal();
        validated.due_diligence_complete = true;
        validated.third_party_validated = true;
        let boosted = engine.score(&validated);
        assert!(boosted.confidence > full.confidence);
        assert!(boosted.confidence <= 1.0);
    }

    #[test]
    fn test_risk_inversion_raises_overall_for_low_risk() {
        let engine = DealScoringEngine::new();
        let mut risky = strong_deal();
        risky.integration_complexity = Some(Complexity::VeryHigh);
        risky.litigation_pending = Some(true);
        let safe_score = engine.score(&strong_deal());
        let risky_score = engine.score(&risky);
        assert!(safe_score.overall_score > risky_score.overall_score);
    }

    #[test]
    fn test_narrative_surfaces_concerns() {
        let engine = DealScoringEngine::new();
        let mut attrs = DealAttributes::new("D-104");
        attrs.debt_to_equity = Some(3.0);
        attrs.litigation_pending = Some(true);
        let score = engine.score(&attrs);
        assert!(score.key_concerns.iter().any(|c| c.contains("leverage")));
        assert!(score.key_concerns.iter().any(|c| c.contains("litigation")));
    }
}
