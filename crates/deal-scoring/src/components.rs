//! Component Score Calculators
//!
//! Pure threshold-ladder scoring over the deal attribute schema. Each
//! dimension starts from a fixed base, applies additive adjustments for the
//! attributes that are present, and clamps to [0,100]. Missing attributes use
//! neutral defaults and never error.

use deal_core::math::clamp_score;
use deal_core::{Complexity, ComponentScores, DealAttributes, Intensity, MarketPosition};

pub struct ScoreComponentCalculator;

impl ScoreComponentCalculator {
    pub fn new() -> Self {
        Self
    }

    /// All six component scores for a deal.
    pub fn all_scores(&self, attrs: &DealAttributes) -> ComponentScores {
        ComponentScores {
            financial: self.financial_score(attrs),
            strategic: self.strategic_score(attrs),
            market: self.market_score(attrs),
            risk: self.risk_score(attrs),
            execution: self.execution_score(attrs),
            team: self.team_score(attrs),
        }
    }

    /// Financial health. Base 50.
    /// Ladder: growth >20 → +20, >10 → +10, <0 → -15; EBITDA margin >15 → +15,
    /// >8 → +8, <0 → -10; debt/equity <0.3 → +10, >2.0 → -15 (default 1.0 is
    /// neutral); recurring revenue >60% → +8; customer concentration >50% → -10.
    pub fn financial_score(&self, attrs: &DealAttributes) -> f64 {
        let mut score = 50.0;

        if let Some(growth) = attrs.revenue_growth_rate {
            if growth > 20.0 {
                score += 20.0;
            } else if growth > 10.0 {
                score += 10.0;
            } else if growth < 0.0 {
                score -= 15.0;
            }
        }

        if let Some(margin) = attrs.ebitda_margin {
            if margin > 15.0 {
                score += 15.0;
            } else if margin > 8.0 {
                score += 8.0;
            } else if margin < 0.0 {
                score -= 10.0;
            }
        }

        let d2e = attrs.debt_to_equity.unwrap_or(1.0);
        if d2e < 0.3 {
            score += 10.0;
        } else if d2e > 2.0 {
            score -= 15.0;
        }

        if attrs.recurring_revenue_pct.unwrap_or(0.0) > 60.0 {
            score += 8.0;
        }
        if attrs.customer_concentration_pct.unwrap_or(0.0) > 50.0 {
            score -= 10.0;
        }

        clamp_score(score)
    }

    /// Strategic fit. Base 50.
    pub fn strategic_score(&self, attrs: &DealAttributes) -> f64 {
        let mut score = 50.0;

        if let Some(tech) = attrs.technology_overlap {
            if tech > 0.7 {
                score += 15.0;
            } else if tech > 0.4 {
                score += 8.0;
            }
        }

        if let Some(product) = attrs.product_synergy {
            if product > 0.7 {
                score += 15.0;
            } else if product > 0.4 {
                score += 8.0;
            }
        }

        if attrs.market_expansion_potential.unwrap_or(0.0) > 0.6 {
            score += 12.0;
        }

        if let Some(culture) = attrs.cultural_alignment {
            if culture > 0.7 {
                score += 8.0;
            } else if culture < 0.3 {
                score -= 12.0;
            }
        }

        clamp_score(score)
    }

    /// Market attractiveness. Base 50.
    pub fn market_score(&self, attrs: &DealAttributes) -> f64 {
        let mut score = 50.0;

        if let Some(position) = attrs.market_position {
            score += match position {
                MarketPosition::Leader => 20.0,
                MarketPosition::Challenger => 10.0,
                MarketPosition::Niche => 5.0,
                MarketPosition::Follower => 0.0,
            };
        }

        if let Some(growth) = attrs.market_growth_rate {
            if growth > 10.0 {
                score += 15.0;
            } else if growth > 5.0 {
                score += 8.0;
            } else if growth < 0.0 {
                score -= 10.0;
            }
        }

        // Defaults to medium, which is neutral
        match attrs.competitive_intensity.unwrap_or(Intensity::Medium) {
            Intensity::Low => score += 10.0,
            Intensity::Medium => {}
            Intensity::High => score -= 10.0,
        }

        if attrs.market_share_pct.unwrap_or(0.0) > 25.0 {
            score += 5.0;
        }

        clamp_score(score)
    }

    /// Risk exposure, higher = riskier. Base 30.
    /// The scoring engine inverts this (100 - risk) before weighting.
    pub fn risk_score(&self, attrs: &DealAttributes) -> f64 {
        let mut score = 30.0;

        // Defaults to medium, which is neutral
        score += match attrs.integration_complexity.unwrap_or(Complexity::Medium) {
            Complexity::Low => -10.0,
            Complexity::Medium => 0.0,
            Complexity::High => 15.0,
            Complexity::VeryHigh => 25.0,
        };

        match attrs.regulatory_exposure.unwrap_or(Intensity::Medium) {
            Intensity::Low => score -= 5.0,
            Intensity::Medium => {}
            Intensity::High => score += 15.0,
        }

        if attrs.key_person_dependency.unwrap_or(0.0) > 0.6 {
            score += 10.0;
        }
        if attrs.litigation_pending.unwrap_or(false) {
            score += 15.0;
        }
        if attrs.customer_concentration_pct.unwrap_or(0.0) > 50.0 {
            score += 10.0;
        }
        if attrs.debt_to_equity.unwrap_or(1.0) > 2.0 {
            score += 10.0;
        }

        clamp_score(score)
    }

    /// Execution readiness. Base 60.
    pub fn execution_score(&self, attrs: &DealAttributes) -> f64 {
        let mut score = 60.0;

        if let Some(exp) = attrs.integration_team_experience {
            if exp > 0.6 {
                score += 15.0;
            } else if exp < 0.2 {
                score -= 10.0;
            }
        }

        if let Some(mgmt) = attrs.management_strength {
            if mgmt > 0.7 {
                score += 10.0;
            } else if mgmt < 0.3 {
                score -= 10.0;
            }
        }

        if let Some(readiness) = attrs.change_readiness {
            if readiness > 0.6 {
                score += 8.0;
            } else if readiness < 0.3 {
                score -= 8.0;
            }
        }

        match attrs.integration_complexity.unwrap_or(Complexity::Medium) {
            Complexity::High => score -= 10.0,
            Complexity::VeryHigh => score -= 20.0,
            _ => {}
        }

        clamp_score(score)
    }

    /// Team quality. Base 50.
    pub fn team_score(&self, attrs: &DealAttributes) -> f64 {
        let mut score = 50.0;

        if let Some(mgmt) = attrs.management_strength {
            if mgmt > 0.7 {
                score += 20.0;
            } else if mgmt > 0.5 {
                score += 10.0;
            } else if mgmt < 0.3 {
                score -= 15.0;
            }
        }

        if attrs.leadership_depth.unwrap_or(0.0) > 0.6 {
            score += 15.0;
        }
        if attrs.key_talent_retention_risk.unwrap_or(0.0) > 0.6 {
            score -= 15.0;
        }

        clamp_score(score)
    }
}

impl Default for ScoreComponentCalculator {
    fn default() -> Self {
        Self::new()
    }
}
