use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::DealError;

/// Market position of the target company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketPosition {
    Leader,
    Challenger,
    Follower,
    Niche,
}

impl MarketPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketPosition::Leader => "leader",
            MarketPosition::Challenger => "challenger",
            MarketPosition::Follower => "follower",
            MarketPosition::Niche => "niche",
        }
    }
}

impl FromStr for MarketPosition {
    type Err = DealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "leader" => Ok(MarketPosition::Leader),
            "challenger" => Ok(MarketPosition::Challenger),
            "follower" => Ok(MarketPosition::Follower),
            "niche" => Ok(MarketPosition::Niche),
            other => Err(DealError::UnknownValue(format!(
                "market position '{}'",
                other
            ))),
        }
    }
}

/// Generic low/medium/high intensity rating (competitive pressure, regulatory exposure)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        }
    }
}

impl FromStr for Intensity {
    type Err = DealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "high" => Ok(Intensity::High),
            other => Err(DealError::UnknownValue(format!("intensity '{}'", other))),
        }
    }
}

/// Integration complexity rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
            Complexity::VeryHigh => "very_high",
        }
    }
}

impl FromStr for Complexity {
    type Err = DealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Complexity::Low),
            "medium" => Ok(Complexity::Medium),
            "high" => Ok(Complexity::High),
            "very_high" | "very high" => Ok(Complexity::VeryHigh),
            other => Err(DealError::UnknownValue(format!("complexity '{}'", other))),
        }
    }
}

/// Deal attributes supplied by the caller for scoring.
///
/// Every analytical field is optional; missing fields fall back to documented
/// neutral defaults inside the component calculators and lower the score
/// confidence instead of erroring. Percentages are expressed as 0-100,
/// fractions as 0.0-1.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealAttributes {
    pub deal_id: String,
    #[serde(default)]
    pub industry: Option<String>,
    /// Proposed transaction value in dollars
    #[serde(default)]
    pub deal_value: Option<f64>,

    // --- Financial dimension ---
    /// Year-over-year revenue growth, percent
    #[serde(default)]
    pub revenue_growth_rate: Option<f64>,
    /// EBITDA margin, percent
    #[serde(default)]
    pub ebitda_margin: Option<f64>,
    /// Debt-to-equity ratio (defaults to 1.0 when absent)
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    /// Share of revenue that is recurring, percent
    #[serde(default)]
    pub recurring_revenue_pct: Option<f64>,
    /// Revenue share of the largest customers, percent
    #[serde(default)]
    pub customer_concentration_pct: Option<f64>,

    // --- Strategic dimension ---
    /// Technology stack overlap with the acquirer, 0-1
    #[serde(default)]
    pub technology_overlap: Option<f64>,
    /// Product/portfolio complementarity, 0-1
    #[serde(default)]
    pub product_synergy: Option<f64>,
    /// Access to markets the acquirer does not serve, 0-1
    #[serde(default)]
    pub market_expansion_potential: Option<f64>,
    /// Cultural alignment between the organizations, 0-1
    #[serde(default)]
    pub cultural_alignment: Option<f64>,

    // --- Market dimension ---
    #[serde(default)]
    pub market_position: Option<MarketPosition>,
    /// Addressable market growth, percent
    #[serde(default)]
    pub market_growth_rate: Option<f64>,
    /// Competitive intensity in the target's market (defaults to medium)
    #[serde(default)]
    pub competitive_intensity: Option<Intensity>,
    /// Target's market share, percent
    #[serde(default)]
    pub market_share_pct: Option<f64>,

    // --- Risk dimension ---
    /// Integration complexity (defaults to medium)
    #[serde(default)]
    pub integration_complexity: Option<Complexity>,
    #[serde(default)]
    pub regulatory_exposure: Option<Intensity>,
    /// Dependency on specific individuals, 0-1
    #[serde(default)]
    pub key_person_dependency: Option<f64>,
    #[serde(default)]
    pub litigation_pending: Option<bool>,

    // --- Execution dimension ---
    /// Acquirer's integration track record, 0-1
    #[serde(default)]
    pub integration_team_experience: Option<f64>,
    /// Target management strength, 0-1
    #[serde(default)]
    pub management_strength: Option<f64>,
    /// Organizational readiness for change, 0-1
    #[serde(default)]
    pub change_readiness: Option<f64>,

    // --- Team dimension ---
    /// Bench depth below the executive layer, 0-1
    #[serde(default)]
    pub leadership_depth: Option<f64>,
    /// Risk of losing key talent post-close, 0-1
    #[serde(default)]
    pub key_talent_retention_risk: Option<f64>,

    /// Due diligence has been completed
    #[serde(default)]
    pub due_diligence_complete: bool,
    /// Figures validated by a third party
    #[serde(default)]
    pub third_party_validated: bool,
}

impl DealAttributes {
    pub fn new(deal_id: &str) -> Self {
        Self {
            deal_id: deal_id.to_string(),
            ..Default::default()
        }
    }
}

/// One clamped [0,100] score per scoring dimension.
/// The risk score reads "higher = riskier"; it is inverted before weighting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComponentScores {
    pub financial: f64,
    pub strategic: f64,
    pub market: f64,
    pub risk: f64,
    pub execution: f64,
    pub team: f64,
}

/// Risk level derived from the risk component score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Bucket a [0,100] risk component score (higher = riskier)
    pub fn from_risk_score(score: f64) -> Self {
        if score < 30.0 {
            RiskLevel::Low
        } else if score < 50.0 {
            RiskLevel::Medium
        } else if score < 70.0 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Recommendation label derived from overall score, risk level and confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Proceed,
    ProceedWithCaution,
    InvestigateFurther,
    NegotiateTerms,
    Decline,
}

impl Recommendation {
    pub fn to_label(&self) -> &'static str {
        match self {
            Recommendation::Proceed => "Proceed",
            Recommendation::ProceedWithCaution => "Proceed with Caution",
            Recommendation::InvestigateFurther => "Investigate Further",
            Recommendation::NegotiateTerms => "Negotiate Terms",
            Recommendation::Decline => "Decline",
        }
    }
}

/// Complete scoring result for one deal. Immutable once produced;
/// callers may cache it keyed by deal id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealScore {
    pub deal_id: String,
    pub components: ComponentScores,
    /// Weighted overall score, [0,100], rounded to one decimal
    pub overall_score: f64,
    /// Data-completeness confidence, [0,1]
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub recommendation: Recommendation,
    pub key_strengths: Vec<String>,
    pub key_concerns: Vec<String>,
    /// Raw component scores and notable ratios for downstream dashboards
    pub metrics: serde_json::Value,
    pub scored_at: DateTime<Utc>,
}

/// Per-company financial/operational profile used for synergy identification.
/// All fields optional; estimators skip categories whose inputs are absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    /// Annual revenue, dollars
    #[serde(default)]
    pub annual_revenue: Option<f64>,
    /// Annual operating costs, dollars
    #[serde(default)]
    pub operating_costs: Option<f64>,
    /// Annual pretax income, dollars
    #[serde(default)]
    pub pretax_income: Option<f64>,
    #[serde(default)]
    pub headcount: Option<f64>,
    /// Fraction of customers shared with the counterparty, 0-1
    #[serde(default)]
    pub customer_overlap: Option<f64>,
    /// Fraction of product lines overlapping with the counterparty, 0-1
    #[serde(default)]
    pub product_overlap: Option<f64>,
    /// Fraction of geographic footprint overlapping, 0-1
    #[serde(default)]
    pub geographic_overlap: Option<f64>,
    /// Total outstanding debt, dollars
    #[serde(default)]
    pub total_debt: Option<f64>,
    /// Blended annual cost of debt, fraction (e.g. 0.08)
    #[serde(default)]
    pub cost_of_debt: Option<f64>,
    /// Operating margin, percent
    #[serde(default)]
    pub operating_margin: Option<f64>,
}

impl CompanyProfile {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_buckets() {
        assert_eq!(RiskLevel::from_risk_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_risk_score(29.9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_risk_score(30.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_risk_score(50.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_risk_score(70.0), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_risk_score(100.0), RiskLevel::Critical);
    }

    #[test]
    fn test_enum_parsing_fails_fast() {
        assert!("leader".parse::<MarketPosition>().is_ok());
        assert!("dominant".parse::<MarketPosition>().is_err());
        assert!("very high".parse::<Complexity>().is_ok());
        assert!("extreme".parse::<Complexity>().is_err());
        assert!("medium".parse::<Intensity>().is_ok());
        assert!("severe".parse::<Intensity>().is_err());
    }
}
