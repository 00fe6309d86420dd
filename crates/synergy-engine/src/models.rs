use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use deal_core::DealError;

/// Synergy category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SynergyType {
    Revenue,
    Cost,
    Tax,
    Financial,
    Operational,
}

impl SynergyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynergyType::Revenue => "revenue",
            SynergyType::Cost => "cost",
            SynergyType::Tax => "tax",
            SynergyType::Financial => "financial",
            SynergyType::Operational => "operational",
        }
    }
}

/// Lifecycle status of a synergy opportunity.
///
/// IDENTIFIED -> PLANNED -> IN_PROGRESS -> {REALIZED | AT_RISK | CANCELLED};
/// AT_RISK and DELAYED are recoverable, REALIZED and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SynergyStatus {
    Identified,
    Planned,
    InProgress,
    Realized,
    AtRisk,
    Delayed,
    Cancelled,
}

impl SynergyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynergyStatus::Identified => "identified",
            SynergyStatus::Planned => "planned",
            SynergyStatus::InProgress => "in_progress",
            SynergyStatus::Realized => "realized",
            SynergyStatus::AtRisk => "at_risk",
            SynergyStatus::Delayed => "delayed",
            SynergyStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SynergyStatus::Realized | SynergyStatus::Cancelled)
    }

    /// Whether `next` is a legal successor of this status.
    pub fn can_transition_to(&self, next: SynergyStatus) -> bool {
        use SynergyStatus::*;
        match self {
            Identified => matches!(next, Planned | Cancelled),
            Planned => matches!(next, InProgress | Cancelled),
            InProgress => matches!(next, Realized | AtRisk | Cancelled),
            AtRisk => matches!(next, InProgress | Delayed | Cancelled),
            Delayed => matches!(next, InProgress | AtRisk | Cancelled),
            Realized | Cancelled => false,
        }
    }
}

/// A quantifiable benefit expected from combining two companies.
/// Created by the identification engine; only its status mutates afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynergyOpportunity {
    pub id: String,
    pub deal_id: String,
    pub synergy_type: SynergyType,
    pub category: String,
    pub description: String,
    /// Estimated total synergy value, dollars
    pub estimated_value: f64,
    pub realization_timeline_months: u32,
    /// Confidence in the estimate, [0,1]
    pub confidence_level: f64,
    pub status: SynergyStatus,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub risks: Vec<String>,
    /// Composite priority used for ordering, [0,100]
    pub priority_score: f64,
    pub identified_at: DateTime<Utc>,
}

impl SynergyOpportunity {
    /// Risk adjustment factor: 1 - 0.05 per named risk, floored at 0.7.
    pub fn risk_adjustment(&self) -> f64 {
        (1.0 - self.risks.len() as f64 * 0.05).max(0.7)
    }

    /// Estimated value scaled by confidence and the risk adjustment; the
    /// most-likely outcome and the base for NPV discounting.
    pub fn risk_adjusted_value(&self) -> f64 {
        self.estimated_value * self.confidence_level * self.risk_adjustment()
    }

    /// Apply a status transition, rejecting illegal moves.
    pub fn transition_to(&mut self, next: SynergyStatus) -> Result<(), DealError> {
        if !self.status.can_transition_to(next) {
            return Err(DealError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Market context for valuation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    /// Expected market growth, fraction (e.g. 0.03)
    pub market_growth_rate: f64,
    /// Annual discount rate, fraction (e.g. 0.10)
    pub annual_discount_rate: f64,
}

impl Default for MarketData {
    fn default() -> Self {
        Self {
            market_growth_rate: 0.02,
            annual_discount_rate: 0.10,
        }
    }
}

/// Scenario value distribution for a synergy opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueDistribution {
    pub synergy_id: String,
    pub conservative: f64,
    pub most_likely: f64,
    pub optimistic: f64,
    /// Monthly-discounted NPV of the estimated annual value
    pub net_present_value: f64,
    pub risk_adjustment: f64,
    pub timeline_adjustment: f64,
    pub market_adjustment: f64,
}

/// Caller-supplied actuals for one measurement period
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RealizationPeriod {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub planned_value: f64,
    pub realized_value: f64,
}

/// One recorded period of realized-vs-planned value. Append-only per synergy;
/// the cumulative rate is recomputed from the full history on every append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynergyRealization {
    pub synergy_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub planned_value: f64,
    pub realized_value: f64,
    pub variance: f64,
    pub variance_percentage: f64,
    /// Cumulative realized / cumulative planned across all periods to date
    pub cumulative_realization_rate: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Payback period in months, or unbounded when nothing has been realized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PaybackPeriod {
    Months(f64),
    Unbounded,
}

/// Measurement window for portfolio roll-ups; inclusive on both ends
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeasurementWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MeasurementWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Portfolio-level value creation roll-up over a measurement window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueCreationMetrics {
    pub total_identified_value: f64,
    pub total_planned_value: f64,
    pub total_realized_value: f64,
    /// Cumulative realized / planned within the window
    pub realization_rate: f64,
    /// Estimated one-time integration cost, dollars
    pub integration_cost: f64,
    pub roi_percentage: f64,
    /// NPV of the risk-adjusted identified portfolio net of integration cost
    pub net_present_value: f64,
    pub payback_period: PaybackPeriod,
    pub identified_by_type: BTreeMap<String, f64>,
    pub realized_by_type: BTreeMap<String, f64>,
    pub synergy_count: usize,
}
