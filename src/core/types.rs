use serde::{Deserialize, Serialize};

use crate::error::SipError;

/// Contribution periods per year.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum InvestmentFrequency {
    Yearly,
    HalfYearly,
    Quarterly,
    Monthly,
}

impl InvestmentFrequency {
    /// Form order, most frequent first.
    pub const ALL: [InvestmentFrequency; 4] = [
        InvestmentFrequency::Monthly,
        InvestmentFrequency::Quarterly,
        InvestmentFrequency::HalfYearly,
        InvestmentFrequency::Yearly,
    ];

    pub fn periods_per_year(self) -> u32 {
        match self {
            InvestmentFrequency::Yearly => 1,
            InvestmentFrequency::HalfYearly => 2,
            InvestmentFrequency::Quarterly => 4,
            InvestmentFrequency::Monthly => 12,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InvestmentFrequency::Yearly => "Yearly",
            InvestmentFrequency::HalfYearly => "Half-Yearly",
            InvestmentFrequency::Quarterly => "Quarterly",
            InvestmentFrequency::Monthly => "Monthly",
        }
    }
}

impl TryFrom<u32> for InvestmentFrequency {
    type Error = SipError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(InvestmentFrequency::Yearly),
            2 => Ok(InvestmentFrequency::HalfYearly),
            4 => Ok(InvestmentFrequency::Quarterly),
            12 => Ok(InvestmentFrequency::Monthly),
            other => Err(SipError::InvalidFrequency(other)),
        }
    }
}

impl From<InvestmentFrequency> for u32 {
    fn from(value: InvestmentFrequency) -> Self {
        value.periods_per_year()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepUpMode {
    #[serde(alias = "Percent")]
    Percent,
    #[serde(alias = "Amount")]
    Amount,
}

/// Both step-up magnitudes are kept so toggling the mode never loses an entry.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepUpConfig {
    pub percent: f64,
    pub amount: f64,
}

impl StepUpConfig {
    pub fn active(&self, mode: StepUpMode) -> f64 {
        match mode {
            StepUpMode::Percent => self.percent,
            StepUpMode::Amount => self.amount,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInputs {
    pub investment_amount: f64,
    pub investment_frequency: InvestmentFrequency,
    pub accumulation_phase_years: u32,
    pub step_up_mode: StepUpMode,
    pub step_up: StepUpConfig,
    pub step_up_frequency: InvestmentFrequency,
    pub expected_growth_percent: f64,
    pub investment_tenure_years: u32,
}

impl Default for PlanInputs {
    fn default() -> Self {
        Self {
            investment_amount: 1_000.0,
            investment_frequency: InvestmentFrequency::Monthly,
            accumulation_phase_years: 10,
            step_up_mode: StepUpMode::Percent,
            step_up: StepUpConfig {
                percent: 10.0,
                amount: 100.0,
            },
            step_up_frequency: InvestmentFrequency::Yearly,
            expected_growth_percent: 12.0,
            investment_tenure_years: 10,
        }
    }
}

impl PlanInputs {
    pub fn accumulation_periods(&self) -> u32 {
        self.accumulation_phase_years
            .saturating_mul(self.investment_frequency.periods_per_year())
    }

    pub fn growth_periods(&self) -> u32 {
        self.investment_tenure_years
            .saturating_sub(self.accumulation_phase_years)
            .saturating_mul(self.investment_frequency.periods_per_year())
    }

    /// Contribution periods between two step-up events.
    pub fn step_up_interval(&self) -> u32 {
        let periods = self.investment_frequency.periods_per_year();
        let steps = self.step_up_frequency.periods_per_year().min(periods);
        (periods / steps).max(1)
    }

    pub fn periodic_growth_rate(&self) -> f64 {
        self.expected_growth_percent
            / (100.0 * f64::from(self.investment_frequency.periods_per_year()))
    }
}

/// Unrounded running totals of one track.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TrackTotals {
    pub invested: f64,
    pub gains: f64,
}

impl TrackTotals {
    pub fn maturity(&self) -> f64 {
        self.invested + self.gains
    }

    pub fn rounded(&self) -> RoundedTotals {
        RoundedTotals {
            invested_amount: round_for_display(self.invested),
            estimated_gains: round_for_display(self.gains),
            maturity_amount: round_for_display(self.maturity()),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundedTotals {
    pub invested_amount: i64,
    pub estimated_gains: i64,
    pub maturity_amount: i64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectionResult {
    pub step_up: TrackTotals,
    pub no_step_up: TrackTotals,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanPhase {
    Accumulation,
    Growth,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionYear {
    pub year: u32,
    pub phase: PlanPhase,
    pub invested: f64,
    pub gains: f64,
    pub no_step_up_invested: f64,
    pub no_step_up_gains: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyOption {
    pub value: InvestmentFrequency,
    pub label: &'static str,
    pub enabled: bool,
}

// Totals are never negative, so half-away-from-zero matches half-up.
fn round_for_display(value: f64) -> i64 {
    value.round() as i64
}
