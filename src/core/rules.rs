use serde::Deserialize;

use super::types::{FrequencyOption, InvestmentFrequency, PlanInputs, StepUpMode};

/// Longest accumulation phase or tenure a year field accepts.
pub const MAX_YEARS: f64 = 10_000.0;

/// Bounds declared by a numeric form field.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FieldBounds {
    pub min: f64,
    pub max: Option<f64>,
    pub integer_step: bool,
}

impl FieldBounds {
    pub const INVESTMENT_AMOUNT: FieldBounds = FieldBounds {
        min: 100.0,
        max: None,
        integer_step: false,
    };
    pub const YEARS: FieldBounds = FieldBounds {
        min: 1.0,
        max: Some(MAX_YEARS),
        integer_step: true,
    };
    pub const STEP_UP: FieldBounds = FieldBounds {
        min: 0.0,
        max: None,
        integer_step: true,
    };
    pub const EXPECTED_GROWTH: FieldBounds = FieldBounds {
        min: 1.0,
        max: None,
        integer_step: true,
    };
}

/// A number or the raw text of a form field.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawInput {
    Number(f64),
    Text(String),
}

impl From<f64> for RawInput {
    fn from(value: f64) -> Self {
        RawInput::Number(value)
    }
}

impl From<&str> for RawInput {
    fn from(value: &str) -> Self {
        RawInput::Text(value.to_string())
    }
}

/// One user edit of the form.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum PlanEdit {
    InvestmentAmount(RawInput),
    InvestmentFrequency(InvestmentFrequency),
    AccumulationPhaseYears(RawInput),
    StepUpMode(StepUpMode),
    StepUpPercent(RawInput),
    StepUpAmount(RawInput),
    StepUpFrequency(InvestmentFrequency),
    ExpectedGrowthPercent(RawInput),
    InvestmentTenureYears(RawInput),
}

impl PlanEdit {
    /// Edit of whichever step-up magnitude `mode` selects.
    pub fn step_up_magnitude(mode: StepUpMode, raw: impl Into<RawInput>) -> Self {
        match mode {
            StepUpMode::Percent => PlanEdit::StepUpPercent(raw.into()),
            StepUpMode::Amount => PlanEdit::StepUpAmount(raw.into()),
        }
    }
}

pub fn coerce(value: f64, bounds: FieldBounds) -> f64 {
    if !value.is_finite() || value < bounds.min {
        return bounds.min;
    }
    if let Some(max) = bounds.max {
        if value > max {
            return max;
        }
    }
    if bounds.integer_step && value.fract() != 0.0 {
        return value.trunc();
    }
    value
}

/// Unparseable text keeps `previous`, like a number input with no valid value.
pub fn coerce_raw(raw: &RawInput, bounds: FieldBounds, previous: f64) -> f64 {
    match raw {
        RawInput::Number(value) => coerce(*value, bounds),
        RawInput::Text(text) => match text.trim().parse::<f64>() {
            Ok(value) => coerce(value, bounds),
            Err(_) => previous,
        },
    }
}

fn coerce_years(raw: &RawInput, previous: u32) -> u32 {
    // Bounded to 1..=MAX_YEARS and integral, so the cast is exact.
    coerce_raw(raw, FieldBounds::YEARS, f64::from(previous)) as u32
}

/// Applies one edit and restores both coupling invariants.
pub fn apply_edit(current: &PlanInputs, edit: &PlanEdit) -> PlanInputs {
    let mut next = *current;
    match edit {
        PlanEdit::InvestmentAmount(raw) => {
            next.investment_amount = coerce_raw(
                raw,
                FieldBounds::INVESTMENT_AMOUNT,
                current.investment_amount,
            );
        }
        PlanEdit::InvestmentFrequency(frequency) => next.investment_frequency = *frequency,
        PlanEdit::AccumulationPhaseYears(raw) => {
            next.accumulation_phase_years = coerce_years(raw, current.accumulation_phase_years);
        }
        PlanEdit::StepUpMode(mode) => next.step_up_mode = *mode,
        PlanEdit::StepUpPercent(raw) => {
            next.step_up.percent = coerce_raw(raw, FieldBounds::STEP_UP, current.step_up.percent);
        }
        PlanEdit::StepUpAmount(raw) => {
            next.step_up.amount = coerce_raw(raw, FieldBounds::STEP_UP, current.step_up.amount);
        }
        PlanEdit::StepUpFrequency(frequency) => next.step_up_frequency = *frequency,
        PlanEdit::ExpectedGrowthPercent(raw) => {
            next.expected_growth_percent = coerce_raw(
                raw,
                FieldBounds::EXPECTED_GROWTH,
                current.expected_growth_percent,
            );
        }
        PlanEdit::InvestmentTenureYears(raw) => {
            next.investment_tenure_years = coerce_years(raw, current.investment_tenure_years);
        }
    }

    let next = clamp_step_up_frequency(next);
    reconcile_phase_and_tenure(next, PhaseAuthority::for_edit(edit))
}

/// Applies edits in order, each against the result of the previous one.
pub fn apply_edits<'a>(
    start: PlanInputs,
    edits: impl IntoIterator<Item = &'a PlanEdit>,
) -> PlanInputs {
    edits
        .into_iter()
        .fold(start, |inputs, edit| apply_edit(&inputs, edit))
}

/// Step-ups cannot happen more often than contributions.
pub fn clamp_step_up_frequency(mut inputs: PlanInputs) -> PlanInputs {
    if inputs.step_up_frequency > inputs.investment_frequency {
        inputs.step_up_frequency = inputs.investment_frequency;
    }
    inputs
}

/// Which side of the phase/tenure pair was just edited.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PhaseAuthority {
    AccumulationPhase,
    Tenure,
}

impl PhaseAuthority {
    fn for_edit(edit: &PlanEdit) -> Self {
        match edit {
            PlanEdit::InvestmentTenureYears(_) => PhaseAuthority::Tenure,
            _ => PhaseAuthority::AccumulationPhase,
        }
    }
}

/// Pulls the non-authoritative field so that tenure >= accumulation phase.
pub fn reconcile_phase_and_tenure(mut inputs: PlanInputs, authority: PhaseAuthority) -> PlanInputs {
    if inputs.investment_tenure_years >= inputs.accumulation_phase_years {
        return inputs;
    }
    match authority {
        PhaseAuthority::AccumulationPhase => {
            inputs.investment_tenure_years = inputs.accumulation_phase_years;
        }
        PhaseAuthority::Tenure => {
            inputs.accumulation_phase_years = inputs.investment_tenure_years;
        }
    }
    inputs
}

pub fn satisfies_invariants(inputs: &PlanInputs) -> bool {
    inputs.investment_tenure_years >= inputs.accumulation_phase_years
        && inputs.step_up_frequency <= inputs.investment_frequency
}

/// Step-up frequency choices; those above the contribution frequency are disabled.
pub fn step_up_frequency_options(investment_frequency: InvestmentFrequency) -> Vec<FrequencyOption> {
    InvestmentFrequency::ALL
        .iter()
        .map(|&value| FrequencyOption {
            value,
            label: value.label(),
            enabled: value <= investment_frequency,
        })
        .collect()
}
