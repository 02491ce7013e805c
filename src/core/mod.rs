mod engine;
mod rules;
mod types;

pub use engine::{period_contribution, run_projection, run_yearly_trace};
pub use rules::{
    FieldBounds, MAX_YEARS, PhaseAuthority, PlanEdit, RawInput, apply_edit, apply_edits,
    clamp_step_up_frequency, coerce, coerce_raw, reconcile_phase_and_tenure,
    satisfies_invariants, step_up_frequency_options,
};
pub use types::{
    FrequencyOption, InvestmentFrequency, PlanInputs, PlanPhase, ProjectionResult,
    ProjectionYear, RoundedTotals, StepUpConfig, StepUpMode, TrackTotals,
};
