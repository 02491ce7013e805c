use super::types::{
    PlanInputs, PlanPhase, ProjectionResult, ProjectionYear, StepUpMode, TrackTotals,
};

#[derive(Debug, Clone, Copy)]
struct PeriodState {
    index: u32,
    phase: PlanPhase,
    step_up: TrackTotals,
    no_step_up: TrackTotals,
}

impl TrackTotals {
    fn grow(&mut self, periodic_rate: f64) {
        self.gains += (self.invested + self.gains) * periodic_rate;
    }
}

pub fn run_projection(inputs: &PlanInputs) -> ProjectionResult {
    walk_periods(inputs, |_| {})
}

/// End-of-year totals for every year of the tenure.
pub fn run_yearly_trace(inputs: &PlanInputs) -> Vec<ProjectionYear> {
    let periods_per_year = inputs.investment_frequency.periods_per_year();
    let mut years = Vec::with_capacity(inputs.investment_tenure_years.min(1_000) as usize);
    walk_periods(inputs, |state| {
        let elapsed = state.index.saturating_add(1);
        if elapsed % periods_per_year == 0 {
            years.push(ProjectionYear {
                year: elapsed / periods_per_year,
                phase: state.phase,
                invested: state.step_up.invested,
                gains: state.step_up.gains,
                no_step_up_invested: state.no_step_up.invested,
                no_step_up_gains: state.no_step_up.gains,
            });
        }
    });
    years
}

/// Contribution made in the given period of the accumulation phase, step-up included.
pub fn period_contribution(inputs: &PlanInputs, step_up_count: u32) -> f64 {
    inputs.investment_amount + step_up_increment(inputs, step_up_count)
}

fn step_up_increment(inputs: &PlanInputs, step_up_count: u32) -> f64 {
    match inputs.step_up_mode {
        StepUpMode::Percent => {
            let factor = 1.0 + inputs.step_up.percent / 100.0;
            inputs.investment_amount * (factor.powi(step_up_count as i32) - 1.0)
        }
        StepUpMode::Amount => inputs.step_up.amount * f64::from(step_up_count),
    }
}

fn walk_periods(inputs: &PlanInputs, mut on_period: impl FnMut(&PeriodState)) -> ProjectionResult {
    let rate = inputs.periodic_growth_rate();
    let interval = inputs.step_up_interval();
    let accumulation_periods = inputs.accumulation_periods();
    let growth_periods = inputs.growth_periods();

    let mut state = PeriodState {
        index: 0,
        phase: PlanPhase::Accumulation,
        step_up: TrackTotals::default(),
        no_step_up: TrackTotals::default(),
    };
    let mut step_up_count = 0u32;

    for index in 0..accumulation_periods {
        state.index = index;
        state.step_up.invested += inputs.investment_amount;
        state.no_step_up.invested += inputs.investment_amount;

        // The first step-up lands on the first interval boundary after period 0.
        if index != 0 && index % interval == 0 {
            step_up_count += 1;
        }
        state.step_up.invested += step_up_increment(inputs, step_up_count);

        state.step_up.grow(rate);
        state.no_step_up.grow(rate);
        on_period(&state);
    }

    state.phase = PlanPhase::Growth;
    for offset in 0..growth_periods {
        state.index = accumulation_periods.saturating_add(offset);
        state.step_up.grow(rate);
        state.no_step_up.grow(rate);
        on_period(&state);
    }

    ProjectionResult {
        step_up: state.step_up,
        no_step_up: state.no_step_up,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{InvestmentFrequency, StepUpConfig};
    use proptest::prelude::{Just, Strategy, prop_assert, prop_assert_eq, prop_oneof, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_inputs() -> PlanInputs {
        PlanInputs::default()
    }

    fn yearly_inputs(amount: f64, growth: f64, phase: u32, tenure: u32) -> PlanInputs {
        PlanInputs {
            investment_amount: amount,
            investment_frequency: InvestmentFrequency::Yearly,
            accumulation_phase_years: phase,
            step_up_mode: StepUpMode::Percent,
            step_up: StepUpConfig {
                percent: 0.0,
                amount: 0.0,
            },
            step_up_frequency: InvestmentFrequency::Yearly,
            expected_growth_percent: growth,
            investment_tenure_years: tenure,
        }
    }

    fn frequency_pair() -> impl Strategy<Value = (InvestmentFrequency, InvestmentFrequency)> {
        use InvestmentFrequency::*;
        prop_oneof![
            Just((Monthly, Monthly)),
            Just((Monthly, Quarterly)),
            Just((Monthly, HalfYearly)),
            Just((Monthly, Yearly)),
            Just((Quarterly, Quarterly)),
            Just((Quarterly, HalfYearly)),
            Just((Quarterly, Yearly)),
            Just((HalfYearly, HalfYearly)),
            Just((HalfYearly, Yearly)),
            Just((Yearly, Yearly)),
        ]
    }

    #[test]
    fn default_plan_baseline_invests_exactly_one_hundred_twenty_thousand() {
        let result = run_projection(&sample_inputs());
        assert_eq!(result.no_step_up.invested, 120_000.0);
        assert_eq!(result.no_step_up.rounded().invested_amount, 120_000);
        assert!(result.step_up.invested > 120_000.0);
        assert!(result.step_up.gains > result.no_step_up.gains);
    }

    #[test]
    fn default_plan_step_up_invested_matches_geometric_yearly_contributions() {
        // Twelve monthly payments per year, each year 10% above the last.
        let expected: f64 = (0..10).map(|year| 12_000.0 * 1.1f64.powi(year)).sum();
        let result = run_projection(&sample_inputs());
        assert!((result.step_up.invested - expected).abs() < 1e-6 * expected);
    }

    #[test]
    fn percent_step_up_oracle_two_years() {
        let mut inputs = yearly_inputs(1_000.0, 10.0, 2, 2);
        inputs.step_up.percent = 10.0;

        let result = run_projection(&inputs);
        assert_approx(result.step_up.invested, 2_100.0);
        assert_approx(result.step_up.gains, 320.0);
        assert_approx(result.step_up.maturity(), 2_420.0);
        assert_approx(result.no_step_up.invested, 2_000.0);
        assert_approx(result.no_step_up.gains, 310.0);
        assert_approx(result.no_step_up.maturity(), 2_310.0);
    }

    #[test]
    fn amount_step_up_is_linear_per_step_event() {
        let inputs = PlanInputs {
            investment_amount: 1_000.0,
            investment_frequency: InvestmentFrequency::HalfYearly,
            accumulation_phase_years: 2,
            step_up_mode: StepUpMode::Amount,
            step_up: StepUpConfig {
                percent: 50.0,
                amount: 100.0,
            },
            step_up_frequency: InvestmentFrequency::Yearly,
            expected_growth_percent: 0.0,
            investment_tenure_years: 2,
        };

        // Periods pay 1000, 1000, 1100, 1100.
        let result = run_projection(&inputs);
        assert_approx(result.step_up.invested, 4_200.0);
        assert_approx(result.no_step_up.invested, 4_000.0);
        assert_approx(result.step_up.gains, 0.0);
    }

    #[test]
    fn step_up_every_period_starts_after_period_zero() {
        let inputs = PlanInputs {
            investment_amount: 100.0,
            investment_frequency: InvestmentFrequency::Quarterly,
            accumulation_phase_years: 1,
            step_up_mode: StepUpMode::Amount,
            step_up: StepUpConfig {
                percent: 0.0,
                amount: 10.0,
            },
            step_up_frequency: InvestmentFrequency::Quarterly,
            expected_growth_percent: 0.0,
            investment_tenure_years: 1,
        };

        // 100, 110, 120, 130.
        let result = run_projection(&inputs);
        assert_approx(result.step_up.invested, 460.0);
        assert_approx(period_contribution(&inputs, 0), 100.0);
        assert_approx(period_contribution(&inputs, 3), 130.0);
    }

    #[test]
    fn growth_phase_compounds_frozen_principal() {
        let inputs = yearly_inputs(1_000.0, 10.0, 1, 3);
        let result = run_projection(&inputs);
        assert_approx(result.no_step_up.invested, 1_000.0);
        assert_approx(result.no_step_up.gains, 331.0);
        assert_approx(result.no_step_up.maturity(), 1_331.0);
        assert_eq!(result.no_step_up.rounded().maturity_amount, 1_331);
    }

    #[test]
    fn phase_equal_to_tenure_skips_growth_phase() {
        let mut inputs = sample_inputs();
        inputs.accumulation_phase_years = 5;
        inputs.investment_tenure_years = 5;
        assert_eq!(inputs.growth_periods(), 0);

        let result = run_projection(&inputs);
        let trace = run_yearly_trace(&inputs);
        assert_eq!(trace.len(), 5);
        assert!(trace.iter().all(|year| year.phase == PlanPhase::Accumulation));
        let last = trace.last().expect("five years traced");
        assert_eq!(last.invested, result.step_up.invested);
        assert_eq!(last.gains, result.step_up.gains);
    }

    #[test]
    fn zero_percent_step_up_equals_baseline() {
        let mut inputs = sample_inputs();
        inputs.step_up.percent = 0.0;
        let result = run_projection(&inputs);
        assert_eq!(result.step_up, result.no_step_up);
    }

    #[test]
    fn inactive_magnitude_is_ignored() {
        let mut inputs = sample_inputs();
        inputs.step_up_mode = StepUpMode::Amount;
        inputs.step_up.amount = 0.0;
        inputs.step_up.percent = 50.0;
        let result = run_projection(&inputs);
        assert_eq!(result.step_up, result.no_step_up);
    }

    #[test]
    fn rounding_uses_unrounded_components() {
        let totals = TrackTotals {
            invested: 100.4,
            gains: 200.4,
        };
        let rounded = totals.rounded();
        assert_eq!(rounded.invested_amount, 100);
        assert_eq!(rounded.estimated_gains, 200);
        assert_eq!(rounded.maturity_amount, 301);
    }

    #[test]
    fn yearly_trace_marks_growth_years_and_freezes_invested() {
        let inputs = yearly_inputs(1_000.0, 10.0, 1, 3);
        let trace = run_yearly_trace(&inputs);
        assert_eq!(trace.len(), 3);
        assert_eq!(trace[0].phase, PlanPhase::Accumulation);
        assert_eq!(trace[1].phase, PlanPhase::Growth);
        assert_eq!(trace[2].year, 3);
        assert_approx(trace[0].no_step_up_gains, 100.0);
        assert_approx(trace[1].no_step_up_gains, 210.0);
        assert_approx(trace[2].no_step_up_gains, 331.0);
        assert!(trace.iter().all(|year| year.no_step_up_invested == 1_000.0));
    }

    #[test]
    fn monthly_trace_has_one_row_per_year() {
        let mut inputs = sample_inputs();
        inputs.investment_tenure_years = 15;
        let trace = run_yearly_trace(&inputs);
        let years: Vec<u32> = trace.iter().map(|year| year.year).collect();
        assert_eq!(years, (1..=15).collect::<Vec<_>>());
        assert_eq!(trace[9].phase, PlanPhase::Accumulation);
        assert_eq!(trace[10].phase, PlanPhase::Growth);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_totals_are_finite_and_non_negative(
            (investment_frequency, step_up_frequency) in frequency_pair(),
            amount in 100u32..50_000,
            phase in 1u32..30,
            tenure_extra in 0u32..15,
            growth in 1u32..30,
            percent_mode in proptest::bool::ANY,
            step_up_value in 0u32..50,
        ) {
            let inputs = PlanInputs {
                investment_amount: f64::from(amount),
                investment_frequency,
                accumulation_phase_years: phase,
                step_up_mode: if percent_mode { StepUpMode::Percent } else { StepUpMode::Amount },
                step_up: StepUpConfig {
                    percent: f64::from(step_up_value),
                    amount: f64::from(step_up_value) * 10.0,
                },
                step_up_frequency,
                expected_growth_percent: f64::from(growth),
                investment_tenure_years: phase + tenure_extra,
            };

            let result = run_projection(&inputs);
            for totals in [result.step_up, result.no_step_up] {
                prop_assert!(totals.invested.is_finite() && totals.invested >= 0.0);
                prop_assert!(totals.gains.is_finite() && totals.gains >= 0.0);
            }
            prop_assert!(result.step_up.invested >= result.no_step_up.invested);

            let expected_baseline = f64::from(amount)
                * f64::from(phase * investment_frequency.periods_per_year());
            prop_assert!((result.no_step_up.invested - expected_baseline).abs() < 1e-6);
        }

        #[test]
        fn prop_zero_step_up_matches_baseline(
            (investment_frequency, step_up_frequency) in frequency_pair(),
            phase in 1u32..25,
            tenure_extra in 0u32..10,
            percent_mode in proptest::bool::ANY,
        ) {
            let inputs = PlanInputs {
                investment_frequency,
                step_up_frequency,
                accumulation_phase_years: phase,
                investment_tenure_years: phase + tenure_extra,
                step_up_mode: if percent_mode { StepUpMode::Percent } else { StepUpMode::Amount },
                step_up: StepUpConfig { percent: 0.0, amount: 0.0 },
                ..sample_inputs()
            };
            let result = run_projection(&inputs);
            prop_assert_eq!(result.step_up, result.no_step_up);
        }

        #[test]
        fn prop_higher_growth_never_lowers_gains(
            (investment_frequency, step_up_frequency) in frequency_pair(),
            phase in 1u32..20,
            tenure_extra in 0u32..10,
            growth in 1u32..25,
            bump in 0u32..10,
        ) {
            let low = PlanInputs {
                investment_frequency,
                step_up_frequency,
                accumulation_phase_years: phase,
                investment_tenure_years: phase + tenure_extra,
                expected_growth_percent: f64::from(growth),
                ..sample_inputs()
            };
            let high = PlanInputs {
                expected_growth_percent: f64::from(growth + bump),
                ..low
            };
            let low = run_projection(&low);
            let high = run_projection(&high);
            prop_assert!(high.step_up.gains >= low.step_up.gains);
            prop_assert!(high.no_step_up.gains >= low.no_step_up.gains);
        }

        #[test]
        fn prop_trace_ends_at_projection_totals(
            (investment_frequency, step_up_frequency) in frequency_pair(),
            phase in 1u32..15,
            tenure_extra in 0u32..10,
        ) {
            let inputs = PlanInputs {
                investment_frequency,
                step_up_frequency,
                accumulation_phase_years: phase,
                investment_tenure_years: phase + tenure_extra,
                ..sample_inputs()
            };
            let result = run_projection(&inputs);
            let trace = run_yearly_trace(&inputs);
            prop_assert_eq!(trace.len() as u32, inputs.investment_tenure_years);
            let last = trace[trace.len() - 1];
            prop_assert_eq!(last.invested, result.step_up.invested);
            prop_assert_eq!(last.gains, result.step_up.gains);
            prop_assert_eq!(last.no_step_up_gains, result.no_step_up.gains);
        }
    }
}
