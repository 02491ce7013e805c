use std::net::IpAddr;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sip::api::{
    ProjectionPayload, ProjectionResponse, build_projection_response, inputs_from_payload,
    render_json, run_http_server,
};
use sip::config::ServerConfig;
use sip::core::{InvestmentFrequency, RoundedTotals, StepUpMode};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFrequency {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl From<CliFrequency> for InvestmentFrequency {
    fn from(value: CliFrequency) -> Self {
        match value {
            CliFrequency::Monthly => InvestmentFrequency::Monthly,
            CliFrequency::Quarterly => InvestmentFrequency::Quarterly,
            CliFrequency::HalfYearly => InvestmentFrequency::HalfYearly,
            CliFrequency::Yearly => InvestmentFrequency::Yearly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStepUpMode {
    Percent,
    Amount,
}

impl From<CliStepUpMode> for StepUpMode {
    fn from(value: CliStepUpMode) -> Self {
        match value {
            CliStepUpMode::Percent => StepUpMode::Percent,
            CliStepUpMode::Amount => StepUpMode::Amount,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "sip",
    about = "Systematic Investment Plan calculator (step-up vs flat contributions)"
)]
struct Cli {
    #[arg(short, long, global = true, help = "Log at debug level")]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the calculator form and JSON API
    Serve {
        #[arg(long, help = "Bind address, defaults to $SIP_HOST or 0.0.0.0")]
        host: Option<IpAddr>,
        #[arg(long, help = "Port, defaults to $SIP_PORT or 8080")]
        port: Option<u16>,
    },
    /// Print a projection for the given plan
    Project(ProjectArgs),
}

// Unset flags keep the calculator defaults; values are coerced like form edits.
#[derive(Args, Debug)]
struct ProjectArgs {
    #[arg(long, help = "Contribution per period (min 100)")]
    investment_amount: Option<f64>,
    #[arg(long, value_enum)]
    investment_frequency: Option<CliFrequency>,
    #[arg(long, help = "Years of contributions (min 1)")]
    accumulation_phase: Option<f64>,
    #[arg(long, value_enum)]
    step_up_mode: Option<CliStepUpMode>,
    #[arg(long, help = "Step-up per event in percent")]
    step_up_percent: Option<f64>,
    #[arg(long, help = "Step-up per event as a flat amount")]
    step_up_amount: Option<f64>,
    #[arg(long, value_enum)]
    step_up_frequency: Option<CliFrequency>,
    #[arg(long, help = "Expected annual growth in percent (min 1)")]
    expected_growth: Option<f64>,
    #[arg(long, help = "Total years including the growth-only phase (min 1)")]
    investment_tenure: Option<f64>,
    #[arg(long, help = "Print the full JSON response")]
    json: bool,
}

impl From<&ProjectArgs> for ProjectionPayload {
    fn from(args: &ProjectArgs) -> Self {
        ProjectionPayload {
            investment_amount: args.investment_amount.map(Into::into),
            investment_frequency: args.investment_frequency.map(Into::into),
            accumulation_phase_years: args.accumulation_phase.map(Into::into),
            step_up_mode: args.step_up_mode.map(Into::into),
            step_up_percent: args.step_up_percent.map(Into::into),
            step_up_amount: args.step_up_amount.map(Into::into),
            step_up_frequency: args.step_up_frequency.map(Into::into),
            expected_growth_percent: args.expected_growth.map(Into::into),
            investment_tenure_years: args.investment_tenure.map(Into::into),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Serve { host, port } => {
            let config = ServerConfig::resolve(host, port)?;
            run_http_server(config).await?;
        }
        Command::Project(args) => {
            let inputs = inputs_from_payload(ProjectionPayload::from(&args));
            let response = build_projection_response(inputs);
            if args.json {
                println!("{}", render_json(&response)?);
            } else {
                print_summary(&response);
            }
        }
    }
    Ok(())
}

fn print_summary(response: &ProjectionResponse) {
    let inputs = &response.inputs;
    let step_up = match inputs.step_up_mode {
        StepUpMode::Percent => format!("{}%", inputs.step_up.percent),
        StepUpMode::Amount => format!("{}", inputs.step_up.amount),
    };
    println!(
        "{} {} for {} years (step-up {} {}), {}% p.a., tenure {} years",
        inputs.investment_amount,
        inputs.investment_frequency.label(),
        inputs.accumulation_phase_years,
        step_up,
        inputs.step_up_frequency.label(),
        inputs.expected_growth_percent,
        inputs.investment_tenure_years,
    );
    println!();
    println!("{:<12} {:>16} {:>16} {:>16}", "", "Invested", "Gains", "Maturity");
    print_row("Step-Up", &response.step_up);
    print_row("No Step-Up", &response.no_step_up);
}

fn print_row(label: &str, totals: &RoundedTotals) {
    println!(
        "{:<12} {:>16} {:>16} {:>16}",
        label, totals.invested_amount, totals.estimated_gains, totals.maturity_amount
    );
}
