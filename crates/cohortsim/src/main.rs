use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cohortsim::{
    OutputFormat, RunReport, init_logging, load_scenario_or_default, render_run, render_tornado,
    scenario_to_yaml,
};
use cohortsim_core::{
    OutcomeMetric, SensitivityProgress, evaluate_with_options, one_way_sensitivity,
};
use color_eyre::eyre::WrapErr;

#[derive(Parser, Debug)]
#[command(name = "cohortsim")]
#[command(about = "Markov cohort model with one-way sensitivity analysis")]
struct Args {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate the base case and print outcomes and the cohort trace
    Run {
        /// Scenario YAML file (default: reference scenario)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Run the one-way sensitivity analysis and print the tornado table
    Tornado {
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Outcome to record (default: the scenario's metric)
        #[arg(short, long, value_enum)]
        metric: Option<MetricArg>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Order rows by descending swing instead of input order
        #[arg(long)]
        sorted: bool,
    },
    /// Print the effective scenario as YAML
    Scenario {
        #[arg(short, long)]
        scenario: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    Cost,
    Utility,
    LifeExpectancy,
}

impl From<MetricArg> for OutcomeMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Cost => OutcomeMetric::DiscountedCost,
            MetricArg::Utility => OutcomeMetric::DiscountedUtility,
            MetricArg::LifeExpectancy => OutcomeMetric::LifeExpectancy,
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level)?;

    let output = match args.command {
        Command::Run { scenario, format } => {
            let scenario = load_scenario_or_default(scenario.as_deref())?;
            let eval = evaluate_with_options(&scenario.parameters, &scenario.trace)
                .wrap_err("Model evaluation failed")?;
            if !eval.drift().is_clean() {
                tracing::warn!(
                    events = eval.drift().events.len(),
                    max_deviation = eval.drift().max_deviation,
                    "Cohort trace drifted beyond tolerance"
                );
            }
            render_run(&RunReport::new(&scenario, &eval)?, format)?
        }
        Command::Tornado {
            scenario,
            metric,
            format,
            sorted,
        } => {
            let scenario = load_scenario_or_default(scenario.as_deref())?;
            let mut config = scenario.sensitivity_config();
            if let Some(metric) = metric {
                config.metric = metric.into();
            }
            let progress = SensitivityProgress::new(config.total_evaluations());
            let table = one_way_sensitivity(&scenario.parameters, &config, Some(&progress))
                .wrap_err("Sensitivity analysis failed")?;
            tracing::info!(
                evaluations = progress.completed(),
                rows = table.len(),
                "Tornado table ready"
            );
            render_tornado(&table, format, sorted)?
        }
        Command::Scenario { scenario } => {
            scenario_to_yaml(&load_scenario_or_default(scenario.as_deref())?)?
        }
    };

    print!("{output}");
    Ok(())
}
