//! Goal projection CLI
//!
//! Projects a capital ledger, solves for goal quantities, or runs the full
//! goal analysis (scenarios, sensitivity, stress, Monte Carlo).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use goal_projection::{
    CompoundingCalculator, EngineConfig, FixedCapital, Goal, GoalAnalysis, GoalAnalyzer, JsonLinesSink,
    MarketCondition, MarketContext, MemorySink, ProjectionParameters, SeededRandom, StaticMarket,
};

#[derive(Parser, Debug)]
#[command(name = "goal-projection")]
#[command(about = "Savings goal projection and risk analysis")]
struct Cli {
    /// Engine configuration overrides (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Replace the stress library with one loaded from CSV
    #[arg(long, global = true)]
    stress_csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project the monthly capital ledger
    Project {
        #[command(flatten)]
        params: ParamArgs,

        /// Write the full ledger to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Ledger rows to print
        #[arg(long, default_value_t = 12)]
        rows: usize,
    },
    /// Solve for a goal quantity
    #[command(subcommand)]
    Solve(SolveCommand),
    /// Run the full analysis for a goal described in a JSON file
    Analyze {
        goal: PathBuf,

        /// Current capital
        #[arg(long, default_value_t = 0.0)]
        capital: f64,

        #[arg(long)]
        historical_performance: Option<f64>,

        #[arg(long)]
        volatility: Option<f64>,

        /// BULLISH, NEUTRAL or BEARISH
        #[arg(long)]
        market_condition: Option<String>,

        /// Analysis date (default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Monte Carlo seed (overrides the configured one)
        #[arg(long)]
        seed: Option<u64>,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,

        /// Also write stored rows as JSON lines to this file
        #[arg(long)]
        sink: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum SolveCommand {
    /// Monthly contribution needed to reach a target
    RequiredContribution {
        #[arg(long)]
        present_value: f64,
        #[arg(long)]
        target: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        months: u32,
        /// Inflate the target by the assumed inflation rate
        #[arg(long)]
        real: bool,
    },
    /// Months until the target is reached
    TimeToGoal {
        #[arg(long)]
        present_value: f64,
        #[arg(long)]
        target: f64,
        #[arg(long)]
        contribution: f64,
        #[arg(long)]
        rate: f64,
        /// Compare inflation-adjusted capital against the target
        #[arg(long)]
        real: bool,
    },
    /// Month in which cumulative growth covers cumulative contributions
    BreakEven {
        #[arg(long)]
        present_value: f64,
        #[arg(long)]
        contribution: f64,
        #[arg(long)]
        rate: f64,
    },
    /// Internal rate of return of an investment and its annual cash flows
    Irr {
        #[arg(long)]
        initial: f64,
        /// Comma-separated cash flows
        #[arg(long, value_delimiter = ',', required = true)]
        cash_flows: Vec<f64>,
    },
}

#[derive(Args, Debug)]
struct ParamArgs {
    #[arg(long)]
    present_value: f64,
    #[arg(long)]
    contribution: f64,
    /// Annual return, percent
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    months: u32,
    /// Annual inflation, percent
    #[arg(long)]
    inflation: Option<f64>,
    /// Annual contribution growth, percent
    #[arg(long)]
    contribution_growth: Option<f64>,
    /// Annual dividend yield, percent
    #[arg(long)]
    dividend_yield: Option<f64>,
    #[arg(long)]
    reinvest_dividends: bool,
}

impl ParamArgs {
    fn to_params(&self) -> ProjectionParameters {
        let mut params = ProjectionParameters::new(self.present_value, self.contribution, self.rate, self.months);
        params.inflation_rate = self.inflation;
        params.contribution_growth_rate = self.contribution_growth;
        params.dividend_yield = self.dividend_yield;
        params.reinvest_dividends = self.reinvest_dividends;
        params
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_path(path)?,
        None => EngineConfig::default(),
    };
    if let Some(path) = &cli.stress_csv {
        config = config.with_stress_csv(path)?;
    }

    match cli.command {
        Command::Project { params, csv, rows } => run_project(&config, &params.to_params(), csv, rows),
        Command::Solve(command) => run_solve(&config, command),
        Command::Analyze {
            goal,
            capital,
            historical_performance,
            volatility,
            market_condition,
            as_of,
            seed,
            json,
            sink,
        } => {
            let goal: Goal = serde_json::from_reader(
                File::open(&goal).with_context(|| format!("Failed to open goal file {}", goal.display()))?,
            )
            .context("Failed to parse goal JSON")?;
            let market = MarketContext {
                historical_performance,
                volatility_factor: volatility,
                market_condition: market_condition.as_deref().map(MarketCondition::classify),
            };
            let as_of = as_of.unwrap_or_else(|| chrono::Local::now().date_naive());
            let mut rng = SeededRandom::from_option(seed.or(config.monte_carlo.seed));

            let analyzer = GoalAnalyzer::new(config, FixedCapital(capital), StaticMarket(market));
            let analysis = match sink {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create sink file {}", path.display()))?;
                    let mut sink = JsonLinesSink::new(BufWriter::new(file));
                    let analysis = analyzer.analyze(&goal, as_of, &mut rng, &mut sink)?;
                    sink.into_inner().flush()?;
                    analysis
                }
                None => analyzer.analyze(&goal, as_of, &mut rng, &mut MemorySink::default())?,
            };

            if json {
                serde_json::to_writer_pretty(io::stdout().lock(), &analysis)?;
                println!();
            } else {
                print_analysis(&analysis);
            }
            Ok(())
        }
    }
}

fn run_project(
    config: &EngineConfig,
    params: &ProjectionParameters,
    csv_path: Option<PathBuf>,
    rows: usize,
) -> anyhow::Result<()> {
    let calculator = CompoundingCalculator::new(config.solver);
    let result = calculator.calculate_future_value(params)?;

    println!(
        "{:>5} {:>14} {:>12} {:>12} {:>10} {:>14} {:>14}",
        "Month", "Capital BOP", "Contrib", "Growth", "Dividends", "Capital EOP", "Real"
    );
    println!("{}", "-".repeat(87));
    for row in result.ledger.iter().take(rows) {
        println!(
            "{:>5} {:>14.2} {:>12.2} {:>12.2} {:>10.2} {:>14.2} {:>14.2}",
            row.month, row.capital_before, row.contribution, row.growth, row.dividends, row.capital_after, row.real_value
        );
    }
    if result.ledger.len() > rows {
        println!("... ({} more months)", result.ledger.len() - rows);
    }

    if let Some(path) = csv_path {
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
        for row in &result.ledger {
            writer.serialize(row)?;
        }
        writer.flush()?;
        println!("\nFull ledger written to: {}", path.display());
    }

    let summary = result.summary(params.present_value);
    println!("\nSummary:");
    println!("  Future value:        {:.2}", result.future_value);
    println!("  Real future value:   {:.2}", result.real_future_value);
    println!("  Total contributions: {:.2}", result.total_contributions);
    println!("  Total growth:        {:.2}", result.total_growth);
    println!("  Total dividends:     {:.2}", result.total_dividends);
    println!("  Effective return:    {:.4}%", result.effective_annual_return);
    println!("  Real return:         {:.4}%", result.real_annual_return);
    println!("  Gain multiple:       {:.4}", summary.gain_multiple);
    Ok(())
}

fn run_solve(config: &EngineConfig, command: SolveCommand) -> anyhow::Result<()> {
    let calculator = CompoundingCalculator::new(config.solver);

    match command {
        SolveCommand::RequiredContribution { present_value, target, rate, months, real } => {
            let contribution =
                calculator.calculate_required_contribution(present_value, target, rate, months, real)?;
            println!("Required monthly contribution: {:.2}", contribution);
        }
        SolveCommand::TimeToGoal { present_value, target, contribution, rate, real } => {
            let time = calculator.calculate_time_to_goal(present_value, target, contribution, rate, real)?;
            println!("Time to goal: {} months ({:.2} years)", time.months, time.years);
        }
        SolveCommand::BreakEven { present_value, contribution, rate } => {
            let be = calculator.calculate_break_even(present_value, contribution, rate)?;
            println!(
                "Break-even at month {}: growth {:.2} vs contributions {:.2} (capital {:.2})",
                be.months, be.cumulative_growth, be.cumulative_contributions, be.capital
            );
        }
        SolveCommand::Irr { initial, cash_flows } => {
            let irr = calculator.calculate_irr(initial, &cash_flows)?;
            println!("IRR: {:.4}%", irr);
        }
    }
    Ok(())
}

fn print_analysis(analysis: &GoalAnalysis) {
    println!("Goal {} as of {}", analysis.goal_id, analysis.analysis_date);
    println!(
        "  Capital: {:.2}{}",
        analysis.current_capital,
        if analysis.capital_fallback { " (fallback)" } else { "" }
    );
    println!(
        "  Rate: {:.2}% -> {:.2}% (confidence {:.0})",
        analysis.adjustment.original_rate, analysis.adjustment.adjusted_rate, analysis.adjustment.confidence_score
    );
    println!("  {}", analysis.adjustment.rationale);

    println!("\nScenarios ({} months):", analysis.parameters.periods);
    for scenario in &analysis.scenarios.scenarios {
        println!(
            "  {:<12} FV {:>14.2}  real {:>14.2}  confidence {:>3.0}",
            scenario.kind.name(),
            scenario.result.future_value,
            scenario.result.real_future_value,
            scenario.confidence
        );
    }

    let mc = &analysis.scenarios.monte_carlo;
    println!("\nMonte Carlo ({} trials, real values):", mc.iterations);
    println!(
        "  p10 {:.2}  p50 {:.2}  p90 {:.2}",
        mc.percentiles.p10, mc.percentiles.p50, mc.percentiles.p90
    );
    println!(
        "  VaR95 {:.2}  ES95 {:.2}  CV {:.4}",
        mc.volatility.var_95, mc.volatility.expected_shortfall_95, mc.volatility.coefficient_of_variation
    );
    if let (Some(probability), Some(shortfall)) = (mc.success_probability, mc.expected_shortfall) {
        println!("  Success probability {:.1}%, expected shortfall {:.2}", probability, shortfall);
    }

    let summary = &analysis.sensitivity.summary;
    println!("\nSensitivity: average impact {:.2}% ({:?})", summary.average_impact, summary.risk_rating);
    if let Some(most) = summary.most_sensitive {
        println!("  Most sensitive: {}", most);
    }

    println!("\nStress scenarios:");
    for outcome in &analysis.stress.outcomes {
        match outcome.result.completed() {
            Some(result) => println!(
                "  {:<20} {:?}  real {:>14.2}",
                outcome.scenario.name, outcome.scenario.severity, result.real_future_value
            ),
            None => println!("  {:<20} failed", outcome.scenario.name),
        }
    }

    if let Some(required) = analysis.required_contribution.as_ref().and_then(|o| o.completed()) {
        println!("\nRequired contribution: {:.2}", required);
    }
    if let Some(time) = analysis.time_to_goal.as_ref().and_then(|o| o.completed()) {
        println!("Time to goal: {} months", time.months);
    }

    println!();
    for note in &analysis.correlation_notes {
        println!("  {}", note);
    }
}
