//! line-sim - headless production line runner
//!
//! Runs a scenario for a number of ticks and prints a summary.
//!
//! # Usage
//!
//! ```bash
//! # Run the jidoka step for 5000 ticks
//! line-sim --scenario step-4 --ticks 5000
//!
//! # Custom line from JSON, market changes on ticks 1000 and 3000
//! line-sim --config-file line.json --market-change-at 1000 --market-change-at 3000
//!
//! # Machine-readable summary
//! line-sim --scenario playground --seed 7 --json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use line_simulator_core_rs::config::presets::ScenarioId;
use line_simulator_core_rs::config::{LineConfig, SimConfig};
use line_simulator_core_rs::costs::CumulativePl;
use line_simulator_core_rs::engine::TickInputs;
use line_simulator_core_rs::metrics::{
    get_idle_blocked_percent, get_lead_time_avg, get_measured_defect_percent, get_wip,
};
use line_simulator_core_rs::orchestrator::{compute_config_hash, state_digest, SimRunner};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

// =============================================================================
// Constants
// =============================================================================

/// Application name
pub const APP_NAME: &str = "line-sim";

/// Ticks run when `--ticks` is not given
pub const TICKS_DEFAULT: u64 = 2_000;

// =============================================================================
// CLI
// =============================================================================

/// Headless production line simulator
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(about = "Run a production line scenario and print a summary")]
#[command(version)]
struct Cli {
    /// Preset scenario (intro, step-1 .. step-8, playground)
    #[arg(short, long, default_value = "intro")]
    scenario: String,

    /// Line config JSON file; replaces the preset
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Override the sampler seed
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to run (fewer if the line goes bust or runs out of time)
    #[arg(short, long, default_value_t = TICKS_DEFAULT)]
    ticks: u64,

    /// Request a market change on this tick (repeatable)
    #[arg(long = "market-change-at")]
    market_change_at: Vec<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// =============================================================================
// Summary
// =============================================================================

#[derive(Debug, Serialize)]
struct Summary {
    scenario: Option<ScenarioId>,
    seed: u64,
    ticks_run: u64,
    display_months: f64,
    bust: bool,
    ended: bool,
    completed: u64,
    defects_shipped: u64,
    rejected: u64,
    rejected_at_end: u64,
    wip: usize,
    lead_time_avg_ms: f64,
    measured_defect_percent: f64,
    idle_percent: f64,
    blocked_percent: f64,
    market_changes: usize,
    manager_rejections: usize,
    pl: Option<CumulativePl>,
    config_hash: String,
    state_digest: String,
}

impl Summary {
    fn collect(runner: &SimRunner, ticks_run: u64) -> Result<Self> {
        let state = runner.state();
        let config = runner.config();
        let idle_blocked = get_idle_blocked_percent(state, config);
        let log = runner.event_log();

        Ok(Self {
            scenario: runner.scenario(),
            seed: config.seed(),
            ticks_run,
            display_months: config.clock().display_months(state.tick()),
            bust: state.is_bust(),
            ended: state.ended(),
            completed: state.total_completed(),
            defects_shipped: state.total_defective_shipped(),
            rejected: state.total_rejected(),
            rejected_at_end: state.rejected_at_end_count(),
            wip: get_wip(state),
            lead_time_avg_ms: get_lead_time_avg(state, config),
            measured_defect_percent: get_measured_defect_percent(state),
            idle_percent: idle_blocked.idle_percent,
            blocked_percent: idle_blocked.blocked_percent,
            market_changes: log.count_of_type("marketChangeTriggered"),
            manager_rejections: log.count_of_type("managerRejected"),
            pl: runner.latest_cumulative().cloned(),
            config_hash: compute_config_hash(config.line())?,
            state_digest: state_digest(state)?,
        })
    }

    fn print(&self) {
        let scenario = self
            .scenario
            .map_or_else(|| "custom".to_string(), |s| format!("{} ({})", s, s.label()));
        println!("scenario        {}", scenario);
        println!("seed            {}", self.seed);
        println!("ticks           {} ({:.1} months)", self.ticks_run, self.display_months);
        if self.bust {
            println!("status          BUST");
        } else if self.ended {
            println!("status          time up");
        }
        println!("completed       {}", self.completed);
        println!("defects shipped {}", self.defects_shipped);
        println!("rejected        {} ({} at end)", self.rejected, self.rejected_at_end);
        println!("wip             {}", self.wip);
        println!("lead time       {:.0} ms", self.lead_time_avg_ms);
        println!("defect rate     {:.1}%", self.measured_defect_percent);
        println!("idle / blocked  {:.1}% / {:.1}%", self.idle_percent, self.blocked_percent);
        println!("market changes  {}", self.market_changes);
        if let Some(pl) = &self.pl {
            println!("avg wip         {:.1}", pl.average_wip());
            println!("revenue         {}", pl.cumulative_revenue);
            println!("profit          {}", pl.cumulative_profit);
        }
        println!("config hash     {}", self.config_hash);
        println!("state digest    {}", self.state_digest);
    }
}

// =============================================================================
// Main
// =============================================================================

fn load_runner(cli: &Cli) -> Result<SimRunner> {
    let mut runner = match &cli.config_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let line: LineConfig = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display()))?;
            SimRunner::new(SimConfig::resolve(line)?)
        }
        None => {
            let scenario: ScenarioId = cli.scenario.parse()?;
            SimRunner::from_scenario(scenario)?
        }
    };

    if let Some(seed) = cli.seed {
        let mut line = runner.config().line().clone();
        line.seed = seed;
        runner.update_config(line)?;
    }
    Ok(runner)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut runner = load_runner(&cli)?;
    let market_ticks: BTreeSet<u64> = cli.market_change_at.iter().copied().collect();

    tracing::info!(
        scenario = ?runner.scenario(),
        seed = runner.config().seed(),
        ticks = cli.ticks,
        "starting run"
    );

    let mut ticks_run = 0;
    while ticks_run < cli.ticks {
        if market_ticks.contains(&(runner.state().tick() + 1)) {
            runner.request_market_change();
        }
        if runner.step(TickInputs::default()).is_none() {
            break;
        }
        ticks_run += 1;
    }

    let summary = Summary::collect(&runner, ticks_run)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
    }
    Ok(())
}
