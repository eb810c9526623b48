use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use mr_controls::ControllerKind;
use mr_project::{Scenario, build_config};
use mr_results::{RunManifest, RunStore, SOLVER_VERSION, compute_run_id};
use mr_sim::{
    DEFAULT_CHATTER_WINDOW_S, DemandProfile, RunMetrics, RunOutcome, SimConfig, Simulation,
    compute_metrics, grid, run_sweep,
};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] mr_project::ProjectError),

    #[error(transparent)]
    Sim(#[from] mr_sim::SimError),

    #[error(transparent)]
    Results(#[from] mr_results::ResultsError),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("run aborted at t = {time_s:.3} s: {message}")]
    RunAborted { time_s: f64, message: String },
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "mr-cli")]
#[command(about = "Microreactor control-drum load-following simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario file
    Validate {
        /// Path to the scenario (YAML or JSON)
        scenario_path: PathBuf,
    },
    /// Run a scenario file
    Run {
        /// Path to the scenario (YAML or JSON)
        scenario_path: PathBuf,
        /// Write the trace as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Save manifest and trace into this run store directory
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Run a built-in preset
    Preset {
        /// Controller: pid or stc
        #[arg(long, default_value = "stc")]
        controller: ControllerKind,
        /// Number of drums (1, 2, 4 or 8)
        #[arg(long, default_value_t = 8)]
        drums: usize,
        /// Demand profile: constant, step, ramp, multi_step, load_follow
        #[arg(long, default_value = "step")]
        profile: DemandProfile,
        /// End time in seconds (defaults to the profile's horizon)
        #[arg(long)]
        t_end: Option<f64>,
        /// Time step in seconds
        #[arg(long, default_value_t = 0.01)]
        dt: f64,
        /// Write the trace as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the preset as a scenario YAML instead of running it
        #[arg(long)]
        emit_scenario: bool,
    },
    /// Run a scenario across drum counts and controllers in parallel
    Sweep {
        /// Path to the scenario (YAML or JSON)
        scenario_path: PathBuf,
        /// Drum counts to sweep
        #[arg(long, value_delimiter = ',', default_value = "1,2,4,8")]
        drums: Vec<usize>,
        /// Controllers to sweep
        #[arg(long, value_delimiter = ',', default_value = "pid,stc")]
        controllers: Vec<ControllerKind>,
    },
    /// List runs saved in a run store
    Runs {
        /// Run store directory
        store: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            output,
            store,
        } => cmd_run(&scenario_path, output.as_deref(), store.as_deref()),
        Commands::Preset {
            controller,
            drums,
            profile,
            t_end,
            dt,
            output,
            emit_scenario,
        } => cmd_preset(
            controller,
            drums,
            profile,
            t_end,
            dt,
            output.as_deref(),
            emit_scenario,
        ),
        Commands::Sweep {
            scenario_path,
            drums,
            controllers,
        } => cmd_sweep(&scenario_path, &drums, &controllers),
        Commands::Runs { store } => cmd_runs(&store),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_scenario(path: &Path) -> CliResult<(Scenario, SimConfig)> {
    // `load` validates; `build_config` checks the resolved run.
    let scenario = mr_project::load(path)?;
    let config = build_config(&scenario)?;
    Ok((scenario, config))
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let (scenario, config) = load_scenario(scenario_path)?;
    println!("✓ Scenario '{}' is valid", scenario.name);
    println!(
        "  {} controller, {} drum(s), {} steps of {} s",
        config.controller.kind(),
        config.drums.count,
        config.steps(),
        config.dt_s
    );
    Ok(())
}

fn cmd_run(scenario_path: &Path, output: Option<&Path>, store: Option<&Path>) -> CliResult<()> {
    let (scenario, config) = load_scenario(scenario_path)?;
    println!("Running scenario: {}", scenario.name);

    let (outcome, metrics) = execute(config.clone())?;
    print_metrics(&metrics);

    if let Some(path) = output {
        mr_results::write_csv(path, &outcome.trace)?;
        println!("Trace written to {}", path.display());
    }

    if let Some(dir) = store {
        let run_id = compute_run_id(&scenario, SOLVER_VERSION);
        let manifest = RunManifest::new(
            run_id.clone(),
            &scenario.name,
            &config,
            &outcome,
            Some(metrics.clone()),
        );
        RunStore::new(dir.to_path_buf())?.save_run(&manifest, &outcome.trace)?;
        println!("Run saved: {run_id}");
    }

    check_outcome(&outcome)
}

fn cmd_preset(
    controller: ControllerKind,
    drums: usize,
    profile: DemandProfile,
    t_end: Option<f64>,
    dt: f64,
    output: Option<&Path>,
    emit_scenario: bool,
) -> CliResult<()> {
    let mut scenario = Scenario::preset(controller, drums, profile);
    scenario.run.dt_s = dt;
    if let Some(t_end) = t_end {
        scenario.run.horizon_s = t_end;
    }

    if emit_scenario {
        print!("{}", serde_yaml::to_string(&scenario)?);
        return Ok(());
    }

    let config = build_config(&scenario)?;
    println!("Running preset: {}", scenario.name);

    let (outcome, metrics) = execute(config)?;
    print_metrics(&metrics);

    if let Some(path) = output {
        mr_results::write_csv(path, &outcome.trace)?;
        println!("Trace written to {}", path.display());
    }

    check_outcome(&outcome)
}

fn cmd_sweep(
    scenario_path: &Path,
    drums: &[usize],
    controllers: &[ControllerKind],
) -> CliResult<()> {
    let (scenario, base) = load_scenario(scenario_path)?;
    let configs = grid(&base, drums, controllers)?;
    println!(
        "Sweeping '{}' over {} configuration(s)",
        scenario.name,
        configs.len()
    );

    let start = Instant::now();
    let results = run_sweep(&configs);
    println!("Completed in {:.2} s\n", start.elapsed().as_secs_f64());

    println!(
        "{:<16} {:>5} {:>10} {:>10} {:>10} {:>10} {:>10}  status",
        "controller", "drums", "IAE", "ITAE", "settle2%", "overshoot", "chatter"
    );
    for (cfg, result) in configs.iter().zip(results) {
        let label = cfg.controller.kind().to_string();
        match result {
            Ok(outcome) => {
                let m = compute_metrics(&outcome.trace, DEFAULT_CHATTER_WINDOW_S);
                let status = match &outcome.failure {
                    None => "ok".to_string(),
                    Some(f) => format!("aborted at {:.3} s", f.time_s),
                };
                println!(
                    "{:<16} {:>5} {:>10.4e} {:>10.4e} {:>10} {:>10} {:>10.3e}  {}",
                    label,
                    cfg.drums.count,
                    m.iae,
                    m.itae,
                    fmt_opt(m.settling_time_2pct_s, "s"),
                    fmt_opt(m.overshoot_pct, "%"),
                    m.chatter_amplitude,
                    status
                );
            }
            Err(err) => println!("{:<16} {:>5}  error: {}", label, cfg.drums.count, err),
        }
    }
    Ok(())
}

fn cmd_runs(store: &Path) -> CliResult<()> {
    let store = RunStore::new(store.to_path_buf())?;
    let runs = store.list_runs()?;

    if runs.is_empty() {
        println!("No runs found in {}", store.root().display());
    } else {
        println!("Runs in {}:", store.root().display());
        for manifest in runs {
            let status = if manifest.is_complete() {
                "complete"
            } else {
                "aborted"
            };
            println!(
                "  {} - {} ({} controller, {} drum(s), {} samples, {}) [{}]",
                &manifest.run_id[..manifest.run_id.len().min(12)],
                manifest.scenario_name,
                manifest.controller,
                manifest.drum_count,
                manifest.samples,
                status,
                manifest.timestamp
            );
        }
    }
    Ok(())
}

fn execute(config: SimConfig) -> CliResult<(RunOutcome, RunMetrics)> {
    let start = Instant::now();
    let outcome = Simulation::new(config)?.run();
    let elapsed = start.elapsed().as_secs_f64();

    println!(
        "✓ Simulated {} samples in {:.3} s",
        outcome.trace.len(),
        elapsed
    );
    let metrics = compute_metrics(&outcome.trace, DEFAULT_CHATTER_WINDOW_S);
    Ok((outcome, metrics))
}

fn check_outcome(outcome: &RunOutcome) -> CliResult<()> {
    match &outcome.failure {
        None => Ok(()),
        Some(f) => {
            tracing::warn!(step = f.step, "partial trace kept after plant failure");
            Err(CliError::RunAborted {
                time_s: f.time_s,
                message: f.error.to_string(),
            })
        }
    }
}

fn fmt_opt(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.2}{unit}"),
        None => "-".to_string(),
    }
}

fn print_metrics(m: &RunMetrics) {
    println!("\nMetrics:");
    println!("  MAE:              {:.4e}", m.mae);
    println!("  IAE:              {:.4e}", m.iae);
    println!("  ITAE:             {:.4e}", m.itae);
    println!("  ISE:              {:.4e}", m.ise);
    println!("  ITSE:             {:.4e}", m.itse);
    println!("  Max |error|:      {:.4e}", m.max_abs_error);
    println!("  Control effort:   {:.4e}", m.control_effort);
    println!(
        "  Settling (2%/1%): {} / {}",
        fmt_opt(m.settling_time_2pct_s, " s"),
        fmt_opt(m.settling_time_1pct_s, " s")
    );
    println!("  Overshoot:        {}", fmt_opt(m.overshoot_pct, " %"));
    println!("  Steady error:     {:.4e}", m.steady_state_error);
    println!(
        "  Saturation:       rate {:.1}%, angle {:.1}%",
        100.0 * m.rate_saturation_fraction,
        100.0 * m.angle_saturation_fraction
    );
    println!("  Chatter:          {:.4e}", m.chatter_amplitude);
}
