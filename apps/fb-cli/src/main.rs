use clap::{Parser, Subcommand, ValueEnum};
use fb_model::LinearBeamModel;
use fb_results::{
    ResponseDocument, RunKind, RunManifest, RunStore, ShapeFrameRecord, compute_run_id,
};
use fb_sim::run_response;
use std::path::{Path, PathBuf};
use std::time::Instant;

mod error;
mod scenario;

use error::CliResult;
use scenario::load_scenario;

/// Stamped into manifests and hashed into run ids; bump on solver changes
/// that alter results.
const SOLVER_VERSION: &str = "0.1.0";

#[derive(Parser)]
#[command(name = "fb-cli")]
#[command(about = "FlexBeam CLI - segmented beam transient response tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and physics
    Validate {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
    },
    /// Run the transient response and cache the result
    Simulate {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs for a scenario
    Runs {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export a cached run for plotting
    Export {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// Full response document: times, node x coordinates, shapes, tip series
    Json,
    /// Tip deflection series only
    Csv,
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Simulate {
            scenario_path,
            no_cache,
        } => cmd_simulate(&scenario_path, !no_cache),
        Commands::Runs { scenario_path } => cmd_runs(&scenario_path),
        Commands::ShowRun {
            scenario_path,
            run_id,
        } => cmd_show_run(&scenario_path, &run_id),
        Commands::Export {
            scenario_path,
            run_id,
            format,
            output,
        } => cmd_export(&scenario_path, &run_id, format, output.as_deref()),
    }
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = load_scenario(scenario_path)?;
    let table = scenario.segment_table()?;
    let model = LinearBeamModel::assemble(&table, scenario.damping())?;
    scenario.impulse(model.n_states())?;

    println!("✓ Scenario is valid");
    println!("  Segments: {}", table.n_segments());
    println!("  Span: {:.3} m", table.total_length_m());
    println!("  Model coordinates: {}", model.n_states());
    Ok(())
}

fn cmd_simulate(scenario_path: &Path, use_cache: bool) -> CliResult<()> {
    println!("Simulating scenario: {}", scenario_path.display());

    let started = Instant::now();
    let scenario = load_scenario(scenario_path)?;
    let table = scenario.segment_table()?;
    let load_s = started.elapsed().as_secs_f64();

    let opts = scenario.sim_options();
    let kind = RunKind::Response {
        t_final_s: opts.t_final_s,
        dt_report_s: opts.dt_report_s,
    };
    let run_id = compute_run_id(&scenario, &kind, SOLVER_VERSION);
    let store = RunStore::for_scenario(scenario_path)?;

    if use_cache && store.has_run(&run_id) {
        let manifest = store.load_manifest(&run_id)?;
        println!("✓ Loaded from cache: {}", run_id);
        println!("  Samples: {}", manifest.samples);
        println!("  Solver steps: {}", manifest.steps);
        return Ok(());
    }

    let assemble_started = Instant::now();
    let model = LinearBeamModel::assemble(&table, scenario.damping())?;
    let forcing = scenario.impulse(model.n_states())?;
    let assemble_s = assemble_started.elapsed().as_secs_f64();

    let solve_started = Instant::now();
    let response = run_response(&model, &table, forcing, &opts)?;
    let solve_s = solve_started.elapsed().as_secs_f64();

    let save_started = Instant::now();
    let frames: Vec<ShapeFrameRecord> = response
        .times_s
        .iter()
        .zip(response.y_m.iter())
        .zip(response.tip_y_m.iter())
        .map(|((&time_s, y), &tip_y_m)| ShapeFrameRecord {
            time_s,
            y_m: y.clone(),
            tip_y_m,
        })
        .collect();
    let manifest = RunManifest {
        run_id: run_id.clone(),
        scenario_name: scenario.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        solver_version: SOLVER_VERSION.to_string(),
        kind,
        samples: frames.len(),
        steps: response.stats.steps,
        x_m: response.x_m.clone(),
    };
    store.save_run(&manifest, &frames)?;
    let save_s = save_started.elapsed().as_secs_f64();

    println!("✓ Simulation completed: {}", run_id);
    print_timing_summary(
        load_s,
        assemble_s,
        solve_s,
        save_s,
        started.elapsed().as_secs_f64(),
    );

    let peak = response.tip_y_m.iter().fold(0.0f64, |acc, &y| acc.max(y.abs()));
    println!("  Samples: {}", frames.len());
    println!(
        "  Steps: {} ({} accepted, {} rejected)",
        response.stats.steps, response.stats.accepted, response.stats.rejected
    );
    println!("  Peak tip deflection: {:.3e} m", peak);

    Ok(())
}

fn print_timing_summary(load_s: f64, assemble_s: f64, solve_s: f64, save_s: f64, total_s: f64) {
    let total = total_s.max(1.0e-12);
    let load_pct = 100.0 * load_s / total;
    let assemble_pct = 100.0 * assemble_s / total;
    let solve_pct = 100.0 * solve_s / total;
    let save_pct = 100.0 * save_s / total;

    println!("\nTiming summary:");
    println!("  Load:     {:.3}s ({:.1}%)", load_s, load_pct);
    println!("  Assemble: {:.3}s ({:.1}%)", assemble_s, assemble_pct);
    println!("  Solve:    {:.3}s ({:.1}%)", solve_s, solve_pct);
    println!("  Save:     {:.3}s ({:.1}%)", save_s, save_pct);
    println!("  Total:    {:.3}s", total_s);
}

fn cmd_runs(scenario_path: &Path) -> CliResult<()> {
    let scenario = load_scenario(scenario_path)?;
    let store = RunStore::for_scenario(scenario_path)?;
    let mut runs = store.list_runs(&scenario.name)?;
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)); // Most recent first

    if runs.is_empty() {
        println!("No cached runs found for scenario: {}", scenario.name);
    } else {
        println!("Cached runs for scenario '{}':", scenario.name);
        for manifest in runs {
            println!("  {} ({})", manifest.run_id, manifest.timestamp);
        }
    }
    Ok(())
}

fn cmd_show_run(scenario_path: &Path, run_id: &str) -> CliResult<()> {
    println!("Loading run: {}", run_id);

    let store = RunStore::for_scenario(scenario_path)?;
    let manifest = store.load_manifest(run_id)?;
    let frames = store.load_frames(run_id)?;

    let RunKind::Response {
        t_final_s,
        dt_report_s,
    } = manifest.kind;
    let peak = frames.iter().fold(0.0f64, |acc, f| acc.max(f.tip_y_m.abs()));

    println!("\nRun Summary:");
    println!("  Scenario: {}", manifest.scenario_name);
    println!("  Recorded: {}", manifest.timestamp);
    println!("  Window: {:.3} s at {:.3} s per sample", t_final_s, dt_report_s);
    println!("  Samples: {}", frames.len());
    if let (Some(first), Some(last)) = (frames.first(), frames.last()) {
        println!("  Time range: {:.3} - {:.3} s", first.time_s, last.time_s);
    }
    println!("  Solver steps: {}", manifest.steps);
    println!("  Nodes: {}", manifest.x_m.len());
    println!("  Span: {:.3} m", manifest.x_m.last().copied().unwrap_or(0.0));
    println!("  Peak tip deflection: {:.3e} m", peak);

    Ok(())
}

fn cmd_export(
    scenario_path: &Path,
    run_id: &str,
    format: ExportFormat,
    output: Option<&Path>,
) -> CliResult<()> {
    let store = RunStore::for_scenario(scenario_path)?;
    let manifest = store.load_manifest(run_id)?;
    let frames = store.load_frames(run_id)?;

    let rendered = match format {
        ExportFormat::Json => {
            let doc = ResponseDocument::from_frames(&manifest.x_m, &frames);
            let mut text = serde_json::to_string_pretty(&doc)?;
            text.push('\n');
            text
        }
        ExportFormat::Csv => {
            let mut csv = String::from("time_s,tip_y_m\n");
            for frame in &frames {
                csv.push_str(&format!("{},{}\n", frame.time_s, frame.tip_y_m));
            }
            csv
        }
    };

    if let Some(path) = output {
        std::fs::write(path, rendered)?;
        println!("✓ Exported {} frames to {}", frames.len(), path.display());
    } else {
        print!("{}", rendered);
    }

    Ok(())
}
