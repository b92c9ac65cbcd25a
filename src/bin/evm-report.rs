use clap::Parser;
use evm_report::{
    EngineConfig, EvmEngine, ValidationMode, export_chart_data, load_snapshot,
    render::render_report,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Earned value health report for a project task sheet.
#[derive(Debug, Parser)]
#[command(name = "evm-report", version)]
struct Cli {
    /// Task sheet (CSV)
    #[arg(long, default_value = "project_data.csv")]
    tasks: PathBuf,

    /// Milestone document (JSON)
    #[arg(long)]
    milestones: Option<PathBuf>,

    /// Engine configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Active task count above which a resource is over-allocated
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<i64>,

    /// strict | lenient
    #[arg(long)]
    mode: Option<ValidationMode>,

    /// Print the report as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Write chart data (budget series, risk heatmap grid) into this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) -> Result<(), String> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("EVM_REPORT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| format!("failed to initialize tracing subscriber: {error}"))
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_from_json(path)?,
        None => EngineConfig::default(),
    };
    if let Some(threshold) = cli.threshold {
        config = config.with_threshold(threshold);
    }
    if let Some(mode) = cli.mode {
        config = config.with_mode(mode);
    }
    let engine = EvmEngine::new(config)?;

    let snapshot = load_snapshot(&cli.tasks, cli.milestones.as_ref())?;
    let report = engine.analyze(&snapshot)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_report(&report)?);
    }

    if let Some(dir) = &cli.export_dir {
        for path in export_chart_data(&report, dir)? {
            eprintln!("[INFO] Chart data saved as '{}'", path.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = init_tracing(cli.verbose) {
        eprintln!("{error}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
