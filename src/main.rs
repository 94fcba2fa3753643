use anyhow::{Context, Result};
use clap::Parser;
use morpheval::{
    evaluate_conf, DivByZeroStrat, EvalConfigBuilder, EvaluationError, Reporter, TheoryTable,
    DEFAULT_DIGITS,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scores predicted word segmentations against a gold annotation.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Gold annotation file
    #[arg(short, long)]
    gold: PathBuf,
    /// Predictions file, one segmented word per line
    #[arg(short, long)]
    pred: PathBuf,
    /// JSON theory table: `[[rule_id, total, outcome, ...], ...]`
    #[arg(short, long)]
    theories: PathBuf,
    /// Number of decimals of the report
    #[arg(short, long, default_value_t = DEFAULT_DIGITS)]
    digits: usize,
    /// replaceby0, replaceby1 or returnerror
    #[arg(short, long, default_value = "replaceby0")]
    zero_division: DivByZeroStrat,
    /// Compute the metrics on multiple cores
    #[arg(long)]
    parallel: bool,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn read(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read the {} file {:?}", what, path))
}

fn run(args: &Args) -> Result<Reporter> {
    let theories_file = fs::File::open(&args.theories)
        .with_context(|| format!("Failed to open the theories file {:?}", args.theories))?;
    let theories = TheoryTable::from_reader(std::io::BufReader::new(theories_file))
        .map_err(EvaluationError::from)
        .with_context(|| format!("Failed to load the theories from {:?}", args.theories))?;
    info!(rules = theories.len(), "loaded theories");
    let gold = read(&args.gold, "gold")?;
    let pred = read(&args.pred, "predictions")?;
    let config = EvalConfigBuilder::default()
        .division_by_zero(args.zero_division)
        .digits(args.digits)
        .parallel(args.parallel)
        .build();
    info!(%config, "evaluating");
    let reporter = evaluate_conf(&gold, &pred, &theories, config)?;
    Ok(reporter)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("morpheval=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let reporter = match run(&args) {
        Ok(reporter) => reporter,
        Err(err) => {
            let alignment = err
                .downcast_ref::<EvaluationError>()
                .and_then(EvaluationError::alignment);
            return match alignment {
                Some(alignment) => {
                    eprintln!("{}", alignment);
                    ExitCode::from(1)
                }
                None => {
                    eprintln!("Error: {:#}", err);
                    ExitCode::from(2)
                }
            };
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&reporter) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("Error: could not serialize the report: {}", err);
                return ExitCode::from(2);
            }
        }
    } else {
        print!("{}", reporter);
    }
    ExitCode::SUCCESS
}
