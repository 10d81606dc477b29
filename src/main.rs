use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process;

use sbh_check::config::Config;
use sbh_check::display::DisplayManager;
use sbh_check::logging::init_logging;
use sbh_check::parser::{read_log_file, LogParser, ParseMode};
use sbh_check::{AppState, SbhChecker, SbhError};

#[derive(Parser)]
#[command(name = "sbh-check")]
#[command(about = "Check your Scheduled Block Hours and pay against the published flight schedule")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    check: CheckArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a flight log against the schedule and total SBH and pay
    Check(CheckArgs),
    /// Parse a flight log and show the derived lookup parameters (no network)
    Inspect {
        /// Flight log CSV export
        #[arg(long, short)]
        file: Option<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Reject rows with fewer fields than the header
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Args, Clone, Default)]
struct CheckArgs {
    /// Flight log CSV export
    #[arg(long, short)]
    file: Option<PathBuf>,
    /// Pay rate per block hour
    #[arg(long, short)]
    rate: Option<f64>,
    /// Carrier code to query the schedule for
    #[arg(long)]
    carrier: Option<String>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
    /// Reject rows with fewer fields than the header
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let json = match &cli.command {
        Some(Commands::Check(args)) => args.json,
        Some(Commands::Inspect { json, .. }) => *json,
        None => cli.check.json,
    };

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => handle_error(e, json),
    };
    let _guard = init_logging(&config.logging);

    match cli.command.unwrap_or(Commands::Check(cli.check)) {
        Commands::Check(args) => {
            apply_check_args(&mut config, &args);
            match run_check(&config, args.file, json).await {
                Ok(()) => Ok(()),
                Err(e) => handle_error(e, json),
            }
        }
        Commands::Inspect { file, strict, .. } => {
            match run_inspect(file, strict || config.pay.strict_rows, json).await {
                Ok(()) => Ok(()),
                Err(e) => handle_error(e, json),
            }
        }
    }
}

fn apply_check_args(config: &mut Config, args: &CheckArgs) {
    if let Some(rate) = args.rate {
        config.pay.rate = rate;
    }
    if let Some(carrier) = &args.carrier {
        config.lookup.carrier = carrier.clone();
    }
    if args.strict {
        config.pay.strict_rows = true;
    }
}

async fn run_check(config: &Config, file: Option<PathBuf>, json: bool) -> Result<()> {
    config.validate().context("Invalid settings")?;

    let mut state = AppState::new(config.pay.rate);
    if let Some(path) = file {
        state.select_file(path)?;
    }
    if state.file.is_none() {
        return Err(SbhError::NoFile.into());
    }

    let checker = SbhChecker::from_config(config)?;
    let outcome = checker.run(&mut state).await?;

    let display = DisplayManager::new();
    let report = display.build_report(
        &outcome.summary,
        state.rate,
        outcome.pages,
        &outcome.parsed.range,
        &outcome.parsed.airports,
    );
    display.display_report(&report, json);
    Ok(())
}

async fn run_inspect(file: Option<PathBuf>, strict: bool, json: bool) -> Result<()> {
    let path = file.ok_or(SbhError::NoFile)?;
    let text = read_log_file(&path).await?;

    let mode = if strict {
        ParseMode::Strict
    } else {
        ParseMode::Lenient
    };
    let parsed = LogParser::new(mode).parse_and_derive(&text)?;
    DisplayManager::new().display_inspect(&parsed, json);
    Ok(())
}

/// Prints the error once and exits. Selection problems show as an alert.
fn handle_error(e: anyhow::Error, json: bool) -> ! {
    let selection = e
        .downcast_ref::<SbhError>()
        .is_some_and(SbhError::is_selection_error);

    if json {
        println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
    } else if selection {
        eprintln!("{} {}", "⚠️".bright_yellow(), e.to_string().bright_yellow());
    } else {
        eprintln!("Error: {:#}", e);
    }
    process::exit(1);
}
