use analytics::{MetricsEngine, MetricsResult};
use anyhow::{Context, bail};
use api_client::YahooClient;
use clap::{Parser, Subcommand, ValueEnum};
use configuration::{Config, EmaPolicy, MalformedBarPolicy, init_tracing, load_config};
use core_types::split_list;
use indicatif::{ProgressBar, ProgressStyle};
use render::View;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

mod render;

/// The main entry point for the Summit metrics tool.
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; it only carries optional overrides.
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Current price, all-time high and moving averages for NSE equities.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// A TOML configuration file. Defaults to ./config.toml when it exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current price, the all-time high and how far apart they are.
    Drawdown(ReportArgs),
    /// Show the current price next to its exponential moving averages.
    Ema(ReportArgs),
    /// Show everything: drawdown and moving averages.
    Metrics(ReportArgs),
}

#[derive(Parser)]
struct ReportArgs {
    /// NSE codes (e.g. TCS INFY, or "TCS,INFY"). Prompted for when omitted.
    symbols: Vec<String>,

    /// More NSE codes as a comma-separated list; may be repeated.
    #[arg(long = "symbols", value_name = "LIST")]
    symbol_lists: Vec<String>,

    /// EMA spans in bars, comma separated (e.g. 20,50,100).
    #[arg(long, value_delimiter = ',')]
    periods: Option<Vec<usize>>,

    /// What to do when a stock has too little history for a span.
    #[arg(long, value_enum)]
    ema_policy: Option<EmaPolicy>,

    /// What to do with bars whose open or close lies outside their low-high range.
    #[arg(long, value_enum)]
    malformed_bars: Option<MalformedBarPolicy>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

impl ReportArgs {
    /// Positional codes first, then every `--symbols` list in the order given.
    fn requested_symbols(&self) -> Vec<String> {
        self.symbols.iter().chain(&self.symbol_lists).cloned().collect()
    }

    /// Layers the command-line overrides on top of the loaded configuration.
    fn apply_to(&self, view: View, config: &mut Config) {
        if let Some(periods) = &self.periods {
            config.metrics.ema_periods = periods.clone();
        }
        if view == View::Drawdown {
            // The drawdown report needs no averages, so no warm-up gate either.
            config.metrics.ema_periods.clear();
        }
        if let Some(policy) = self.ema_policy {
            config.metrics.ema_policy = policy;
        }
        if let Some(policy) = self.malformed_bars {
            config.metrics.malformed_bars = policy;
        }
    }
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config =
        load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    // Held until the end of `run` so the file writer can flush.
    let _log_guard = init_tracing(&config.logging).context("Failed to initialise logging")?;

    let (view, args) = match cli.command {
        Commands::Drawdown(args) => (View::Drawdown, args),
        Commands::Ema(args) => (View::Ema, args),
        Commands::Metrics(args) => (View::Metrics, args),
    };
    args.apply_to(view, &mut config);
    config.validate().context("Invalid settings")?;

    let symbols = collect_symbols(&args.requested_symbols())?;
    let engine = MetricsEngine::new(&config.metrics)?;
    let results = handle_report(&engine, &config, &symbols).await?;

    match args.format {
        OutputFormat::Table => print!("{}", render::render_table(&results, view, engine.periods())),
        OutputFormat::Json => println!("{}", render::render_json(&results)?),
    }

    // Partial failure is still a usable report; only a total wipe-out is an error.
    if results.iter().any(MetricsResult::is_success) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Fetches every symbol and computes its metrics, showing a spinner meanwhile.
async fn handle_report(
    engine: &MetricsEngine,
    config: &Config,
    symbols: &[String],
) -> anyhow::Result<Vec<MetricsResult>> {
    let client = YahooClient::new(&config.provider).context("Failed to build the market-data client")?;

    tracing::info!(
        symbols = symbols.len(),
        periods = ?engine.periods(),
        "Starting metrics report"
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Fetching {} price histories...", symbols.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let results = engine
        .compute_for_symbols(&client, symbols, config.provider.max_concurrent_fetches)
        .await;

    spinner.finish_and_clear();

    let failed = results.iter().filter(|r| !r.is_success()).count();
    tracing::info!(succeeded = results.len() - failed, failed, "Metrics report complete");

    Ok(results)
}

/// Gathers identifiers from the command line, or asks for them on stdin.
///
/// Each argument may itself be a comma-separated list. Entries are passed on
/// raw so blank ones show up as invalid symbols in the report.
fn collect_symbols(args: &[String]) -> anyhow::Result<Vec<String>> {
    let raw = if args.is_empty() {
        prompt_symbols()?
    } else {
        args.join(",")
    };

    if raw.trim().is_empty() {
        bail!("Please enter at least one NSE code.");
    }
    Ok(split_list(&raw))
}

fn prompt_symbols() -> anyhow::Result<String> {
    print!("Enter NSE codes separated by comma (,): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read symbols from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
