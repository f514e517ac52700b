use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use popbot::backtest::BacktestResult;
use popbot::{BacktestParameters, Extraction, ParameterExtractor, ScenarioGenerator, Settings};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Backtest results for the POP gap-up strategy
#[derive(Debug, Parser)]
#[command(name = "popbot", version)]
struct Cli {
    /// Describe the filters in plain English (needs OPENAI_API_KEY)
    #[arg(long)]
    text: Option<String>,

    /// Minimum gap up, percent
    #[arg(long)]
    gap_pct: Option<f64>,

    /// Minimum relative volume
    #[arg(long)]
    min_rvol: Option<f64>,

    /// Maximum float, millions of shares
    #[arg(long)]
    max_float: Option<f64>,

    /// Maximum share price
    #[arg(long)]
    price_max: Option<f64>,

    /// First day of the window (YYYY-MM-DD)
    #[arg(long)]
    date_start: Option<NaiveDate>,

    /// Last day of the window (YYYY-MM-DD)
    #[arg(long)]
    date_end: Option<NaiveDate>,

    /// Seed for the sample data (overrides POPBOT_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Print one JSON document instead of tables
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn explicit_parameters(&self) -> BacktestParameters {
        BacktestParameters {
            gap_pct: self.gap_pct,
            min_rvol: self.min_rvol,
            max_float: self.max_float,
            price_max: self.price_max,
            date_start: self.date_start,
            date_end: self.date_end,
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    params: &'a BacktestParameters,
    warnings: &'a [String],
    #[serde(flatten)]
    result: &'a BacktestResult,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    setup_logging();

    let settings = Settings::load().context("Failed to load settings")?;

    // Flags typed by the user are rejected outright; extracted ones only warn
    let explicit = cli.explicit_parameters();
    explicit.validate().context("Invalid parameters")?;

    let extractor = ParameterExtractor::from_settings(&settings);
    let extraction = match cli.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => extractor.extract(text).await,
        None => Extraction::default(),
    };

    let params = extraction.params.merge(&explicit);
    let mut warnings = extraction.warnings;
    if let Err(e) = params.validate() {
        tracing::warn!("Parameters failed validation: {}", e);
        warnings.push(format!("Parameter check: {}", e));
    }

    let generator = ScenarioGenerator::new(cli.seed.unwrap_or(settings.seed));
    tracing::info!("Running placeholder backtest (seed {})", generator.seed());
    let result = generator.generate(&params);

    if cli.json {
        let report = Report {
            params: &params,
            warnings: &warnings,
            result: &result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&params, &warnings, &result)?;
    }

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("popbot=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(
    params: &BacktestParameters,
    warnings: &[String],
    result: &BacktestResult,
) -> anyhow::Result<()> {
    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║              POP BACKTEST RESULTS                     ║");
    println!("╚═══════════════════════════════════════════════════════╝\n");

    println!("PARAMETERS");
    println!("  {}", serde_json::to_string(params)?);

    for warning in warnings {
        println!("  ⚠️  {}", warning);
    }

    println!("\nMETRICS");
    for (label, value) in result.metrics.entries() {
        println!("  {:<18} {:>10}", label, value);
    }

    println!("\nTRADES");
    println!(
        "  {:<12} {:<8} {:>10} {:>10} {:>9}",
        "Date", "Ticker", "Entry", "Exit", "PnL%"
    );
    println!("  {}", "─".repeat(53));
    for trade in &result.trades {
        println!(
            "  {:<12} {:<8} {:>10.2} {:>10.2} {:>+9.2}",
            trade.date.to_string(),
            trade.ticker,
            trade.entry_price,
            trade.exit_price,
            trade.pnl_pct
        );
    }

    println!("\nEQUITY");
    for point in &result.equity {
        println!("  {}  {:>10.2}", point.date, point.equity);
    }

    println!("\n═══════════════════════════════════════════════════════\n");
    Ok(())
}
