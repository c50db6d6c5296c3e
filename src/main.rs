use clap::{Parser, Subcommand};
use std::sync::Arc;
use stockcast::types::normalize_symbol;
use stockcast::{Config, MarketDataSource, Predictor, SqliteStore, YahooFinanceClient};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stockcast")]
#[command(about = "Predict next-day stock direction and track prediction accuracy")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on fresh history and recommend for each symbol
    Recommend {
        /// Ticker symbols (e.g. AAPL MSFT)
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the accuracy of stored predictions
    Accuracy {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// List stored predictions for a symbol
    History {
        symbol: String,

        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "n/a".to_string())
}

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockcast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    info!(
        "Using ledger {} ({} history, {} training)",
        config.database_path,
        config.history_period,
        config.training_mode.name()
    );

    let store = Arc::new(SqliteStore::open(&config.database_path)?);
    let source: Arc<dyn MarketDataSource> =
        Arc::new(YahooFinanceClient::new(config.http_timeout())?);
    let predictor = Predictor::from_config(&config, source, store.clone());

    match cli.command {
        Commands::Recommend { symbols, json } => {
            for symbol in symbols {
                let report = predictor.recommend(&symbol);
                if json {
                    println!("{}", serde_json::to_string(&report)?);
                    continue;
                }
                println!("{}", report.message);
                println!(
                    "  price: {}  volume: {}  volume trend: {}",
                    fmt_opt(report.price, 2),
                    fmt_opt(report.volume, 0),
                    report
                        .volume_trend
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "n/a".to_string())
                );
            }
        }
        Commands::Accuracy { symbols } => {
            for symbol in symbols {
                let stats = predictor.ledger().accuracy_stats(&symbol)?;
                println!(
                    "{}: {:.2}% ({} of {} correct)",
                    normalize_symbol(&symbol),
                    stats.accuracy_pct(),
                    stats.correct,
                    stats.total
                );
            }
        }
        Commands::History { symbol, limit } => {
            for record in predictor.ledger().history(&symbol, limit)? {
                println!(
                    "{}  {:<6} {:<11} actual={} correct={}",
                    record.date,
                    record.symbol,
                    record.predicted_direction,
                    record
                        .actual_direction
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    record.correct
                );
            }
        }
    }

    // Release the ledger before the store closes.
    drop(predictor);
    match Arc::try_unwrap(store) {
        Ok(store) => store.close()?,
        Err(_) => tracing::warn!("SQLite store still shared at shutdown"),
    }

    Ok(())
}
