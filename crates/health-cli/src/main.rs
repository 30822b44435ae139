use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use health_core::{DashboardConfig, HealthDataManager, TimeWindow};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "health-cli")]
#[command(about = "Query the personal health metrics data drop")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, or JSON when the extension is .json)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Directory holding labs.json, vitals.json, activity.json and sleep.json
    #[arg(long, env = "HEALTH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalogued metrics
    Metrics {
        /// Only metrics whose label or name contains this text
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Print the series of a metric
    Series {
        metric: String,
        /// Trailing window: 1M, 6M, 1Y or ALL (defaults to the configured window)
        #[arg(long, short)]
        window: Option<TimeWindow>,
    },
    /// Print the most recent value of a metric
    Latest { metric: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .with_file(false),
        )
        .init();

    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let manager = HealthDataManager::initialize(&config.data_source())
        .await
        .with_context(|| format!("failed to load health data from {}", config.data_dir.display()))?;

    let output = match cli.command {
        Commands::Metrics { search } => match search {
            Some(query) => serde_json::to_string_pretty(&manager.search(&query))?,
            None => serde_json::to_string_pretty(manager.metrics())?,
        },
        Commands::Series { metric, window } => {
            let window = window.unwrap_or(config.default_window);
            let series = window.filter_now(manager.query_series(&metric));
            tracing::debug!("{} points for {} over {}", series.len(), metric, window);
            serde_json::to_string_pretty(&series)?
        }
        Commands::Latest { metric } => match manager.query_latest(&metric) {
            Some(latest) => serde_json::to_string_pretty(&latest)?,
            None => {
                tracing::info!("No data for metric {}", metric);
                "null".to_string()
            }
        },
    };

    println!("{output}");
    Ok(())
}
