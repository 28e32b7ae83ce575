use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;
use tokio::sync::mpsc;

use crate::backfill;
use crate::config::{
    Credentials, StreamConfig, DEFAULT_DRAIN_TIMEOUT_SECS, DEFAULT_LOOKBACK_HOURS,
    DEFAULT_TICK_INTERVAL_SECS,
};
use crate::console;
use crate::error::FeedError;
use crate::gateway::{IngestionGateway, RestGateway, SqliteGateway, SENSOR_TABLE};
use crate::shutdown::shutdown_signal;
use crate::signal::SignalModel;
use crate::stream::{StreamController, StreamEvent};

#[derive(Parser, Debug)]
#[command(author, version, about = "Feed synthetic environmental sensor readings into sensor_data")]
pub struct Cli {
    /// Write to a local SQLite file instead of the remote REST endpoint
    #[arg(long, global = true, env = "SENSORFEED_SQLITE_PATH")]
    pub sqlite: Option<PathBuf>,

    /// Seed the noise generator for reproducible readings
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert one hourly reading per hour of history in a single batch
    Backfill {
        /// Hours of history, ending now
        #[arg(long, default_value_t = DEFAULT_LOOKBACK_HOURS, value_parser = clap::value_parser!(u32).range(1..))]
        hours: u32,
    },
    /// Send one live reading per interval until interrupted
    Stream {
        /// Seconds between readings
        #[arg(long, default_value_t = DEFAULT_TICK_INTERVAL_SECS)]
        interval_secs: u64,

        /// Seconds to wait for in-flight inserts at shutdown
        #[arg(long, default_value_t = DEFAULT_DRAIN_TIMEOUT_SECS)]
        drain_timeout_secs: u64,
    },
}

pub async fn run(cli: Cli) -> Result<(), FeedError> {
    let model = match cli.seed {
        Some(seed) => SignalModel::with_seed(seed),
        None => SignalModel::new(),
    };

    match cli.command {
        Commands::Backfill { hours } => {
            let gateway = open_gateway(cli.sqlite)?;
            run_backfill_command(gateway, model, hours).await
        }
        Commands::Stream {
            interval_secs,
            drain_timeout_secs,
        } => {
            let config = StreamConfig::from_secs(interval_secs, drain_timeout_secs)?;
            let gateway = open_gateway(cli.sqlite)?;
            run_stream_command(gateway, model, config).await
        }
    }
}

/// Resolve the sink. Remote credentials are validated here, before any
/// reading is generated.
pub fn open_gateway(sqlite: Option<PathBuf>) -> Result<Arc<dyn IngestionGateway>, FeedError> {
    match sqlite {
        Some(path) => {
            info!("Using local SQLite sink at {}", path.display());
            Ok(Arc::new(SqliteGateway::open(path)?))
        }
        None => {
            let credentials = Credentials::from_env()?;
            let gateway = RestGateway::new(&credentials)?;
            info!("Using REST sink at {}", gateway.endpoint());
            Ok(Arc::new(gateway))
        }
    }
}

async fn run_backfill_command(
    gateway: Arc<dyn IngestionGateway>,
    mut model: SignalModel,
    hours: u32,
) -> Result<(), FeedError> {
    println!("Seeding {hours} hours of sensor history...");

    let batch = backfill::build_batch(&mut model, Utc::now(), hours);
    println!("Prepared {} readings for submission", batch.len());

    let report = backfill::submit_batch(gateway.as_ref(), &batch).await?;
    println!("{}", console::format_backfill_summary(&report));
    println!("Rows written to {SENSOR_TABLE}");
    Ok(())
}

async fn run_stream_command(
    gateway: Arc<dyn IngestionGateway>,
    model: SignalModel,
    config: StreamConfig,
) -> Result<(), FeedError> {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let mut controller = StreamController::new();
    controller.start(gateway, model, config, Some(events_tx))?;

    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            let Some(text) = console::format_stream_event(&event) else {
                continue;
            };
            match event {
                StreamEvent::Failed { .. } => eprintln!("{text}"),
                _ => println!("{text}"),
            }
        }
    });

    shutdown_signal().await;
    println!("\nStopping sensor stream... (Ctrl+C again to abandon in-flight inserts)");

    let report = tokio::select! {
        stopped = controller.stop() => stopped?,
        _ = shutdown_signal() => return Err(FeedError::Interrupted),
    };
    // the loop dropped its sender, so the printer ends once the backlog is out
    if let Err(err) = printer.await {
        log::warn!("event printer task failed: {err}");
    }

    println!("{}", console::format_stream_summary(&report));
    Ok(())
}
