//! Flow record publisher - tail stage of the collection pipeline
//!
//! Usage:
//!   flowbus-publisher --listen tcp://0.0.0.0:5556 --source-id 7 < records.jsonl
//!   flowbus-publisher --config config/flowbus.toml
//!   flowbus-publisher --driver stdout
//!
//! Each stdin line is one serialized flow record and is published as-is.

use anyhow::{Context, Result};
use clap::Parser;
use flowbus_config::{FlowbusConfig, LoggingConfig};
use flowbus_transport::{Delivery, DriverRegistry, OutputStage};
use std::future::Future;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flowbus-publisher")]
#[command(about = "Publish decoded flow records onto a message bus")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transport driver (ntopng, stdout)
    #[arg(short, long)]
    driver: Option<String>,

    /// Bind address for the ntopng publish socket
    #[arg(long = "transport.ntopng.listen", alias = "listen")]
    listen: Option<String>,

    /// Source id embedded in every ntopng header (0-255)
    #[arg(long = "transport.ntopng.source_id", alias = "source-id")]
    source_id: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = FlowbusConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    apply_overrides(&args, &mut config);

    init_logging(&config.logging)?;
    config.validate().context("Invalid configuration")?;

    info!("Starting flowbus publisher (driver: {})", config.driver);

    let registry = DriverRegistry::with_defaults();
    let driver = registry.create(&config.driver)?;
    let stage = OutputStage::new(driver);
    stage
        .start(&config)
        .context("Failed to start output stage")?;

    let reader = BufReader::new(tokio::io::stdin());
    let pumped = pump(&stage, reader, tokio::signal::ctrl_c()).await;
    if let Err(e) = &pumped {
        error!("Publishing stopped: {:#}", e);
    }

    let stats = stage.shutdown().context("Failed to close transport")?;
    info!(
        "Publisher stopped: {} published, {} dropped",
        stats.published, stats.dropped
    );

    pumped.map(|_| ())
}

/// CLI flags win over file and environment
fn apply_overrides(args: &Args, config: &mut FlowbusConfig) {
    if let Some(driver) = &args.driver {
        config.driver = driver.clone();
    }
    if let Some(listen) = &args.listen {
        config.transport.ntopng.listen = listen.clone();
    }
    if let Some(source_id) = args.source_id {
        config.transport.ntopng.source_id = source_id;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.json = true;
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .with_context(|| format!("Invalid log level '{}'", logging.level))?;

    // Logs go to stderr so the stdout driver's records stay clean
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
}

/// Publish one record per non-empty line until EOF or shutdown
///
/// Records are opaque bytes: no UTF-8 decoding, no `\r` stripping.
async fn pump<R, S>(stage: &OutputStage, reader: R, shutdown: S) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    S: Future,
{
    let mut records_in = reader.split(b'\n');
    let mut records = 0u64;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            record = records_in.next_segment() => {
                let Some(record) = record.context("Failed to read record")? else {
                    info!("Input closed");
                    break;
                };
                if record.is_empty() {
                    continue;
                }
                records += 1;
                if stage.publish(&[], &record)? == Delivery::Dropped {
                    tracing::debug!("Record {} dropped", records);
                }
            }
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    Ok(records)
}
