//! LP Range Monitor
//!
//! Main entry point. Loads config from the environment (or an env file),
//! connects to the RPC endpoint, then polls the pool once per interval:
//! LP balance, reference price, reserves, spot price, band, decision.
//!
//! Usage:
//!   lp-range-monitor                      # loop until Ctrl-C
//!   lp-range-monitor --once               # single cycle, then exit
//!   lp-range-monitor --env-file .env.base --json-logs

use anyhow::{Context, Result};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use clap::Parser;
use lp_range_monitor::config::{load_config_from_file, rpc_host};
use lp_range_monitor::liquidity::RouterLiquidityManager;
use lp_range_monitor::oracle::DexscreenerClient;
use lp_range_monitor::pool::{ChainReader, V2PairReader};
use lp_range_monitor::rebalance::{MonitorSettings, RebalanceMonitor, Scheduler};
use lp_range_monitor::types::BotConfig;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, EnvFilter};

/// LP Range Monitor - V2 pool vs. reference price
#[derive(Parser)]
#[command(name = "lp-range-monitor")]
struct Args {
    /// Env file to load before reading configuration (skipped if missing)
    #[arg(long, env = "ENV_FILE", default_value = ".env")]
    env_file: String,

    /// Run a single monitoring cycle and exit
    #[arg(long)]
    once: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first: LOG_FILE decides where logging goes
    let config = if Path::new(&args.env_file).exists() {
        load_config_from_file(&args.env_file)?
    } else {
        lp_range_monitor::load_config()?
    };

    init_logging(&config, args.json_logs)?;

    info!("===========================================");
    info!("   LP Range Monitor");
    info!("===========================================");
    info!("Configuration loaded");
    info!("RPC host: {}", rpc_host(&config.rpc_url));
    info!("Pool: {:?}", config.pool_address);
    info!("Wallet: {:?}", config.wallet_address);
    info!("Volatility: {}%", config.volatility_percent);
    info!("Poll interval: {}s", config.poll_interval_secs);

    // Read-only provider for the monitor
    let provider = ProviderBuilder::new()
        .connect(&config.rpc_url)
        .await
        .context("Failed to connect to RPC")?
        .erased();
    let provider = Arc::new(provider);

    // Verify connection
    let chain_id = provider
        .get_chain_id()
        .await
        .context("RPC connection check failed")?;
    info!("Connected! Chain ID: {}", chain_id);

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let reader = V2PairReader::new(Arc::clone(&provider), config.pool_address, timeout);

    match reader.read_token_addresses().await {
        Ok(tokens) => info!("Pool tokens: token0 {:?}, token1 {:?}", tokens.token0, tokens.token1),
        Err(e) => warn!("Could not read pool tokens: {}", e),
    }

    match RouterLiquidityManager::<DynProvider>::from_config(&config).await? {
        Some(manager) => info!(
            "Liquidity manager ready (signer {:?}) - rebalances are logged, not sent",
            manager.signer_address()
        ),
        None => info!("No ROUTER_ADDRESS/PRIVATE_KEY - running read-only"),
    }

    let prices = DexscreenerClient::new(&config.price_api_url, &config.price_api_chain, timeout)
        .context("Failed to build price API client")?;

    let monitor = RebalanceMonitor::new(reader, prices, MonitorSettings::from_config(&config));

    if args.once {
        let decision = monitor.run_cycle().await;
        info!("Decision: {}", decision);
        return Ok(());
    }

    let scheduler = Scheduler::new(
        monitor,
        Duration::from_secs(config.poll_interval_secs),
        config.failure_warn_threshold,
    );

    scheduler
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Ctrl-C handler failed: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Ctrl-C received");
        })
        .await;

    Ok(())
}

/// fmt subscriber with `RUST_LOG` filtering (default "info"); also
/// appends to `LOG_FILE` when set
fn init_logging(config: &BotConfig, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let writer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(std::io::stdout.and(Mutex::new(file)))
        }
        None => BoxMakeWriter::new(std::io::stdout),
    };

    // No colour codes in the log file
    let ansi = config.log_file.is_none();

    if json {
        fmt().json().with_env_filter(filter).with_writer(writer).init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .init();
    }

    Ok(())
}
