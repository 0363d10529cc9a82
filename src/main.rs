//! Sensor critical-threshold monitor
//!
//! Watches threshold-critical property changes and requests a chassis
//! power-off when a monitored alarm asserts.

use anyhow::Context;
use clap::Parser;
use sensor_bus::{BusKind, ZbusTransport};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use threshold_monitor::{
    ActionDispatcher, Classification, ClassifierMode, EventLoop, MonitorConfig, Pipeline,
    SignalFilter,
};

mod cli;
use cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(cli.config.as_deref(), cli.bus.into()).await,
        Commands::ShowConfig => show_config(cli.config.as_deref()),
        Commands::MatchRule => {
            SignalFilter::critical()
                .match_rule()
                .context("Failed to build match rule")
                .map(|rule| println!("{rule}"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_pipeline(config_path: Option<&Path>) -> anyhow::Result<(MonitorConfig, Pipeline)> {
    let (config, source) =
        MonitorConfig::load_or_default(config_path).context("Failed to load sensor config")?;
    info!("Sensor config: {source}");

    let pipeline = Pipeline::from_config(&config).context("Invalid sensor config")?;
    if config.mode == ClassifierMode::Global {
        warn!(
            "Global classification: watching {} on every sensor",
            config.global_thresholds
        );
    }
    Ok((config, pipeline))
}

async fn run(config_path: Option<&Path>, bus: BusKind) -> anyhow::Result<()> {
    let (_, pipeline) = load_pipeline(config_path)?;
    if let Classification::PerSensor(registry) = pipeline.classification() {
        info!("Monitoring {} sensors", registry.len());
    }

    let transport = ZbusTransport::connect(bus)
        .await
        .with_context(|| format!("Failed to connect to {bus} bus"))?;

    let mut monitor = EventLoop::new(transport, pipeline, ActionDispatcher::default());
    monitor
        .subscribe()
        .await
        .context("Failed to add match rule")?;

    match monitor.run().await {
        Ok(never) => match never {},
        Err(e) => Err(anyhow::Error::new(e).context("Monitor loop ended")),
    }
}

fn show_config(config_path: Option<&Path>) -> anyhow::Result<()> {
    let (config, pipeline) = load_pipeline(config_path)?;

    println!("Mode: {}", config.mode);
    match pipeline.classification() {
        Classification::Global(watched) => {
            println!("Watched on every sensor: {watched}");
        }
        Classification::PerSensor(registry) => {
            println!();
            println!("{:<60} Thresholds", "Sensor");
            println!("{}", "-".repeat(72));
            for sensor in registry.iter() {
                println!("{:<60} {}", sensor.path(), sensor.watched());
            }
            println!();
            println!("{} sensors", registry.len());
        }
    }
    Ok(())
}
