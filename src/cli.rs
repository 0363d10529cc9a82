// CLI definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use sensor_bus::BusKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "threshold_monitor")]
#[command(author, version, about = "Sensor critical-threshold monitor")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Sensor table (TOML); defaults to ~/.config/threshold-monitor/sensors.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bus to connect to
    #[arg(long, global = true, value_enum, default_value_t = BusArg::System)]
    pub bus: BusArg,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Monitor threshold signals (default)
    Run,

    /// Print the effective sensor table and classification mode
    #[command(visible_alias = "show")]
    ShowConfig,

    /// Print the bus match rule used for subscription
    MatchRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BusArg {
    System,
    Session,
}

impl From<BusArg> for BusKind {
    fn from(arg: BusArg) -> Self {
        match arg {
            BusArg::System => BusKind::System,
            BusArg::Session => BusKind::Session,
        }
    }
}
