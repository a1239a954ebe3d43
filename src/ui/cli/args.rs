use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, FromArgMatches, Parser, Subcommand, ValueHint};

use crate::server::ServerConfig;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Train and serve a machine downtime classifier"
)]
pub struct Cli {
    /// Where the trained model is stored
    #[arg(
        long,
        global = true,
        default_value = "model.json",
        env = "DOWNTIME_MODEL_PATH",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub model_path: PathBuf,

    /// Log filter used when RUST_LOG is unset (e.g. info, debug)
    #[arg(long, global = true, default_value = "info", value_name = "LEVEL")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve(ServeArgs),
    /// Train from a CSV file and persist the model
    Train(TrainArgs),
    /// Predict downtime for one observation with the stored model
    Predict(PredictArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5000", env = "DOWNTIME_BIND", value_name = "ADDR")]
    pub bind: SocketAddr,

    /// Largest accepted request body in bytes
    #[arg(
        long,
        default_value_t = 10 * 1024 * 1024,
        value_name = "BYTES",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub max_body_size: u64,
}

impl ServeArgs {
    /// Serve options when no subcommand was given: defaults plus environment.
    pub fn from_env() -> Result<Self, clap::Error> {
        let command = Self::augment_args(clap::Command::new("serve"));
        let matches = command.try_get_matches_from(["serve"])?;
        Self::from_arg_matches(&matches)
    }

    pub fn into_server_config(self) -> ServerConfig {
        ServerConfig::default()
            .with_address(self.bind)
            .with_max_body_size(usize::try_from(self.max_body_size).unwrap_or(usize::MAX))
    }
}

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// CSV with Machine_ID, Temperature, Run_Time and Downtime_Flag columns
    #[arg(long, value_name = "CSV", value_hint = ValueHint::FilePath)]
    pub data: PathBuf,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    pub temperature: f64,

    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    pub run_time: f64,
}
