use super::toml_config::{DispatchConfig, OutputConfig};
use super::DEFAULT_DATA_DIR;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "ride-dispatch")]
#[command(about = "Load a ride-share dataset and dispatch drivers to trip requests")]
pub struct CliConfig {
    /// Directory holding passengers.csv, drivers.csv and trips.csv
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// List every passenger
    Passengers,
    /// List every driver with their status
    Drivers,
    /// List drivers currently available for dispatch
    Available,
    /// Show one passenger and their trips
    Passenger { id: i64 },
    /// Show one driver and their trips
    Driver { id: i64 },
    /// Request a trip for each passenger, in order
    Request {
        #[arg(required = true)]
        passenger_ids: Vec<i64>,
    },
    /// Load the dataset and report status inconsistencies
    Check,
}

impl CliConfig {
    /// Merges the optional TOML file with command line flags; flags win.
    pub fn resolve(&self) -> Result<DispatchConfig> {
        let mut config = match &self.config {
            Some(path) => DispatchConfig::from_file(path)?,
            None => DispatchConfig::for_directory(DEFAULT_DATA_DIR),
        };

        if let Some(dir) = &self.data_dir {
            config.data.directory = dir.clone();
        }
        if self.json {
            config.output = Some(OutputConfig { json: Some(true) });
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_command() {
        let config =
            CliConfig::try_parse_from(["ride-dispatch", "--json", "request", "1", "2"]).unwrap();
        assert!(config.json);
        assert_eq!(
            config.command,
            Command::Request {
                passenger_ids: vec![1, 2]
            }
        );
    }

    #[test]
    fn test_request_needs_a_passenger() {
        assert!(CliConfig::try_parse_from(["ride-dispatch", "request"]).is_err());
    }

    #[test]
    fn test_resolve_prefers_flags() {
        let dir = tempfile::TempDir::new().unwrap();
        let dir_str = dir.path().to_str().unwrap();

        let config = CliConfig::try_parse_from([
            "ride-dispatch",
            "--data-dir",
            dir_str,
            "--json",
            "available",
        ])
        .unwrap();

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.data_directory(), dir_str);
        assert!(resolved.json_output());
    }

    #[test]
    fn test_resolve_rejects_missing_directory() {
        let config =
            CliConfig::try_parse_from(["ride-dispatch", "--data-dir", "/no/such/dir", "check"])
                .unwrap();
        assert!(config.resolve().is_err());
    }
}
