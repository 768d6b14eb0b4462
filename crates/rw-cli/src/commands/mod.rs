//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rw_core::DashboardConfig;
use std::path::PathBuf;

pub mod latest;
pub mod next_refresh;
pub mod presign;
pub mod serve;
pub mod status;

/// Report wall - full-screen PDF report and dashboard display
#[derive(Parser)]
#[command(name = "reportwall")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file (defaults to ./reportwall.toml)
    #[arg(short, long, global = true, env = "REPORTWALL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the report wall web server
    Serve(serve::ServeArgs),

    /// Show the newest report file in a local folder
    Latest(latest::LatestArgs),

    /// Show when the next page reload is due
    NextRefresh(next_refresh::NextRefreshArgs),

    /// Print a signed URL for the configured report object
    Presign(presign::PresignArgs),

    /// Check the configured report object without downloading it
    Status,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = DashboardConfig::load(self.config.as_deref())?;

        match self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Latest(args) => latest::execute(args, &config).await,
            Commands::NextRefresh(args) => next_refresh::execute(args, &config),
            Commands::Presign(args) => presign::execute(args, &config),
            Commands::Status => status::execute(&config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_config_flag() {
        let cli = Cli::try_parse_from(["reportwall", "status", "--config", "wall.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("wall.toml")));
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from(["reportwall", "serve", "--port", "9000", "--log"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(9000));
                assert!(args.host.is_none());
                assert!(args.log);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_next_refresh() {
        let cli =
            Cli::try_parse_from(["reportwall", "next-refresh", "--at", "07:15", "--tz", "Europe/Berlin"]).unwrap();
        match cli.command {
            Commands::NextRefresh(args) => {
                assert_eq!(args.at.unwrap().to_string(), "07:15");
                assert_eq!(args.tz.unwrap(), chrono_tz::Europe::Berlin);
            }
            _ => panic!("expected next-refresh"),
        }
    }

    #[test]
    fn test_reject_bad_time() {
        assert!(Cli::try_parse_from(["reportwall", "next-refresh", "--at", "25:00"]).is_err());
    }
}
