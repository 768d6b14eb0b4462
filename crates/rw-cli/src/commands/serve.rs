//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use rw_core::config::Landing;
use rw_core::DashboardConfig;
use std::path::PathBuf;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (defaults to .reportwall/serve.log)
    #[arg(long, requires = "log")]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, config: DashboardConfig) -> Result<()> {
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);

    let landing = match config.page.landing {
        Landing::Report => "report",
        Landing::Viz => "viz",
    };

    println!();
    println!("  {} {}", "Reportwall".cyan().bold(), "Web Server".bold());
    println!();
    println!("  {}     http://{}:{}  ({})", "Landing".green(), host, port, landing);
    println!("  {}      http://{}:{}/report", "Report".green(), host, port);
    if config.visualization.is_some() {
        println!("  {}         http://{}:{}/viz", "Viz".green(), host, port);
    }
    println!("  {}         http://{}:{}/api", "API".green(), host, port);
    println!("  {}     {}", "Refresh".green(), config.refresh.describe());
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    rw_web::run_server(config, &host, port).await?;

    Ok(())
}
