//! Next refresh command.

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::Args;
use rw_core::schedule::RefreshDelay;
use rw_core::{DashboardConfig, RefreshPolicy, TimeOfDay};

use crate::output;

#[derive(Args)]
pub struct NextRefreshArgs {
    /// Daily reload time, HH:MM (defaults to the configured policy)
    #[arg(long)]
    pub at: Option<TimeOfDay>,

    /// IANA time zone (defaults to page.timezone)
    #[arg(long, value_parser = parse_tz)]
    pub tz: Option<Tz>,
}

fn parse_tz(s: &str) -> Result<Tz, String> {
    s.parse::<Tz>()
        .map_err(|_| format!("unknown time zone '{}'", s))
}

fn plan(args: &NextRefreshArgs, config: &DashboardConfig, now: DateTime<Utc>) -> (RefreshPolicy, Tz, Option<RefreshDelay>) {
    let policy = match args.at {
        Some(at) => RefreshPolicy::Daily { at },
        None => config.refresh.clone(),
    };
    let tz = args.tz.unwrap_or(config.page.timezone);
    let delay = policy.reload_delay(now, tz);
    (policy, tz, delay)
}

pub fn execute(args: NextRefreshArgs, config: &DashboardConfig) -> Result<()> {
    let (policy, tz, delay) = plan(&args, config, Utc::now());
    output::print_refresh(&policy, tz, delay.as_ref());
    Ok(())
}
