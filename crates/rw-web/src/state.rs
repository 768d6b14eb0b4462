//! Application state.

use chrono::{DateTime, Utc};
use rw_core::DashboardConfig;
use rw_storage::ReportService;
use std::sync::Arc;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub reports: Arc<ReportService>,
    clock: Clock,
}

impl AppState {
    pub fn new(config: DashboardConfig, reports: ReportService) -> Self {
        Self {
            config: Arc::new(config),
            reports: Arc::new(reports),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock, for deterministic rendering.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}
