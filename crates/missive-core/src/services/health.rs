//! Aggregate health report: process liveness plus a time-boxed store probe.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::entities::StoreProbe;

/// Budget for a single store probe unless configured otherwise.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// `UP` only when both the process and the store probe are healthy.
    pub status: HealthStatus,
    /// Always `UP`: answering at all proves the process is alive.
    pub api: HealthStatus,
    pub database: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_error: Option<String>,
    /// Crate version of the running build.
    pub version: String,
    /// Milliseconds since the reporter was created at startup.
    pub uptime: u64,
}

#[derive(Debug)]
pub struct HealthReporter<P> {
    probe: Arc<P>,
    timeout: Duration,
    started_at: Instant,
}

impl<P: StoreProbe> HealthReporter<P> {
    pub fn new(probe: Arc<P>) -> Self {
        Self {
            probe,
            timeout: DEFAULT_PROBE_TIMEOUT,
            started_at: Instant::now(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Probe the store and build a report. Never fails: problems are
    /// reported as `DOWN` with a diagnostic in `db_error`.
    pub async fn report(&self) -> HealthReport {
        let uptime = u64::try_from(self.started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut report = HealthReport {
            status: HealthStatus::Up,
            api: HealthStatus::Up,
            database: HealthStatus::Up,
            db_type: None,
            db_version: None,
            db_error: None,
            version: env!("CARGO_PKG_VERSION").to_owned(),
            uptime,
        };

        match tokio::time::timeout(self.timeout, self.probe.probe()).await {
            Ok(Ok(info)) => {
                report.db_type = Some(info.db_type);
                report.db_version = Some(info.db_version);
            }
            Ok(Err(e)) => {
                warn!(error = %e, "database probe failed");
                report.database = HealthStatus::Down;
                report.db_error = Some(e.to_string());
            }
            Err(_) => {
                let budget_ms = self.timeout.as_millis();
                warn!(budget_ms, "database probe timed out");
                report.database = HealthStatus::Down;
                report.db_error = Some(format!("database probe timed out after {budget_ms} ms"));
            }
        }

        if report.database == HealthStatus::Down {
            report.status = HealthStatus::Down;
        }
        report
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
