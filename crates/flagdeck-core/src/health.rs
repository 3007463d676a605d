//! API health probing.
//!
//! A probe times one `GET /feature-flags`; the response body is discarded.
//! Polling runs in its own task and publishes [`SystemHealth`] snapshots
//! through a `watch` channel. Probe failures are never surfaced as toasts.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::api::{FlagApi, HttpFlagApi};

/// Latency above which a reachable API counts as degraded.
pub const DEGRADED_LATENCY: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Degraded,
    Down,
}

impl HealthStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthSample {
    pub reachable: bool,
    pub latency: Duration,
}

impl HealthSample {
    pub fn status(&self) -> HealthStatus {
        if !self.reachable {
            HealthStatus::Down
        } else if self.latency > DEGRADED_LATENCY {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub status: HealthStatus,
    #[serde(rename = "apiLatencyMs", serialize_with = "serialize_millis")]
    pub api_latency: Duration,
    /// `None` until the first probe completes
    pub last_check: Option<DateTime<Utc>>,
}

impl SystemHealth {
    pub fn record(&mut self, sample: HealthSample, checked_at: DateTime<Utc>) {
        self.status = sample.status();
        self.api_latency = sample.latency;
        self.last_check = Some(checked_at);
    }
}

/// Time one list request against the API.
pub async fn probe<A: FlagApi>(api: &A) -> HealthSample {
    let started = Instant::now();
    let reachable = match api.list_flags().await {
        Ok(_) => true,
        Err(error) => {
            tracing::debug!(%error, "Health probe failed");
            false
        }
    };
    HealthSample {
        reachable,
        latency: started.elapsed(),
    }
}

/// Handle to a running poller. Dropping it stops polling.
#[derive(Debug)]
pub struct HealthMonitor {
    receiver: watch::Receiver<SystemHealth>,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SystemHealth> {
        self.receiver.clone()
    }

    pub fn current(&self) -> SystemHealth {
        self.receiver.borrow().clone()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Probe immediately, then once per `interval`, until the monitor is dropped.
pub fn spawn_polling(api: HttpFlagApi, interval: Duration) -> HealthMonitor {
    let (sender, receiver) = watch::channel(SystemHealth::default());
    let period = interval.max(Duration::from_millis(1));

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let sample = probe(&api).await;
            tracing::debug!(
                status = %sample.status(),
                latency_ms = sample.latency.as_millis(),
                "Health probe completed"
            );
            sender.send_modify(|health| health.record(sample, Utc::now()));
            if sender.is_closed() {
                break;
            }
        }
    });

    HealthMonitor { receiver, task }
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}
