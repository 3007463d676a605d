use std::time::Duration;

use chrono::Utc;
use flagdeck_core::api::HttpFlagApi;
use flagdeck_core::display::format_timestamp;
use flagdeck_core::health::{probe, spawn_polling, SystemHealth};

use crate::commands::common::CliContext;
use crate::error::CliError;

pub fn format_health_line(health: &SystemHealth) -> String {
    let checked = health
        .last_check
        .map_or_else(|| "never".to_string(), format_timestamp);
    format!(
        "{:<8}  {:>5} ms  checked {checked}",
        health.status.as_str(),
        health.api_latency.as_millis()
    )
}

fn print_health(health: &SystemHealth, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string(health)?);
    } else {
        println!("{}", format_health_line(health));
    }
    Ok(())
}

pub async fn check_once(api: &HttpFlagApi) -> SystemHealth {
    let sample = probe(api).await;
    let mut health = SystemHealth::default();
    health.record(sample, Utc::now());
    health
}

pub async fn run_health(
    context: &CliContext,
    watch: bool,
    interval_ms: Option<u64>,
) -> Result<(), CliError> {
    let api = HttpFlagApi::new(&context.config)?;

    if !watch {
        let health = check_once(&api).await;
        return print_health(&health, context.json);
    }

    let interval = interval_ms.map_or(context.config.health_check_interval, Duration::from_millis);
    if interval.is_zero() {
        return Err(CliError::Config("--interval-ms must be greater than 0".to_string()));
    }
    tracing::info!(interval_ms = interval.as_millis(), "Watching API health");

    let monitor = spawn_polling(api, interval);
    let mut updates = monitor.subscribe();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let health = updates.borrow_and_update().clone();
                print_health(&health, context.json)?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    monitor.stop();
    Ok(())
}
