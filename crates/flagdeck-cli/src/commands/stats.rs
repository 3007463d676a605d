use chrono::{DateTime, Utc};
use flagdeck_core::models::{Platform, PlatformCounts, PlatformFilter};
use flagdeck_core::display::format_timestamp;
use serde::Serialize;

use crate::commands::common::{close_session, open_session, CliContext, Session, SessionKind};
use crate::error::CliError;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FlagStats {
    pub total: usize,
    pub enabled: usize,
    pub disabled: usize,
    pub platforms: PlatformCounts,
    pub last_sync: Option<DateTime<Utc>>,
}

pub fn collect_stats(session: &Session) -> FlagStats {
    let store = session.store();
    FlagStats {
        total: store.total_count(),
        enabled: store.enabled_count(),
        disabled: store.disabled_count(),
        platforms: store.platform_counts(),
        last_sync: store.last_sync(),
    }
}

pub fn format_stats_lines(stats: &FlagStats) -> Vec<String> {
    let mut lines = vec![
        format!("Total:     {}", stats.total),
        format!("Enabled:   {}", stats.enabled),
        format!("Disabled:  {}", stats.disabled),
    ];
    lines.extend(Platform::ALL.iter().map(|platform| {
        format!(
            "{:<10} {}",
            format!("{}:", platform.label()),
            stats.platforms.get(PlatformFilter::Only(*platform))
        )
    }));
    if let Some(last_sync) = stats.last_sync {
        lines.push(format!("Synced:    {}", format_timestamp(last_sync)));
    }
    lines
}

pub async fn run_stats(context: &CliContext) -> Result<(), CliError> {
    let mut session = open_session(context, SessionKind::ReadOnly)?;
    let loaded = session.load(false).await;
    close_session(&session, context, SessionKind::ReadOnly)?;
    loaded?;

    let stats = collect_stats(&session);
    if context.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        for line in format_stats_lines(&stats) {
            println!("{line}");
        }
    }
    Ok(())
}
