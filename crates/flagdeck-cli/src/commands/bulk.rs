use flagdeck_core::coordinator::BulkOutcome;
use flagdeck_core::FlagId;
use serde::Serialize;

use crate::commands::common::{
    close_session, open_session, resolve_flag_ids, CliContext, Session, SessionKind,
};
use crate::error::CliError;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct BulkFailure {
    pub id: FlagId,
    pub error: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct BulkReport {
    pub succeeded: Vec<FlagId>,
    pub failed: Vec<BulkFailure>,
    pub skipped: Vec<FlagId>,
}

impl From<BulkOutcome> for BulkReport {
    fn from(outcome: BulkOutcome) -> Self {
        Self {
            succeeded: outcome.succeeded,
            failed: outcome
                .failed
                .into_iter()
                .map(|(id, error)| BulkFailure { id, error })
                .collect(),
            skipped: outcome.skipped,
        }
    }
}

/// Select the given flags and drive them all to `enabled`.
pub async fn set_flags(
    session: &mut Session,
    keys: &[String],
    enabled: bool,
) -> Result<BulkReport, CliError> {
    session.load(false).await?;
    let ids = resolve_flag_ids(session, keys)?;
    session.store_mut().select_all(ids);

    let outcome = if enabled {
        session.bulk_enable().await
    } else {
        session.bulk_disable().await
    };
    Ok(outcome.into())
}

pub fn format_bulk_lines(report: &BulkReport, enabled: bool) -> Vec<String> {
    let verb = if enabled { "Enabled" } else { "Disabled" };
    let join = |ids: &[FlagId]| {
        ids.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut lines = vec![format!("{verb}: {}", report.succeeded.len())];
    if !report.skipped.is_empty() {
        lines.push(format!("Already {}: {}", verb.to_lowercase(), join(&report.skipped)));
    }
    for failure in &report.failed {
        lines.push(format!("Failed {}: {}", failure.id, failure.error));
    }
    lines
}

pub async fn run_bulk(context: &CliContext, keys: &[String], enabled: bool) -> Result<(), CliError> {
    let mut session = open_session(context, SessionKind::Recording)?;
    let report = set_flags(&mut session, keys, enabled).await;
    close_session(&session, context, SessionKind::Recording)?;
    let report = report?;

    if context.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_bulk_lines(&report, enabled) {
            println!("{line}");
        }
    }

    if !report.failed.is_empty() {
        return Err(CliError::PartialFailure {
            failed: report.failed.len(),
            attempted: report.failed.len() + report.succeeded.len(),
        });
    }
    Ok(())
}
