use flagdeck_core::models::Flag;
use flagdeck_core::FlagId;
use serde::Serialize;

use crate::commands::common::{
    close_session, open_session, resolve_flag_ids, status_label, CliContext, Session, SessionKind,
};
use crate::error::CliError;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ToggleReport {
    pub id: FlagId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToggleReport {
    fn from_result(id: FlagId, result: flagdeck_core::Result<Flag>) -> Self {
        match result {
            Ok(flag) => Self {
                id,
                enabled: Some(flag.enabled),
                error: None,
            },
            Err(error) => Self {
                id,
                enabled: None,
                error: Some(error.to_string()),
            },
        }
    }
}

pub async fn toggle_flags(
    session: &mut Session,
    keys: &[String],
) -> Result<Vec<ToggleReport>, CliError> {
    session.load(false).await?;
    let ids = resolve_flag_ids(session, keys)?;
    Ok(session
        .toggle_many(&ids)
        .await
        .into_iter()
        .map(|(id, result)| ToggleReport::from_result(id, result))
        .collect())
}

pub fn format_toggle_lines(reports: &[ToggleReport]) -> Vec<String> {
    reports
        .iter()
        .map(|report| match (&report.enabled, &report.error) {
            (Some(enabled), _) => format!("{:>5}  now {}", report.id.to_string(), status_label(*enabled)),
            (None, Some(error)) => format!("{:>5}  failed: {error}", report.id.to_string()),
            (None, None) => format!("{:>5}  unchanged", report.id.to_string()),
        })
        .collect()
}

pub async fn run_toggle(context: &CliContext, keys: &[String]) -> Result<(), CliError> {
    let mut session = open_session(context, SessionKind::Recording)?;
    let reports = toggle_flags(&mut session, keys).await;
    close_session(&session, context, SessionKind::Recording)?;
    let reports = reports?;

    if context.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for line in format_toggle_lines(&reports) {
            println!("{line}");
        }
    }

    let failed = reports.iter().filter(|report| report.error.is_some()).count();
    if failed > 0 {
        return Err(CliError::PartialFailure {
            failed,
            attempted: reports.len(),
        });
    }
    Ok(())
}
