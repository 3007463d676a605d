use flagdeck_core::models::{CreateFlagRequest, Flag, FlagEnvironment, RolloutPercentage};

use crate::commands::common::{close_session, open_session, CliContext, SessionKind};
use crate::error::CliError;

pub fn build_create_request(
    name: &str,
    description: &str,
    environment: FlagEnvironment,
    rollout: u8,
    disabled: bool,
) -> Result<CreateFlagRequest, CliError> {
    let request = CreateFlagRequest::new(name)
        .description(description)
        .environment(environment)
        .rollout(RolloutPercentage::new(i64::from(rollout))?)
        .enabled(!disabled);
    Ok(request.normalized()?)
}

pub async fn run_create(context: &CliContext, request: CreateFlagRequest) -> Result<Flag, CliError> {
    let mut session = open_session(context, SessionKind::Recording)?;
    let created = session.create(request).await;
    close_session(&session, context, SessionKind::Recording)?;
    let created = created?;

    if context.json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!("{}", created.id);
    }
    Ok(created)
}
