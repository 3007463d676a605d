use flagdeck_core::models::{Flag, FlagEnvironment, FlagUpdate, RolloutPercentage};

use crate::commands::common::{
    close_session, normalize_flag_identifier, open_session, CliContext, Session, SessionKind,
};
use crate::error::CliError;

pub fn build_flag_update(
    description: Option<String>,
    environment: Option<FlagEnvironment>,
    rollout: Option<u8>,
) -> Result<FlagUpdate, CliError> {
    let update = FlagUpdate {
        description: description.map(|description| description.trim().to_string()),
        environment,
        rollout_percentage: rollout
            .map(|rollout| RolloutPercentage::new(i64::from(rollout)))
            .transpose()?,
        ..FlagUpdate::default()
    };
    if update.is_empty() {
        return Err(CliError::NothingToUpdate);
    }
    Ok(update)
}

async fn update_flag(session: &mut Session, key: &str, update: &FlagUpdate) -> Result<Flag, CliError> {
    session.load(false).await?;
    let id = session.store().resolve(key)?.id;
    Ok(session.update(id, update).await?)
}

pub async fn run_update(context: &CliContext, key: &str, update: &FlagUpdate) -> Result<(), CliError> {
    let key = normalize_flag_identifier(key)?;
    let mut session = open_session(context, SessionKind::Recording)?;
    let updated = update_flag(&mut session, &key, update).await;
    close_session(&session, context, SessionKind::Recording)?;
    let updated = updated?;

    if context.json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        println!("{}", updated.id);
    }
    Ok(())
}
