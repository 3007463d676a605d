use flagdeck_core::models::Flag;

use crate::commands::common::{
    close_session, normalize_flag_identifier, open_session, CliContext, Session, SessionKind,
};
use crate::error::CliError;

async fn delete_flag(session: &mut Session, key: &str) -> Result<Flag, CliError> {
    session.load(false).await?;
    let id = session.store().resolve(key)?.id;
    Ok(session.delete(id).await?)
}

pub async fn run_delete(context: &CliContext, key: &str) -> Result<(), CliError> {
    let key = normalize_flag_identifier(key)?;
    let mut session = open_session(context, SessionKind::Recording)?;
    let removed = delete_flag(&mut session, &key).await;
    close_session(&session, context, SessionKind::Recording)?;
    let removed = removed?;

    if context.json {
        println!("{}", serde_json::to_string_pretty(&removed)?);
    } else {
        println!("Deleted {} ({})", removed.name, removed.id);
    }
    Ok(())
}
