use crate::commands::common::{
    close_session, format_flag_details, normalize_flag_identifier, open_session, CliContext,
    SessionKind,
};
use crate::error::CliError;

pub async fn run_show(context: &CliContext, key: &str) -> Result<(), CliError> {
    let key = normalize_flag_identifier(key)?;
    let mut session = open_session(context, SessionKind::ReadOnly)?;
    let loaded = session.load(false).await;
    close_session(&session, context, SessionKind::ReadOnly)?;
    loaded?;

    let store = session.store();
    let flag = store.resolve(&key)?;
    if context.json {
        println!("{}", serde_json::to_string_pretty(flag)?);
    } else {
        for line in format_flag_details(flag, store.catalog()) {
            println!("{line}");
        }
    }
    Ok(())
}
