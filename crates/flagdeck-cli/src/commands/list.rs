use flagdeck_core::filter::{visible_flags, FilterOptions};

use crate::commands::common::{
    close_session, format_category_lines, open_session, CliContext, SessionKind,
};
use crate::error::CliError;

pub async fn run_list(context: &CliContext, options: &FilterOptions) -> Result<(), CliError> {
    let mut session = open_session(context, SessionKind::ReadOnly)?;
    let loaded = session.load(false).await;
    close_session(&session, context, SessionKind::ReadOnly)?;
    loaded?;

    let categories = session.store().filter(options);
    if context.json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else if categories.is_empty() {
        println!("No flags match the current filters.");
    } else {
        let counts = session.store().platform_counts();
        println!(
            "{} ({} flags, showing {})",
            options.platform.label(),
            counts.get(options.platform),
            visible_flags(&categories).len()
        );
        println!();
        for line in format_category_lines(&categories) {
            println!("{line}");
        }
    }

    Ok(())
}
