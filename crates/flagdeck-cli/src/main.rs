//! Flagdeck CLI - administer feature flags from the terminal
//!
//! Lists, inspects and mutates flags through the flag API and keeps a local
//! audit trail of every change made from this machine.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;
use flagdeck_core::filter::FilterOptions;

use crate::cli::{Cli, Commands};
use crate::commands::audit::{run_audit, run_audit_clear, AuditQuery};
use crate::commands::bulk::run_bulk;
use crate::commands::common::{default_audit_log_path, resolve_config, CliContext};
use crate::commands::completions::run_completions;
use crate::commands::create::{build_create_request, run_create};
use crate::commands::delete::run_delete;
use crate::commands::health::run_health;
use crate::commands::list::run_list;
use crate::commands::show::run_show;
use crate::commands::stats::run_stats;
use crate::commands::toggle::run_toggle;
use crate::commands::update::{build_flag_update, run_update};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "flagdeck=info"
                    .parse()
                    .map_err(|error| CliError::Config(format!("invalid log directive: {error}")))?,
            ),
        )
        .init();

    let cli = Cli::parse();
    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let context = CliContext {
        config: resolve_config(cli.api_url.as_deref(), cli.profile)?,
        audit_path: default_audit_log_path(),
        json: cli.json,
    };
    tracing::debug!(
        profile = %context.config.profile,
        api = %context.config.api_base_url,
        "Resolved configuration"
    );

    match cli.command {
        Commands::List {
            platform,
            filter,
            search,
            sort,
        } => {
            let options = FilterOptions {
                platform: platform.into(),
                quick: filter.map(Into::into),
                search: search.unwrap_or_default(),
                sort: sort.into(),
            };
            run_list(&context, &options).await?;
        }
        Commands::Stats => run_stats(&context).await?,
        Commands::Show { flag } => run_show(&context, &flag).await?,
        Commands::Toggle { flags } => run_toggle(&context, &flags).await?,
        Commands::Enable { flags } => run_bulk(&context, &flags, true).await?,
        Commands::Disable { flags } => run_bulk(&context, &flags, false).await?,
        Commands::Create {
            name,
            description,
            environment,
            rollout,
            disabled,
        } => {
            let request =
                build_create_request(&name, &description, environment.into(), rollout, disabled)?;
            run_create(&context, request).await?;
        }
        Commands::Update {
            flag,
            description,
            environment,
            rollout,
        } => {
            let update = build_flag_update(description, environment.map(Into::into), rollout)?;
            run_update(&context, &flag, &update).await?;
        }
        Commands::Delete { flag } => run_delete(&context, &flag).await?,
        Commands::Audit {
            action,
            flag,
            format,
            output,
            clear,
        } => {
            if clear {
                run_audit_clear(&context)?;
            } else {
                let query = AuditQuery {
                    action: action.map(Into::into),
                    flag,
                };
                run_audit(&context, &query, format.map(Into::into), output.as_deref())?;
            }
        }
        Commands::Health { watch, interval_ms } => {
            run_health(&context, watch, interval_ms).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
