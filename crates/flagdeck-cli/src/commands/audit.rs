use std::path::Path;

use flagdeck_core::audit::{AuditAction, AuditLog, AuditLogEntry};
use flagdeck_core::display::format_flag_name;
use flagdeck_core::export::{render_audit_export, suggested_export_file_name, ExportFormat};
use flagdeck_core::util::unix_timestamp_millis_now;

use crate::commands::common::{format_audit_lines, save_audit_log, CliContext};
use crate::error::CliError;

#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub action: Option<AuditAction>,
    pub flag: Option<String>,
}

/// Entries matching every given filter, newest first.
pub fn select_entries<'a>(log: &'a AuditLog, query: &AuditQuery) -> Vec<&'a AuditLogEntry> {
    let flag_name = query.flag.as_deref().map(format_flag_name);
    log.entries()
        .filter(|entry| query.action.is_none_or(|action| entry.action == action))
        .filter(|entry| {
            flag_name
                .as_deref()
                .is_none_or(|name| entry.flag_name == name)
        })
        .collect()
}

pub fn load_audit_log(context: &CliContext) -> Result<AuditLog, CliError> {
    let config = &context.config;
    let path = context
        .audit_path
        .as_deref()
        .ok_or_else(|| CliError::Config("could not determine the audit log location".to_string()))?;
    Ok(AuditLog::load_or_empty(
        path,
        config.max_audit_log_entries,
        config.audit_user.clone(),
    ))
}

pub fn run_audit_clear(context: &CliContext) -> Result<(), CliError> {
    let mut log = load_audit_log(context)?;
    let removed = log.len();
    log.clear();
    if let Some(path) = &context.audit_path {
        save_audit_log(&log, path)?;
    }
    println!("Cleared {removed} audit entries");
    Ok(())
}

pub fn run_audit(
    context: &CliContext,
    query: &AuditQuery,
    format: Option<ExportFormat>,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let log = load_audit_log(context)?;
    let entries = select_entries(&log, query);

    let format = format.or_else(|| (context.json || output_path.is_some()).then_some(ExportFormat::Json));
    let Some(format) = format else {
        if entries.is_empty() {
            println!("No audit entries.");
        }
        for line in format_audit_lines(&entries) {
            println!("{line}");
        }
        return Ok(());
    };

    let owned: Vec<AuditLogEntry> = entries.into_iter().cloned().collect();
    let rendered = render_audit_export(&owned, format)?;
    if let Some(path) = output_path {
        let path = if path.is_dir() {
            path.join(suggested_export_file_name(format, unix_timestamp_millis_now()))
        } else {
            path.to_path_buf()
        };
        std::fs::write(&path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }
    Ok(())
}
