use std::env;
use std::path::{Path, PathBuf};

use chrono::Utc;
use flagdeck_core::api::HttpFlagApi;
use flagdeck_core::audit::{AuditLog, AuditLogEntry};
use flagdeck_core::categorize::{place, Placement};
use flagdeck_core::config::{
    CategoryCatalog, EnvironmentConfig, EnvironmentProfile, OTHER_CATEGORY_NAME,
};
use flagdeck_core::coordinator::Coordinator;
use flagdeck_core::display::{
    format_flag_name, format_relative_time, format_timestamp, relative_to_now,
};
use flagdeck_core::models::{Category, Flag, FlagId};
use flagdeck_core::notify::{NotificationQueue, Toast};
use flagdeck_core::store::FlagStore;

use crate::cli::ProfileArg;
use crate::error::CliError;

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct CliContext {
    pub config: EnvironmentConfig,
    /// Where the audit log is persisted; `None` keeps it in memory only
    pub audit_path: Option<PathBuf>,
    pub json: bool,
}

/// Resolve configuration from the environment with CLI overrides on top.
pub fn resolve_config(
    api_url: Option<&str>,
    profile: Option<ProfileArg>,
) -> Result<EnvironmentConfig, CliError> {
    resolve_config_with(api_url, profile, |name| env::var(name).ok())
}

pub fn resolve_config_with(
    api_url: Option<&str>,
    profile: Option<ProfileArg>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<EnvironmentConfig, CliError> {
    let profile = profile.map(|profile| EnvironmentProfile::from(profile).as_str().to_string());

    let config = EnvironmentConfig::from_lookup(|name| match name {
        "FLAGDECK_API_URL" if api_url.is_some() => api_url.map(str::to_string),
        "FLAGDECK_PROFILE" if profile.is_some() => profile.clone(),
        _ => lookup(name),
    })?;
    Ok(config)
}

pub fn default_audit_log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("flagdeck").join("audit-log.json"))
}

pub type Session = Coordinator<HttpFlagApi>;

/// Whether a command changes flags and therefore writes audit entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    ReadOnly,
    Recording,
}

/// Build the coordinator for one invocation. Recording sessions restore the
/// persisted audit log; read-only sessions never touch it.
pub fn open_session(context: &CliContext, kind: SessionKind) -> Result<Session, CliError> {
    let config = &context.config;
    let api = HttpFlagApi::new(config)?;
    let store = FlagStore::new(api, config);
    let audit = match (&context.audit_path, kind) {
        (Some(path), SessionKind::Recording) => AuditLog::load_or_empty(
            path,
            config.max_audit_log_entries,
            config.audit_user.clone(),
        ),
        _ => AuditLog::from_config(config),
    };
    // Toasts are printed before exit, so they never need to expire.
    let notifications = NotificationQueue::new(std::time::Duration::ZERO);
    Ok(Coordinator::new(store, audit, notifications))
}

/// Print queued toasts to stderr and, for recording sessions, persist the
/// audit log.
pub fn close_session(
    session: &Session,
    context: &CliContext,
    kind: SessionKind,
) -> Result<(), CliError> {
    for line in format_toast_lines(&session.notifications().toasts()) {
        eprintln!("{line}");
    }
    session.notifications().dismiss_all();

    if kind == SessionKind::Recording {
        if let Some(path) = &context.audit_path {
            save_audit_log(session.audit(), path)?;
        }
    }
    Ok(())
}

pub fn save_audit_log(audit: &AuditLog, path: &Path) -> Result<(), CliError> {
    audit.save_to_path(path)?;
    tracing::debug!(path = %path.display(), entries = audit.len(), "Saved audit log");
    Ok(())
}

pub fn normalize_flag_identifier(raw: &str) -> Result<String, CliError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyFlagIdentifier);
    }
    Ok(trimmed.to_string())
}

/// Resolve ids or names against the loaded store, keeping the given order
/// and dropping repeats.
pub fn resolve_flag_ids(session: &Session, keys: &[String]) -> Result<Vec<FlagId>, CliError> {
    let mut ids = Vec::with_capacity(keys.len());
    for key in keys {
        let key = normalize_flag_identifier(key)?;
        let id = session.store().resolve(&key)?.id;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

pub fn format_toast_lines(toasts: &[Toast]) -> Vec<String> {
    toasts
        .iter()
        .map(|toast| format!("[{}] {}: {}", toast.kind, toast.title, toast.message))
        .collect()
}

pub fn status_label(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

pub fn format_flag_line(flag: &Flag, now_ms: i64) -> String {
    let relative_time = format_relative_time(flag.updated_at.timestamp_millis(), now_ms);
    format!(
        "{:<4} {:>5}  {:<36} {:<12} {:>4}%  {}",
        status_label(flag.enabled),
        flag.id.to_string(),
        flag.name,
        flag.environment.as_str(),
        flag.rollout_percentage.get(),
        relative_time
    )
}

pub fn format_category_lines(categories: &[Category]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    let mut lines = Vec::new();
    for (index, category) in categories.iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }
        lines.push(format!(
            "{} {} ({}) {}/{} enabled",
            category.icon,
            category.name,
            category.platform,
            category.enabled_count(),
            category.flags.len()
        ));
        lines.extend(
            category
                .flags
                .iter()
                .map(|flag| format!("  {}", format_flag_line(flag, now_ms))),
        );
    }
    lines
}

pub fn category_name_for(flag: &Flag, catalog: &CategoryCatalog) -> String {
    match place(&flag.name, catalog) {
        Placement::Declared(index) => catalog.definitions()[index].name.clone(),
        Placement::Other => OTHER_CATEGORY_NAME.to_string(),
    }
}

pub fn format_flag_details(flag: &Flag, catalog: &CategoryCatalog) -> Vec<String> {
    let mut lines = vec![
        format!("ID:          {}", flag.id),
        format!("Name:        {}", flag.name),
        format!("Display:     {}", format_flag_name(&flag.name)),
        format!("Category:    {}", category_name_for(flag, catalog)),
        format!("Status:      {}", if flag.enabled { "enabled" } else { "disabled" }),
        format!("Environment: {}", flag.environment),
        format!("Rollout:     {}", flag.rollout_percentage),
    ];
    if !flag.description.is_empty() {
        lines.push(format!("Description: {}", flag.description));
    }
    if let Some(variant) = &flag.variant_name {
        lines.push(format!("Variant:     {variant}"));
    }
    lines.push(format!("Created:     {}", format_timestamp(flag.created_at)));
    lines.push(format!(
        "Updated:     {} ({})",
        format_timestamp(flag.updated_at),
        relative_to_now(flag.updated_at)
    ));
    lines
}

pub fn format_audit_lines(entries: &[&AuditLogEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let change = match (entry.previous_value, entry.new_value) {
                (Some(previous), Some(new)) => {
                    format!("  {} -> {}", status_label(previous), status_label(new))
                }
                (None, Some(new)) => format!("  -> {}", status_label(new)),
                _ => String::new(),
            };
            format!(
                "#{:<4} {}  {:<10} {:<8}  {}{change}",
                entry.id,
                format_timestamp(entry.timestamp),
                entry.user,
                entry.action.as_str(),
                entry.flag_name
            )
        })
        .collect()
}
