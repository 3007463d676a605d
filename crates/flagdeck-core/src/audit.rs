//! In-memory audit trail of flag mutations.
//!
//! Entries are kept newest first and bounded; the oldest entry is evicted once
//! the configured maximum is exceeded.

use std::collections::VecDeque;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EnvironmentConfig;
use crate::display::format_flag_name;
use crate::error::{Error, Result};
use crate::export::{render_audit_export, ExportFormat};
use crate::models::Flag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Enabled,
    Disabled,
    Created,
    Updated,
    Deleted,
}

impl AuditAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "deleted" => Ok(Self::Deleted),
            other => Err(Error::InvalidInput(format!("unknown audit action '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: u64,
    /// Display form of the flag name, e.g. "Dark Mode"
    pub flag_name: String,
    pub action: AuditAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<bool>,
    pub timestamp: DateTime<Utc>,
    pub user: String,
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: VecDeque<AuditLogEntry>,
    last_id: u64,
    max_entries: usize,
    user: String,
}

impl AuditLog {
    pub fn new(max_entries: usize, user: impl Into<String>) -> Self {
        Self {
            entries: VecDeque::new(),
            last_id: 0,
            max_entries,
            user: user.into(),
        }
    }

    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self::new(config.max_audit_log_entries, config.audit_user.clone())
    }

    pub fn log_toggle(&mut self, flag_name: &str, previous_value: bool, new_value: bool) -> u64 {
        let action = if new_value {
            AuditAction::Enabled
        } else {
            AuditAction::Disabled
        };
        self.record(flag_name, action, Some(previous_value), Some(new_value))
    }

    pub fn log_create(&mut self, flag: &Flag) -> u64 {
        self.record(&flag.name, AuditAction::Created, None, Some(flag.enabled))
    }

    pub fn log_update(&mut self, flag: &Flag) -> u64 {
        self.record(&flag.name, AuditAction::Updated, None, None)
    }

    pub fn log_delete(&mut self, flag_name: &str) -> u64 {
        self.record(flag_name, AuditAction::Deleted, None, None)
    }

    /// Entries newest first.
    pub fn entries(&self) -> impl Iterator<Item = &AuditLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn entries_by_action(&self, action: AuditAction) -> Vec<&AuditLogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.action == action)
            .collect()
    }

    /// Accepts either the raw flag name or its display form.
    pub fn entries_for_flag(&self, flag_name: &str) -> Vec<&AuditLogEntry> {
        let formatted = format_flag_name(flag_name);
        self.entries
            .iter()
            .filter(|entry| entry.flag_name == formatted)
            .collect()
    }

    pub fn export(&self, format: ExportFormat) -> Result<String> {
        let entries: Vec<AuditLogEntry> = self.entries.iter().cloned().collect();
        Ok(render_audit_export(&entries, format)?)
    }

    /// Empty the log. Ids keep counting from where they were.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Restore a log saved with [`AuditLog::save_to_path`]. A missing file
    /// yields an empty log.
    pub fn load_from_path(path: &Path, max_entries: usize, user: impl Into<String>) -> Result<Self> {
        let mut log = Self::new(max_entries, user);
        if !path.exists() {
            return Ok(log);
        }

        let raw = std::fs::read_to_string(path)?;
        let mut entries: Vec<AuditLogEntry> = if raw.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&raw)?
        };
        entries.sort_by(|left, right| right.id.cmp(&left.id));

        log.last_id = entries.iter().map(|entry| entry.id).max().unwrap_or(0);
        log.entries = entries.into();
        log.enforce_bound();
        tracing::debug!(
            path = %path.display(),
            entries = log.entries.len(),
            "Loaded audit log"
        );
        Ok(log)
    }

    /// Like [`AuditLog::load_from_path`], but an unreadable or corrupt file
    /// starts an empty log instead of failing.
    pub fn load_or_empty(path: &Path, max_entries: usize, user: impl Into<String>) -> Self {
        let user = user.into();
        match Self::load_from_path(path, max_entries, user.clone()) {
            Ok(log) => log,
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "Audit log could not be read, starting an empty one"
                );
                Self::new(max_entries, user)
            }
        }
    }

    /// Write the log as JSON. The file is replaced atomically, so an
    /// interrupted save leaves the previous contents in place.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;
        let rendered = self.export(ExportFormat::Json)?;

        let mut file = tempfile::NamedTempFile::new_in(parent)?;
        file.write_all(rendered.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|error| error.error)?;
        Ok(())
    }

    fn record(
        &mut self,
        flag_name: &str,
        action: AuditAction,
        previous_value: Option<bool>,
        new_value: Option<bool>,
    ) -> u64 {
        self.last_id += 1;
        let entry = AuditLogEntry {
            id: self.last_id,
            flag_name: format_flag_name(flag_name),
            action,
            previous_value,
            new_value,
            timestamp: Utc::now(),
            user: self.user.clone(),
        };
        tracing::info!(id = entry.id, flag = %entry.flag_name, action = %action, "Audit entry recorded");
        self.entries.push_front(entry);
        self.enforce_bound();
        self.last_id
    }

    fn enforce_bound(&mut self) {
        if self.entries.len() > self.max_entries {
            let evicted = self.entries.len() - self.max_entries;
            self.entries.truncate(self.max_entries);
            tracing::debug!(evicted, "Trimmed audit log to its bound");
        }
    }
}
