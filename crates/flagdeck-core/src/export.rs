//! Audit trail export helpers shared by every front end.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::audit::AuditLogEntry;

pub const CSV_HEADER: [&str; 7] = [
    "ID",
    "Timestamp",
    "User",
    "Action",
    "Flag Name",
    "Previous Value",
    "New Value",
];

/// Export output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Render entries as pretty-printed JSON, in the order given.
pub fn render_json_export(entries: &[AuditLogEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}

/// Render entries as CSV. Absent values become empty cells.
#[must_use]
pub fn render_csv_export(entries: &[AuditLogEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(CSV_HEADER.join(","));

    for entry in entries {
        let row = [
            entry.id.to_string(),
            entry
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            csv_cell(&entry.user),
            entry.action.as_str().to_string(),
            csv_cell(&entry.flag_name),
            optional_bool(entry.previous_value),
            optional_bool(entry.new_value),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

pub fn render_audit_export(
    entries: &[AuditLogEntry],
    format: ExportFormat,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(entries),
        ExportFormat::Csv => Ok(render_csv_export(entries)),
    }
}

/// Build a deterministic default file name for export flows.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("flagdeck-audit-{timestamp_ms}.{}", format.extension())
}

fn optional_bool(value: Option<bool>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

// Quote only when the cell would otherwise break the row.
fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditAction;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn entry(id: u64, action: AuditAction, previous: Option<bool>, new: Option<bool>) -> AuditLogEntry {
        AuditLogEntry {
            id,
            flag_name: "Dark Mode".to_string(),
            action,
            previous_value: previous,
            new_value: new,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
            user: "Admin".to_string(),
        }
    }

    #[test]
    fn csv_has_header_and_empty_cells() {
        let rendered = render_csv_export(&[
            entry(2, AuditAction::Enabled, Some(false), Some(true)),
            entry(1, AuditAction::Deleted, None, None),
        ]);

        assert_eq!(
            rendered,
            "ID,Timestamp,User,Action,Flag Name,Previous Value,New Value\n\
             2,2024-03-01T12:30:00.000Z,Admin,enabled,Dark Mode,false,true\n\
             1,2024-03-01T12:30:00.000Z,Admin,deleted,Dark Mode,,"
        );
    }

    #[test]
    fn csv_quotes_cells_with_separators() {
        let mut tricky = entry(1, AuditAction::Updated, None, None);
        tricky.flag_name = "Say \"hi\", there".to_string();
        let rendered = render_csv_export(&[tricky]);
        assert!(rendered.ends_with(",\"Say \"\"hi\"\", there\",,"));
    }

    #[test]
    fn csv_of_empty_log_is_header_only() {
        assert_eq!(render_csv_export(&[]), CSV_HEADER.join(","));
    }

    #[test]
    fn json_uses_wire_field_names() {
        let rendered = render_json_export(&[entry(3, AuditAction::Created, None, Some(true))]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value[0]["flagName"], "Dark Mode");
        assert_eq!(value[0]["action"], "created");
        assert_eq!(value[0]["newValue"], true);
        assert!(value[0].get("previousValue").is_none());
        assert!(rendered.contains("\n  "));
    }

    #[test]
    fn suggested_export_file_name_uses_format_extension() {
        assert_eq!(
            suggested_export_file_name(ExportFormat::Json, 123),
            "flagdeck-audit-123.json"
        );
        assert_eq!(
            suggested_export_file_name(ExportFormat::Csv, 456),
            "flagdeck-audit-456.csv"
        );
    }
}
