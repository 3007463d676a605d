use std::path::PathBuf;

use clap::CommandFactory;
use flagdeck_core::audit::{AuditAction, AuditLog};
use flagdeck_core::config::{CategoryCatalog, EnvironmentConfig, EnvironmentProfile};
use flagdeck_core::filter::FilterOptions;
use flagdeck_core::models::{FlagEnvironment, FlagId};
use flagdeck_core::notify::{NotificationQueue, ToastKind};
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::cli::{Cli, CompletionShell, ProfileArg};
use crate::commands::audit::{run_audit, select_entries, AuditQuery};
use crate::commands::bulk::set_flags;
use crate::commands::common::{
    close_session, format_category_lines, format_flag_details, format_toast_lines,
    normalize_flag_identifier, open_session, resolve_config_with, CliContext, SessionKind,
};
use crate::commands::list::run_list;
use crate::commands::completions::render_completions;
use crate::commands::create::{build_create_request, run_create};
use crate::commands::delete::run_delete;
use crate::commands::stats::collect_stats;
use crate::commands::toggle::{format_toggle_lines, toggle_flags};
use crate::commands::update::build_flag_update;
use crate::error::CliError;

fn flag_json(id: i64, name: &str, enabled: bool) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "enabled": enabled,
        "environment": "all",
        "rolloutPercentage": 100,
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-02T00:00:00Z"
    })
}

fn sample_flags_json() -> serde_json::Value {
    json!([
        flag_json(1, "ui.dark-mode", false),
        flag_json(2, "mobile.offline-sync", true),
        flag_json(3, "chat.typing-indicator", true)
    ])
}

fn test_context(server: &MockServer, dir: &tempfile::TempDir) -> CliContext {
    let mut config = EnvironmentConfig::development()
        .with_api_base_url(&server.url("/api"))
        .unwrap();
    config.load_retry_count = 0;
    CliContext {
        config,
        audit_path: Some(dir.path().join("audit-log.json")),
        json: false,
    }
}

fn saved_audit(context: &CliContext) -> AuditLog {
    AuditLog::load_from_path(context.audit_path.as_ref().unwrap(), 50, "Admin").unwrap()
}

#[test]
fn cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn resolve_config_prefers_cli_overrides() {
    let lookup = |name: &str| match name {
        "FLAGDECK_API_URL" => Some("https://flags.example.com/api".to_string()),
        "FLAGDECK_USER" => Some("ops-bot".to_string()),
        _ => None,
    };

    let from_env = resolve_config_with(None, None, lookup).unwrap();
    assert_eq!(from_env.profile, EnvironmentProfile::Production);
    assert_eq!(from_env.api_base_url, "https://flags.example.com/api");
    assert_eq!(from_env.audit_user, "ops-bot");

    let local = resolve_config_with(Some("http://localhost:8080/api/"), None, lookup).unwrap();
    assert_eq!(local.profile, EnvironmentProfile::Development);
    assert_eq!(local.api_base_url, "http://localhost:8080/api");
    assert_eq!(local.max_audit_log_entries, 50);

    let forced = resolve_config_with(None, Some(ProfileArg::Development), lookup).unwrap();
    assert_eq!(forced.profile, EnvironmentProfile::Development);
    assert_eq!(forced.api_base_url, "https://flags.example.com/api");
}

#[test]
fn resolve_config_rejects_non_http_url() {
    let result = resolve_config_with(Some("ftp://flags"), None, |_| None);
    assert!(matches!(result, Err(CliError::Core(_))));
}

#[test]
fn normalize_flag_identifier_rejects_empty() {
    assert_eq!(normalize_flag_identifier("  7 ").unwrap(), "7");
    assert!(matches!(
        normalize_flag_identifier("  "),
        Err(CliError::EmptyFlagIdentifier)
    ));
}

#[test]
fn toast_lines_include_kind_and_title() {
    let queue = NotificationQueue::new(std::time::Duration::ZERO);
    queue.show(ToastKind::Success, "Flag Updated", "Dark Mode is now enabled", None);
    assert_eq!(
        format_toast_lines(&queue.toasts()),
        vec!["[success] Flag Updated: Dark Mode is now enabled"]
    );
}

#[test]
fn build_create_request_applies_options() {
    let request =
        build_create_request("  ui.compact  ", " Compact ", FlagEnvironment::Production, 25, true)
            .unwrap();
    assert_eq!(request.name, "ui.compact");
    assert_eq!(request.description, "Compact");
    assert_eq!(request.environment, FlagEnvironment::Production);
    assert_eq!(request.rollout_percentage.get(), 25);
    assert!(!request.enabled);

    assert!(build_create_request(" ", "", FlagEnvironment::All, 100, false).is_err());
}

#[test]
fn build_flag_update_requires_a_change() {
    assert!(matches!(
        build_flag_update(None, None, None),
        Err(CliError::NothingToUpdate)
    ));
    let update = build_flag_update(None, None, Some(40)).unwrap();
    assert_eq!(update.rollout_percentage.map(|value| value.get()), Some(40));
}

#[test]
fn completions_mention_binary_name() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("flagdeck"));
}

#[test]
fn audit_selection_combines_filters() {
    let mut log = AuditLog::new(10, "Admin");
    log.log_toggle("ui.dark-mode", false, true);
    log.log_toggle("chat.typing-indicator", true, false);
    log.log_toggle("ui.dark-mode", true, false);

    let all = select_entries(&log, &AuditQuery::default());
    assert_eq!(all.len(), 3);

    let query = AuditQuery {
        action: Some(AuditAction::Disabled),
        flag: Some("ui.dark-mode".to_string()),
    };
    let selected = select_entries(&log, &query);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, 3);
}

#[tokio::test]
async fn list_view_groups_and_describes_flags() {
    let server = MockServer::start_async().await;
    let list = server.mock(|when, then| {
        when.method(GET).path("/api/feature-flags");
        then.status(200).json_body(sample_flags_json());
    });
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(&server, &dir);

    let mut session = open_session(&context, SessionKind::ReadOnly).unwrap();
    session.load(false).await.unwrap();
    list.assert();

    let lines = format_category_lines(&session.store().categories());
    assert!(lines[0].contains("UI/UX (frontend) 0/1 enabled"));
    assert!(lines.iter().any(|line| line.contains("mobile.offline-sync")));

    let stats = collect_stats(&session);
    assert_eq!((stats.total, stats.enabled, stats.disabled), (3, 2, 1));
    assert_eq!(stats.platforms.shared, 1);

    let flag = session.store().resolve("chat.typing-indicator").unwrap();
    let details = format_flag_details(flag, &CategoryCatalog::default());
    assert!(details.contains(&"Category:    Chat".to_string()));
    assert!(details.contains(&"Display:     Typing Indicator".to_string()));
}

#[tokio::test]
async fn toggle_persists_audit_entries() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/api/feature-flags");
        then.status(200).json_body(sample_flags_json());
    });
    let toggle = server.mock(|when, then| {
        when.method(POST).path("/api/feature-flags/1/toggle");
        then.status(200).json_body(flag_json(1, "ui.dark-mode", true));
    });
    let failing = server.mock(|when, then| {
        when.method(POST).path("/api/feature-flags/3/toggle");
        then.status(503).json_body(json!({ "message": "maintenance window" }));
    });
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(&server, &dir);

    let mut session = open_session(&context, SessionKind::Recording).unwrap();
    let reports = toggle_flags(&mut session, &["ui.dark-mode".to_string(), "3".to_string()])
        .await
        .unwrap();
    close_session(&session, &context, SessionKind::Recording).unwrap();
    toggle.assert();
    failing.assert();

    assert_eq!(reports[0].enabled, Some(true));
    assert!(reports[1].error.as_deref().unwrap().contains("maintenance window"));
    let lines = format_toggle_lines(&reports);
    assert!(lines[0].ends_with("now on"));

    let audit = saved_audit(&context);
    let entries: Vec<_> = audit.entries().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Enabled);
    assert_eq!(entries[0].flag_name, "Dark Mode");
}

#[tokio::test]
async fn bulk_enable_skips_flags_already_enabled() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/api/feature-flags");
        then.status(200).json_body(sample_flags_json());
    });
    let toggle = server.mock(|when, then| {
        when.method(POST).path("/api/feature-flags/1/toggle");
        then.status(200).json_body(flag_json(1, "ui.dark-mode", true));
    });
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(&server, &dir);

    let mut session = open_session(&context, SessionKind::Recording).unwrap();
    let report = set_flags(&mut session, &["1".to_string(), "2".to_string()], true)
        .await
        .unwrap();

    toggle.assert_hits(1);
    assert_eq!(report.succeeded, vec![FlagId(1)]);
    assert_eq!(report.skipped, vec![FlagId(2)]);
    assert!(report.failed.is_empty());
    assert!(session.store().selected_flags().is_empty());
}

#[tokio::test]
async fn create_and_delete_are_recorded() {
    let server = MockServer::start_async().await;
    let create = server.mock(|when, then| {
        when.method(POST).path("/api/feature-flags");
        then.status(201)
            .json_body(flag_json(9, "experimental.ai-suggest", true));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/feature-flags");
        then.status(200).json_body(json!([flag_json(9, "experimental.ai-suggest", true)]));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/api/feature-flags/9");
        then.status(204);
    });
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(&server, &dir);

    let request =
        build_create_request("experimental.ai-suggest", "", FlagEnvironment::All, 100, false)
            .unwrap();
    let created = run_create(&context, request).await.unwrap();
    assert_eq!(created.id, FlagId(9));
    create.assert();

    run_delete(&context, "experimental.ai-suggest").await.unwrap();
    delete.assert();

    let audit = saved_audit(&context);
    let actions: Vec<AuditAction> = audit.entries().map(|entry| entry.action).collect();
    assert_eq!(actions, vec![AuditAction::Deleted, AuditAction::Created]);
    assert_eq!(audit.entries().last().unwrap().new_value, Some(true));
}

#[tokio::test]
async fn read_only_commands_ignore_corrupt_audit_log() {
    let server = MockServer::start_async().await;
    let list = server.mock(|when, then| {
        when.method(GET).path("/api/feature-flags");
        then.status(200).json_body(sample_flags_json());
    });
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(&server, &dir);
    let audit_path = context.audit_path.clone().unwrap();
    std::fs::write(&audit_path, "{not json").unwrap();

    run_list(&context, &FilterOptions::default()).await.unwrap();
    list.assert();
    assert_eq!(std::fs::read_to_string(&audit_path).unwrap(), "{not json");
}

#[tokio::test]
async fn mutating_commands_replace_corrupt_audit_log() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/api/feature-flags");
        then.status(200).json_body(sample_flags_json());
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/feature-flags");
        then.status(201)
            .json_body(flag_json(9, "experimental.ai-suggest", true));
    });
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(&server, &dir);
    std::fs::write(context.audit_path.as_ref().unwrap(), "{not json").unwrap();

    let request =
        build_create_request("experimental.ai-suggest", "", FlagEnvironment::All, 100, false)
            .unwrap();
    run_create(&context, request).await.unwrap();

    let audit = saved_audit(&context);
    let entries: Vec<_> = audit.entries().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, 1);
    assert_eq!(entries[0].action, AuditAction::Created);
}

#[tokio::test]
async fn delete_unknown_flag_fails_without_request() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/api/feature-flags");
        then.status(200).json_body(sample_flags_json());
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE);
        then.status(204);
    });
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(&server, &dir);

    let error = run_delete(&context, "ui.unknown").await.unwrap_err();
    assert!(matches!(
        error,
        CliError::Core(flagdeck_core::Error::NotFound(_))
    ));
    delete.assert_hits(0);
}

#[test]
fn audit_export_writes_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let audit_path = dir.path().join("audit-log.json");
    let mut log = AuditLog::new(10, "Admin");
    log.log_toggle("ui.dark-mode", false, true);
    log.log_delete("debug.verbose");
    log.save_to_path(&audit_path).unwrap();

    let context = CliContext {
        config: EnvironmentConfig::development(),
        audit_path: Some(audit_path),
        json: false,
    };
    let output_path: PathBuf = dir.path().join("audit.csv");
    run_audit(
        &context,
        &AuditQuery::default(),
        Some(flagdeck_core::export::ExportFormat::Csv),
        Some(&output_path),
    )
    .unwrap();

    let exported = std::fs::read_to_string(&output_path).unwrap();
    let lines: Vec<&str> = exported.lines().collect();
    assert_eq!(
        lines[0],
        "ID,Timestamp,User,Action,Flag Name,Previous Value,New Value"
    );
    assert!(lines[1].starts_with("2,"));
    assert!(lines[1].ends_with(",Admin,deleted,Verbose,,"));
    assert!(lines[2].ends_with(",Admin,enabled,Dark Mode,false,true"));
}

#[test]
fn audit_export_into_directory_uses_suggested_name() {
    let dir = tempfile::tempdir().unwrap();
    let audit_path = dir.path().join("audit-log.json");
    let mut log = AuditLog::new(10, "Admin");
    log.log_create(&serde_json::from_value(flag_json(4, "reports.weekly", true)).unwrap());
    log.save_to_path(&audit_path).unwrap();

    let export_dir = dir.path().join("exports");
    std::fs::create_dir(&export_dir).unwrap();
    let context = CliContext {
        config: EnvironmentConfig::development(),
        audit_path: Some(audit_path),
        json: true,
    };
    run_audit(&context, &AuditQuery::default(), None, Some(&export_dir)).unwrap();

    let written: Vec<PathBuf> = std::fs::read_dir(&export_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(written.len(), 1);
    let file_name = written[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("flagdeck-audit-"));
    assert!(file_name.ends_with(".json"));

    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert_eq!(exported[0]["action"], "created");
    assert_eq!(exported[0]["flagName"], "Weekly");
}

#[test]
fn stats_lines_list_every_platform() {
    let stats = crate::commands::stats::FlagStats {
        total: 5,
        enabled: 3,
        disabled: 2,
        platforms: flagdeck_core::models::PlatformCounts {
            all: 5,
            frontend: 1,
            mobile: 2,
            shared: 2,
        },
        last_sync: None,
    };
    assert_eq!(
        crate::commands::stats::format_stats_lines(&stats),
        vec![
            "Total:     5",
            "Enabled:   3",
            "Disabled:  2",
            "Frontend:  1",
            "Mobile:    2",
            "Shared:    2",
        ]
    );
}
