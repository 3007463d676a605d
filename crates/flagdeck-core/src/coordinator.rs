//! Admin workflows on top of the store: toggles, bulk updates and CRUD,
//! each leaving an audit entry and a toast behind.
//!
//! A toggle runs in three steps. [`Coordinator::begin_toggle`] moves the flag
//! from idle to toggling and rejects a second toggle of the same flag. The
//! request itself only borrows the API. [`Coordinator::finish_toggle`] then
//! reconciles the response. Toggles on different flags can therefore be in
//! flight together.

use std::collections::HashMap;

use futures_util::future::join_all;
use thiserror::Error;

use crate::api::FlagApi;
use crate::audit::AuditLog;
use crate::display::format_flag_name;
use crate::error::{ApiErrorKind, Error, Result};
use crate::models::{CreateFlagRequest, Flag, FlagId, FlagUpdate};
use crate::notify::NotificationQueue;
use crate::store::{FlagStore, LoadSource};

const TOGGLE_FAILED: &str = "Failed to toggle the feature flag. Please try again.";
const CREATE_FAILED: &str = "Failed to create the feature flag. Please try again.";
const UPDATE_FAILED: &str = "Failed to update the feature flag. Please try again.";
const DELETE_FAILED: &str = "Failed to delete the feature flag. Please try again.";
const LOAD_FAILED: &str = "Failed to load feature flags. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToggleState {
    #[default]
    Idle,
    Toggling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ToggleRejected {
    #[error("Flag {0} is already being toggled")]
    AlreadyToggling(FlagId),
}

/// A toggle that has been started but not yet reconciled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    pub id: FlagId,
    pub name: String,
    /// Request number; only the latest request for a flag is reconciled.
    pub ticket: u64,
}

/// Result of a bulk enable or disable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub succeeded: Vec<FlagId>,
    pub failed: Vec<(FlagId, String)>,
    /// Selected flags that were already in the target state
    pub skipped: Vec<FlagId>,
}

impl BulkOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

#[derive(Debug)]
pub struct Coordinator<A> {
    store: FlagStore<A>,
    audit: AuditLog,
    notifications: NotificationQueue,
    /// In-flight toggles keyed by flag, holding the ticket of the current request
    toggles: HashMap<FlagId, u64>,
    next_ticket: u64,
}

impl<A: FlagApi> Coordinator<A> {
    pub fn new(store: FlagStore<A>, audit: AuditLog, notifications: NotificationQueue) -> Self {
        Self {
            store,
            audit,
            notifications,
            toggles: HashMap::new(),
            next_ticket: 0,
        }
    }

    pub const fn store(&self) -> &FlagStore<A> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FlagStore<A> {
        &mut self.store
    }

    pub const fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn audit_mut(&mut self) -> &mut AuditLog {
        &mut self.audit
    }

    pub const fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn toggle_state(&self, id: FlagId) -> ToggleState {
        if self.toggles.contains_key(&id) {
            ToggleState::Toggling
        } else {
            ToggleState::Idle
        }
    }

    /// Load flags, raising a toast when the load fails.
    pub async fn load(&mut self, force_refresh: bool) -> Result<LoadSource> {
        match self.store.load(force_refresh).await {
            Ok(source) => Ok(source),
            Err(error) => {
                self.notifications
                    .error("Connection Error", LOAD_FAILED, None);
                // The load banner already covers connectivity.
                if !matches!(&error, Error::Api(api) if api.kind == ApiErrorKind::Network) {
                    self.report_global(&error);
                }
                Err(error)
            }
        }
    }

    /// Move a flag from idle to toggling.
    pub fn begin_toggle(&mut self, id: FlagId) -> Result<PendingToggle> {
        let name = self
            .store
            .get(id)
            .map(|flag| flag.name.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        if self.toggles.contains_key(&id) {
            tracing::debug!(%id, "Toggle rejected, already in flight");
            return Err(ToggleRejected::AlreadyToggling(id).into());
        }
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.toggles.insert(id, ticket);
        Ok(PendingToggle { id, name, ticket })
    }

    /// Reconcile a toggle response and return the flag to idle.
    ///
    /// Returns `Ok(None)` when the flag was no longer toggling, or is toggling
    /// for a newer request, in which case the response is dropped.
    pub fn finish_toggle(
        &mut self,
        pending: &PendingToggle,
        response: Result<Flag>,
    ) -> Result<Option<Flag>> {
        if self.toggles.get(&pending.id) != Some(&pending.ticket) {
            tracing::debug!(
                id = %pending.id,
                ticket = pending.ticket,
                "Ignoring response for a toggle that is no longer current"
            );
            return Ok(None);
        }
        self.toggles.remove(&pending.id);

        match response {
            Ok(updated) => {
                let Some(previous) = self.store.apply_toggle(&updated) else {
                    tracing::debug!(id = %pending.id, "Toggled flag is no longer in the store");
                    return Ok(None);
                };
                self.audit
                    .log_toggle(&pending.name, previous, updated.enabled);
                let state = if updated.enabled { "enabled" } else { "disabled" };
                self.notifications.success(
                    "Flag Updated",
                    &format!("{} is now {state}", format_flag_name(&pending.name)),
                    None,
                );
                tracing::info!(id = %pending.id, enabled = updated.enabled, "Toggled feature flag");
                Ok(Some(updated))
            }
            Err(error) => {
                self.notifications.error("Update Failed", TOGGLE_FAILED, None);
                self.report_global(&error);
                Err(error)
            }
        }
    }

    /// Drop a flag's toggling state without waiting for its response.
    pub fn abandon_toggle(&mut self, id: FlagId) -> bool {
        self.toggles.remove(&id).is_some()
    }

    pub async fn toggle(&mut self, id: FlagId) -> Result<Flag> {
        let pending = self.begin_toggle(id)?;
        let response = self.store.api().toggle_flag(id).await;
        self.finish_toggle(&pending, response)?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Toggle several flags concurrently. Each flag succeeds or fails on its
    /// own; results come back in input order.
    pub async fn toggle_many(&mut self, ids: &[FlagId]) -> Vec<(FlagId, Result<Flag>)> {
        let mut results = Vec::with_capacity(ids.len());
        let mut pending = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.begin_toggle(id) {
                Ok(started) => pending.push(started),
                Err(error) => results.push((id, Err(error))),
            }
        }

        let responses = {
            let api = self.store.api();
            join_all(pending.iter().map(|started| api.toggle_flag(started.id))).await
        };

        for (started, response) in pending.iter().zip(responses) {
            let outcome = self
                .finish_toggle(started, response)
                .and_then(|flag| flag.ok_or_else(|| Error::NotFound(started.id.to_string())));
            results.push((started.id, outcome));
        }

        let position = |id: &FlagId| ids.iter().position(|candidate| candidate == id);
        results.sort_by_key(|(id, _)| position(id));
        results
    }

    pub async fn bulk_enable(&mut self) -> BulkOutcome {
        self.bulk_set(true).await
    }

    pub async fn bulk_disable(&mut self) -> BulkOutcome {
        self.bulk_set(false).await
    }

    /// Drive every selected flag to `enabled`, then clear the selection.
    async fn bulk_set(&mut self, enabled: bool) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        let mut targets = Vec::new();
        for flag in self.store.selected_flags() {
            if flag.enabled == enabled {
                outcome.skipped.push(flag.id);
            } else {
                targets.push(flag.id);
            }
        }

        for (id, result) in self.toggle_many(&targets).await {
            match result {
                Ok(_) => outcome.succeeded.push(id),
                Err(error) => outcome.failed.push((id, error.to_string())),
            }
        }
        self.store.clear_selection();

        tracing::info!(
            enabled,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            skipped = outcome.skipped.len(),
            "Bulk update finished"
        );
        if !outcome.is_complete() {
            self.notifications.warning(
                "Bulk Update Incomplete",
                &format!(
                    "{} of {} flags could not be updated.",
                    outcome.failed.len(),
                    outcome.attempted()
                ),
                None,
            );
        }
        outcome
    }

    pub async fn create(&mut self, request: CreateFlagRequest) -> Result<Flag> {
        let request = request.normalized()?;
        match self.store.create(request).await {
            Ok(created) => {
                self.audit.log_create(&created);
                self.notifications.success(
                    "Flag Created",
                    &format!("{} has been created", format_flag_name(&created.name)),
                    None,
                );
                Ok(created)
            }
            Err(error) => {
                self.notifications.error("Creation Failed", CREATE_FAILED, None);
                self.report_global(&error);
                Err(error)
            }
        }
    }

    pub async fn update(&mut self, id: FlagId, update: &FlagUpdate) -> Result<Flag> {
        match self.store.update(id, update).await {
            Ok(updated) => {
                self.audit.log_update(&updated);
                self.notifications.success(
                    "Flag Updated",
                    &format!("{} has been updated", format_flag_name(&updated.name)),
                    None,
                );
                Ok(updated)
            }
            Err(error) => {
                self.fail_remote("Update Failed", UPDATE_FAILED, &error);
                Err(error)
            }
        }
    }

    pub async fn delete(&mut self, id: FlagId) -> Result<Flag> {
        match self.store.delete(id).await {
            Ok(removed) => {
                self.toggles.remove(&id);
                self.audit.log_delete(&removed.name);
                self.notifications.success(
                    "Flag Deleted",
                    &format!("{} has been deleted", format_flag_name(&removed.name)),
                    None,
                );
                Ok(removed)
            }
            Err(error) => {
                self.fail_remote("Deletion Failed", DELETE_FAILED, &error);
                Err(error)
            }
        }
    }

    // Local validation errors are returned without a toast.
    fn fail_remote(&self, title: &str, message: &str, error: &Error) {
        if matches!(error, Error::Api(_)) {
            self.notifications.error(title, message, None);
            self.report_global(error);
        }
    }

    fn report_global(&self, error: &Error) {
        let Error::Api(api) = error else {
            return;
        };
        if let Some((kind, title)) = api.kind.global_notice() {
            self.notifications
                .show(kind, title, api.notice_message(), None);
        }
    }
}
