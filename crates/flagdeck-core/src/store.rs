//! The flag store: the single owner of flag records.
//!
//! Loads are cached for the configured TTL and retried a fixed number of
//! times. Categories, counts and filtered views are recomputed from the flag
//! list every time they are read.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::api::FlagApi;
use crate::categorize::{categorize, platform_counts};
use crate::config::{CategoryCatalog, EnvironmentConfig};
use crate::error::{load_error_message, Error, Result};
use crate::filter::{self, FilterOptions};
use crate::models::{Category, CreateFlagRequest, Flag, FlagId, FlagUpdate, PlatformCounts};

/// Where the flags returned by [`FlagStore::load`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Cache,
    Remote,
}

#[derive(Debug)]
pub struct FlagStore<A> {
    api: A,
    catalog: CategoryCatalog,
    flags: Vec<Flag>,
    selection: BTreeSet<FlagId>,
    cache_timeout: Duration,
    retry_count: u32,
    retry_delay: Duration,
    cached_at: Option<Instant>,
    last_sync: Option<DateTime<Utc>>,
    error: Option<String>,
}

impl<A: FlagApi> FlagStore<A> {
    pub fn new(api: A, config: &EnvironmentConfig) -> Self {
        Self {
            api,
            catalog: CategoryCatalog::default(),
            flags: Vec::new(),
            selection: BTreeSet::new(),
            cache_timeout: config.cache_timeout,
            retry_count: config.load_retry_count,
            retry_delay: config.load_retry_delay,
            cached_at: None,
            last_sync: None,
            error: None,
        }
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: CategoryCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    pub const fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    /// Fetch all flags, or reuse the last successful load while it is fresh.
    pub async fn load(&mut self, force_refresh: bool) -> Result<LoadSource> {
        if !force_refresh && self.is_cache_fresh() {
            tracing::debug!(flags = self.flags.len(), "Serving flags from cache");
            return Ok(LoadSource::Cache);
        }

        self.error = None;
        match self.fetch_with_retry().await {
            Ok(flags) => {
                tracing::info!(flags = flags.len(), "Loaded feature flags");
                self.flags = flags;
                self.selection.clear();
                self.cached_at = Some(Instant::now());
                self.last_sync = Some(Utc::now());
                Ok(LoadSource::Remote)
            }
            Err(error) => {
                self.cached_at = None;
                self.error = Some(load_error_message(&error));
                Err(error)
            }
        }
    }

    async fn fetch_with_retry(&self) -> Result<Vec<Flag>> {
        let mut attempt = 0;
        loop {
            match self.api.list_flags().await {
                Ok(flags) => return Ok(flags),
                Err(error) if attempt < self.retry_count => {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        retries = self.retry_count,
                        "Loading flags failed, retrying: {error}"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    pub fn is_cache_fresh(&self) -> bool {
        self.cached_at
            .is_some_and(|cached_at| cached_at.elapsed() < self.cache_timeout)
    }

    /// Forget the cached load so the next [`FlagStore::load`] hits the API.
    pub fn invalidate_cache(&mut self) {
        self.cached_at = None;
    }

    /// Send a toggle and apply the result.
    pub async fn toggle(&mut self, id: FlagId) -> Result<&Flag> {
        self.require(id)?;
        let updated = self.api.toggle_flag(id).await?;
        self.apply_toggle(&updated);
        self.require(id)
    }

    /// Write a toggle response into the store.
    ///
    /// Only `enabled` and `updatedAt` change. Returns the previous `enabled`
    /// value, or `None` when the flag is no longer held.
    pub fn apply_toggle(&mut self, updated: &Flag) -> Option<bool> {
        let flag = self.flags.iter_mut().find(|flag| flag.id == updated.id)?;
        let previous = flag.enabled;
        flag.enabled = updated.enabled;
        flag.updated_at = updated.updated_at;
        self.cached_at = None;
        Some(previous)
    }

    pub async fn create(&mut self, request: CreateFlagRequest) -> Result<Flag> {
        let request = request.normalized()?;
        let created = self.api.create_flag(&request).await?;
        tracing::info!(id = %created.id, name = %created.name, "Created feature flag");
        self.flags.push(created.clone());
        self.cached_at = None;
        Ok(created)
    }

    /// Apply a partial update; the stored flag is replaced by the server copy.
    pub async fn update(&mut self, id: FlagId, update: &FlagUpdate) -> Result<Flag> {
        if update.is_empty() {
            return Err(Error::InvalidInput("update has no changes".to_string()));
        }
        self.require(id)?;

        let updated = self.api.update_flag(id, update).await?;
        if let Some(slot) = self.flags.iter_mut().find(|flag| flag.id == id) {
            *slot = updated.clone();
        }
        tracing::info!(%id, "Updated feature flag");
        self.cached_at = None;
        Ok(updated)
    }

    /// Delete a flag and return the record that was removed.
    pub async fn delete(&mut self, id: FlagId) -> Result<Flag> {
        self.require(id)?;
        self.api.delete_flag(id).await?;

        let index = self
            .flags
            .iter()
            .position(|flag| flag.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let removed = self.flags.remove(index);
        self.selection.remove(&id);
        self.cached_at = None;
        tracing::info!(%id, name = %removed.name, "Deleted feature flag");
        Ok(removed)
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn get(&self, id: FlagId) -> Option<&Flag> {
        self.flags.iter().find(|flag| flag.id == id)
    }

    /// Look a flag up by numeric id or exact name.
    pub fn resolve(&self, key: &str) -> Result<&Flag> {
        let key = key.trim();
        let by_id = key
            .parse::<FlagId>()
            .ok()
            .and_then(|id| self.get(id));
        by_id
            .or_else(|| self.flags.iter().find(|flag| flag.name == key))
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    fn require(&self, id: FlagId) -> Result<&Flag> {
        self.get(id).ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Message from the last failed load, cleared by the next load attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    pub fn total_count(&self) -> usize {
        self.flags.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.flags.iter().filter(|flag| flag.enabled).count()
    }

    pub fn disabled_count(&self) -> usize {
        self.total_count() - self.enabled_count()
    }

    pub fn categories(&self) -> Vec<Category> {
        categorize(&self.flags, &self.catalog)
    }

    pub fn platform_counts(&self) -> PlatformCounts {
        platform_counts(self.flags.len(), &self.categories())
    }

    pub fn filter(&self, options: &FilterOptions) -> Vec<Category> {
        filter::apply(self.categories(), options)
    }

    /// Flip selection for one flag. Returns whether it is now selected.
    pub fn toggle_selection(&mut self, id: FlagId) -> bool {
        if self.selection.remove(&id) {
            false
        } else if self.get(id).is_some() {
            self.selection.insert(id)
        } else {
            false
        }
    }

    /// Replace the selection with the given ids that exist in the store.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = FlagId>) {
        let known: BTreeSet<FlagId> = self.flags.iter().map(|flag| flag.id).collect();
        self.selection = ids.into_iter().filter(|id| known.contains(id)).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: FlagId) -> bool {
        self.selection.contains(&id)
    }

    /// Selected flags in store order.
    pub fn selected_flags(&self) -> Vec<&Flag> {
        self.flags
            .iter()
            .filter(|flag| self.selection.contains(&flag.id))
            .collect()
    }
}
