//! Request payloads for flag mutations

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{FlagEnvironment, RolloutPercentage};

/// Body of `POST /feature-flags`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlagRequest {
    pub name: String,
    pub description: String,
    pub environment: FlagEnvironment,
    pub rollout_percentage: RolloutPercentage,
    pub enabled: bool,
}

impl CreateFlagRequest {
    /// New request with the dashboard form defaults: all environments,
    /// full rollout, enabled.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            environment: FlagEnvironment::All,
            rollout_percentage: RolloutPercentage::FULL,
            enabled: true,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn environment(mut self, environment: FlagEnvironment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub const fn rollout(mut self, rollout: RolloutPercentage) -> Self {
        self.rollout_percentage = rollout;
        self
    }

    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Trim the name and description; reject a blank name.
    pub fn normalized(mut self) -> Result<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("flag name cannot be empty".to_string()));
        }
        self.name = name.to_string();
        self.description = self.description.trim().to_string();
        Ok(self)
    }
}

/// Partial flag body for `PUT /feature-flags/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<FlagEnvironment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollout_percentage: Option<RolloutPercentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_payload: Option<String>,
}

impl FlagUpdate {
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.enabled.is_none()
            && self.environment.is_none()
            && self.rollout_percentage.is_none()
            && self.variant_name.is_none()
            && self.variant_payload.is_none()
    }
}
