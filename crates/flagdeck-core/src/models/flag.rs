//! Flag model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// Server-assigned flag identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagId(pub i64);

impl fmt::Display for FlagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FlagId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Deployment environment a flag applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagEnvironment {
    #[default]
    All,
    Production,
    Development,
}

impl FlagEnvironment {
    /// Wire name, also used for environment sorting
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl fmt::Display for FlagEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlagEnvironment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            other => Err(Error::InvalidInput(format!("unknown environment '{other}'"))),
        }
    }
}

/// Rollout percentage, always within `0..=100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RolloutPercentage(u8);

impl RolloutPercentage {
    pub const FULL: Self = Self(100);

    pub fn new(value: i64) -> Result<Self, Error> {
        u8::try_from(value)
            .ok()
            .filter(|value| *value <= 100)
            .map(Self)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "rollout percentage must be between 0 and 100, got {value}"
                ))
            })
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for RolloutPercentage {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for RolloutPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl RolloutPercentage {
    /// Clamp a server-reported value into range.
    pub fn saturating(value: i64) -> Self {
        Self::new(value).unwrap_or_else(|_| {
            let clamped = value.clamp(0, 100);
            tracing::warn!(value, clamped, "Rollout percentage out of range, clamping");
            Self(u8::try_from(clamped).unwrap_or(100))
        })
    }
}

// Lenient on the wire so one bad record does not fail a whole listing.
impl<'de> Deserialize<'de> for RolloutPercentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(Self::saturating(raw))
    }
}

/// A feature flag as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub id: FlagId,
    /// Dot-delimited name, e.g. `ui.dark-mode`
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub enabled: bool,
    #[serde(default)]
    pub environment: FlagEnvironment,
    #[serde(default)]
    pub rollout_percentage: RolloutPercentage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_payload: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flag {
    /// Name segment before the first dot, if the name has one
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once('.').map(|(prefix, _)| prefix)
    }

    /// Case-insensitive match against name or description
    pub fn matches_query(&self, query_lower: &str) -> bool {
        self.name.to_lowercase().contains(query_lower)
            || self.description.to_lowercase().contains(query_lower)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "id": 7,
        "name": "ui.dark-mode",
        "description": null,
        "enabled": true,
        "environment": "production",
        "rolloutPercentage": 25,
        "variantName": "blue",
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-02T11:30:00.123Z"
    }"#;

    #[test]
    fn deserializes_wire_format() {
        let flag: Flag = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(flag.id, FlagId(7));
        assert_eq!(flag.description, "");
        assert_eq!(flag.environment, FlagEnvironment::Production);
        assert_eq!(flag.rollout_percentage.get(), 25);
        assert_eq!(flag.variant_name.as_deref(), Some("blue"));
        assert_eq!(flag.variant_payload, None);
        assert_eq!(flag.prefix(), Some("ui"));
    }

    #[test]
    fn clamps_rollout_from_server_but_rejects_local_input() {
        let payload = SAMPLE.replace("\"rolloutPercentage\": 25", "\"rolloutPercentage\": 140");
        let flag: Flag = serde_json::from_str(&payload).unwrap();
        assert_eq!(flag.rollout_percentage.get(), 100);

        let payload = SAMPLE.replace("\"rolloutPercentage\": 25", "\"rolloutPercentage\": -5");
        let flag: Flag = serde_json::from_str(&payload).unwrap();
        assert_eq!(flag.rollout_percentage.get(), 0);

        let error = RolloutPercentage::new(140).unwrap_err();
        assert!(error.to_string().contains("between 0 and 100"));
        assert!(RolloutPercentage::new(-1).is_err());
        assert!(RolloutPercentage::new(0).is_ok());
        assert!(RolloutPercentage::new(100).is_ok());
    }

    #[test]
    fn serializes_camel_case() {
        let flag: Flag = serde_json::from_str(SAMPLE).unwrap();
        let value = serde_json::to_value(&flag).unwrap();
        assert_eq!(value["rolloutPercentage"], 25);
        assert_eq!(value["variantName"], "blue");
        assert!(value.get("variantPayload").is_none());
    }

    #[test]
    fn parses_environment_names() {
        assert_eq!("Production".parse::<FlagEnvironment>().unwrap(), FlagEnvironment::Production);
        assert!("staging".parse::<FlagEnvironment>().is_err());
    }

    #[test]
    fn matches_query_checks_name_and_description() {
        let mut flag: Flag = serde_json::from_str(SAMPLE).unwrap();
        flag.description = "Enables the Night theme".to_string();
        assert!(flag.matches_query("dark"));
        assert!(flag.matches_query("night"));
        assert!(!flag.matches_query("offline"));
    }
}
