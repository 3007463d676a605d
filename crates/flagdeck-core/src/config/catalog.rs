//! Category catalog: declared categories and their keyword tables.

use crate::models::Platform;

pub const OTHER_CATEGORY_NAME: &str = "Other";
pub const OTHER_CATEGORY_PREFIX: &str = "other";
pub const OTHER_CATEGORY_ICON: &str = "\u{1F4E6}";

/// One declared category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDefinition {
    pub prefix: String,
    pub name: String,
    pub icon: String,
    pub platform: Platform,
    /// Lowercase substrings matched against names without a known prefix
    pub keywords: Vec<String>,
}

impl CategoryDefinition {
    pub fn new(prefix: &str, name: &str, icon: &str, platform: Platform, keywords: &[&str]) -> Self {
        Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            platform,
            keywords: keywords.iter().map(|keyword| keyword.to_lowercase()).collect(),
        }
    }

    /// `ui.dark-mode` matches prefix `ui`; `ui` or `uikit.x` do not.
    pub fn matches_prefix(&self, flag_name: &str) -> bool {
        flag_name
            .strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.starts_with('.'))
    }

    pub fn matches_keyword(&self, flag_name_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| flag_name_lower.contains(keyword.as_str()))
    }
}

/// Ordered, immutable set of category definitions.
///
/// Declaration order decides which category wins when several match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCatalog {
    definitions: Vec<CategoryDefinition>,
}

impl CategoryCatalog {
    pub const fn new(definitions: Vec<CategoryDefinition>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &[CategoryDefinition] {
        &self.definitions
    }

    pub fn find(&self, prefix: &str) -> Option<&CategoryDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.prefix == prefix)
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        use Platform::{Frontend, Mobile, Shared};

        Self::new(vec![
            CategoryDefinition::new(
                "ui",
                "UI/UX",
                "\u{1F3A8}",
                Frontend,
                &["dark-mode", "navigation", "theme", "compact", "animation", "skeleton", "loading"],
            ),
            CategoryDefinition::new(
                "reports",
                "Reports",
                "\u{1F4CA}",
                Frontend,
                &["report", "export", "pdf", "excel", "analytics", "dashboard"],
            ),
            CategoryDefinition::new(
                "mobile",
                "Mobile Features",
                "\u{1F4F1}",
                Mobile,
                &[
                    "mobile",
                    "offline",
                    "biometric",
                    "haptic",
                    "swipe",
                    "pull-to-refresh",
                    "background-sync",
                ],
            ),
            CategoryDefinition::new(
                "location",
                "Location/GPS",
                "\u{1F4CD}",
                Mobile,
                &[
                    "location",
                    "gps",
                    "tracking",
                    "geofencing",
                    "route",
                    "traffic",
                    "eta",
                    "real-time-tracking",
                ],
            ),
            CategoryDefinition::new(
                "media",
                "Photos/Media",
                "\u{1F4F7}",
                Mobile,
                &["photo", "image", "video", "camera", "media", "document-scan", "capture"],
            ),
            CategoryDefinition::new("signature", "Signatures", "\u{270D}", Mobile, &["signature"]),
            CategoryDefinition::new(
                "appointments",
                "Appointments",
                "\u{1F4C5}",
                Shared,
                &[
                    "appointment",
                    "scheduling",
                    "calendar",
                    "recurring",
                    "bulk-create",
                    "drag-drop",
                    "conflict",
                ],
            ),
            CategoryDefinition::new(
                "surveyor",
                "Surveyor Features",
                "\u{1F477}",
                Shared,
                &["surveyor", "availability", "territory", "skills", "workload", "performance-metrics"],
            ),
            CategoryDefinition::new(
                "notifications",
                "Notifications",
                "\u{1F514}",
                Shared,
                &["notification", "push", "sms", "email", "in-app", "quiet-hours"],
            ),
            CategoryDefinition::new(
                "chat",
                "Chat",
                "\u{1F4AC}",
                Shared,
                &["chat", "message", "voice-messages", "typing", "read-receipts", "attachments"],
            ),
            CategoryDefinition::new(
                "perf",
                "Performance",
                "\u{26A1}",
                Shared,
                &["lazy-loading", "cache", "optimization", "batching", "performance"],
            ),
            CategoryDefinition::new(
                "security",
                "Security",
                "\u{1F512}",
                Shared,
                &["session", "timeout", "audit", "two-factor", "auth", "login", "pin-lock"],
            ),
            CategoryDefinition::new(
                "api",
                "API/Backend",
                "\u{1F5A5}",
                Shared,
                &["api", "webhook", "endpoint"],
            ),
            CategoryDefinition::new(
                "integration",
                "Integrations",
                "\u{1F517}",
                Shared,
                &["integration", "google", "outlook", "slack", "calendar-sync"],
            ),
            CategoryDefinition::new(
                "experimental",
                "Experimental",
                "\u{1F9EA}",
                Shared,
                &["experimental", "ai", "voice-commands", "ar-navigation"],
            ),
            CategoryDefinition::new(
                "debug",
                "Debug",
                "\u{1F41E}",
                Shared,
                &["debug", "verbose", "logging", "overlay"],
            ),
            CategoryDefinition::new(
                "maintenance",
                "Maintenance",
                "\u{1F527}",
                Shared,
                &["maintenance"],
            ),
        ])
    }
}
