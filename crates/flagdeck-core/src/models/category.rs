//! Derived category views

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::Flag;

/// Platform a category of flags targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Frontend,
    Mobile,
    Shared,
}

impl Platform {
    pub const ALL: [Self; 3] = [Self::Frontend, Self::Mobile, Self::Shared];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frontend => "frontend",
            Self::Mobile => "mobile",
            Self::Shared => "shared",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Frontend => "Frontend",
            Self::Mobile => "Mobile",
            Self::Shared => "Shared",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform tab selection: everything, or one platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(Platform),
}

impl PlatformFilter {
    pub fn admits(self, platform: Platform) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == platform,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Platforms",
            Self::Only(platform) => platform.label(),
        }
    }
}

impl FromStr for PlatformFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "frontend" => Ok(Self::Only(Platform::Frontend)),
            "mobile" => Ok(Self::Only(Platform::Mobile)),
            "shared" => Ok(Self::Only(Platform::Shared)),
            other => Err(Error::InvalidInput(format!("unknown platform '{other}'"))),
        }
    }
}

/// A named group of flags. Recomputed from the flag list, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub prefix: String,
    pub icon: String,
    pub platform: Platform,
    pub flags: Vec<Flag>,
    pub expanded: bool,
}

impl Category {
    pub fn enabled_count(&self) -> usize {
        self.flags.iter().filter(|flag| flag.enabled).count()
    }
}

/// Flag counts per platform tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlatformCounts {
    pub all: usize,
    pub frontend: usize,
    pub mobile: usize,
    pub shared: usize,
}

impl PlatformCounts {
    pub const fn get(&self, filter: PlatformFilter) -> usize {
        match filter {
            PlatformFilter::All => self.all,
            PlatformFilter::Only(Platform::Frontend) => self.frontend,
            PlatformFilter::Only(Platform::Mobile) => self.mobile,
            PlatformFilter::Only(Platform::Shared) => self.shared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_filter_parses_and_admits() {
        let mobile: PlatformFilter = "Mobile".parse().unwrap();
        assert!(mobile.admits(Platform::Mobile));
        assert!(!mobile.admits(Platform::Shared));
        assert!("all".parse::<PlatformFilter>().unwrap().admits(Platform::Shared));
        assert!("desktop".parse::<PlatformFilter>().is_err());
    }

    #[test]
    fn platform_filter_labels_match_tabs() {
        assert_eq!(PlatformFilter::All.label(), "All Platforms");
        assert_eq!(PlatformFilter::Only(Platform::Frontend).label(), "Frontend");
    }
}
