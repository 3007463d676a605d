//! Filter and sort pipeline over categorized flags.
//!
//! Stages run in a fixed order: platform, quick filter, free-text search,
//! then per-category sorting. Categories emptied by a stage are dropped.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::models::{Category, Flag, FlagEnvironment, PlatformFilter};

/// Single-predicate shorthand filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickFilter {
    Enabled,
    Disabled,
    Production,
    Development,
}

impl QuickFilter {
    pub fn admits(self, flag: &Flag) -> bool {
        match self {
            Self::Enabled => flag.enabled,
            Self::Disabled => !flag.enabled,
            Self::Production => flag.environment == FlagEnvironment::Production,
            Self::Development => flag.environment == FlagEnvironment::Development,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl FromStr for QuickFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            other => Err(Error::InvalidInput(format!("unknown quick filter '{other}'"))),
        }
    }
}

impl fmt::Display for QuickFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order applied inside each category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortBy {
    #[default]
    Name,
    /// Most recently updated first
    Updated,
    /// Enabled flags first
    Status,
    Environment,
}

impl SortBy {
    fn compare(self, a: &Flag, b: &Flag) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::Updated => b.updated_at.cmp(&a.updated_at),
            Self::Status => b.enabled.cmp(&a.enabled),
            Self::Environment => a.environment.as_str().cmp(b.environment.as_str()),
        }
    }
}

impl FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "updated" => Ok(Self::Updated),
            "status" => Ok(Self::Status),
            "environment" => Ok(Self::Environment),
            other => Err(Error::InvalidInput(format!("unknown sort order '{other}'"))),
        }
    }
}

/// Everything the dashboard filters by
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub platform: PlatformFilter,
    pub quick: Option<QuickFilter>,
    pub search: String,
    pub sort: SortBy,
}

impl FilterOptions {
    /// Selecting the active quick filter again turns it off.
    pub fn toggle_quick_filter(&mut self, filter: QuickFilter) {
        self.quick = if self.quick == Some(filter) {
            None
        } else {
            Some(filter)
        };
    }

    /// Reset search, quick filter and platform. The sort order is kept.
    pub fn clear(&mut self) {
        self.search.clear();
        self.quick = None;
        self.platform = PlatformFilter::All;
    }
}

/// Run the whole pipeline.
pub fn apply(categories: Vec<Category>, options: &FilterOptions) -> Vec<Category> {
    let categories = filter_platform(categories, options.platform);
    let categories = match options.quick {
        Some(quick) => filter_quick(categories, quick),
        None => categories,
    };
    let categories = filter_search(categories, &options.search);
    sort_categories(categories, options.sort)
}

pub fn filter_platform(categories: Vec<Category>, platform: PlatformFilter) -> Vec<Category> {
    categories
        .into_iter()
        .filter(|category| platform.admits(category.platform))
        .collect()
}

pub fn filter_quick(categories: Vec<Category>, quick: QuickFilter) -> Vec<Category> {
    retain_flags(categories, |flag| quick.admits(flag))
}

/// Case-insensitive substring match on name or description.
/// A blank query passes everything through; otherwise surrounding spaces are
/// part of the match.
pub fn filter_search(categories: Vec<Category>, query: &str) -> Vec<Category> {
    if query.trim().is_empty() {
        return categories;
    }
    let query = query.to_lowercase();
    retain_flags(categories, |flag| flag.matches_query(&query))
}

pub fn sort_categories(categories: Vec<Category>, sort: SortBy) -> Vec<Category> {
    categories
        .into_iter()
        .map(|mut category| {
            category.flags.sort_by(|a, b| sort.compare(a, b));
            category
        })
        .collect()
}

/// Flatten categories back into a flag list, in display order.
pub fn visible_flags(categories: &[Category]) -> Vec<&Flag> {
    categories
        .iter()
        .flat_map(|category| category.flags.iter())
        .collect()
}

fn retain_flags(categories: Vec<Category>, keep: impl Fn(&Flag) -> bool) -> Vec<Category> {
    categories
        .into_iter()
        .filter_map(|mut category| {
            category.flags.retain(|flag| keep(flag));
            (!category.flags.is_empty()).then_some(category)
        })
        .collect()
}
