//! Grouping flags into catalog categories.
//!
//! Each flag lands in exactly one category: the first declared category whose
//! prefix matches, otherwise the first whose keyword table matches, otherwise
//! the synthetic "Other" category.

use crate::config::{
    CategoryCatalog, CategoryDefinition, OTHER_CATEGORY_ICON, OTHER_CATEGORY_NAME,
    OTHER_CATEGORY_PREFIX,
};
use crate::models::{Category, Flag, Platform, PlatformCounts};

/// Where a single flag is filed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Index into the catalog definitions
    Declared(usize),
    Other,
}

/// Decide the category for one flag name.
pub fn place(name: &str, catalog: &CategoryCatalog) -> Placement {
    let definitions = catalog.definitions();
    if let Some(index) = definitions
        .iter()
        .position(|definition| definition.matches_prefix(name))
    {
        return Placement::Declared(index);
    }

    let name_lower = name.to_lowercase();
    definitions
        .iter()
        .position(|definition| definition.matches_keyword(&name_lower))
        .map_or(Placement::Other, Placement::Declared)
}

/// Build the non-empty categories for a flag list, in catalog order with
/// "Other" last. Flags keep their input order within a category.
pub fn categorize(flags: &[Flag], catalog: &CategoryCatalog) -> Vec<Category> {
    let definitions = catalog.definitions();
    let mut buckets: Vec<Vec<Flag>> = vec![Vec::new(); definitions.len()];
    let mut other = Vec::new();

    for flag in flags {
        match place(&flag.name, catalog) {
            Placement::Declared(index) => buckets[index].push(flag.clone()),
            Placement::Other => other.push(flag.clone()),
        }
    }

    let mut categories: Vec<Category> = definitions
        .iter()
        .zip(buckets)
        .filter(|(_, flags)| !flags.is_empty())
        .map(|(definition, flags)| declared_category(definition, flags))
        .collect();

    if !other.is_empty() {
        categories.push(Category {
            name: OTHER_CATEGORY_NAME.to_string(),
            prefix: OTHER_CATEGORY_PREFIX.to_string(),
            icon: OTHER_CATEGORY_ICON.to_string(),
            platform: Platform::Shared,
            flags: other,
            expanded: true,
        });
    }

    categories
}

/// Count flags per platform tab. `all` is the plain flag total.
pub fn platform_counts(total: usize, categories: &[Category]) -> PlatformCounts {
    let sum_for = |platform: Platform| {
        categories
            .iter()
            .filter(|category| category.platform == platform)
            .map(|category| category.flags.len())
            .sum()
    };

    PlatformCounts {
        all: total,
        frontend: sum_for(Platform::Frontend),
        mobile: sum_for(Platform::Mobile),
        shared: sum_for(Platform::Shared),
    }
}

fn declared_category(definition: &CategoryDefinition, flags: Vec<Flag>) -> Category {
    Category {
        name: definition.name.clone(),
        prefix: definition.prefix.clone(),
        icon: definition.icon.clone(),
        platform: definition.platform,
        flags,
        expanded: true,
    }
}
