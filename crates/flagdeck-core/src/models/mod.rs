//! Data models for Flagdeck

mod category;
mod flag;
mod request;

pub use category::{Category, Platform, PlatformCounts, PlatformFilter};
pub use flag::{Flag, FlagEnvironment, FlagId, RolloutPercentage};
pub use request::{CreateFlagRequest, FlagUpdate};
