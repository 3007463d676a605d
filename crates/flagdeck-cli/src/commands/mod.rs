pub mod audit;
pub mod bulk;
pub mod common;
pub mod completions;
pub mod create;
pub mod delete;
pub mod health;
pub mod list;
pub mod show;
pub mod stats;
pub mod toggle;
pub mod update;
