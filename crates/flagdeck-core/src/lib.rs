//! flagdeck-core - Core library for Flagdeck
//!
//! This crate contains the flag models, the categorization and filtering
//! pipeline, the REST client, and the admin workflows (toggle coordination,
//! audit trail, toast queue, health polling) shared by Flagdeck front ends.

pub mod api;
pub mod audit;
pub mod categorize;
pub mod config;
pub mod coordinator;
pub mod display;
pub mod error;
pub mod export;
pub mod filter;
pub mod health;
pub mod models;
pub mod notify;
pub mod store;
pub mod util;

pub use error::{ApiError, ApiErrorKind, Error, Result};
pub use models::{Flag, FlagId};
