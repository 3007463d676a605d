use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] flagdeck_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Flag identifier cannot be empty")]
    EmptyFlagIdentifier,
    #[error("Nothing to update: pass --description, --environment or --rollout")]
    NothingToUpdate,
    #[error("{failed} of {attempted} flag updates failed")]
    PartialFailure { failed: usize, attempted: usize },
    #[error("Configuration error: {0}")]
    Config(String),
}
