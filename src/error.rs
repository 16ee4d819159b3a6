use thiserror::Error;

use crate::config::ConfigError;
use crate::sim::SimError;

/// Any failure surfaced by the scenario runner or the CLI.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("scene has no [drive] section")]
    MissingDrive,

    #[error("drive object '{0}' does not exist in the world")]
    UnknownDriveObject(String),

    #[error("failed to write trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode trace: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
