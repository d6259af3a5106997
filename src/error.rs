use thiserror::Error;
use wfc_core::WfcError;
use wfc_rules::LoadError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rule File Error: {0}")]
    Rules(#[from] LoadError),

    #[error("WFC Core Error: {0}")]
    WfcCore(#[from] WfcError),

    #[error("Failed to save output: {0}")]
    SaveError(anyhow::Error),

    #[error("Generation cancelled")]
    Cancelled,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
