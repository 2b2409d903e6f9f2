use thiserror::Error;

use crate::models::sandbox::SandboxError;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] common::store::StoreError),

    #[error("Broker error: {0}")]
    Mq(#[from] mq::MqError),

    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WorkerError>;
