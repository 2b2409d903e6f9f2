use thiserror::Error;

#[derive(Debug, Error)]
pub enum MqError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Broker command failed: {0}")]
    Command(#[from] redis::RedisError),

    #[error("Acknowledgment failed: {0}")]
    AckFailed(String),
}
