pub mod config;
pub mod error;
pub mod models;

pub use config::WorkerAppConfig;
pub use error::{Result, WorkerError};
