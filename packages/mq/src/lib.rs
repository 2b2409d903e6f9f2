pub mod broker;
pub mod config;
pub mod error;
pub mod memory;

pub use broker::{RedisStreamBroker, StreamBroker, StreamMessage, submission_fields};
pub use config::MqConfig;
pub use error::MqError;
pub use memory::MemoryBroker;
