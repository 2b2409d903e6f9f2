use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use redis::streams::{StreamReadOptions, StreamReadReply};
use tracing::debug;

use crate::config::MqConfig;
use crate::error::MqError;

/// The one field a submission message carries.
pub const SUBMISSION_ID_FIELD: &str = "submission_id";

/// Field map for a submission job message.
pub fn submission_fields(submission_id: i32) -> Vec<(String, String)> {
    vec![(SUBMISSION_ID_FIELD.to_string(), submission_id.to_string())]
}

/// A message delivered from the stream. `id` is the broker-assigned id used
/// for acknowledgement; unknown fields are carried but ignored.
#[derive(Debug, Clone)]
pub struct StreamMessage {
    pub id: String,
    pub fields: HashMap<String, String>,
}

impl StreamMessage {
    /// Parse the `submission_id` field. `None` means the message is
    /// malformed and should be acknowledged and skipped.
    pub fn submission_id(&self) -> Option<i32> {
        self.fields.get(SUBMISSION_ID_FIELD)?.parse().ok()
    }
}

/// Durable at-least-once work stream with consumer-group semantics.
///
/// The same message may be delivered more than once if an acknowledgement is
/// lost; consumers are responsible for idempotence.
#[async_trait]
pub trait StreamBroker: Send + Sync {
    /// Create the stream and consumer group if absent, starting at the
    /// current tail. Idempotent.
    async fn ensure_group(&self) -> Result<(), MqError>;

    /// Append a message and return its broker-assigned id.
    async fn append(&self, fields: &[(String, String)]) -> Result<String, MqError>;

    /// Read up to `count` new messages for `consumer`, blocking up to
    /// `block`. A timeout returns an empty vec, not an error.
    async fn read_group(
        &self,
        consumer: &str,
        block: Duration,
        count: usize,
    ) -> Result<Vec<StreamMessage>, MqError>;

    /// Acknowledge a delivered message. Idempotent.
    async fn ack(&self, message_id: &str) -> Result<(), MqError>;
}

/// Redis Streams implementation (XADD / XREADGROUP / XACK).
pub struct RedisStreamBroker {
    conn: ConnectionManager,
    stream: String,
    group: String,
}

impl RedisStreamBroker {
    pub async fn connect(config: &MqConfig) -> Result<Self, MqError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| MqError::Connection(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| MqError::Connection(e.to_string()))?;

        Ok(Self {
            conn,
            stream: config.stream.clone(),
            group: config.group.clone(),
        })
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }
}

#[async_trait]
impl StreamBroker for RedisStreamBroker {
    async fn ensure_group(&self) -> Result<(), MqError> {
        let mut conn = self.conn.clone();
        let created: Result<String, redis::RedisError> = conn
            .xgroup_create_mkstream(&self.stream, &self.group, "$")
            .await;

        match created {
            Ok(_) => Ok(()),
            // The group surviving a restart is the expected case.
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn append(&self, fields: &[(String, String)]) -> Result<String, MqError> {
        let mut conn = self.conn.clone();
        let pairs: Vec<(&str, &str)> = fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();

        let id: String = conn.xadd(&self.stream, "*", &pairs).await?;
        debug!(stream = %self.stream, message_id = %id, "message appended");

        Ok(id)
    }

    async fn read_group(
        &self,
        consumer: &str,
        block: Duration,
        count: usize,
    ) -> Result<Vec<StreamMessage>, MqError> {
        let mut conn = self.conn.clone();
        let options = StreamReadOptions::default()
            .group(&self.group, consumer)
            .count(count)
            .block(block.as_millis() as usize);

        let reply: StreamReadReply = conn
            .xread_options(&[self.stream.as_str()], &[">"], &options)
            .await?;

        let mut messages = Vec::new();
        for key in reply.keys {
            for entry in key.ids {
                let mut fields = HashMap::new();
                for (name, value) in entry.map {
                    if let Ok(text) = redis::from_redis_value::<String>(&value) {
                        fields.insert(name, text);
                    }
                }
                messages.push(StreamMessage {
                    id: entry.id,
                    fields,
                });
            }
        }

        Ok(messages)
    }

    async fn ack(&self, message_id: &str) -> Result<(), MqError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .xack(&self.stream, &self.group, &[message_id])
            .await
            .map_err(|e| MqError::AckFailed(e.to_string()))?;

        Ok(())
    }
}
