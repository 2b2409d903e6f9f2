use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::{Instant, timeout};

use crate::broker::{StreamBroker, StreamMessage};
use crate::error::MqError;

/// In-process broker with the same delivery contract as the Redis streams
/// implementation: each message goes to exactly one consumer and stays
/// pending until acknowledged. Used by tests and broker-less development.
#[derive(Default)]
pub struct MemoryBroker {
    queue: Mutex<VecDeque<StreamMessage>>,
    pending: Mutex<HashSet<String>>,
    next_id: AtomicU64,
    notify: Notify,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered but not yet acknowledged.
    pub fn unacked(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Messages waiting to be delivered.
    pub fn queued(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

#[async_trait]
impl StreamBroker for MemoryBroker {
    async fn ensure_group(&self) -> Result<(), MqError> {
        Ok(())
    }

    async fn append(&self, fields: &[(String, String)]) -> Result<String, MqError> {
        let id = format!("{}-0", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let fields: HashMap<String, String> = fields.iter().cloned().collect();

        self.queue.lock().unwrap().push_back(StreamMessage {
            id: id.clone(),
            fields,
        });
        self.notify.notify_one();

        Ok(id)
    }

    async fn read_group(
        &self,
        _consumer: &str,
        block: Duration,
        count: usize,
    ) -> Result<Vec<StreamMessage>, MqError> {
        let deadline = Instant::now() + block;

        loop {
            {
                let mut queue = self.queue.lock().unwrap();
                if !queue.is_empty() {
                    let taken: Vec<StreamMessage> =
                        (0..count).filter_map(|_| queue.pop_front()).collect();
                    let mut pending = self.pending.lock().unwrap();
                    for message in &taken {
                        pending.insert(message.id.clone());
                    }
                    return Ok(taken);
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero()
                || timeout(remaining, self.notify.notified()).await.is_err()
            {
                return Ok(Vec::new());
            }
        }
    }

    async fn ack(&self, message_id: &str) -> Result<(), MqError> {
        self.pending.lock().unwrap().remove(message_id);
        Ok(())
    }
}
