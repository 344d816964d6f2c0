use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use abi_views::{Queue, QueueError, ReceivedMessage};
use rand::Rng;
use tokio::sync::Mutex;

/// Queue kept in memory. Sends whose body mentions a failing address and
/// deletes of failing receipt handles are refused.
#[derive(Default)]
pub struct InMemoryQueue {
    pending: Mutex<Vec<ReceivedMessage>>,
    sent: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    failing_addresses: HashSet<String>,
    failing_receipt_handles: HashSet<String>,
    max_delay_ms: u64,
    next_receipt_handle: AtomicUsize,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_sends_for(mut self, contract_addresses: &[String]) -> Self {
        self.failing_addresses.extend(contract_addresses.iter().map(|a| a.to_lowercase()));

        self
    }

    pub fn failing_deletes_for(mut self, receipt_handles: &[&str]) -> Self {
        self.failing_receipt_handles.extend(receipt_handles.iter().map(|h| h.to_string()));

        self
    }

    /// Every send and delete sleeps up to `max_delay_ms`, shuffling completion order.
    pub fn with_random_delays(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;

        self
    }

    /// Enqueues `body` as if a producer sent it, returning its receipt handle.
    pub async fn push(&self, body: &str) -> String {
        let receipt_handle = self.new_receipt_handle();

        self.pending.lock().await.push(ReceivedMessage::new(&receipt_handle, body));

        receipt_handle
    }

    pub async fn sent_bodies(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }

    pub async fn deleted_receipt_handles(&self) -> Vec<String> {
        self.deleted.lock().await.clone()
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    fn new_receipt_handle(&self) -> String {
        format!("receipt-{}", self.next_receipt_handle.fetch_add(1, Ordering::SeqCst))
    }

    async fn random_delay(&self) {
        if self.max_delay_ms == 0 {
            return;
        }

        let delay = rand::thread_rng().gen_range(0..=self.max_delay_ms);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

#[async_trait::async_trait]
impl Queue for InMemoryQueue {
    async fn send(&self, body: &str) -> Result<(), QueueError> {
        self.random_delay().await;

        if self.failing_addresses.iter().any(|address| body.contains(address.as_str())) {
            return Err(QueueError::Send("access denied".to_string()));
        }

        self.sent.lock().await.push(body.to_string());
        self.push(body).await;

        Ok(())
    }

    async fn receive(&self, max_messages: i32) -> Result<Vec<ReceivedMessage>, QueueError> {
        let mut pending = self.pending.lock().await;
        let count = pending.len().min(max_messages.max(0) as usize);

        Ok(pending.drain(..count).collect())
    }

    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.random_delay().await;

        if self.failing_receipt_handles.contains(receipt_handle) {
            return Err(QueueError::Delete("receipt handle is invalid".to_string()));
        }

        self.deleted.lock().await.push(receipt_handle.to_string());

        Ok(())
    }
}
