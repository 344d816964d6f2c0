#[cfg(feature = "sqs")]
mod sqs_queue;

use derive_more::Display;

#[cfg(feature = "sqs")]
pub use sqs_queue::{SqsQueue, MAX_RECEIVE_BATCH};

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[display("could not send message: {_0}")]
    Send(String),
    #[display("could not receive messages: {_0}")]
    Receive(String),
    #[display("could not delete message: {_0}")]
    Delete(String),
}

impl std::error::Error for QueueError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Opaque token needed to acknowledge (delete) the message.
    pub receipt_handle: String,
    pub body: String,
}

impl ReceivedMessage {
    pub fn new(receipt_handle: &str, body: &str) -> Self {
        Self {
            receipt_handle: receipt_handle.to_string(),
            body: body.to_string(),
        }
    }
}

/// At-least-once message transport. A received message that is never deleted
/// is delivered again once its visibility timeout expires.
#[async_trait::async_trait]
pub trait Queue: Send + Sync {
    async fn send(&self, body: &str) -> Result<(), QueueError>;

    async fn receive(&self, max_messages: i32) -> Result<Vec<ReceivedMessage>, QueueError>;

    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError>;
}
