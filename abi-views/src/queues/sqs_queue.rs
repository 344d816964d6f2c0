use aws_config::BehaviorVersion;
use aws_sdk_sqs::config::Region;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::Client;
use tracing::warn;

use super::{Queue, QueueError, ReceivedMessage};

/// Upper bound SQS accepts for one receive call.
pub const MAX_RECEIVE_BATCH: i32 = 10;
const LONG_POLL_SECONDS: i32 = 20;

#[derive(Clone, Debug)]
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    /// Credentials come from the default AWS provider chain.
    pub async fn new(queue_url: &str, region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }

        let sdk_config = loader.load().await;

        Self {
            client: Client::new(&sdk_config),
            queue_url: queue_url.to_string(),
        }
    }

    pub fn queue_name(&self) -> &str {
        self.queue_url.rsplit('/').next().unwrap_or(&self.queue_url)
    }
}

#[async_trait::async_trait]
impl Queue for SqsQueue {
    async fn send(&self, body: &str) -> Result<(), QueueError> {
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| QueueError::Send(DisplayErrorContext(e).to_string()))?;

        Ok(())
    }

    async fn receive(&self, max_messages: i32) -> Result<Vec<ReceivedMessage>, QueueError> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages.clamp(1, MAX_RECEIVE_BATCH))
            .wait_time_seconds(LONG_POLL_SECONDS)
            .send()
            .await
            .map_err(|e| QueueError::Receive(DisplayErrorContext(e).to_string()))?;

        let messages = output
            .messages()
            .iter()
            .filter_map(|message| match message.receipt_handle() {
                Some(receipt_handle) => Some(ReceivedMessage::new(
                    receipt_handle,
                    message.body().unwrap_or_default(),
                )),
                None => {
                    warn!(
                        queue = self.queue_name(),
                        message_id = message.message_id().unwrap_or_default(),
                        "received message without receipt handle"
                    );
                    None
                }
            })
            .collect();

        Ok(messages)
    }

    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| QueueError::Delete(DisplayErrorContext(e).to_string()))?;

        Ok(())
    }
}
