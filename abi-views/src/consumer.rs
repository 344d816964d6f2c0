mod error;
mod outcome;

use std::sync::Arc;

use tracing::{debug, info, warn};

pub use error::ConsumeFailure;
pub use outcome::{ConsumeEvent, ConsumeOutcome};

use crate::messages::QueueMessage;
use crate::pipeline::{Accumulator, PipelineError, Recorder, TaskGroup};
use crate::queues::{Queue, ReceivedMessage};
use crate::warehouses::{ExecutesMultiStatements, MultiStatementContext};

/// Executes received view statements and acknowledges what ran.
///
/// Nothing is retried in process: a message that is not deleted comes back
/// after its visibility timeout.
pub struct Consumer<Q, W>
where
    Q: Queue + ?Sized + 'static,
    W: ExecutesMultiStatements + ?Sized + 'static,
{
    queue: Arc<Q>,
    warehouse: Arc<W>,
    dry_run: bool,
}

impl<Q, W> Consumer<Q, W>
where
    Q: Queue + ?Sized + 'static,
    W: ExecutesMultiStatements + ?Sized + 'static,
{
    pub fn new(queue: Arc<Q>, warehouse: Arc<W>) -> Self {
        Self {
            queue,
            warehouse,
            dry_run: false,
        }
    }

    /// Decode and count only; nothing is executed or deleted.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;

        self
    }

    pub async fn process_batch(
        &self,
        messages: Vec<ReceivedMessage>,
    ) -> Result<ConsumeOutcome, PipelineError> {
        debug!(messages = messages.len(), dry_run = self.dry_run, "consuming batch");

        let accumulator = Accumulator::<ConsumeOutcome>::start();
        let mut task_group = TaskGroup::new();

        for message in messages {
            let queue = self.queue.clone();
            let warehouse = self.warehouse.clone();
            let recorder = accumulator.recorder();
            let dry_run = self.dry_run;

            task_group.spawn(async move {
                consume_message(
                    message,
                    queue.as_ref(),
                    warehouse.as_ref(),
                    dry_run,
                    &recorder,
                )
                .await;
            });
        }

        let joined = task_group.join_all().await;
        let outcome = accumulator.finish().await?;

        outcome.log_summary();
        joined?;

        Ok(outcome)
    }
}

async fn consume_message<Q, W>(
    received: ReceivedMessage,
    queue: &Q,
    warehouse: &W,
    dry_run: bool,
    recorder: &Recorder<ConsumeEvent>,
) where
    Q: Queue + ?Sized,
    W: ExecutesMultiStatements + ?Sized,
{
    let ReceivedMessage {
        receipt_handle,
        body,
    } = received;

    recorder.record(ConsumeEvent::Received);

    let message = match QueueMessage::decode(&body) {
        Ok(message) => message,
        Err(error) => {
            warn!(receipt_handle = receipt_handle.as_str(), %error, "could not decode message");
            recorder.record(ConsumeEvent::Failed {
                receipt_handle,
                failure: error.into(),
            });
            return;
        }
    };

    let contract_address = message.contract_address.as_str();

    if dry_run {
        info!(
            contract_address,
            statement_count = message.number_of_statements,
            "dry run: not executing"
        );
        return;
    }

    if message.number_of_statements > 0 {
        let context = MultiStatementContext::new(message.number_of_statements);

        if let Err(error) = warehouse.execute_multi_statement(&context, &message.sql_statements).await
        {
            warn!(
                contract_address,
                receipt_handle = receipt_handle.as_str(),
                request_id = %context.request_id,
                %error,
                "execution failed, leaving message for redelivery"
            );
            recorder.record(ConsumeEvent::Failed {
                receipt_handle,
                failure: ConsumeFailure::Execution {
                    contract_address: message.contract_address.clone(),
                    error,
                },
            });
            return;
        }

        recorder.record(ConsumeEvent::Executed);
    }

    match queue.delete(&receipt_handle).await {
        Ok(()) => recorder.record(ConsumeEvent::Acknowledged),
        Err(error) => {
            warn!(
                contract_address,
                receipt_handle = receipt_handle.as_str(),
                %error,
                "could not acknowledge message"
            );
            recorder.record(ConsumeEvent::AckFailed);
        }
    }
}
