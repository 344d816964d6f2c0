use tracing::{error, info};

use super::error::ConsumeFailure;
use crate::pipeline::Tally;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeEvent {
    Received,
    Executed,
    Acknowledged,
    AckFailed,
    Failed {
        receipt_handle: String,
        failure: ConsumeFailure,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumeOutcome {
    pub messages_received: usize,
    pub messages_executed: usize,
    pub messages_acknowledged: usize,
    /// Executed but not deleted; the queue will redeliver these.
    pub ack_failures: usize,
    pub failures: Vec<(String, ConsumeFailure)>,
}

impl ConsumeOutcome {
    /// Ack failures alone do not fail a batch: redelivery re-runs idempotent statements.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_receipt_handles(&self) -> Vec<&str> {
        self.failures.iter().map(|(handle, _)| handle.as_str()).collect()
    }

    pub fn log_summary(&self) {
        for (receipt_handle, failure) in &self.failures {
            error!(receipt_handle = receipt_handle.as_str(), %failure, "message failed");
        }

        info!(
            messages_received = self.messages_received,
            messages_executed = self.messages_executed,
            messages_acknowledged = self.messages_acknowledged,
            ack_failures = self.ack_failures,
            failures = self.failures.len(),
            "batch consumed"
        );
    }
}

impl Tally for ConsumeOutcome {
    type Event = ConsumeEvent;

    fn record(&mut self, event: ConsumeEvent) {
        match event {
            ConsumeEvent::Received => self.messages_received += 1,
            ConsumeEvent::Executed => self.messages_executed += 1,
            ConsumeEvent::Acknowledged => self.messages_acknowledged += 1,
            ConsumeEvent::AckFailed => self.ack_failures += 1,
            ConsumeEvent::Failed {
                receipt_handle,
                failure,
            } => self.failures.push((receipt_handle, failure)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::MessageError;

    #[test]
    fn ack_failures_do_not_fail_the_batch() {
        let mut outcome = ConsumeOutcome::default();

        outcome.record(ConsumeEvent::Received);
        outcome.record(ConsumeEvent::Executed);
        outcome.record(ConsumeEvent::AckFailed);

        assert_eq!(outcome.ack_failures, 1);
        assert!(outcome.is_success());
    }

    #[test]
    fn attributes_failures_to_receipt_handles() {
        let mut outcome = ConsumeOutcome::default();

        outcome.record(ConsumeEvent::Failed {
            receipt_handle: "handle-1".to_string(),
            failure: ConsumeFailure::Decode(MessageError::Decode("eof".to_string())),
        });

        assert_eq!(outcome.failed_receipt_handles(), vec!["handle-1"]);
        assert!(!outcome.is_success());
    }
}
