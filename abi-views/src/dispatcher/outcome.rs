use tracing::{error, info};

use super::error::DispatchFailure;
use crate::pipeline::Tally;

const PROGRESS_LOG_INTERVAL: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    Seen,
    Skipped,
    StatementsGenerated(usize),
    SendAttempted,
    SendSucceeded,
    Failed {
        contract_address: String,
        failure: DispatchFailure,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub contracts_seen: usize,
    pub contracts_skipped: usize,
    pub statements_generated: usize,
    pub send_attempts: usize,
    pub send_successes: usize,
    /// Keyed by contract address, in the order failures were recorded.
    pub failures: Vec<(String, DispatchFailure)>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_contract_addresses(&self) -> Vec<&str> {
        self.failures.iter().map(|(address, _)| address.as_str()).collect()
    }

    pub fn log_summary(&self) {
        for (contract_address, failure) in &self.failures {
            error!(contract_address = contract_address.as_str(), %failure, "dispatch failed");
        }

        info!(
            contracts_seen = self.contracts_seen,
            contracts_skipped = self.contracts_skipped,
            statements_generated = self.statements_generated,
            send_attempts = self.send_attempts,
            send_successes = self.send_successes,
            failures = self.failures.len(),
            "dispatch finished"
        );
    }
}

impl Tally for DispatchOutcome {
    type Event = DispatchEvent;

    fn record(&mut self, event: DispatchEvent) {
        match event {
            DispatchEvent::Seen => {
                self.contracts_seen += 1;

                if self.contracts_seen % PROGRESS_LOG_INTERVAL == 0 {
                    info!(contracts_seen = self.contracts_seen, "dispatch progress");
                }
            }
            DispatchEvent::Skipped => self.contracts_skipped += 1,
            DispatchEvent::StatementsGenerated(count) => self.statements_generated += count,
            DispatchEvent::SendAttempted => self.send_attempts += 1,
            DispatchEvent::SendSucceeded => self.send_successes += 1,
            DispatchEvent::Failed {
                contract_address,
                failure,
            } => self.failures.push((contract_address, failure)),
        }
    }
}
