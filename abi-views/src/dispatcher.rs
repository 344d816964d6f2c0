mod error;
mod outcome;

use std::sync::Arc;

use ethers::abi::Abi;
use tracing::{debug, info, warn};

pub use error::DispatchFailure;
pub use outcome::{DispatchEvent, DispatchOutcome};

use crate::abis::{is_contract_address, ContractAbi, Resolution, SkipReason};
use crate::config::Config;
use crate::pipeline::{Accumulator, PipelineError, Recorder, TaskGroup};
use crate::queues::Queue;
use crate::sql::ContractBatch;
use crate::warehouses::CandidateContract;

enum PreparedMessage {
    Skipped(SkipReason),
    Empty,
    Ready {
        body: String,
        number_of_statements: usize,
    },
}

/// Fans view generation out over candidate contracts, one task per contract,
/// and ships each contract's statements as one queue message.
pub struct Dispatcher<Q: Queue + ?Sized + 'static> {
    queue: Arc<Q>,
    config: Arc<Config>,
}

impl<Q: Queue + ?Sized + 'static> Dispatcher<Q> {
    pub fn new(queue: Arc<Q>, config: Config) -> Self {
        Self {
            queue,
            config: Arc::new(config),
        }
    }

    pub async fn run(
        &self,
        candidates: Vec<CandidateContract>,
    ) -> Result<DispatchOutcome, PipelineError> {
        if self.config.dry_run {
            info!("dry run: generated statements will not be sent");
        }

        info!(
            contracts = candidates.len(),
            dialect = %self.config.dialect,
            "dispatching contract views"
        );

        let accumulator = Accumulator::<DispatchOutcome>::start();
        let mut task_group = TaskGroup::new();

        for candidate in candidates {
            let queue = self.queue.clone();
            let config = self.config.clone();
            let recorder = accumulator.recorder();

            task_group.spawn(async move {
                dispatch_contract(candidate, &config, queue.as_ref(), &recorder).await;
            });
        }

        let joined = task_group.join_all().await;
        let outcome = accumulator.finish().await?;

        outcome.log_summary();
        joined?;

        Ok(outcome)
    }
}

async fn dispatch_contract<Q: Queue + ?Sized>(
    candidate: CandidateContract,
    config: &Config,
    queue: &Q,
    recorder: &Recorder<DispatchEvent>,
) {
    let contract_address = candidate.contract_address.to_lowercase();
    recorder.record(DispatchEvent::Seen);

    let result = match prepare_message(&candidate, config) {
        Ok(PreparedMessage::Skipped(reason)) => {
            info!(contract_address = contract_address.as_str(), %reason, "skipping contract");
            recorder.record(DispatchEvent::Skipped);
            return;
        }
        Ok(PreparedMessage::Empty) => {
            debug!(
                contract_address = contract_address.as_str(),
                "no events or methods to generate views for"
            );
            return;
        }
        Ok(PreparedMessage::Ready {
            body,
            number_of_statements,
        }) => {
            recorder.record(DispatchEvent::StatementsGenerated(number_of_statements));

            if config.dry_run {
                debug!(
                    contract_address = contract_address.as_str(),
                    statement_count = number_of_statements,
                    "dry run: not sending"
                );
                return;
            }

            recorder.record(DispatchEvent::SendAttempted);
            queue.send(&body).await.map_err(DispatchFailure::from)
        }
        Err(failure) => Err(failure),
    };

    match result {
        Ok(()) => recorder.record(DispatchEvent::SendSucceeded),
        Err(failure) => {
            warn!(contract_address = contract_address.as_str(), %failure, "dispatch failed");
            recorder.record(DispatchEvent::Failed {
                contract_address,
                failure,
            });
        }
    }
}

fn prepare_message(
    candidate: &CandidateContract,
    config: &Config,
) -> Result<PreparedMessage, DispatchFailure> {
    if !is_contract_address(&candidate.contract_address) {
        return Err(DispatchFailure::SourceRow(format!(
            "invalid contract address {:?}",
            candidate.contract_address
        )));
    }

    let abi: Abi = serde_json::from_slice(&candidate.abi_json)?;

    let contract = ContractAbi::resolve(&candidate.contract_address, &abi, &config.namespace);
    let contract = match contract.validate(config.max_identifier_length()) {
        Resolution::Resolved(contract) => contract,
        Resolution::Skipped(reason) => return Ok(PreparedMessage::Skipped(reason)),
    };

    let batch = ContractBatch::build(&contract, config.dialect, &config.source_tables)?;
    if batch.is_empty() {
        return Ok(PreparedMessage::Empty);
    }

    let number_of_statements = batch.number_of_statements();
    let body = batch.into_message().encode()?;

    Ok(PreparedMessage::Ready {
        body,
        number_of_statements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::Dialect;

    const ABI: &str = r#"[
        {"type":"event","name":"Transfer","anonymous":false,"inputs":[
            {"name":"from","type":"address","indexed":true},
            {"name":"to","type":"address","indexed":true},
            {"name":"value","type":"uint256","indexed":false}]},
        {"type":"function","name":"transfer","stateMutability":"nonpayable","inputs":[
            {"name":"to","type":"address"},
            {"name":"amount","type":"uint256"}],"outputs":[]}
    ]"#;

    const ADDRESS: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

    #[test]
    fn prepares_one_message_per_contract() {
        let candidate = CandidateContract::new(ADDRESS, ABI.as_bytes());

        match prepare_message(&candidate, &Config::new("ETH")).unwrap() {
            PreparedMessage::Ready {
                body,
                number_of_statements,
            } => {
                assert_eq!(number_of_statements, 2);
                assert!(body.contains(&ADDRESS.to_lowercase()));
            }
            _ => panic!("expected a message"),
        }
    }

    #[test]
    fn skips_contracts_whose_view_names_overflow_the_dialect() {
        let candidate = CandidateContract::new(ADDRESS, ABI.as_bytes());
        let namespace = "N".repeat(20);
        let config = Config::new(&namespace).with_dialect(Dialect::Postgres);

        assert!(matches!(
            prepare_message(&candidate, &config),
            Ok(PreparedMessage::Skipped(_))
        ));
    }

    #[test]
    fn prepares_nothing_for_abis_without_members() {
        let candidate = CandidateContract::new(ADDRESS, b"[]");

        assert!(matches!(
            prepare_message(&candidate, &Config::new("ETH")),
            Ok(PreparedMessage::Empty)
        ));
    }

    #[test]
    fn rejects_malformed_contract_addresses() {
        let malformed = [
            "0x1' OR '1'='1",
            "0xabc'def",
            "",
            "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc",
        ];

        for contract_address in malformed {
            let candidate = CandidateContract::new(contract_address, ABI.as_bytes());

            assert!(matches!(
                prepare_message(&candidate, &Config::new("ETH")),
                Err(DispatchFailure::SourceRow(message)) if message.contains("invalid contract address")
            ));
        }
    }

    #[test]
    fn fails_on_malformed_abis() {
        let candidate = CandidateContract::new(ADDRESS, b"{not an abi");

        assert!(matches!(
            prepare_message(&candidate, &Config::new("ETH")),
            Err(DispatchFailure::SourceRow(_))
        ));
    }
}
