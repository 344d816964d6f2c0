pub mod abis;
mod config;
pub mod consumer;
pub mod dispatcher;
mod hashes;
mod logging;
pub mod messages;
pub mod pipeline;
pub mod queues;
pub mod sql;
pub mod warehouses;

pub use abi_views_macros::validated_sql;
pub use config::{require_queue_url, Config, ConfigError};
pub use consumer::{ConsumeFailure, ConsumeOutcome, Consumer};
pub use dispatcher::{DispatchFailure, DispatchOutcome, Dispatcher};
pub use hashes::Hashes;
pub use logging::init_logging;
pub use messages::{MessageError, QueueMessage, MAX_MESSAGE_BYTES};
pub use pipeline::PipelineError;
pub use queues::{Queue, QueueError, ReceivedMessage};
pub use sql::{Dialect, SourceTables};
pub use warehouses::{
    CandidateContract, CandidatePolicy, ExecutesMultiStatements, LoadsCandidates,
    MultiStatementContext, WarehouseError,
};

#[cfg(feature = "postgres")]
pub use warehouses::PostgresWarehouse;

#[cfg(feature = "sqs")]
pub use queues::SqsQueue;

use std::sync::Arc;

use derive_more::Display;
use tracing::info;

#[derive(Debug, Display)]
pub enum AbiViewsError {
    #[display("config error: {_0}")]
    Config(ConfigError),
    #[display("warehouse error: {_0}")]
    Warehouse(WarehouseError),
    #[display("queue error: {_0}")]
    Queue(QueueError),
    #[display("pipeline error: {_0}")]
    Pipeline(PipelineError),
}

impl std::error::Error for AbiViewsError {}

impl From<ConfigError> for AbiViewsError {
    fn from(value: ConfigError) -> Self {
        AbiViewsError::Config(value)
    }
}

impl From<WarehouseError> for AbiViewsError {
    fn from(value: WarehouseError) -> Self {
        AbiViewsError::Warehouse(value)
    }
}

impl From<QueueError> for AbiViewsError {
    fn from(value: QueueError) -> Self {
        AbiViewsError::Queue(value)
    }
}

impl From<PipelineError> for AbiViewsError {
    fn from(value: PipelineError) -> Self {
        AbiViewsError::Pipeline(value)
    }
}

/// Loads candidate contracts and queues one message of decode views per contract.
pub async fn dispatch_views<W, Q>(
    config: Config,
    warehouse: &W,
    policy: &CandidatePolicy,
    queue: Arc<Q>,
) -> Result<DispatchOutcome, AbiViewsError>
where
    W: LoadsCandidates + ?Sized,
    Q: Queue + ?Sized + 'static,
{
    config.validate()?;

    let candidates = warehouse.load_candidates(policy).await?;
    info!(candidates = candidates.len(), "loaded candidate contracts");

    let outcome = Dispatcher::new(queue, config).run(candidates).await?;

    Ok(outcome)
}

/// Receives one batch of up to `max_messages` and executes it.
pub async fn consume_messages<Q, W>(
    queue: Arc<Q>,
    warehouse: Arc<W>,
    max_messages: i32,
    dry_run: bool,
) -> Result<ConsumeOutcome, AbiViewsError>
where
    Q: Queue + ?Sized + 'static,
    W: ExecutesMultiStatements + ?Sized + 'static,
{
    let messages = queue.receive(max_messages).await?;

    if messages.is_empty() {
        info!("no messages to consume");
        return Ok(ConsumeOutcome::default());
    }

    let outcome = Consumer::new(queue, warehouse)
        .with_dry_run(dry_run)
        .process_batch(messages)
        .await?;

    Ok(outcome)
}
