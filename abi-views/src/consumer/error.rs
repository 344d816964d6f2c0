use derive_more::Display;

use crate::messages::MessageError;
use crate::warehouses::WarehouseError;

/// Why a received message was left on the queue.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ConsumeFailure {
    #[display("{_0}")]
    Decode(MessageError),
    #[display("executing views of {contract_address} failed: {error}")]
    Execution {
        contract_address: String,
        error: WarehouseError,
    },
}

impl std::error::Error for ConsumeFailure {}

impl From<MessageError> for ConsumeFailure {
    fn from(value: MessageError) -> Self {
        ConsumeFailure::Decode(value)
    }
}
