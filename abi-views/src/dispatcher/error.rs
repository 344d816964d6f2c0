use derive_more::Display;

use crate::messages::MessageError;
use crate::queues::QueueError;
use crate::sql::CodegenError;

/// Why one contract's views never made it onto the queue.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum DispatchFailure {
    #[display("invalid ABI: {_0}")]
    SourceRow(String),
    #[display("{_0}")]
    Codegen(CodegenError),
    #[display("{_0}")]
    Serialization(MessageError),
    #[display("{_0}")]
    Dispatch(QueueError),
}

impl std::error::Error for DispatchFailure {}

impl From<serde_json::Error> for DispatchFailure {
    fn from(value: serde_json::Error) -> Self {
        DispatchFailure::SourceRow(value.to_string())
    }
}

impl From<CodegenError> for DispatchFailure {
    fn from(value: CodegenError) -> Self {
        DispatchFailure::Codegen(value)
    }
}

impl From<MessageError> for DispatchFailure {
    fn from(value: MessageError) -> Self {
        DispatchFailure::Serialization(value)
    }
}

impl From<QueueError> for DispatchFailure {
    fn from(value: QueueError) -> Self {
        DispatchFailure::Dispatch(value)
    }
}
