mod batch;
mod dialect;
mod views;

pub use batch::{count_statements, ContractBatch};
pub use dialect::{Dialect, POSTGRES_MAX_IDENTIFIER_LENGTH, SNOWFLAKE_MAX_IDENTIFIER_LENGTH};
pub use views::{event_view, method_view, CodegenError, SourceTables};
