mod columns;
mod contract_abi;
mod validation;

pub use columns::{
    column_name, function_input_start, indexed_event_input_start, unindexed_event_input_start,
    Column, SourceColumn, WORD_WIDTH,
};
pub use contract_abi::{is_contract_address, AbiEvent, AbiMethod, ContractAbi, MemberKind};
pub use validation::{identifier_length, Resolution, SkipReason};
