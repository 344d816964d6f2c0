use std::collections::HashSet;

use derive_more::Display;

use super::dialect::Dialect;
use crate::abis::{AbiEvent, AbiMethod, Column};

const LOG_METADATA_COLUMNS: [(&str, &str); 5] = [
    ("block_number", "block_number"),
    ("block_timestamp", "block_timestamp"),
    ("transaction_hash", "transaction_hash"),
    ("log_index", "log_index"),
    ("address", "contract_address"),
];

const TRANSACTION_METADATA_COLUMNS: [(&str, &str); 5] = [
    ("block_number", "block_number"),
    ("block_timestamp", "block_timestamp"),
    ("hash", "hash"),
    ("from_address", "from_address"),
    ("to_address", "to_address"),
];

// `0x` + 64 hex chars of topic[0]
const SIGNATURE_TOPIC_WIDTH: usize = 66;
// `0x` + 8 hex chars of the selector
const SELECTOR_WIDTH: usize = 10;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[display("view {view} cannot quote identifier {identifier:?}")]
    UnquotableIdentifier { view: String, identifier: String },
    #[display("view {view} selects column {column} more than once")]
    DuplicateColumn { view: String, column: String },
    #[display("view {view} selects column {column:?}, longer than the {max} character identifier limit")]
    IdentifierTooLong {
        view: String,
        column: String,
        max: usize,
    },
}

impl std::error::Error for CodegenError {}

/// Raw tables the views read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTables {
    pub logs: String,
    pub transactions: String,
}

impl SourceTables {
    pub fn new(logs: &str, transactions: &str) -> Self {
        Self {
            logs: logs.to_string(),
            transactions: transactions.to_string(),
        }
    }
}

impl Default for SourceTables {
    fn default() -> Self {
        Self::new("logs", "transactions")
    }
}

pub fn event_view(
    event: &AbiEvent,
    dialect: Dialect,
    tables: &SourceTables,
) -> Result<String, CodegenError> {
    let view_name = event.view_name();
    let filter = format!(
        "address = '{}' AND SUBSTR(topics, 1, {SIGNATURE_TOPIC_WIDTH}) = '{}'",
        event.contract_address, event.signature_hash
    );

    create_view(
        &view_name,
        &LOG_METADATA_COLUMNS,
        &event.columns,
        dialect,
        &tables.logs,
        &filter,
    )
}

pub fn method_view(
    method: &AbiMethod,
    dialect: Dialect,
    tables: &SourceTables,
) -> Result<String, CodegenError> {
    let view_name = method.view_name();
    let filter = format!(
        "to_address = '{}' AND SUBSTR(input, 1, {SELECTOR_WIDTH}) = '{}'",
        method.contract_address, method.selector
    );

    create_view(
        &view_name,
        &TRANSACTION_METADATA_COLUMNS,
        &method.columns,
        dialect,
        &tables.transactions,
        &filter,
    )
}

fn create_view(
    view_name: &str,
    metadata_columns: &[(&str, &str)],
    columns: &[Column],
    dialect: Dialect,
    table: &str,
    filter: &str,
) -> Result<String, CodegenError> {
    let mut aliases = HashSet::new();
    let mut select_list = Vec::with_capacity(metadata_columns.len() + columns.len());

    for (column, alias) in metadata_columns {
        aliases.insert(alias.to_string());

        if column == alias {
            select_list.push(column.to_string());
        } else {
            select_list.push(format!("{column} AS {alias}"));
        }
    }

    // Warehouses truncate longer aliases, and truncated ones may collide.
    let max = dialect.max_identifier_length();

    for column in columns {
        if column.name.len() > max {
            return Err(CodegenError::IdentifierTooLong {
                view: view_name.to_string(),
                column: column.name.clone(),
                max,
            });
        }

        if !aliases.insert(column.name.clone()) {
            return Err(CodegenError::DuplicateColumn {
                view: view_name.to_string(),
                column: column.name.clone(),
            });
        }

        let alias = quote_identifier(view_name, &column.name)?;
        select_list.push(format!("{} AS {alias}", dialect.select_expression(column)));
    }

    Ok(format!(
        "CREATE OR REPLACE VIEW {} AS SELECT {} FROM {table} WHERE {filter};",
        quote_identifier(view_name, view_name)?,
        select_list.join(", ")
    ))
}

fn quote_identifier(view_name: &str, identifier: &str) -> Result<String, CodegenError> {
    if identifier.contains('"') || identifier.contains('\0') {
        Err(CodegenError::UnquotableIdentifier {
            view: view_name.to_string(),
            identifier: identifier.to_string(),
        })
    } else {
        Ok(format!("\"{identifier}\""))
    }
}
