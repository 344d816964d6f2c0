use sqlparser::parser::{Parser, ParserError};

use super::dialect::Dialect;
use super::views::{event_view, method_view, CodegenError, SourceTables};
use crate::abis::ContractAbi;
use crate::messages::QueueMessage;

/// Every decode view of one contract, ready to ship as a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractBatch {
    pub contract_address: String,
    pub statements: Vec<String>,
}

impl ContractBatch {
    /// Events first, then methods, in resolution order. Rendering the same
    /// contract twice yields the same text.
    pub fn build(
        contract: &ContractAbi,
        dialect: Dialect,
        tables: &SourceTables,
    ) -> Result<Self, CodegenError> {
        let mut statements = Vec::with_capacity(contract.number_of_statements());

        for event in &contract.events {
            statements.push(event_view(event, dialect, tables)?);
        }

        for method in &contract.methods {
            statements.push(method_view(method, dialect, tables)?);
        }

        Ok(Self {
            contract_address: contract.contract_address.clone(),
            statements,
        })
    }

    pub fn number_of_statements(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn sql(&self) -> String {
        self.statements.join("\n")
    }

    pub fn into_message(self) -> QueueMessage {
        let number_of_statements = self.number_of_statements();

        QueueMessage::new(&self.contract_address, &self.sql(), number_of_statements)
    }
}

/// Number of top-level statements in `sql`.
pub fn count_statements(dialect: Dialect, sql: &str) -> Result<usize, ParserError> {
    if sql.trim().is_empty() {
        return Ok(0);
    }

    Parser::parse_sql(dialect.parser_dialect().as_ref(), sql).map(|statements| statements.len())
}
