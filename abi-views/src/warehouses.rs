#[cfg(feature = "postgres")]
mod postgres_warehouse;

use derive_more::Display;
use uuid::Uuid;

use crate::sql::{count_statements, Dialect};

#[cfg(feature = "postgres")]
pub use postgres_warehouse::{Conn, PostgresWarehouse, Pool, CANDIDATE_CONTRACTS_QUERY};

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum WarehouseError {
    #[display("warehouse connection failed: {_0}")]
    Connection(String),
    #[display("warehouse query failed: {_0}")]
    Query(String),
    #[display("declared {declared} statements, found {actual}")]
    StatementCountMismatch { declared: usize, actual: usize },
    #[display("could not parse statements: {_0}")]
    Parse(String),
}

impl std::error::Error for WarehouseError {}

/// A contract that may get decode views, with its ABI as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateContract {
    pub contract_address: String,
    pub abi_json: Vec<u8>,
}

impl CandidateContract {
    pub fn new(contract_address: &str, abi_json: &[u8]) -> Self {
        Self {
            contract_address: contract_address.to_string(),
            abi_json: abi_json.to_vec(),
        }
    }
}

/// Which contracts are worth views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePolicy {
    /// Contracts that emitted fewer logs are left out.
    pub min_log_count: i64,
    pub limit: Option<i64>,
}

impl CandidatePolicy {
    pub fn new(min_log_count: i64) -> Self {
        Self {
            min_log_count,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiStatementContext {
    pub request_id: Uuid,
    /// What the sender declared; execution refuses text holding a different count.
    pub statement_count: usize,
}

impl MultiStatementContext {
    pub fn new(statement_count: usize) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            statement_count,
        }
    }
}

#[async_trait::async_trait]
pub trait LoadsCandidates: Send + Sync {
    async fn load_candidates(
        &self,
        policy: &CandidatePolicy,
    ) -> Result<Vec<CandidateContract>, WarehouseError>;
}

#[async_trait::async_trait]
pub trait ExecutesMultiStatements: Send + Sync {
    fn dialect(&self) -> Dialect;

    async fn execute_multi_statement(
        &self,
        context: &MultiStatementContext,
        sql: &str,
    ) -> Result<(), WarehouseError>;
}

/// Checks `sql` holds exactly the statements `context` declares.
pub fn verify_statement_count(
    dialect: Dialect,
    context: &MultiStatementContext,
    sql: &str,
) -> Result<(), WarehouseError> {
    let actual =
        count_statements(dialect, sql).map_err(|e| WarehouseError::Parse(e.to_string()))?;

    if actual == context.statement_count {
        Ok(())
    } else {
        Err(WarehouseError::StatementCountMismatch {
            declared: context.statement_count,
            actual,
        })
    }
}
