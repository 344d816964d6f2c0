use std::collections::HashSet;

use abi_views::warehouses::verify_statement_count;
use abi_views::{
    CandidateContract, CandidatePolicy, Dialect, ExecutesMultiStatements, LoadsCandidates,
    MultiStatementContext, WarehouseError,
};
use tokio::sync::Mutex;

/// Serves fixed candidates and records what it is asked to execute.
/// Statements mentioning a failing address are refused.
pub struct RecordingWarehouse {
    dialect: Dialect,
    candidates: Vec<CandidateContract>,
    failing_addresses: HashSet<String>,
    executed: Mutex<Vec<(MultiStatementContext, String)>>,
}

impl RecordingWarehouse {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            candidates: vec![],
            failing_addresses: HashSet::new(),
            executed: Mutex::new(vec![]),
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<CandidateContract>) -> Self {
        self.candidates = candidates;

        self
    }

    pub fn failing_executions_for(mut self, contract_addresses: &[String]) -> Self {
        self.failing_addresses.extend(contract_addresses.iter().map(|a| a.to_lowercase()));

        self
    }

    pub async fn executed(&self) -> Vec<(MultiStatementContext, String)> {
        self.executed.lock().await.clone()
    }

    pub async fn executed_statement_count(&self) -> usize {
        self.executed
            .lock()
            .await
            .iter()
            .map(|(context, _)| context.statement_count)
            .sum()
    }
}

#[async_trait::async_trait]
impl LoadsCandidates for RecordingWarehouse {
    async fn load_candidates(
        &self,
        policy: &CandidatePolicy,
    ) -> Result<Vec<CandidateContract>, WarehouseError> {
        let limit = policy.limit.map(|l| l as usize).unwrap_or(self.candidates.len());

        Ok(self.candidates.iter().take(limit).cloned().collect())
    }
}

#[async_trait::async_trait]
impl ExecutesMultiStatements for RecordingWarehouse {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute_multi_statement(
        &self,
        context: &MultiStatementContext,
        sql: &str,
    ) -> Result<(), WarehouseError> {
        verify_statement_count(self.dialect, context, sql)?;

        if self.failing_addresses.iter().any(|address| sql.contains(address.as_str())) {
            return Err(WarehouseError::Query("permission denied for schema".to_string()));
        }

        self.executed.lock().await.push((context.clone(), sql.to_string()));

        Ok(())
    }
}
