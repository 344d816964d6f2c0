use diesel::sql_types::{BigInt, Binary, Nullable, Text};
use diesel::QueryableByName;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl, SimpleAsyncConnection};
use tracing::{debug, info};

use super::{
    verify_statement_count, CandidateContract, CandidatePolicy, ExecutesMultiStatements,
    LoadsCandidates, MultiStatementContext, WarehouseError,
};
use crate::sql::Dialect;
use crate::validated_sql;

pub type Conn<'a> = bb8::PooledConnection<'a, AsyncDieselConnectionManager<AsyncPgConnection>>;
pub type Pool = bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Contracts with a stored ABI, busiest first. `$1` is the minimum log count,
/// `$2` an optional row limit (`NULL` for all).
pub const CANDIDATE_CONTRACTS_QUERY: &str = validated_sql!(
    "SELECT contracts.contract_address, contracts.abi_json \
     FROM contracts \
     JOIN (SELECT address, COUNT(*) AS log_count FROM logs GROUP BY address) AS log_counts \
     ON log_counts.address = contracts.contract_address \
     WHERE contracts.abi_json IS NOT NULL AND log_counts.log_count >= $1 \
     ORDER BY log_counts.log_count DESC \
     LIMIT $2"
);

#[derive(QueryableByName)]
struct CandidateRow {
    #[diesel(sql_type = Text)]
    contract_address: String,
    #[diesel(sql_type = Binary)]
    abi_json: Vec<u8>,
}

#[derive(Clone)]
pub struct PostgresWarehouse {
    pool: Pool,
}

impl PostgresWarehouse {
    pub async fn new(url: &str, max_pool_size: u32) -> Result<Self, WarehouseError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(url);
        let pool = bb8::Pool::builder()
            .max_size(max_pool_size)
            .build(manager)
            .await
            .map_err(|e| WarehouseError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }

    async fn get_conn(&self) -> Result<Conn<'_>, WarehouseError> {
        self.pool.get().await.map_err(|e| WarehouseError::Connection(e.to_string()))
    }
}

#[async_trait::async_trait]
impl LoadsCandidates for PostgresWarehouse {
    async fn load_candidates(
        &self,
        policy: &CandidatePolicy,
    ) -> Result<Vec<CandidateContract>, WarehouseError> {
        let mut conn = self.get_conn().await?;

        debug!(
            min_log_count = policy.min_log_count,
            limit = ?policy.limit,
            "loading candidate contracts"
        );

        let rows: Vec<CandidateRow> = diesel::sql_query(CANDIDATE_CONTRACTS_QUERY)
            .bind::<BigInt, _>(policy.min_log_count)
            .bind::<Nullable<BigInt>, _>(policy.limit)
            .load(&mut *conn)
            .await
            .map_err(|e| WarehouseError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| CandidateContract {
                contract_address: row.contract_address,
                abi_json: row.abi_json,
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl ExecutesMultiStatements for PostgresWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn execute_multi_statement(
        &self,
        context: &MultiStatementContext,
        sql: &str,
    ) -> Result<(), WarehouseError> {
        verify_statement_count(self.dialect(), context, sql)?;

        let mut conn = self.get_conn().await?;
        let tagged_sql = format!("/* request_id={} */\n{sql}", context.request_id);

        conn.batch_execute(&tagged_sql)
            .await
            .map_err(|e| WarehouseError::Query(e.to_string()))?;

        info!(
            request_id = %context.request_id,
            statement_count = context.statement_count,
            "executed statements"
        );

        Ok(())
    }
}
