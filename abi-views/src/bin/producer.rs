use std::sync::Arc;

use abi_views::{
    dispatch_views, init_logging, require_queue_url, CandidatePolicy, Config, Dialect,
    PostgresWarehouse, SourceTables, SqsQueue,
};
use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

/// Generates decode views for every candidate contract and queues them for execution.
#[derive(Parser, Debug)]
#[command(name = "abi-views-producer", version)]
struct Args {
    /// Generate and encode messages without sending them
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Maximum number of contracts to process (0 for all)
    #[arg(long, default_value_t = 0)]
    limit: i64,

    /// Minimum number of logs a contract must have emitted
    #[arg(long, default_value_t = 5)]
    count: i64,

    /// Prefix of every generated view name
    #[arg(long, env = "NAMESPACE", default_value = "ETH")]
    namespace: String,

    /// Target SQL engine: postgres or snowflake
    #[arg(long, env = "SQL_DIALECT", default_value = "postgres")]
    dialect: Dialect,

    #[arg(long, env = "SQS_QUEUE_URL")]
    queue_url: String,

    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(long, env = "LOGS_TABLE", default_value = "logs")]
    logs_table: String,

    #[arg(long, env = "TRANSACTIONS_TABLE", default_value = "transactions")]
    transactions_table: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args = Args::parse();

    let config = Config::new(&args.namespace)
        .with_dialect(args.dialect)
        .with_source_tables(SourceTables::new(&args.logs_table, &args.transactions_table))
        .with_dry_run(args.dry_run);
    config.validate()?;

    let mut policy = CandidatePolicy::new(args.count);
    if args.limit > 0 {
        policy = policy.with_limit(args.limit);
    }

    let warehouse = PostgresWarehouse::new(&args.database_url, 1)
        .await
        .context("connecting to the warehouse")?;
    let queue = SqsQueue::new(require_queue_url(&args.queue_url)?, args.region.clone()).await;

    info!(queue = queue.queue_name(), namespace = args.namespace.as_str(), "starting producer");

    let outcome = dispatch_views(config, &warehouse, &policy, Arc::new(queue)).await?;

    if !outcome.is_success() {
        bail!(
            "{} of {} contracts failed to dispatch",
            outcome.failures.len(),
            outcome.contracts_seen
        );
    }

    Ok(())
}
