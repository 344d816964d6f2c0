use std::sync::Arc;

use abi_views::queues::MAX_RECEIVE_BATCH;
use abi_views::{consume_messages, init_logging, require_queue_url, PostgresWarehouse, SqsQueue};
use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

/// Receives one batch of view messages, executes them and acknowledges what ran.
#[derive(Parser, Debug)]
#[command(name = "abi-views-consumer", version)]
struct Args {
    #[arg(long, env = "SQS_QUEUE_URL")]
    queue_url: String,

    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Messages to receive in one batch (at most 10)
    #[arg(long, default_value_t = MAX_RECEIVE_BATCH)]
    max_messages: i32,

    /// Decode messages without executing or deleting them
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = 4)]
    pool_size: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args = Args::parse();

    let warehouse = PostgresWarehouse::new(&args.database_url, args.pool_size)
        .await
        .context("connecting to the warehouse")?;
    let queue = SqsQueue::new(require_queue_url(&args.queue_url)?, args.region.clone()).await;

    info!(queue = queue.queue_name(), dry_run = args.dry_run, "starting consumer");

    let outcome = consume_messages(
        Arc::new(queue),
        Arc::new(warehouse),
        args.max_messages,
        args.dry_run,
    )
    .await?;

    if !outcome.is_success() {
        bail!(
            "{} of {} messages failed",
            outcome.failures.len(),
            outcome.messages_received
        );
    }

    Ok(())
}
