#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use abi_views::abis::ContractAbi;
    use abi_views::sql::{ContractBatch, SourceTables};
    use abi_views::{
        consume_messages, ConsumeFailure, ConsumeOutcome, Consumer, Dialect, MessageError,
        QueueMessage, ReceivedMessage, WarehouseError,
    };

    use crate::factory::{
        erc20_abi, random_contract_address, InMemoryQueue, RecordingWarehouse, ERC20_EVENT_COUNT,
        ERC20_METHOD_COUNT,
    };

    fn erc20_message(contract_address: &str) -> String {
        let abi = serde_json::from_str(&erc20_abi()).unwrap();
        let contract = ContractAbi::resolve(contract_address, &abi, "ETH");

        ContractBatch::build(&contract, Dialect::Postgres, &SourceTables::default())
            .unwrap()
            .into_message()
            .encode()
            .unwrap()
    }

    async fn consume(
        queue: &Arc<InMemoryQueue>,
        warehouse: &Arc<RecordingWarehouse>,
        messages: Vec<ReceivedMessage>,
    ) -> ConsumeOutcome {
        Consumer::new(queue.clone(), warehouse.clone())
            .process_batch(messages)
            .await
            .unwrap()
    }

    #[tokio::test]
    pub async fn executes_and_acknowledges_messages() {
        let queue = Arc::new(InMemoryQueue::new().with_random_delays(10));
        let warehouse = Arc::new(RecordingWarehouse::new(Dialect::Postgres));
        let messages: Vec<_> = (0..3)
            .map(|index| {
                ReceivedMessage::new(
                    &format!("receipt-{index}"),
                    &erc20_message(&random_contract_address()),
                )
            })
            .collect();

        let outcome = consume(&queue, &warehouse, messages).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.messages_received, 3);
        assert_eq!(outcome.messages_executed, 3);
        assert_eq!(outcome.messages_acknowledged, 3);
        assert_eq!(
            warehouse.executed_statement_count().await,
            3 * (ERC20_EVENT_COUNT + ERC20_METHOD_COUNT)
        );

        let mut deleted = queue.deleted_receipt_handles().await;
        deleted.sort();
        assert_eq!(deleted, vec!["receipt-0", "receipt-1", "receipt-2"]);
    }

    #[tokio::test]
    pub async fn tags_every_execution_with_its_own_request_id() {
        let queue = Arc::new(InMemoryQueue::new());
        let warehouse = Arc::new(RecordingWarehouse::new(Dialect::Postgres));
        let messages = vec![
            ReceivedMessage::new("receipt-a", &erc20_message(&random_contract_address())),
            ReceivedMessage::new("receipt-b", &erc20_message(&random_contract_address())),
        ];

        consume(&queue, &warehouse, messages).await;

        let executed = warehouse.executed().await;
        assert_eq!(executed.len(), 2);
        assert_ne!(executed[0].0.request_id, executed[1].0.request_id);
    }

    #[tokio::test]
    pub async fn acknowledges_empty_messages_without_executing_them() {
        let queue = Arc::new(InMemoryQueue::new());
        let warehouse = Arc::new(RecordingWarehouse::new(Dialect::Postgres));
        let body = QueueMessage::new(&random_contract_address(), "", 0).encode().unwrap();

        let outcome = consume(&queue, &warehouse, vec![ReceivedMessage::new("receipt-0", &body)]).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.messages_executed, 0);
        assert_eq!(outcome.messages_acknowledged, 1);
        assert!(warehouse.executed().await.is_empty());
        assert_eq!(queue.deleted_receipt_handles().await, vec!["receipt-0"]);
    }

    #[tokio::test]
    pub async fn leaves_undecodable_messages_on_the_queue() {
        let queue = Arc::new(InMemoryQueue::new());
        let warehouse = Arc::new(RecordingWarehouse::new(Dialect::Postgres));
        let messages = vec![
            ReceivedMessage::new("receipt-0", r#"{"contract_address":"0xabc"}"#),
            ReceivedMessage::new("receipt-1", &erc20_message(&random_contract_address())),
        ];

        let outcome = consume(&queue, &warehouse, messages).await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.failed_receipt_handles(), vec!["receipt-0"]);
        assert!(matches!(
            outcome.failures[0].1,
            ConsumeFailure::Decode(MessageError::Decode(_))
        ));
        assert_eq!(queue.deleted_receipt_handles().await, vec!["receipt-1"]);
    }

    #[tokio::test]
    pub async fn leaves_failed_executions_for_redelivery() {
        let failing_address = random_contract_address();
        let queue = Arc::new(InMemoryQueue::new());
        let warehouse = Arc::new(
            RecordingWarehouse::new(Dialect::Postgres)
                .failing_executions_for(&[failing_address.clone()]),
        );
        let messages = vec![
            ReceivedMessage::new("receipt-0", &erc20_message(&failing_address)),
            ReceivedMessage::new("receipt-1", &erc20_message(&random_contract_address())),
        ];

        let outcome = consume(&queue, &warehouse, messages).await;

        assert_eq!(outcome.messages_executed, 1);
        assert_eq!(outcome.failed_receipt_handles(), vec!["receipt-0"]);
        match &outcome.failures[0].1 {
            ConsumeFailure::Execution {
                contract_address,
                error,
            } => {
                assert_eq!(contract_address, &failing_address);
                assert!(matches!(error, WarehouseError::Query(_)));
            }
            failure => panic!("expected an execution failure, got {failure}"),
        }
        assert_eq!(queue.deleted_receipt_handles().await, vec!["receipt-1"]);
    }

    #[tokio::test]
    pub async fn refuses_messages_declaring_the_wrong_statement_count() {
        let queue = Arc::new(InMemoryQueue::new());
        let warehouse = Arc::new(RecordingWarehouse::new(Dialect::Postgres));
        let mut message = QueueMessage::decode(&erc20_message(&random_contract_address())).unwrap();
        message.number_of_statements -= 1;
        let body = message.encode().unwrap();

        let outcome = consume(&queue, &warehouse, vec![ReceivedMessage::new("receipt-0", &body)]).await;

        assert!(matches!(
            &outcome.failures[0].1,
            ConsumeFailure::Execution {
                error: WarehouseError::StatementCountMismatch { .. },
                ..
            }
        ));
        assert!(warehouse.executed().await.is_empty());
        assert!(queue.deleted_receipt_handles().await.is_empty());
    }

    #[tokio::test]
    pub async fn counts_ack_failures_without_failing_the_batch() {
        let queue = Arc::new(InMemoryQueue::new().failing_deletes_for(&["receipt-0"]));
        let warehouse = Arc::new(RecordingWarehouse::new(Dialect::Postgres));
        let body = erc20_message(&random_contract_address());

        let outcome = consume(&queue, &warehouse, vec![ReceivedMessage::new("receipt-0", &body)]).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.messages_executed, 1);
        assert_eq!(outcome.messages_acknowledged, 0);
        assert_eq!(outcome.ack_failures, 1);
    }

    #[tokio::test]
    pub async fn neither_executes_nor_deletes_on_dry_runs() {
        let queue = Arc::new(InMemoryQueue::new());
        let warehouse = Arc::new(RecordingWarehouse::new(Dialect::Postgres));
        let messages = vec![
            ReceivedMessage::new("receipt-0", &erc20_message(&random_contract_address())),
            ReceivedMessage::new("receipt-1", "garbage"),
        ];

        let outcome = Consumer::new(queue.clone(), warehouse.clone())
            .with_dry_run(true)
            .process_batch(messages)
            .await
            .unwrap();

        assert_eq!(outcome.messages_received, 2);
        assert_eq!(outcome.failed_receipt_handles(), vec!["receipt-1"]);
        assert!(warehouse.executed().await.is_empty());
        assert!(queue.deleted_receipt_handles().await.is_empty());
    }

    #[tokio::test]
    pub async fn consumes_nothing_from_an_empty_queue() {
        let queue = Arc::new(InMemoryQueue::new());
        let warehouse = Arc::new(RecordingWarehouse::new(Dialect::Postgres));

        let outcome = consume_messages(queue, warehouse, 10, false).await.unwrap();

        assert_eq!(outcome, ConsumeOutcome::default());
    }
}
