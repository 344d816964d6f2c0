use derive_more::Display;
use serde::{Deserialize, Serialize};

/// SQS rejects bodies above 256 KiB.
pub const MAX_MESSAGE_BYTES: usize = 262_144;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[display("could not encode message: {_0}")]
    Encode(String),
    #[display("could not decode message: {_0}")]
    Decode(String),
    #[display("encoded message is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },
}

impl std::error::Error for MessageError {}

/// What travels over the queue: one contract's combined view statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueMessage {
    pub contract_address: String,
    pub sql_statements: String,
    pub number_of_statements: usize,
}

impl QueueMessage {
    pub fn new(contract_address: &str, sql_statements: &str, number_of_statements: usize) -> Self {
        Self {
            contract_address: contract_address.to_string(),
            sql_statements: sql_statements.to_string(),
            number_of_statements,
        }
    }

    pub fn encode(&self) -> Result<String, MessageError> {
        let body = serde_json::to_string(self).map_err(|e| MessageError::Encode(e.to_string()))?;

        if body.len() > MAX_MESSAGE_BYTES {
            return Err(MessageError::TooLarge {
                size: body.len(),
                max: MAX_MESSAGE_BYTES,
            });
        }

        Ok(body)
    }

    pub fn decode(body: &str) -> Result<Self, MessageError> {
        serde_json::from_str(body).map_err(|e| MessageError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_what_it_encodes() {
        let message = QueueMessage::new(
            "0xdac17f958d2ee523a2206206994597c13d831ec7",
            "CREATE OR REPLACE VIEW \"v\" AS SELECT 1;",
            1,
        );

        let body = message.encode().unwrap();

        assert_eq!(QueueMessage::decode(&body).unwrap(), message);
    }

    #[test]
    fn uses_snake_case_field_names() {
        let body = QueueMessage::new("0xabc", "", 0).encode().unwrap();

        assert_eq!(
            body,
            r#"{"contract_address":"0xabc","sql_statements":"","number_of_statements":0}"#
        );
    }

    #[test]
    fn rejects_missing_fields() {
        let error = QueueMessage::decode(r#"{"contract_address":"0xabc","sql_statements":""}"#)
            .unwrap_err();

        assert!(matches!(error, MessageError::Decode(_)));
    }

    #[test]
    fn rejects_unknown_fields() {
        let body = r#"{"contract_address":"0xabc","sql_statements":"","number_of_statements":0,"extra":true}"#;

        assert!(matches!(
            QueueMessage::decode(body),
            Err(MessageError::Decode(_))
        ));
    }

    #[test]
    fn rejects_malformed_bodies() {
        for body in ["", "not json", "[]", r#"{"number_of_statements":-1}"#] {
            assert!(QueueMessage::decode(body).is_err(), "{body}");
        }
    }

    #[test]
    fn refuses_to_encode_oversized_messages() {
        let sql = "x".repeat(MAX_MESSAGE_BYTES);

        let error = QueueMessage::new("0xabc", &sql, 1).encode().unwrap_err();

        assert!(matches!(error, MessageError::TooLarge { max: MAX_MESSAGE_BYTES, .. }));
    }
}
