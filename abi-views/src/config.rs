use derive_more::Display;

use crate::sql::{Dialect, SourceTables};

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[display("a namespace is required")]
    EmptyNamespace,
    #[display("namespace {_0} may only hold ASCII letters, digits and underscores")]
    InvalidNamespace(String),
    #[display("source table names cannot be empty")]
    EmptyTableName,
    #[display("a queue URL is required")]
    MissingQueueUrl,
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Prefix of every generated view name, e.g. `ETH`.
    pub namespace: String,
    pub dialect: Dialect,
    pub source_tables: SourceTables,
    /// Generate and encode, but never send.
    pub dry_run: bool,
}

impl Config {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            dialect: Dialect::default(),
            source_tables: SourceTables::default(),
            dry_run: false,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;

        self
    }

    pub fn with_source_tables(mut self, source_tables: SourceTables) -> Self {
        self.source_tables = source_tables;

        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;

        self
    }

    pub fn max_identifier_length(&self) -> usize {
        self.dialect.max_identifier_length()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }

        if !self.namespace.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::InvalidNamespace(self.namespace.clone()));
        }

        let SourceTables { logs, transactions } = &self.source_tables;
        if logs.trim().is_empty() || transactions.trim().is_empty() {
            return Err(ConfigError::EmptyTableName);
        }

        Ok(())
    }
}

pub fn require_queue_url(queue_url: &str) -> Result<&str, ConfigError> {
    let queue_url = queue_url.trim();

    if queue_url.is_empty() {
        Err(ConfigError::MissingQueueUrl)
    } else {
        Ok(queue_url)
    }
}
