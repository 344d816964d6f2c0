use std::str::FromStr;

use derive_more::Display;
use sqlparser::dialect::{Dialect as ParserDialect, PostgreSqlDialect, SnowflakeDialect};

use crate::abis::{Column, WORD_WIDTH};

pub const SNOWFLAKE_MAX_IDENTIFIER_LENGTH: usize = 255;
pub const POSTGRES_MAX_IDENTIFIER_LENGTH: usize = 63;

// TO_NUMBER tops out at 38 decimal digits
const SNOWFLAKE_MAX_NUMERIC_BITS: usize = 96;
// BIGINT is signed 64-bit
const POSTGRES_MAX_NUMERIC_BITS: usize = 56;

/// Target SQL engine of the generated views.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    #[display("postgres")]
    Postgres,
    #[display("snowflake")]
    Snowflake,
}

impl Dialect {
    pub fn max_identifier_length(&self) -> usize {
        match self {
            Dialect::Postgres => POSTGRES_MAX_IDENTIFIER_LENGTH,
            Dialect::Snowflake => SNOWFLAKE_MAX_IDENTIFIER_LENGTH,
        }
    }

    pub fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        match self {
            Dialect::Postgres => Box::new(PostgreSqlDialect {}),
            Dialect::Snowflake => Box::new(SnowflakeDialect {}),
        }
    }

    /// Select expression extracting `column` from its raw hex source.
    ///
    /// Dynamic types (`string`, `bytes`, arrays, tuples) and integers too
    /// wide for the engine's numeric cast come out as the raw `0x`-prefixed word.
    pub fn select_expression(&self, column: &Column) -> String {
        let source = column.source;
        let start = column.start;
        let abi_type = column.abi_type.as_str();

        if abi_type == "address" {
            return format!("'0x' || SUBSTR({source}, {}, 40)", start + 24);
        }

        if abi_type == "bool" {
            return format!("(SUBSTR({source}, {}, 1) = '1')", start + WORD_WIDTH - 1);
        }

        if let Some(size) = fixed_bytes_size(abi_type) {
            return format!("'0x' || SUBSTR({source}, {start}, {})", size * 2);
        }

        if let Some(bits) = uint_bits(abi_type) {
            let digits = bits / 4;
            let digits_start = start + WORD_WIDTH - digits;

            match self {
                Dialect::Snowflake if bits <= SNOWFLAKE_MAX_NUMERIC_BITS => {
                    return format!(
                        "TO_NUMBER(SUBSTR({source}, {digits_start}, {digits}), '{}')",
                        "X".repeat(digits)
                    );
                }
                Dialect::Postgres if bits <= POSTGRES_MAX_NUMERIC_BITS => {
                    return format!(
                        "('x' || SUBSTR({source}, {digits_start}, {digits}))::bit({bits})::bigint"
                    );
                }
                _ => {}
            }
        }

        format!("'0x' || SUBSTR({source}, {start}, {})", column.width)
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "snowflake" => Ok(Dialect::Snowflake),
            other => Err(format!("unknown SQL dialect: {other}")),
        }
    }
}

fn fixed_bytes_size(abi_type: &str) -> Option<usize> {
    abi_type
        .strip_prefix("bytes")
        .and_then(|size| size.parse::<usize>().ok())
        .filter(|size| (1..=32).contains(size))
}

fn uint_bits(abi_type: &str) -> Option<usize> {
    abi_type
        .strip_prefix("uint")
        .and_then(|bits| bits.parse::<usize>().ok())
        .filter(|bits| *bits > 0 && bits % 8 == 0 && *bits <= 256)
}
