use derive_more::Display;
use ethers::abi::{EventParam, Param};

/// Hex characters in one 32-byte ABI word.
pub const WORD_WIDTH: usize = 64;

// `0x` + 8-char selector, 1-based for SUBSTR
const FUNCTION_INPUT_START: usize = 11;
// `0x`, 1-based for SUBSTR
const UNINDEXED_INPUT_START: usize = 3;
// skips topic[0] (the signature hash) and the `,0x` ahead of topic[1]
const INDEXED_INPUT_START: usize = 70;
// `,0x` between concatenated topics
const TOPIC_SEPARATOR_WIDTH: usize = 3;

const UNNAMED_INPUT_PREFIX: &str = "inp_";

/// Raw warehouse column an argument is sliced out of.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceColumn {
    #[display("topics")]
    Topics,
    #[display("data")]
    Data,
    #[display("input")]
    Input,
}

/// A positioned ABI argument.
///
/// `start` is a 1-based character offset into the hex string held by `source`,
/// ready to be used with SQL `SUBSTR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub source: SourceColumn,
    pub name: String,
    pub abi_type: String,
    pub indexed: bool,
    pub start: usize,
    pub width: usize,
}

impl Column {
    pub fn from_function_params(params: &[Param]) -> Vec<Column> {
        params
            .iter()
            .enumerate()
            .map(|(index, param)| Column {
                source: SourceColumn::Input,
                name: column_name(&param.name, index),
                abi_type: param.kind.to_string(),
                indexed: false,
                start: function_input_start(index),
                width: WORD_WIDTH,
            })
            .collect()
    }

    /// Indexed and unindexed params are positioned independently: each group
    /// counts only its own members.
    pub fn from_event_params(params: &[EventParam]) -> Vec<Column> {
        let mut indexed_count = 0;
        let mut unindexed_count = 0;

        params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let (source, start) = if param.indexed {
                    indexed_count += 1;
                    (
                        SourceColumn::Topics,
                        indexed_event_input_start(indexed_count - 1),
                    )
                } else {
                    unindexed_count += 1;
                    (
                        SourceColumn::Data,
                        unindexed_event_input_start(unindexed_count - 1),
                    )
                };

                Column {
                    source,
                    name: column_name(&param.name, index),
                    abi_type: param.kind.to_string(),
                    indexed: param.indexed,
                    start,
                    width: WORD_WIDTH,
                }
            })
            .collect()
    }
}

pub fn function_input_start(index: usize) -> usize {
    FUNCTION_INPUT_START + index * WORD_WIDTH
}

pub fn unindexed_event_input_start(unindexed_index: usize) -> usize {
    UNINDEXED_INPUT_START + unindexed_index * WORD_WIDTH
}

pub fn indexed_event_input_start(indexed_index: usize) -> usize {
    INDEXED_INPUT_START + indexed_index * (WORD_WIDTH + TOPIC_SEPARATOR_WIDTH)
}

pub fn column_name(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("{UNNAMED_INPUT_PREFIX}{index}")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use ethers::abi::ParamType;

    use super::*;

    fn event_param(name: &str, kind: ParamType, indexed: bool) -> EventParam {
        EventParam {
            name: name.to_string(),
            kind,
            indexed,
        }
    }

    fn param(name: &str, kind: ParamType) -> Param {
        Param {
            name: name.to_string(),
            kind,
            internal_type: None,
        }
    }

    #[test]
    fn positions_transfer_event_params() {
        let columns = Column::from_event_params(&[
            event_param("from", ParamType::Address, true),
            event_param("to", ParamType::Address, true),
            event_param("value", ParamType::Uint(256), false),
        ]);

        let positions: Vec<_> =
            columns.iter().map(|c| (c.name.as_str(), c.source, c.start)).collect();

        assert_eq!(
            positions,
            vec![
                ("from", SourceColumn::Topics, 70),
                ("to", SourceColumn::Topics, 137),
                ("value", SourceColumn::Data, 3),
            ]
        );
    }

    #[test]
    fn counts_indexed_and_unindexed_params_separately() {
        let columns = Column::from_event_params(&[
            event_param("a", ParamType::Uint(256), false),
            event_param("b", ParamType::Address, true),
            event_param("c", ParamType::Bool, false),
            event_param("d", ParamType::Address, true),
            event_param("e", ParamType::Uint(8), false),
        ]);

        let starts: Vec<_> = columns.iter().map(|c| c.start).collect();

        assert_eq!(starts, vec![3, 70, 67, 137, 131]);
    }

    #[test]
    fn positions_function_params_after_the_selector() {
        let columns = Column::from_function_params(&[
            param("to", ParamType::Address),
            param("amount", ParamType::Uint(256)),
            param("data", ParamType::Bytes),
        ]);

        for (index, column) in columns.iter().enumerate() {
            assert_eq!(column.start, 11 + 64 * index);
            assert_eq!(column.width, WORD_WIDTH);
            assert_eq!(column.source, SourceColumn::Input);
        }
    }

    #[test]
    fn names_unnamed_params_by_position() {
        let columns = Column::from_function_params(&[
            param("", ParamType::Address),
            param("amount", ParamType::Uint(256)),
            param("", ParamType::Bool),
        ]);

        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["inp_0", "amount", "inp_2"]);
    }

    #[test]
    fn renders_canonical_abi_types() {
        let columns = Column::from_function_params(&[
            param("ids", ParamType::Array(Box::new(ParamType::Uint(256)))),
            param(
                "order",
                ParamType::Tuple(vec![ParamType::Address, ParamType::Uint(128)]),
            ),
            param("salt", ParamType::FixedBytes(32)),
        ]);

        let types: Vec<_> = columns.iter().map(|c| c.abi_type.as_str()).collect();

        assert_eq!(types, vec!["uint256[]", "(address,uint128)", "bytes32"]);
    }
}
