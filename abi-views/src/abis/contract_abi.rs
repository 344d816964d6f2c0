use std::collections::HashSet;

use derive_more::Display;
use ethers::abi::{Abi, Event, Function};
use tracing::debug;

use super::columns::Column;
use crate::hashes::Hashes;

// `_` + `_evt_`
const EVENT_DECORATION_LENGTH: usize = 6;
// `_` + `_fn_`
const METHOD_DECORATION_LENGTH: usize = 5;

const ADDRESS_HEX_DIGITS: usize = 40;

/// `0x` followed by exactly 40 hex digits, in either case.
///
/// Addresses end up inside view names and SQL string literals, so nothing
/// else is allowed through.
pub fn is_contract_address(contract_address: &str) -> bool {
    contract_address
        .strip_prefix("0x")
        .is_some_and(|digits| {
            digits.len() == ADDRESS_HEX_DIGITS && digits.bytes().all(|b| b.is_ascii_hexdigit())
        })
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    #[display("event")]
    Event,
    #[display("method")]
    Method,
}

impl MemberKind {
    fn infix(&self) -> &'static str {
        match self {
            MemberKind::Event => "evt",
            MemberKind::Method => "fn",
        }
    }

    /// Characters the view name adds on top of namespace, address and member name.
    pub fn decoration_length(&self) -> usize {
        match self {
            MemberKind::Event => EVENT_DECORATION_LENGTH,
            MemberKind::Method => METHOD_DECORATION_LENGTH,
        }
    }

    pub fn view_name(&self, namespace: &str, contract_address: &str, name: &str) -> String {
        format!("{namespace}_{contract_address}_{}_{name}", self.infix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiEvent {
    pub contract_address: String,
    pub namespace: String,
    /// Unique within the contract; overloads carry a numeric suffix.
    pub name: String,
    pub signature_hash: String,
    pub columns: Vec<Column>,
}

impl AbiEvent {
    pub fn new(event: &Event, name: &str, contract_address: &str, namespace: &str) -> Self {
        let columns = Column::from_event_params(&event.inputs);
        let signature = Hashes::canonical_signature(
            &event.name,
            columns.iter().map(|c| c.abi_type.as_str()),
        );

        Self {
            contract_address: contract_address.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            signature_hash: Hashes::signature_hash(&signature),
            columns,
        }
    }

    pub fn view_name(&self) -> String {
        MemberKind::Event.view_name(&self.namespace, &self.contract_address, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiMethod {
    pub contract_address: String,
    pub namespace: String,
    /// Unique within the contract; overloads carry a numeric suffix.
    pub name: String,
    pub selector: String,
    pub columns: Vec<Column>,
}

impl AbiMethod {
    pub fn new(function: &Function, name: &str, contract_address: &str, namespace: &str) -> Self {
        let columns = Column::from_function_params(&function.inputs);
        let signature = Hashes::canonical_signature(
            &function.name,
            columns.iter().map(|c| c.abi_type.as_str()),
        );

        Self {
            contract_address: contract_address.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            selector: Hashes::selector(&signature),
            columns,
        }
    }

    pub fn view_name(&self) -> String {
        MemberKind::Method.view_name(&self.namespace, &self.contract_address, &self.name)
    }
}

/// A contract's events and methods with every argument positioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractAbi {
    pub contract_address: String,
    pub events: Vec<AbiEvent>,
    pub methods: Vec<AbiMethod>,
}

impl ContractAbi {
    /// Positions every event and function argument of `abi`.
    ///
    /// Anonymous events are left out: without a signature topic there is
    /// nothing to filter their logs by.
    pub fn resolve(contract_address: &str, abi: &Abi, namespace: &str) -> Self {
        let contract_address = contract_address.to_lowercase();

        let mut event_names = HashSet::new();
        let events = abi
            .events
            .iter()
            .flat_map(|(name, overloads)| overloads.iter().map(move |e| (name, e)))
            .filter(|(_, event)| {
                if event.anonymous {
                    debug!(
                        contract_address = contract_address.as_str(),
                        event = event.name.as_str(),
                        "leaving out anonymous event"
                    );
                }
                !event.anonymous
            })
            .map(|(name, event)| {
                let name = unique_name(name, &mut event_names);
                AbiEvent::new(event, &name, &contract_address, namespace)
            })
            .collect();

        let mut method_names = HashSet::new();
        let methods = abi
            .functions
            .iter()
            .flat_map(|(name, overloads)| overloads.iter().map(move |f| (name, f)))
            .map(|(name, function)| {
                let name = unique_name(name, &mut method_names);
                AbiMethod::new(function, &name, &contract_address, namespace)
            })
            .collect();

        Self {
            contract_address,
            events,
            methods,
        }
    }

    pub fn number_of_statements(&self) -> usize {
        self.events.len() + self.methods.len()
    }
}

/// `name`, then `name0`, `name1`, ... until one is free.
fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = name.to_string();
    let mut suffix = 0;

    while taken.contains(&candidate) {
        candidate = format!("{name}{suffix}");
        suffix += 1;
    }

    taken.insert(candidate.clone());

    candidate
}
