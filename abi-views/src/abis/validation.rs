use derive_more::Display;

use super::contract_abi::{ContractAbi, MemberKind};

/// Outcome of identifier validation, decided once per contract before any
/// SQL is generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ContractAbi),
    Skipped(SkipReason),
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display(
    "{member_kind} {member_name} of {contract_address} needs a {identifier_length} character view name, limit is {max_identifier_length}"
)]
pub struct SkipReason {
    pub contract_address: String,
    pub member_kind: MemberKind,
    pub member_name: String,
    pub identifier_length: usize,
    pub max_identifier_length: usize,
}

pub fn identifier_length(
    namespace: &str,
    contract_address: &str,
    name: &str,
    kind: MemberKind,
) -> usize {
    namespace.len() + contract_address.len() + name.len() + kind.decoration_length()
}

impl ContractAbi {
    /// Either every view of the contract fits `max_identifier_length` or the
    /// whole contract is skipped. Stops at the first offending member,
    /// events before methods.
    pub fn validate(self, max_identifier_length: usize) -> Resolution {
        let members = self
            .events
            .iter()
            .map(|e| (MemberKind::Event, e.namespace.as_str(), e.name.as_str()))
            .chain(
                self.methods
                    .iter()
                    .map(|m| (MemberKind::Method, m.namespace.as_str(), m.name.as_str())),
            );

        for (member_kind, namespace, name) in members {
            let length = identifier_length(namespace, &self.contract_address, name, member_kind);

            if length > max_identifier_length {
                return Resolution::Skipped(SkipReason {
                    contract_address: self.contract_address.clone(),
                    member_kind,
                    member_name: name.to_string(),
                    identifier_length: length,
                    max_identifier_length,
                });
            }
        }

        Resolution::Resolved(self)
    }
}
