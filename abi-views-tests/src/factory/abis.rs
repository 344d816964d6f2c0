use abi_views::CandidateContract;
use rand::Rng;
use serde_json::json;

pub const USDC_CONTRACT_ADDRESS: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

/// Events in `erc20_abi`.
pub const ERC20_EVENT_COUNT: usize = 2;
/// Functions in `erc20_abi`.
pub const ERC20_METHOD_COUNT: usize = 9;

pub fn erc20_abi() -> String {
    json!([
        event("Transfer", &[("from", "address", true), ("to", "address", true), ("value", "uint256", false)]),
        event("Approval", &[("owner", "address", true), ("spender", "address", true), ("value", "uint256", false)]),
        function("name", &[], "view"),
        function("symbol", &[], "view"),
        function("decimals", &[], "view"),
        function("totalSupply", &[], "view"),
        function("balanceOf", &[("account", "address")], "view"),
        function("allowance", &[("owner", "address"), ("spender", "address")], "view"),
        function("transfer", &[("to", "address"), ("value", "uint256")], "nonpayable"),
        function("approve", &[("spender", "address"), ("value", "uint256")], "nonpayable"),
        function(
            "transferFrom",
            &[("from", "address"), ("to", "address"), ("value", "uint256")],
            "nonpayable"
        ),
    ])
    .to_string()
}

/// Its `DelegateVotesChanged` view name only fits identifier limits of 71 or more.
pub fn governance_abi() -> String {
    json!([
        event(
            "DelegateVotesChanged",
            &[("delegate", "address", true), ("previousBalance", "uint256", false), ("newBalance", "uint256", false)]
        ),
        function("delegate", &[("delegatee", "address")], "nonpayable"),
    ])
    .to_string()
}

/// Its `Moved` event has an argument named like the `log_index` metadata column.
pub fn duplicate_column_abi() -> String {
    json!([event(
        "Moved",
        &[("log_index", "uint256", false), ("to", "address", true)]
    )])
    .to_string()
}

/// Enough wide functions that the rendered message passes the queue's size limit.
pub fn oversized_abi() -> String {
    let names: Vec<_> = (0..8).map(|index| format!("a{index}")).collect();
    let inputs: Vec<_> = names.iter().map(|name| (name.as_str(), "uint256")).collect();

    serde_json::Value::Array(
        (0..OVERSIZED_METHOD_COUNT)
            .map(|index| function(&format!("bulk{index}"), &inputs, "nonpayable"))
            .collect(),
    )
    .to_string()
}

const OVERSIZED_METHOD_COUNT: usize = 600;

pub fn erc20_contract(contract_address: &str) -> CandidateContract {
    CandidateContract::new(contract_address, erc20_abi().as_bytes())
}

pub fn governance_contract(contract_address: &str) -> CandidateContract {
    CandidateContract::new(contract_address, governance_abi().as_bytes())
}

pub fn contract_with_duplicate_column(contract_address: &str) -> CandidateContract {
    CandidateContract::new(contract_address, duplicate_column_abi().as_bytes())
}

pub fn oversized_contract(contract_address: &str) -> CandidateContract {
    CandidateContract::new(contract_address, oversized_abi().as_bytes())
}

pub fn contract_with_invalid_abi(contract_address: &str) -> CandidateContract {
    CandidateContract::new(contract_address, br#"{"type":"event""#)
}

/// Lower-cased, like every address the pipeline reports.
pub fn random_contract_address() -> String {
    let mut rng = rand::thread_rng();

    format!("0x{:08x}{:032x}", rng.gen::<u32>(), rng.gen::<u128>())
}

pub fn random_erc20_contracts(count: usize) -> Vec<CandidateContract> {
    (0..count).map(|_| erc20_contract(&random_contract_address())).collect()
}

fn event(name: &str, inputs: &[(&str, &str, bool)]) -> serde_json::Value {
    json!({
        "type": "event",
        "name": name,
        "anonymous": false,
        "inputs": inputs
            .iter()
            .map(|(name, kind, indexed)| json!({"name": name, "type": kind, "indexed": indexed}))
            .collect::<Vec<_>>(),
    })
}

fn function(name: &str, inputs: &[(&str, &str)], state_mutability: &str) -> serde_json::Value {
    json!({
        "type": "function",
        "name": name,
        "stateMutability": state_mutability,
        "inputs": inputs
            .iter()
            .map(|(name, kind)| json!({"name": name, "type": kind}))
            .collect::<Vec<_>>(),
        "outputs": [],
    })
}
