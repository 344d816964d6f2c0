use ethers::types::H256;
use ethers::utils::keccak256;

pub struct Hashes;

impl Hashes {
    pub fn h256_to_string(h256: &H256) -> String {
        format!("{h256:#x}")
    }

    /// Keccak-256 of a canonical `name(type1,type2,...)` signature, `0x`-prefixed.
    pub fn signature_hash(canonical_signature: &str) -> String {
        Self::h256_to_string(&H256::from(keccak256(canonical_signature.as_bytes())))
    }

    /// First 4 bytes of the signature hash, `0x`-prefixed.
    pub fn selector(canonical_signature: &str) -> String {
        let hash = keccak256(canonical_signature.as_bytes());

        format!(
            "0x{:08x}",
            u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]])
        )
    }

    pub fn canonical_signature<'a>(name: &str, types: impl Iterator<Item = &'a str>) -> String {
        format!("{name}({})", types.collect::<Vec<_>>().join(","))
    }
}
