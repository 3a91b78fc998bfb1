// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Deterministic deployment identities.

use alloy::{
    primitives::{keccak256, B256},
    sol_types::SolValue,
};

/// Ledger `id` for a `(name, version)` deployment, used by registries to cross-reference it.
///
/// `keccak256(abi.encode(name ++ version))`, where the concatenation is encoded as a single
/// `string` parameter.
pub fn deployment_id(contract_name: &str, version: &str) -> B256 {
    let tag = format!("{contract_name}{version}");
    keccak256((tag,).abi_encode_params())
}

/// Salt the ContractFactory marks as used once `(name, version)` is deployed:
/// `keccak256(abi.encodePacked(name, version))`.
pub fn factory_salt(contract_name: &str, version: &str) -> B256 {
    keccak256(format!("{contract_name}{version}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stable() {
        let a = deployment_id("DonationVotingMerkleDistributionDirectTransferStrategy", "v2.1");
        let b = deployment_id("DonationVotingMerkleDistributionDirectTransferStrategy", "v2.1");
        assert_eq!(a, b);
    }

    #[test]
    fn id_depends_on_version() {
        assert_ne!(
            deployment_id("QVSimpleStrategy", "v1.0"),
            deployment_id("QVSimpleStrategy", "v1.0a")
        );
    }

    #[test]
    fn id_hashes_abi_encoded_string() {
        // offset, length, then the right-padded bytes of "Av1"
        let mut encoded = [0u8; 96];
        encoded[31] = 0x20;
        encoded[63] = 3;
        encoded[64..67].copy_from_slice(b"Av1");
        assert_eq!(deployment_id("A", "v1"), keccak256(encoded));
    }

    #[test]
    fn factory_salt_is_packed() {
        assert_eq!(factory_salt("A", "v1"), keccak256(b"Av1"));
        assert_ne!(factory_salt("A", "v1"), deployment_id("A", "v1"));
    }
}
