// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use std::time::Duration;

/// Confirmations awaited on public networks unless configured otherwise.
pub const DEFAULT_CONFIRMATIONS: u64 = 5;

/// Chain ids of local development nodes (hardhat, anvil, ganache, zkSync in-memory nodes).
pub const LOCAL_CHAIN_IDS: [u64; 4] = [31337, 1337, 260, 270];

pub fn is_local(chain_id: u64) -> bool {
    LOCAL_CHAIN_IDS.contains(&chain_id)
}

/// Network name used for upgrade manifest files, e.g. `.openzeppelin/sepolia.json`.
pub fn manifest_network_name(chain_id: u64) -> String {
    let known = match chain_id {
        1 => "mainnet",
        5 => "goerli",
        10 => "optimism",
        137 => "polygon",
        42161 => "arbitrum-one",
        80001 => "polygon-mumbai",
        421614 => "arbitrum-sepolia",
        11155111 => "sepolia",
        11155420 => "optimism-sepolia",
        _ => return format!("unknown-{chain_id}"),
    };
    known.to_string()
}

#[derive(Clone, Debug)]
pub struct ChainConfig {
    pub chain_id: u64,
    /// Blocks to wait for after each transaction.
    pub confirmations: u64,
    /// Give up waiting for a receipt after this long. Waits forever if unset.
    pub receipt_timeout: Option<Duration>,
}

impl ChainConfig {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            confirmations: if is_local(chain_id) {
                0
            } else {
                DEFAULT_CONFIRMATIONS
            },
            receipt_timeout: None,
        }
    }

    pub fn is_local(&self) -> bool {
        is_local(self.chain_id)
    }

    /// Confirmation count in the form receipt watchers expect: at least one block.
    pub fn required_confirmations(&self) -> u64 {
        self.confirmations.max(1)
    }
}
