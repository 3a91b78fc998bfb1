// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Per-chain deployment parameters.
//!
//! Parameters live in a TOML file with one table per chain id:
//!
//! ```toml
//! [chains.11155111.common]
//! proxy_admin_owner = "0x..."
//!
//! [chains.11155111.registry]
//! version = "v1.0"
//! owner = "0x..."
//!
//! [[chains.11155111.strategies]]
//! name = "DonationVotingMerkleDistributionDirectTransferStrategy"
//! version = "v2.1"
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use alloy::primitives::{Address, U256};
use serde::Deserialize;

use crate::core::{chain::ChainConfig, version::DeploymentVersion};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml read error: {0}")]
    TomlRead(#[from] toml::de::Error),

    #[error("no configuration for chain {0}")]
    MissingChain(u64),
    #[error("no [{section}] configuration for chain {chain_id}")]
    MissingSection {
        chain_id: u64,
        section: &'static str,
    },
    #[error("strategy {name} is not configured for chain {chain_id}")]
    UnknownStrategy { chain_id: u64, name: String },
}

#[derive(Debug, Default, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    chains: BTreeMap<String, ChainTable>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChainTable {
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub common: CommonConfig,
    pub contract_factory: Option<ContractFactoryConfig>,
    pub registry: Option<RegistryConfig>,
    pub allo: Option<AlloConfig>,
    #[serde(default)]
    pub strategies: Vec<StrategyConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommonConfig {
    pub permit2: Option<Address>,
    pub proxy_admin_owner: Option<Address>,
}

#[derive(Debug, Deserialize)]
pub struct ContractFactoryConfig {
    pub version: DeploymentVersion,
    /// Accounts allowed to deploy through the factory besides its owner.
    #[serde(default)]
    pub deployers: Vec<Address>,
}

#[derive(Debug, Deserialize)]
pub struct RegistryConfig {
    pub version: DeploymentVersion,
    pub owner: Address,
}

#[derive(Debug, Deserialize)]
pub struct AlloConfig {
    pub version: DeploymentVersion,
    pub owner: Address,
    pub treasury: Address,
    pub percent_fee: U256,
    pub base_fee: U256,
}

#[derive(Debug, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    pub version: DeploymentVersion,
}

impl DeployConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Settings for a chain. Every deployment needs one, so a missing chain is an error.
    pub fn chain(&self, chain_id: u64) -> Result<ChainSettings<'_>, ConfigError> {
        let table = self
            .chains
            .get(&chain_id.to_string())
            .ok_or(ConfigError::MissingChain(chain_id))?;
        Ok(ChainSettings { chain_id, table })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ChainSettings<'a> {
    pub chain_id: u64,
    table: &'a ChainTable,
}

impl<'a> ChainSettings<'a> {
    pub fn common(&self) -> &'a CommonConfig {
        &self.table.common
    }

    pub fn chain_config(&self) -> ChainConfig {
        let mut config = ChainConfig::new(self.chain_id);
        if let Some(confirmations) = self.table.confirmations {
            config.confirmations = confirmations;
        }
        config
    }

    pub fn contract_factory(&self) -> Result<&'a ContractFactoryConfig, ConfigError> {
        self.table
            .contract_factory
            .as_ref()
            .ok_or(self.missing("contract_factory"))
    }

    pub fn registry(&self) -> Result<&'a RegistryConfig, ConfigError> {
        self.table.registry.as_ref().ok_or(self.missing("registry"))
    }

    pub fn allo(&self) -> Result<&'a AlloConfig, ConfigError> {
        self.table.allo.as_ref().ok_or(self.missing("allo"))
    }

    pub fn strategy(&self, name: &str) -> Result<&'a StrategyConfig, ConfigError> {
        self.table
            .strategies
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownStrategy {
                chain_id: self.chain_id,
                name: name.to_string(),
            })
    }

    fn missing(&self, section: &'static str) -> ConfigError {
        ConfigError::MissingSection {
            chain_id: self.chain_id,
            section,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    const CONFIG: &str = r#"
        [chains.11155111]
        confirmations = 2

        [chains.11155111.common]
        permit2 = "0x000000000022D473030F116dDEE9F6B43aC78BA3"
        proxy_admin_owner = "0x8C180840fcBb90CE8464B4eCd12ab0f840c6647C"

        [chains.11155111.registry]
        version = "v1.0"
        owner = "0x8C180840fcBb90CE8464B4eCd12ab0f840c6647C"

        [chains.11155111.allo]
        version = "v1.0"
        owner = "0x8C180840fcBb90CE8464B4eCd12ab0f840c6647C"
        treasury = "0x8C180840fcBb90CE8464B4eCd12ab0f840c6647C"
        percent_fee = "0"
        base_fee = "0"

        [[chains.11155111.strategies]]
        name = "DonationVotingMerkleDistributionDirectTransferStrategy"
        version = "v2.1"

        [chains.31337]
    "#;

    #[test]
    fn reads_chain_tables() {
        let config = DeployConfig::from_toml(CONFIG).unwrap();
        let sepolia = config.chain(11155111).unwrap();
        assert_eq!(sepolia.chain_config().confirmations, 2);
        assert_eq!(
            sepolia.common().permit2,
            Some(address!("000000000022D473030F116dDEE9F6B43aC78BA3"))
        );
        assert_eq!(sepolia.registry().unwrap().version.to_string(), "v1.0");
        assert_eq!(sepolia.allo().unwrap().percent_fee, U256::ZERO);
        let strategy = sepolia
            .strategy("DonationVotingMerkleDistributionDirectTransferStrategy")
            .unwrap();
        assert_eq!(strategy.version.to_string(), "v2.1");

        let local = config.chain(31337).unwrap();
        assert_eq!(local.chain_config().confirmations, 0);
        assert!(matches!(
            local.registry().unwrap_err(),
            ConfigError::MissingSection { chain_id: 31337, section: "registry" }
        ));
    }

    #[test]
    fn missing_chain_is_fatal() {
        let config = DeployConfig::from_toml(CONFIG).unwrap();
        assert!(matches!(
            config.chain(10).unwrap_err(),
            ConfigError::MissingChain(10)
        ));
        assert!(matches!(
            config.chain(11155111).unwrap().strategy("Nope").unwrap_err(),
            ConfigError::UnknownStrategy { .. }
        ));
    }

    #[test]
    fn malformed_versions_are_rejected() {
        let bad = r#"
            [chains.1.registry]
            version = "1.0"
            owner = "0x8C180840fcBb90CE8464B4eCd12ab0f840c6647C"
        "#;
        assert!(matches!(
            DeployConfig::from_toml(bad).unwrap_err(),
            ConfigError::TomlRead(_)
        ));
    }
}
