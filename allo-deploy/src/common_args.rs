// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use std::{fs, path::PathBuf, time::Duration};

use alloy::{
    network::EthereumWallet,
    primitives::FixedBytes,
    providers::{Provider, ProviderBuilder, WalletProvider},
    signers::{
        local::{LocalSigner, PrivateKeySigner},
        Signer,
    },
};
use allo_tools::{
    core::{
        artifact::ArtifactStore,
        config::DeployConfig,
        deployment::{DeployMode, GasOverrides, TxSettings},
        ledger::{Deployments, FileStore},
        proxy::MANIFEST_DIR,
        validation::ValidationMode,
    },
    ops::{DeployContext, VerifyOptions},
};
use eyre::{eyre, Context};

use crate::{
    constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIG, DEFAULT_DEPLOYMENTS_DIR, DEFAULT_ENDPOINT},
    utils::{convert_gwei_to_wei, decode0x},
};

#[derive(Debug, clap::Args)]
pub struct AuthArgs {
    /// File path to a text file containing a hex-encoded private key
    #[arg(long)]
    private_key_path: Option<PathBuf>,
    /// Private key as a hex string. Warning: this exposes your key to shell history
    #[arg(long)]
    private_key: Option<String>,
    /// Path to an Ethereum wallet keystore file (e.g. clef)
    #[arg(long)]
    keystore_path: Option<String>,
    /// Keystore password file
    #[arg(long)]
    keystore_password_path: Option<PathBuf>,
}

impl AuthArgs {
    fn build_signer(&self, chain_id: u64) -> eyre::Result<PrivateKeySigner> {
        if let Some(key) = &self.private_key {
            if key.is_empty() {
                return Err(eyre!("empty private key"));
            }
            return signer_from_hex(key, chain_id);
        }

        if let Some(file) = &self.private_key_path {
            let key = fs::read_to_string(file).wrap_err("could not open private key file")?;
            return signer_from_hex(&key, chain_id);
        }

        let keystore = self.keystore_path.as_ref().ok_or(eyre!("no keystore"))?;
        let password = self
            .keystore_password_path
            .as_ref()
            .map(fs::read_to_string)
            .unwrap_or(Ok("".into()))?;

        let signer =
            LocalSigner::decrypt_keystore(keystore, password.trim())?.with_chain_id(Some(chain_id));
        Ok(signer)
    }

    fn build_wallet(&self, chain_id: u64) -> eyre::Result<EthereumWallet> {
        Ok(EthereumWallet::new(self.build_signer(chain_id)?))
    }
}

fn signer_from_hex(key: &str, chain_id: u64) -> eyre::Result<PrivateKeySigner> {
    let key = decode0x(key)?;
    if key.len() != 32 {
        return Err(eyre!("private key must be 32 bytes, got {}", key.len()));
    }
    let priv_key_bytes: FixedBytes<32> = FixedBytes::from_slice(&key);
    Ok(PrivateKeySigner::from_bytes(&priv_key_bytes)?.with_chain_id(Some(chain_id)))
}

#[derive(Debug, clap::Args)]
pub struct GasArgs {
    /// Optional max fee per gas in gwei units.
    #[arg(long)]
    max_fee_per_gas_gwei: Option<String>,
    /// Optional max priority fee per gas in gwei units.
    #[arg(long)]
    max_priority_fee_per_gas_gwei: Option<String>,
    /// Start from the node's EIP-1559 fee estimate.
    #[arg(long)]
    estimate_fees: bool,
}

impl GasArgs {
    pub fn overrides(&self) -> eyre::Result<GasOverrides> {
        let to_wei = |gwei: &Option<String>| gwei.as_deref().map(convert_gwei_to_wei).transpose();
        Ok(GasOverrides {
            max_fee_per_gas_wei: to_wei(&self.max_fee_per_gas_gwei)?,
            max_priority_fee_per_gas_wei: to_wei(&self.max_priority_fee_per_gas_gwei)?,
            estimate_fees: self.estimate_fees,
        })
    }
}

#[derive(Debug, clap::Args)]
pub struct ProviderArgs {
    /// RPC endpoint
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

impl ProviderArgs {
    pub async fn build_provider(&self) -> eyre::Result<impl Provider> {
        let provider = ProviderBuilder::new().connect(&self.endpoint).await?;
        Ok(provider)
    }

    pub async fn build_provider_with_wallet(
        &self,
        auth: &AuthArgs,
    ) -> eyre::Result<impl Provider + WalletProvider> {
        let provider = self.build_provider().await?;
        let chain_id = provider.get_chain_id().await?;
        let wallet = auth.build_wallet(chain_id)?;
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect(&self.endpoint)
            .await?;
        Ok(provider)
    }
}

#[derive(Debug, clap::Args)]
pub struct LedgerArgs {
    /// Directory holding the deployment ledgers
    #[arg(long, default_value = DEFAULT_DEPLOYMENTS_DIR)]
    pub deployments: PathBuf,
}

impl LedgerArgs {
    pub fn store(&self) -> FileStore {
        FileStore::new(&self.deployments)
    }
}

#[derive(Debug, clap::Args)]
pub struct ProjectArgs {
    /// Per-chain deployment configuration
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,
    /// Directory of compiled contract artifacts (Hardhat or Foundry)
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    artifacts: PathBuf,
    /// Directory holding the upgrade manifests
    #[arg(long, default_value = MANIFEST_DIR)]
    manifests: PathBuf,
    #[command(flatten)]
    ledger: LedgerArgs,
}

impl ProjectArgs {
    pub fn config(&self) -> eyre::Result<DeployConfig> {
        DeployConfig::load(&self.config)
            .wrap_err_with(|| format!("could not load {}", self.config.display()))
    }
}

#[derive(Debug, clap::Args)]
pub struct DeployArgs {
    /// How contracts are deployed: through the ContractFactory or directly
    #[arg(long, default_value_t = DeployMode::Factory)]
    mode: DeployMode,
    /// Whether failed post-deploy checks abort the command: advisory or strict
    #[arg(long, default_value_t = ValidationMode::Advisory)]
    validation: ValidationMode,
    /// Blocks to wait for after each transaction, overriding the configuration
    #[arg(long)]
    confirmations: Option<u64>,
    /// Give up waiting for a transaction receipt after this many seconds
    #[arg(long)]
    receipt_timeout_secs: Option<u64>,
    /// Verify new contracts on this network's block explorer
    #[arg(long)]
    verify_network: Option<String>,
    /// Seconds to wait before verifying
    #[arg(long, default_value = "10")]
    verify_delay_secs: u64,
}

/// Everything a deploying command needs.
#[derive(Debug, clap::Args)]
pub struct DeployEnvArgs {
    #[command(flatten)]
    auth: AuthArgs,
    #[command(flatten)]
    provider: ProviderArgs,
    #[command(flatten)]
    gas: GasArgs,
    #[command(flatten)]
    project: ProjectArgs,
    #[command(flatten)]
    deploy: DeployArgs,
}

impl DeployEnvArgs {
    /// Connects to the chain and loads its configuration.
    ///
    /// Fails if the configuration has no table for the connected chain.
    pub async fn connect(&self) -> eyre::Result<(DeployContext<impl Provider>, DeployConfig)> {
        let provider = self
            .provider
            .build_provider_with_wallet(&self.auth)
            .await?;
        let chain_id = provider.get_chain_id().await?;
        let sender = provider.default_signer_address();
        let config = self.project.config()?;

        let mut chain = config.chain(chain_id)?.chain_config();
        if let Some(confirmations) = self.deploy.confirmations {
            chain.confirmations = confirmations;
        }
        chain.receipt_timeout = self.deploy.receipt_timeout_secs.map(Duration::from_secs);
        let mut tx = TxSettings::new(chain);
        tx.gas = self.gas.overrides()?;

        let verify = self.deploy.verify_network.as_ref().map(|network| VerifyOptions {
            network: network.clone(),
            delay: Duration::from_secs(self.deploy.verify_delay_secs),
        });

        let ctx = DeployContext {
            provider,
            sender,
            deployments: Deployments::new(self.project.ledger.store(), chain_id),
            artifacts: ArtifactStore::new(&self.project.artifacts),
            manifest_dir: self.project.manifests.clone(),
            mode: self.deploy.mode,
            tx,
            validation: self.deploy.validation,
            verify,
        };
        Ok((ctx, config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use alloy::primitives::address;

    use super::*;

    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn signer_from_key_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{ANVIL_KEY}").unwrap();
        let auth = AuthArgs {
            private_key_path: Some(file.path().to_path_buf()),
            private_key: None,
            keystore_path: None,
            keystore_password_path: None,
        };

        let signer = auth.build_signer(31337).unwrap();
        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert_eq!(signer.chain_id(), Some(31337));
    }

    #[test]
    fn short_keys_are_rejected() {
        assert!(signer_from_hex("0x1234", 1).is_err());
    }

    #[test]
    fn gas_overrides_are_in_wei() {
        let gas = GasArgs {
            max_fee_per_gas_gwei: Some("2".to_string()),
            max_priority_fee_per_gas_gwei: None,
            estimate_fees: true,
        };
        let overrides = gas.overrides().unwrap();
        assert_eq!(overrides.max_fee_per_gas_wei, Some(2_000_000_000));
        assert_eq!(overrides.max_priority_fee_per_gas_wei, None);
        assert!(overrides.estimate_fees);
    }
}
