// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use std::{path::PathBuf, time::Duration};

use alloy::{primitives::Address, providers::Provider};

use crate::{
    core::{
        artifact::ArtifactStore,
        deployment::{
            ContractDeployer, DeployMode, DeployRequest, DeployedContract, DeploymentError,
            DirectDeployer, FactoryClient, TxSettings,
        },
        ledger::{Deployments, FileStore, LedgerStore},
        proxy::{ProxyAdminClient, ProxyAssembler, ProxyDeployment, UpgradeManifest},
        validation::{AbiContract, ValidationMode, Validator},
    },
    error::{Error, Result},
    verifier::{Verifier, DEFAULT_VERIFY_DELAY},
};

/// Block-explorer verification settings.
#[derive(Clone, Debug)]
pub struct VerifyOptions {
    /// Network name passed to the verification command.
    pub network: String,
    pub delay: Duration,
}

impl VerifyOptions {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            delay: DEFAULT_VERIFY_DELAY,
        }
    }
}

/// Everything an operation needs to talk to one chain.
#[derive(Debug)]
pub struct DeployContext<P, S = FileStore> {
    pub provider: P,
    pub sender: Address,
    pub deployments: Deployments<S>,
    pub artifacts: ArtifactStore,
    /// Directory holding the upgrade manifests.
    pub manifest_dir: PathBuf,
    pub mode: DeployMode,
    pub tx: TxSettings,
    pub validation: ValidationMode,
    /// Verify new contracts on a block explorer when set.
    pub verify: Option<VerifyOptions>,
}

impl<P: Provider, S: LedgerStore> DeployContext<P, S> {
    pub fn chain_id(&self) -> u64 {
        self.deployments.chain_id()
    }

    /// Deployer for everything but the factory itself, according to the deploy mode.
    pub fn deployer(&self) -> Result<Deployer<&P>> {
        Ok(match self.mode {
            DeployMode::Factory => {
                let factory = self.deployments.require_contract_factory()?;
                Deployer::Factory(self.factory(factory))
            }
            DeployMode::Direct => Deployer::Direct(self.direct()),
        })
    }

    pub fn factory(&self, address: Address) -> FactoryClient<&P> {
        FactoryClient::new(address, &self.provider, self.sender, self.tx.clone())
    }

    pub fn direct(&self) -> DirectDeployer<&P> {
        DirectDeployer::new(&self.provider, self.sender, self.tx.clone())
    }

    pub fn assembler<D: ContractDeployer>(&self, deployer: D) -> ProxyAssembler<'_, D> {
        ProxyAssembler::new(deployer, &self.artifacts, &self.manifest_dir, self.chain_id())
    }

    pub fn manifest(&self) -> Result<UpgradeManifest> {
        Ok(UpgradeManifest::open(&self.manifest_dir, self.chain_id())?)
    }

    /// The network's proxy admin, as recorded in the upgrade manifest.
    pub fn proxy_admin(&self) -> Result<ProxyAdminClient<&P>> {
        let address = self
            .manifest()?
            .admin()
            .ok_or(Error::NoProxyAdmin(self.chain_id()))?;
        Ok(self.proxy_admin_at(address))
    }

    fn proxy_admin_at(&self, address: Address) -> ProxyAdminClient<&P> {
        ProxyAdminClient::new(address, &self.provider, self.sender, self.tx.clone())
    }

    /// Fails if a proxy admin created by `deployed` is not owned by the account it was meant for.
    pub async fn check_new_admin(&self, deployed: &ProxyDeployment) -> Result<()> {
        let Some(expected) = deployed.admin_owner else {
            return Ok(());
        };
        let owner = self.proxy_admin_at(deployed.admin).owner().await?;
        if owner != expected {
            return Err(Error::AdminOwnerMismatch {
                admin: deployed.admin,
                expected,
                owner,
            });
        }
        Ok(())
    }

    /// Validator for `contract` (an artifact name) deployed at `address`.
    pub fn validator(
        &self,
        contract: &str,
        address: Address,
    ) -> Result<Validator<AbiContract<&P>>> {
        let artifact = self.artifacts.load(contract)?;
        let caller = AbiContract::new(address, &self.provider, artifact.abi);
        Ok(Validator::new(contract, caller, self.validation))
    }

    /// Verifies a new contract if verification is enabled. Never fails.
    pub async fn verify(&self, address: Address, constructor_args: Vec<String>) {
        let Some(options) = &self.verify else {
            return;
        };
        Verifier::builder()
            .network(options.network.clone())
            .address(address)
            .constructor_args(constructor_args)
            .delay(options.delay)
            .build()
            .verify()
            .await;
    }
}

/// The deployer picked by [`DeployMode`].
#[derive(Debug)]
pub enum Deployer<P> {
    Factory(FactoryClient<P>),
    Direct(DirectDeployer<P>),
}

impl<P: Provider> ContractDeployer for Deployer<P> {
    fn sender(&self) -> Address {
        match self {
            Self::Factory(factory) => factory.sender(),
            Self::Direct(direct) => direct.sender(),
        }
    }

    async fn deploy(&self, request: &DeployRequest) -> Result<DeployedContract, DeploymentError> {
        match self {
            Self::Factory(factory) => factory.deploy(request).await,
            Self::Direct(direct) => direct.deploy(request).await,
        }
    }

    async fn deploy_from_sender(
        &self,
        request: &DeployRequest,
    ) -> Result<DeployedContract, DeploymentError> {
        match self {
            Self::Factory(factory) => factory.deploy_from_sender(request).await,
            Self::Direct(direct) => direct.deploy(request).await,
        }
    }
}
