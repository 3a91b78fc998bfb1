// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Transparent upgradeable proxies.
//!
//! A proxy deployment is three contracts: the network's shared `ProxyAdmin`, the implementation,
//! and a `TransparentUpgradeableProxy` pointing at it. The implementation and proxy go through
//! the [`ContractDeployer`], so with the factory they get names derived from the target contract.
//! A ProxyAdmin whose constructor takes no owner is owned by its creator, so it is deployed from
//! the sender.

use std::path::PathBuf;

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::{Address, Bytes},
};

use crate::{
    core::{
        artifact::{ArtifactError, ArtifactStore, ContractArtifact},
        deployment::{
            ConstructorArgs, ContractDeployer, DeployRequest, DeployedContract, DeploymentError,
        },
    },
    utils::color::DebugColor,
};

pub use admin::{ProxyAdmin, ProxyAdminClient};
pub use manifest::{ManifestError, ProxyKind, UpgradeManifest, MANIFEST_DIR};

mod admin;
mod manifest;

pub const PROXY_ADMIN_ARTIFACT: &str = "ProxyAdmin";
pub const TRANSPARENT_PROXY_ARTIFACT: &str = "TransparentUpgradeableProxy";

const INITIALIZER: &str = "initialize";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("{0}")]
    Artifact(#[from] ArtifactError),
    #[error("{0}")]
    Deployment(#[from] DeploymentError),
    #[error("{0}")]
    Manifest(#[from] ManifestError),
    #[error("abi error: {0}")]
    Abi(#[from] alloy::dyn_abi::Error),

    #[error("{contract} has no initialize taking {args} arguments")]
    InitializerMismatch { contract: String, args: usize },
    #[error("{0} creates its own admin, use a proxy taking the ProxyAdmin address")]
    SelfAdministered(String),
}

/// A contract to put behind a fresh proxy.
#[derive(Clone, Debug)]
pub struct ProxyRequest {
    /// Artifact name of the implementation, e.g. `Registry`.
    pub contract_name: String,
    pub version: String,
    pub constructor_args: ConstructorArgs,
    /// Arguments to `initialize`, called through the proxy on creation.
    pub initializer_args: Vec<DynSolValue>,
    /// Owner of a newly deployed proxy admin. Defaults to the deploying account.
    pub admin_owner: Option<Address>,
}

impl ProxyRequest {
    pub fn new(contract_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            contract_name: contract_name.into(),
            version: version.into(),
            constructor_args: ConstructorArgs::default(),
            initializer_args: Vec::new(),
            admin_owner: None,
        }
    }

    pub fn with_initializer_args(mut self, args: Vec<DynSolValue>) -> Self {
        self.initializer_args = args;
        self
    }

    pub fn with_admin_owner(mut self, owner: Address) -> Self {
        self.admin_owner = Some(owner);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProxyDeployment {
    pub implementation: Address,
    pub proxy: Address,
    pub admin: Address,
    /// Account that should own `admin`, set only when this deployment created it.
    pub admin_owner: Option<Address>,
}

/// Encodes a call to the ABI's `initialize`, or nothing if there is no such function.
pub fn initializer_calldata(
    contract: &str,
    abi: &JsonAbi,
    args: &[DynSolValue],
) -> Result<Bytes, ProxyError> {
    let Some(overloads) = abi.function(INITIALIZER) else {
        if !args.is_empty() {
            warn!(@yellow, "{contract} has no initializer, ignoring {} arguments", args.len());
        }
        return Ok(Bytes::new());
    };
    let function = overloads
        .iter()
        .find(|f| f.inputs.len() == args.len())
        .ok_or_else(|| ProxyError::InitializerMismatch {
            contract: contract.to_string(),
            args: args.len(),
        })?;
    Ok(function.abi_encode_input(args)?.into())
}

/// Deploys contracts behind transparent proxies and tracks them in the upgrade manifest.
#[derive(Debug)]
pub struct ProxyAssembler<'a, D> {
    deployer: D,
    artifacts: &'a ArtifactStore,
    manifest_dir: PathBuf,
    chain_id: u64,
}

impl<'a, D: ContractDeployer> ProxyAssembler<'a, D> {
    pub fn new(
        deployer: D,
        artifacts: &'a ArtifactStore,
        manifest_dir: impl Into<PathBuf>,
        chain_id: u64,
    ) -> Self {
        Self {
            deployer,
            artifacts,
            manifest_dir: manifest_dir.into(),
            chain_id,
        }
    }

    /// Account the contracts are deployed from.
    pub fn sender(&self) -> Address {
        self.deployer.sender()
    }

    pub fn manifest(&self) -> Result<UpgradeManifest, ProxyError> {
        Ok(UpgradeManifest::open(&self.manifest_dir, self.chain_id)?)
    }

    pub async fn deploy(&self, request: &ProxyRequest) -> Result<ProxyDeployment, ProxyError> {
        let name = &request.contract_name;
        let artifact = self.artifacts.load(name)?;
        let init_data = initializer_calldata(name, &artifact.abi, &request.initializer_args)?;
        let proxy_artifact = self.artifacts.load(TRANSPARENT_PROXY_ARTIFACT)?;
        check_takes_admin(&proxy_artifact)?;
        let mut manifest = self.manifest()?;

        let (admin, admin_owner) = match manifest.admin() {
            Some(admin) => {
                debug!(@grey, "reusing proxy admin at address: {}", admin.debug_lavender());
                (admin, None)
            }
            None => {
                let (deployed, owner) = self.deploy_admin(request).await?;
                manifest.set_admin(deployed.address, Some(deployed.tx_hash));
                manifest.save()?;
                (deployed.address, Some(owner))
            }
        };

        let implementation = self.deploy_implementation(request).await?;

        let args = ConstructorArgs::new(vec![
            DynSolValue::Address(implementation.address),
            DynSolValue::Address(admin),
            DynSolValue::Bytes(init_data.to_vec()),
        ]);
        let proxy = self
            .deployer
            .deploy(&DeployRequest::new(
                format!("{name}Proxy"),
                &request.version,
                &proxy_artifact.bytecode,
                &args,
            ))
            .await?;

        manifest.add_proxy(proxy.address, Some(proxy.tx_hash), ProxyKind::Transparent);
        manifest.save()?;

        info!(@grey,
            "{name} proxy deployed at address: {}",
            proxy.address.debug_lavender()
        );
        Ok(ProxyDeployment {
            implementation: implementation.address,
            proxy: proxy.address,
            admin,
            admin_owner,
        })
    }

    /// Deploys a bare implementation, for upgrading an existing proxy.
    pub async fn deploy_implementation(
        &self,
        request: &ProxyRequest,
    ) -> Result<DeployedContract, ProxyError> {
        let artifact = self.artifacts.load(&request.contract_name)?;
        let deployed = self
            .deployer
            .deploy(&DeployRequest::new(
                &request.contract_name,
                &request.version,
                &artifact.bytecode,
                &request.constructor_args,
            ))
            .await?;
        info!(@grey,
            "{} implementation deployed at address: {}",
            request.contract_name,
            deployed.address.debug_lavender()
        );
        Ok(deployed)
    }

    /// Deploys a proxy admin and returns it with the account that should own it.
    async fn deploy_admin(
        &self,
        request: &ProxyRequest,
    ) -> Result<(DeployedContract, Address), ProxyError> {
        let artifact = self.artifacts.load(PROXY_ADMIN_ARTIFACT)?;
        let sender = self.deployer.sender();
        let owner = request.admin_owner.unwrap_or(sender);
        let deploy_request = |args: &ConstructorArgs| {
            DeployRequest::new(
                format!("{}ProxyAdmin", request.contract_name),
                &request.version,
                &artifact.bytecode,
                args,
            )
        };

        let (deployed, owner) = if takes_owner(&artifact) {
            let args = ConstructorArgs::new(vec![DynSolValue::Address(owner)]);
            (self.deployer.deploy(&deploy_request(&args)).await?, owner)
        } else {
            if owner != sender {
                warn!(@yellow,
                    "{PROXY_ADMIN_ARTIFACT} takes no owner, it will be owned by {} until ownership is transferred",
                    sender.debug_lavender()
                );
            }
            let args = ConstructorArgs::default();
            (self.deployer.deploy_from_sender(&deploy_request(&args)).await?, sender)
        };
        info!(@grey, "proxy admin deployed at address: {}", deployed.address.debug_lavender());
        Ok((deployed, owner))
    }
}

/// Newer ProxyAdmin versions take their owner in the constructor; older ones use `msg.sender`.
fn takes_owner(admin: &ContractArtifact) -> bool {
    admin
        .abi
        .constructor
        .as_ref()
        .is_some_and(|constructor| !constructor.inputs.is_empty())
}

/// Rejects proxies that deploy their own admin (`initialOwner`) instead of taking the shared one.
fn check_takes_admin(proxy: &ContractArtifact) -> Result<(), ProxyError> {
    let self_administered = proxy
        .abi
        .constructor
        .as_ref()
        .and_then(|constructor| constructor.inputs.get(1))
        .is_some_and(|param| param.name == "initialOwner");
    if self_administered {
        return Err(ProxyError::SelfAdministered(proxy.contract_name.clone()));
    }
    Ok(())
}
