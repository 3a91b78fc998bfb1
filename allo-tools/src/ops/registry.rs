// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{keccak256, Address, B256},
    providers::Provider,
};

use crate::{
    core::{
        config::{ChainSettings, RegistryConfig},
        deployment::ContractDeployer,
        ledger::{self, Deployments, DeploymentRecord, LedgerStore},
        proxy::{ProxyAssembler, ProxyDeployment, ProxyRequest},
    },
    error::Result,
    ops::DeployContext,
    utils::color::DebugColor,
};

pub const REGISTRY_CONTRACT: &str = "Registry";

/// Role the Registry grants its owner on initialization.
pub fn allo_owner_role() -> B256 {
    keccak256("ALLO_OWNER")
}

/// Deploys the Registry behind a proxy and records it in the `registry` ledger.
pub async fn deploy_registry<P: Provider, S: LedgerStore>(
    ctx: &DeployContext<P, S>,
    settings: &ChainSettings<'_>,
) -> Result<ProxyDeployment> {
    let config = settings.registry()?;
    let deployer = ctx.deployer()?;
    let admin_owner = settings.common().proxy_admin_owner;
    let deployed =
        install_registry(&ctx.assembler(&deployer), &ctx.deployments, config, admin_owner).await?;
    ctx.check_new_admin(&deployed).await?;
    mintln!("Registry proxy deployed at address: {}", deployed.proxy.debug_lavender());

    let validator = ctx.validator(REGISTRY_CONTRACT, deployed.proxy)?;
    validator
        .validate(
            "hasRole",
            &[
                DynSolValue::FixedBytes(allo_owner_role(), 32),
                DynSolValue::Address(config.owner),
            ],
            "true",
        )
        .await?;
    ctx.verify(deployed.implementation, Vec::new()).await;
    Ok(deployed)
}

pub(crate) async fn install_registry<D: ContractDeployer, S: LedgerStore>(
    assembler: &ProxyAssembler<'_, D>,
    deployments: &Deployments<S>,
    config: &RegistryConfig,
    admin_owner: Option<Address>,
) -> Result<ProxyDeployment> {
    let version = config.version.to_string();
    let mut request = ProxyRequest::new(REGISTRY_CONTRACT, &version)
        .with_initializer_args(vec![DynSolValue::Address(config.owner)]);
    if let Some(owner) = admin_owner {
        request = request.with_admin_owner(owner);
    }
    let deployed = assembler.deploy(&request).await?;

    let record = DeploymentRecord::new(REGISTRY_CONTRACT, version)
        .with_proxy(deployed.proxy, deployed.implementation)
        .with_deployer(assembler.sender())
        .with_field("owner", config.owner.to_string())
        .with_field("proxyAdmin", deployed.admin.to_string());
    deployments.put(ledger::REGISTRY, record)?;
    Ok(deployed)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;
    use crate::{
        core::{ledger::MemoryStore, proxy::MANIFEST_DIR},
        test_utils::{proxy_artifacts, write_artifact, RecordingDeployer, SENDER},
    };

    #[tokio::test]
    async fn registry_is_recorded_by_proxy() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(
            dir.path(),
            REGISTRY_CONTRACT,
            r#"[{"type":"function","name":"initialize","stateMutability":"nonpayable",
                "outputs":[],"inputs":[{"name":"_owner","type":"address"}]}]"#,
            "0xcc",
        );
        let artifacts = proxy_artifacts(dir.path());
        let deployer = RecordingDeployer::new();
        let assembler =
            ProxyAssembler::new(&deployer, &artifacts, dir.path().join(MANIFEST_DIR), 5);
        let deployments = Deployments::new(MemoryStore::new(), 5);
        let owner = address!("00000000000000000000000000000000000000ee");
        let config = RegistryConfig {
            version: "v1.0".parse().unwrap(),
            owner,
        };

        let deployed = install_registry(&assembler, &deployments, &config, Some(owner))
            .await
            .unwrap();

        let record = deployments.get(ledger::REGISTRY).unwrap().unwrap();
        assert_eq!(record.field("proxy"), deployed.proxy.to_string());
        assert_eq!(record.field("implementation"), deployed.implementation.to_string());
        assert_eq!(record.field("deployerAddress"), SENDER.to_string());
        assert_eq!(record.field("owner"), owner.to_string());
        assert_eq!(record.field("proxyAdmin"), Address::with_last_byte(1).to_string());
        assert_eq!(deployments.registry(), deployed.proxy.to_string());
        // the ProxyAdmin artifact takes no owner, so the sender keeps it
        assert_eq!(deployed.admin_owner, Some(SENDER));
        assert_eq!(*deployer.from_sender.borrow(), ["RegistryProxyAdmin"]);
    }
}
