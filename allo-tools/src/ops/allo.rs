// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use alloy::{dyn_abi::DynSolValue, primitives::Address, providers::Provider};

use crate::{
    core::{
        config::{AlloConfig, ChainSettings},
        deployment::ContractDeployer,
        ledger::{self, Deployments, DeploymentRecord, LedgerStore},
        proxy::{ProxyAssembler, ProxyDeployment, ProxyRequest},
    },
    error::Result,
    ops::DeployContext,
    utils::color::DebugColor,
};

pub const ALLO_CONTRACT: &str = "Allo";

/// Deploys Allo behind a proxy, wired to the chain's Registry, and records it in the `allo`
/// ledger. The Registry must already be recorded.
pub async fn deploy_allo<P: Provider, S: LedgerStore>(
    ctx: &DeployContext<P, S>,
    settings: &ChainSettings<'_>,
) -> Result<ProxyDeployment> {
    let config = settings.allo()?;
    let registry = ctx.deployments.require_registry()?;
    let deployer = ctx.deployer()?;
    let admin_owner = settings.common().proxy_admin_owner;
    let deployed = install_allo(
        &ctx.assembler(&deployer),
        &ctx.deployments,
        config,
        registry,
        admin_owner,
    )
    .await?;
    ctx.check_new_admin(&deployed).await?;
    mintln!("Allo proxy deployed at address: {}", deployed.proxy.debug_lavender());

    let validator = ctx.validator(ALLO_CONTRACT, deployed.proxy)?;
    let expectations = [
        ("owner", config.owner.to_string()),
        ("getRegistry", registry.to_string()),
        ("getTreasury", config.treasury.to_string()),
        ("getPercentFee", config.percent_fee.to_string()),
        ("getBaseFee", config.base_fee.to_string()),
    ];
    for (function, expected) in &expectations {
        validator.validate(function, &[], expected).await?;
    }
    ctx.verify(deployed.implementation, Vec::new()).await;
    Ok(deployed)
}

pub(crate) async fn install_allo<D: ContractDeployer, S: LedgerStore>(
    assembler: &ProxyAssembler<'_, D>,
    deployments: &Deployments<S>,
    config: &AlloConfig,
    registry: Address,
    admin_owner: Option<Address>,
) -> Result<ProxyDeployment> {
    let version = config.version.to_string();
    let mut request = ProxyRequest::new(ALLO_CONTRACT, &version).with_initializer_args(vec![
        DynSolValue::Address(config.owner),
        DynSolValue::Address(registry),
        DynSolValue::Address(config.treasury),
        DynSolValue::Uint(config.percent_fee, 256),
        DynSolValue::Uint(config.base_fee, 256),
    ]);
    if let Some(owner) = admin_owner {
        request = request.with_admin_owner(owner);
    }
    let deployed = assembler.deploy(&request).await?;

    let record = DeploymentRecord::new(ALLO_CONTRACT, version)
        .with_proxy(deployed.proxy, deployed.implementation)
        .with_deployer(assembler.sender())
        .with_field("owner", config.owner.to_string())
        .with_field("registry", registry.to_string())
        .with_field("treasury", config.treasury.to_string())
        .with_field("percentFee", config.percent_fee.to_string())
        .with_field("baseFee", config.base_fee.to_string())
        .with_field("proxyAdmin", deployed.admin.to_string());
    deployments.put(ledger::ALLO, record)?;
    Ok(deployed)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, U256};

    use super::*;
    use crate::{
        core::{
            ledger::{LedgerError, MemoryStore},
            proxy::MANIFEST_DIR,
        },
        error::Error,
        test_utils::{proxy_artifacts, write_artifact, RecordingDeployer},
    };

    const ALLO_ABI: &str = r#"[{"type":"function","name":"initialize","stateMutability":"nonpayable",
        "outputs":[],"inputs":[
            {"name":"_owner","type":"address"},
            {"name":"_registry","type":"address"},
            {"name":"_treasury","type":"address"},
            {"name":"_percentFee","type":"uint256"},
            {"name":"_baseFee","type":"uint256"}]}]"#;

    fn config() -> AlloConfig {
        AlloConfig {
            version: "v1.0".parse().unwrap(),
            owner: address!("00000000000000000000000000000000000000ee"),
            treasury: address!("00000000000000000000000000000000000000dd"),
            percent_fee: U256::from(10u64.pow(16)),
            base_fee: U256::ZERO,
        }
    }

    #[tokio::test]
    async fn allo_records_fees_and_registry() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), ALLO_CONTRACT, ALLO_ABI, "0xcc");
        let artifacts = proxy_artifacts(dir.path());
        let deployer = RecordingDeployer::new();
        let assembler =
            ProxyAssembler::new(&deployer, &artifacts, dir.path().join(MANIFEST_DIR), 10);
        let deployments = Deployments::new(MemoryStore::new(), 10);
        let registry = address!("000000000000000000000000000000000000abcd");

        let deployed = install_allo(&assembler, &deployments, &config(), registry, None)
            .await
            .unwrap();

        let record = deployments.get(ledger::ALLO).unwrap().unwrap();
        assert_eq!(record.field("proxy"), deployed.proxy.to_string());
        assert_eq!(record.field("registry"), registry.to_string());
        assert_eq!(record.field("percentFee"), "10000000000000000");
        assert_eq!(record.field("baseFee"), "0");
        assert_eq!(deployments.allo(), deployed.proxy.to_string());

        // selector + five words of initializer data behind the proxy's own three head words
        let requests = deployer.requests.borrow();
        let proxy_args = &requests[2].creation_code[1..];
        assert_eq!(proxy_args.len(), 32 * 4 + 4 + 32 * 5 + 28);
    }

    #[test]
    fn allo_needs_a_registry() {
        let deployments = Deployments::new(MemoryStore::new(), 10);
        let err: Error = deployments.require_registry().unwrap_err().into();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::MissingDependency { field: "proxy", .. })
        ));
    }
}
