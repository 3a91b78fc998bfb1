// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! ContractFactory deployment and administration.

use alloy::{dyn_abi::DynSolValue, primitives::Address, providers::Provider};

use crate::{
    core::{
        config::ChainSettings,
        deployment::{ConstructorArgs, ContractDeployer, DeployRequest},
        ledger::{self, DeploymentRecord, LedgerStore},
    },
    error::Result,
    ops::DeployContext,
    utils::color::DebugColor,
};

pub const CONTRACT_FACTORY_CONTRACT: &str = "ContractFactory";

/// Deploys the ContractFactory straight from the signer and authorizes the configured deployers.
pub async fn deploy_contract_factory<P: Provider, S: LedgerStore>(
    ctx: &DeployContext<P, S>,
    settings: &ChainSettings<'_>,
) -> Result<Address> {
    let config = settings.contract_factory()?;
    let version = config.version.to_string();
    let artifact = ctx.artifacts.load(CONTRACT_FACTORY_CONTRACT)?;

    let request = DeployRequest::new(
        CONTRACT_FACTORY_CONTRACT,
        &version,
        &artifact.bytecode,
        &ConstructorArgs::default(),
    );
    let deployed = ctx.direct().deploy(&request).await?;

    let record = DeploymentRecord::new(CONTRACT_FACTORY_CONTRACT, version)
        .with_address(deployed.address)
        .with_deployer(ctx.sender);
    ctx.deployments.put(ledger::CONTRACT_FACTORY, record)?;
    mintln!(
        "ContractFactory deployed at address: {}",
        deployed.address.debug_lavender()
    );

    let factory = ctx.factory(deployed.address);
    for &deployer in &config.deployers {
        factory.set_deployer(deployer, true).await?;
        info!(@grey, "authorized deployer: {}", deployer.debug_lavender());
    }

    let validator = ctx.validator(CONTRACT_FACTORY_CONTRACT, deployed.address)?;
    validator
        .validate("isDeployer", &[DynSolValue::Address(ctx.sender)], "true")
        .await?;
    ctx.verify(deployed.address, Vec::new()).await;
    Ok(deployed.address)
}

/// Allows `account` to deploy through the chain's ContractFactory.
pub async fn add_factory_deployer<P: Provider, S: LedgerStore>(
    ctx: &DeployContext<P, S>,
    account: Address,
) -> Result<()> {
    let address = ctx.deployments.require_contract_factory()?;
    let factory = ctx.factory(address);
    if factory.is_deployer(account).await? {
        greyln!("{} can already deploy through the factory", account.debug_lavender());
        return Ok(());
    }
    factory.set_deployer(account, true).await?;
    mintln!("authorized deployer: {}", account.debug_lavender());

    let validator = ctx.validator(CONTRACT_FACTORY_CONTRACT, address)?;
    validator
        .validate("isDeployer", &[DynSolValue::Address(account)], "true")
        .await?;
    Ok(())
}
