// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Strategies are plain contracts deployed once per version. Their constructors take
//! `(allo, name)`, and strategies that pull tokens through Permit2 take its address third.

use alloy::{primitives::Address, providers::Provider};

use crate::{
    core::{
        artifact::{ArtifactStore, ContractArtifact},
        config::ChainSettings,
        deployment::{ConstructorArgs, ContractDeployer, DeployRequest, DeploymentError},
        identity::deployment_id,
        ledger::{strategy_ledger, Deployments, DeploymentRecord, LedgerStore},
    },
    error::{Error, Result},
    ops::DeployContext,
    utils::color::DebugColor,
};

/// Deploys the configured strategy `name` against the chain's Allo and records it in the
/// strategy's own ledger. Allo must already be recorded.
pub async fn deploy_strategy<P: Provider, S: LedgerStore>(
    ctx: &DeployContext<P, S>,
    settings: &ChainSettings<'_>,
    name: &str,
) -> Result<Address> {
    let config = settings.strategy(name)?;
    let allo = ctx.deployments.require_allo()?;
    let deployer = ctx.deployer()?;
    let (address, constructor_args) = install_strategy(
        &deployer,
        &ctx.artifacts,
        &ctx.deployments,
        name,
        &config.version.to_string(),
        allo,
        settings.common().permit2,
    )
    .await?;
    mintln!("{name} deployed at address: {}", address.debug_lavender());

    let validator = ctx.validator(name, address)?;
    validator.validate("getAllo", &[], &allo.to_string()).await?;
    ctx.verify(address, constructor_args).await;
    Ok(address)
}

/// Encodes the artifact's constructor arguments, returning them also as strings for
/// verification.
fn strategy_constructor_args(
    artifact: &ContractArtifact,
    name: &str,
    allo: Address,
    permit2: Option<Address>,
) -> Result<(ConstructorArgs, Vec<String>)> {
    let invalid = |n: usize| {
        DeploymentError::InvalidConstructor(format!(
            "{name} constructor takes {n} arguments, expected (allo, name) or (allo, name, permit2)"
        ))
    };
    let Some(constructor) = &artifact.abi.constructor else {
        return Err(invalid(0).into());
    };
    let mut values = vec![allo.to_string(), name.to_string()];
    match constructor.inputs.len() {
        2 => {}
        3 => {
            let permit2 = permit2.ok_or(Error::MissingSetting("permit2"))?;
            values.push(permit2.to_string());
        }
        n => return Err(invalid(n).into()),
    }
    let args = ConstructorArgs::for_constructor(constructor, &values)?;
    Ok((args, values))
}

pub(crate) async fn install_strategy<D: ContractDeployer, S: LedgerStore>(
    deployer: &D,
    artifacts: &ArtifactStore,
    deployments: &Deployments<S>,
    name: &str,
    version: &str,
    allo: Address,
    permit2: Option<Address>,
) -> Result<(Address, Vec<String>)> {
    let artifact = artifacts.load(name)?;
    let (args, values) = strategy_constructor_args(&artifact, name, allo, permit2)?;
    let deployed = deployer
        .deploy(&DeployRequest::new(name, version, &artifact.bytecode, &args))
        .await?;

    let record = DeploymentRecord::new(name, version)
        .with_address(deployed.address)
        .with_deployer(deployer.sender())
        .with_id(deployment_id(name, version));
    deployments.put(&strategy_ledger(name), record)?;
    Ok((deployed.address, values))
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, U256};

    use super::*;
    use crate::{
        core::ledger::MemoryStore,
        test_utils::{write_artifact, RecordingDeployer, SENDER},
    };

    const ALLO: Address = address!("1133eA7Af70876e64665ecD07C0A0476d09465a1");

    const QV_ABI: &str = r#"[{"type":"constructor","stateMutability":"nonpayable","inputs":[
        {"name":"_allo","type":"address","internalType":"address"},
        {"name":"_name","type":"string","internalType":"string"}]}]"#;

    const PERMIT2_ABI: &str = r#"[{"type":"constructor","stateMutability":"nonpayable","inputs":[
        {"name":"_allo","type":"address","internalType":"address"},
        {"name":"_name","type":"string","internalType":"string"},
        {"name":"_permit2","type":"address","internalType":"contract ISignatureTransfer"}]}]"#;

    #[tokio::test]
    async fn strategy_gets_its_own_ledger_and_id() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "QVSimpleStrategy", QV_ABI, "0x6080");
        let artifacts = ArtifactStore::new(dir.path());
        let deployer = RecordingDeployer::new();
        let deployments = Deployments::new(MemoryStore::new(), 324);

        let (address, values) = install_strategy(
            &deployer,
            &artifacts,
            &deployments,
            "QVSimpleStrategy",
            "v1.0",
            ALLO,
            None,
        )
        .await
        .unwrap();

        let record = deployments.get("qvsimplestrategy").unwrap().unwrap();
        assert_eq!(record.field("address"), address.to_string());
        assert_eq!(record.field("deployerAddress"), SENDER.to_string());
        assert_eq!(
            record.field("id"),
            deployment_id("QVSimpleStrategy", "v1.0").to_string()
        );
        assert_eq!(values, [ALLO.to_string(), "QVSimpleStrategy".to_string()]);

        let requests = deployer.requests.borrow();
        assert_eq!(requests[0].tag(), "QVSimpleStrategyv1.0");
        // two bytes of code, then the allo address left-padded to a word
        assert_eq!(&requests[0].creation_code[14..34], ALLO.as_slice());
    }

    #[tokio::test]
    async fn permit2_is_passed_third_when_the_constructor_takes_it() {
        let dir = tempfile::tempdir().unwrap();
        let name = "DonationVotingMerkleDistributionDirectTransferStrategy";
        write_artifact(dir.path(), name, PERMIT2_ABI, "0x6080");
        let artifacts = ArtifactStore::new(dir.path());
        let deployer = RecordingDeployer::new();
        let deployments = Deployments::new(MemoryStore::new(), 10);
        let permit2 = address!("000000000022D473030F116dDEE9F6B43aC78BA3");

        let (_, values) = install_strategy(
            &deployer,
            &artifacts,
            &deployments,
            name,
            "v2.1",
            ALLO,
            Some(permit2),
        )
        .await
        .unwrap();
        assert_eq!(values[2], permit2.to_string());

        // head: allo, offset of name, permit2
        let requests = deployer.requests.borrow();
        let encoded = &requests[0].creation_code[2..];
        assert_eq!(&encoded[12..32], ALLO.as_slice());
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(96));
        assert_eq!(&encoded[76..96], permit2.as_slice());
    }

    #[tokio::test]
    async fn permit2_strategy_needs_permit2_configured() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "DirectGrantsLiteStrategy", PERMIT2_ABI, "0x6080");
        let artifacts = ArtifactStore::new(dir.path());
        let deployer = RecordingDeployer::new();
        let deployments = Deployments::new(MemoryStore::new(), 10);

        let err = install_strategy(
            &deployer,
            &artifacts,
            &deployments,
            "DirectGrantsLiteStrategy",
            "v1.0",
            ALLO,
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::MissingSetting("permit2")));
        assert!(deployer.names().is_empty());
    }
}
