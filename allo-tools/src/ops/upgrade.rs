// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use std::{fmt, str::FromStr};

use alloy::{
    primitives::{Address, Bytes},
    providers::Provider,
};

use crate::{
    core::{
        config::ChainSettings,
        ledger::{self, DeploymentRecord, LedgerStore},
        proxy::ProxyRequest,
        validation::ValidationMode,
        version::DeploymentVersion,
    },
    error::{Error, Result},
    ops::{allo::ALLO_CONTRACT, registry::REGISTRY_CONTRACT, DeployContext},
    utils::color::DebugColor,
};

/// A proxied contract that can be upgraded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeTarget {
    Registry,
    Allo,
}

impl UpgradeTarget {
    pub fn contract(&self) -> &'static str {
        match self {
            Self::Registry => REGISTRY_CONTRACT,
            Self::Allo => ALLO_CONTRACT,
        }
    }

    pub fn ledger(&self) -> &'static str {
        match self {
            Self::Registry => ledger::REGISTRY,
            Self::Allo => ledger::ALLO,
        }
    }

    fn configured_version(&self, settings: &ChainSettings<'_>) -> Result<DeploymentVersion> {
        Ok(match self {
            Self::Registry => settings.registry()?.version,
            Self::Allo => settings.allo()?.version,
        })
    }
}

impl FromStr for UpgradeTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "registry" => Ok(Self::Registry),
            "allo" => Ok(Self::Allo),
            _ => Err(Error::UnknownTarget(s.to_string())),
        }
    }
}

impl fmt::Display for UpgradeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ledger())
    }
}

/// Deploys a new implementation of `target` and points its proxy at it.
///
/// The implementation is deployed as `version`, or the configured version if not given. Either
/// must differ from the version in the ledger. The ledger record keeps its proxy address and
/// gets the new implementation and version.
pub async fn upgrade<P: Provider, S: LedgerStore>(
    ctx: &DeployContext<P, S>,
    settings: &ChainSettings<'_>,
    target: UpgradeTarget,
    version: Option<DeploymentVersion>,
) -> Result<Address> {
    let proxy = ctx.deployments.require(target.ledger(), "proxy")?;
    let version = match version {
        Some(version) => version,
        None => target.configured_version(settings)?,
    };
    check_new_version(target, &ctx.deployments.lookup(target.ledger(), "version"), &version)?;
    let admin = ctx.proxy_admin()?;

    let deployer = ctx.deployer()?;
    let request = ProxyRequest::new(target.contract(), version.to_string());
    let implementation = ctx
        .assembler(&deployer)
        .deploy_implementation(&request)
        .await?
        .address;

    admin.upgrade(proxy, implementation, Bytes::new()).await?;
    ctx.deployments.update(target.ledger(), |record| {
        record_upgrade(record, implementation, &version)
    })?;
    mintln!(
        "{} proxy {} now points at {}",
        target.contract(),
        proxy.debug_lavender(),
        implementation.debug_lavender()
    );

    let current = admin.implementation_of(proxy).await?;
    if current != implementation {
        let message = format!("{target} proxy reports implementation {current}");
        match ctx.validation {
            ValidationMode::Advisory => warn!(@yellow, "{message}"),
            ValidationMode::Strict => return Err(Error::NotApplied(message)),
        }
    }
    ctx.verify(implementation, Vec::new()).await;
    Ok(implementation)
}

/// Fails if `version` is the one already recorded for `target`.
fn check_new_version(
    target: UpgradeTarget,
    recorded: &str,
    version: &DeploymentVersion,
) -> Result<()> {
    if recorded != version.to_string() {
        return Ok(());
    }
    let suggestion = match version.redeploy {
        None => DeploymentVersion {
            redeploy: Some('a'),
            ..*version
        },
        Some(c) if c < 'z' => DeploymentVersion {
            redeploy: Some((c as u8 + 1) as char),
            ..*version
        },
        Some(_) => DeploymentVersion::new(version.major, version.minor + 1),
    };
    Err(Error::VersionInUse {
        target: target.to_string(),
        version: recorded.to_string(),
        suggestion: suggestion.to_string(),
    })
}

fn record_upgrade(
    record: &mut DeploymentRecord,
    implementation: Address,
    version: &DeploymentVersion,
) {
    if let Some(previous) = record.implementation.take() {
        record
            .extra
            .insert("previousImplementation".to_string(), previous.into());
    }
    record.implementation = Some(implementation.to_string());
    record.version = Some(version.to_string());
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn targets_parse_case_insensitively() {
        assert_eq!("Registry".parse::<UpgradeTarget>().unwrap(), UpgradeTarget::Registry);
        assert_eq!("allo".parse::<UpgradeTarget>().unwrap().ledger(), "allo");
        assert!(matches!(
            "strategy".parse::<UpgradeTarget>(),
            Err(Error::UnknownTarget(_))
        ));
    }

    #[test]
    fn recorded_version_cannot_be_reused() {
        let err = check_new_version(UpgradeTarget::Allo, "v1.0", &"v1.0".parse().unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::VersionInUse { ref suggestion, .. } if suggestion == "v1.0a"
        ));

        let err = check_new_version(UpgradeTarget::Registry, "v1.0a", &"v1.0a".parse().unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::VersionInUse { ref suggestion, .. } if suggestion == "v1.0b"
        ));

        check_new_version(UpgradeTarget::Allo, "v1.0", &"v1.0a".parse().unwrap()).unwrap();
        check_new_version(UpgradeTarget::Allo, "", &"v1.0".parse().unwrap()).unwrap();
    }

    #[test]
    fn upgrade_keeps_proxy_and_remembers_old_implementation() {
        let proxy = address!("00000000000000000000000000000000000000aa");
        let old = address!("00000000000000000000000000000000000000bb");
        let new = address!("00000000000000000000000000000000000000cc");
        let mut record = DeploymentRecord::new("Allo", "v1.0").with_proxy(proxy, old);

        record_upgrade(&mut record, new, &"v1.1".parse().unwrap());

        assert_eq!(record.field("proxy"), proxy.to_string());
        assert_eq!(record.field("implementation"), new.to_string());
        assert_eq!(record.field("previousImplementation"), old.to_string());
        assert_eq!(record.field("version"), "v1.1");
    }
}
