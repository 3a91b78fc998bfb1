// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use alloy::{primitives::Address, providers::Provider};

use crate::{
    core::{
        config::ChainSettings,
        ledger::{self, Deployments, LedgerStore},
        validation::ValidationMode,
    },
    error::{Error, Result},
    ops::DeployContext,
    utils::color::DebugColor,
};

/// Ledgers whose records carry the proxy admin owner.
const PROXIED_LEDGERS: [&str; 2] = [ledger::REGISTRY, ledger::ALLO];

/// Hands the chain's ProxyAdmin to `new_owner`, or to the configured `proxy_admin_owner`.
pub async fn transfer_proxy_admin_ownership<P: Provider, S: LedgerStore>(
    ctx: &DeployContext<P, S>,
    settings: &ChainSettings<'_>,
    new_owner: Option<Address>,
) -> Result<()> {
    let new_owner = new_owner
        .or(settings.common().proxy_admin_owner)
        .ok_or(Error::MissingSetting("proxy admin owner"))?;
    let admin = ctx.proxy_admin()?;

    let current = admin.owner().await?;
    if current == new_owner {
        greyln!("proxy admin is already owned by {}", new_owner.debug_lavender());
    } else {
        admin.transfer_ownership(new_owner).await?;
        let owner = admin.owner().await?;
        if owner != new_owner {
            let message = format!("proxy admin {} is owned by {owner}", admin.address());
            match ctx.validation {
                ValidationMode::Advisory => warn!(@yellow, "{message}"),
                ValidationMode::Strict => return Err(Error::NotApplied(message)),
            }
        }
        mintln!("proxy admin ownership transferred to {}", new_owner.debug_lavender());
    }

    record_admin_owner(&ctx.deployments, new_owner)
}

fn record_admin_owner<S: LedgerStore>(deployments: &Deployments<S>, owner: Address) -> Result<()> {
    for name in PROXIED_LEDGERS {
        if deployments.get(name)?.is_some() {
            deployments.update(name, |record| {
                record
                    .extra
                    .insert("proxyAdminOwner".to_string(), owner.to_string().into());
            })?;
        }
    }
    Ok(())
}
