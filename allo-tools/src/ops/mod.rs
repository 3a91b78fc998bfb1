// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Deployment operations, one per command.

pub use allo::{deploy_allo, ALLO_CONTRACT};
pub use context::{DeployContext, Deployer, VerifyOptions};
pub use factory::{add_factory_deployer, deploy_contract_factory, CONTRACT_FACTORY_CONTRACT};
pub use ownership::transfer_proxy_admin_ownership;
pub use registry::{deploy_registry, REGISTRY_CONTRACT};
pub use show::show;
pub use strategy::deploy_strategy;
pub use upgrade::{upgrade, UpgradeTarget};
pub use validate::{validate, Assertion};

mod allo;
mod context;
mod factory;
mod ownership;
mod registry;
mod show;
mod strategy;
mod upgrade;
mod validate;
