// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use crate::error::AlloDeployResult;

mod add_factory_deployer;
mod deploy_allo;
mod deploy_contract_factory;
mod deploy_registry;
mod deploy_strategy;
mod show;
mod transfer_proxy_admin_ownership;
mod upgrade;
mod validate;

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Deploy the ContractFactory and register its deployers
    #[clap(visible_alias = "f")]
    DeployContractFactory(deploy_contract_factory::Args),
    /// Allow an account to deploy through the ContractFactory
    AddFactoryDeployer(add_factory_deployer::Args),
    /// Deploy the Registry behind a transparent proxy
    #[clap(visible_alias = "r")]
    DeployRegistry(deploy_registry::Args),
    /// Deploy Allo behind a transparent proxy
    #[clap(visible_alias = "a")]
    DeployAllo(deploy_allo::Args),
    /// Deploy a strategy bound to the recorded Allo deployment
    #[clap(visible_alias = "s")]
    DeployStrategy(deploy_strategy::Args),
    /// Upgrade the Registry or Allo to a new implementation
    #[clap(visible_alias = "u")]
    Upgrade(upgrade::Args),
    /// Transfer ownership of the network's ProxyAdmin
    TransferProxyAdminOwnership(transfer_proxy_admin_ownership::Args),
    /// Check a recorded deployment against expected view-function values
    #[clap(visible_alias = "v")]
    Validate(validate::Args),
    /// Print a deployment ledger
    Show(show::Args),
}

pub async fn exec(cmd: Command) -> AlloDeployResult {
    match cmd {
        Command::DeployContractFactory(args) => deploy_contract_factory::exec(args).await,
        Command::AddFactoryDeployer(args) => add_factory_deployer::exec(args).await,
        Command::DeployRegistry(args) => deploy_registry::exec(args).await,
        Command::DeployAllo(args) => deploy_allo::exec(args).await,
        Command::DeployStrategy(args) => deploy_strategy::exec(args).await,
        Command::Upgrade(args) => upgrade::exec(args).await,
        Command::TransferProxyAdminOwnership(args) => {
            transfer_proxy_admin_ownership::exec(args).await
        }
        Command::Validate(args) => validate::exec(args).await,
        Command::Show(args) => show::exec(args),
    }
}
