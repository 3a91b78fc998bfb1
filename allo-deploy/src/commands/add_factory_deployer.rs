// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use alloy::primitives::Address;
use allo_tools::ops;

use crate::{common_args::DeployEnvArgs, error::AlloDeployResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Account to allow
    account: Address,

    #[command(flatten)]
    env: DeployEnvArgs,
}

pub async fn exec(args: Args) -> AlloDeployResult {
    let (ctx, _) = args.env.connect().await?;
    ops::add_factory_deployer(&ctx, args.account).await?;
    Ok(())
}
