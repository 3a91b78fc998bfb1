// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use allo_tools::{
    core::version::DeploymentVersion,
    ops::{self, UpgradeTarget},
};

use crate::{common_args::DeployEnvArgs, error::AlloDeployResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Contract to upgrade: registry or allo
    target: String,
    /// Version of the new implementation, overriding the configured one (e.g. v1.1)
    version: Option<DeploymentVersion>,

    #[command(flatten)]
    env: DeployEnvArgs,
}

pub async fn exec(args: Args) -> AlloDeployResult {
    let target: UpgradeTarget = args.target.parse()?;
    let (ctx, config) = args.env.connect().await?;
    let settings = config.chain(ctx.chain_id())?;
    ops::upgrade(&ctx, &settings, target, args.version).await?;
    Ok(())
}
