// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use allo_tools::ops;

use crate::{common_args::DeployEnvArgs, error::AlloDeployResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[command(flatten)]
    env: DeployEnvArgs,
}

pub async fn exec(args: Args) -> AlloDeployResult {
    let (ctx, config) = args.env.connect().await?;
    let settings = config.chain(ctx.chain_id())?;
    ops::deploy_allo(&ctx, &settings).await?;
    Ok(())
}
