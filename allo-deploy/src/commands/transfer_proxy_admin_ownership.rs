// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use alloy::primitives::Address;
use allo_tools::ops;

use crate::{common_args::DeployEnvArgs, error::AlloDeployResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// New owner. Defaults to the configured proxy_admin_owner
    #[arg(long)]
    new_owner: Option<Address>,

    #[command(flatten)]
    env: DeployEnvArgs,
}

pub async fn exec(args: Args) -> AlloDeployResult {
    let (ctx, config) = args.env.connect().await?;
    let settings = config.chain(ctx.chain_id())?;
    ops::transfer_proxy_admin_ownership(&ctx, &settings, args.new_owner).await?;
    Ok(())
}
