// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use allo_tools::ops::{self, Assertion};
use eyre::eyre;

use crate::{common_args::DeployEnvArgs, error::AlloDeployResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Ledger holding the deployment (e.g. registry, allo, qvsimplestrategy)
    ledger: String,
    /// Artifact whose ABI describes the deployed contract
    contract: String,
    /// Checks of the form `function(arg, ..)=expected`
    #[arg(required = true)]
    assertions: Vec<String>,

    #[command(flatten)]
    env: DeployEnvArgs,
}

pub async fn exec(args: Args) -> AlloDeployResult {
    let assertions = args
        .assertions
        .iter()
        .map(|assertion| assertion.parse())
        .collect::<Result<Vec<Assertion>, _>>()?;
    let (ctx, _) = args.env.connect().await?;
    let outcomes = ops::validate(&ctx, &args.ledger, &args.contract, &assertions).await?;
    let failed = outcomes.iter().filter(|outcome| !outcome.passed()).count();
    if failed > 0 {
        return Err(eyre!("{failed} of {} checks failed", outcomes.len()).into());
    }
    Ok(())
}
