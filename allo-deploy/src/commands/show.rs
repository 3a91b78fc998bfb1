// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use allo_tools::ops;

use crate::{common_args::LedgerArgs, error::AlloDeployResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Ledger to print (e.g. contractFactory, registry, allo)
    ledger: String,
    /// Only print the record for this chain
    #[arg(long)]
    chain_id: Option<u64>,

    #[command(flatten)]
    ledger_dir: LedgerArgs,
}

pub fn exec(args: Args) -> AlloDeployResult {
    let json = ops::show(args.ledger_dir.store(), &args.ledger, args.chain_id)?;
    println!("{json}");
    Ok(())
}
