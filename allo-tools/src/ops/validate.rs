// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use std::str::FromStr;

use alloy::{json_abi::JsonAbi, providers::Provider};

use crate::{
    core::{
        ledger::{LedgerError, LedgerStore},
        validation::{parse_args, ValidationOutcome, Validator, ViewCaller},
    },
    error::{Error, Result},
    ops::DeployContext,
};

/// A view-function call and the value it should return, written `function(args..)=expected`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assertion {
    pub function: String,
    pub args: Vec<String>,
    pub expected: String,
}

impl FromStr for Assertion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidAssertion(s.to_string());
        let (call, expected) = s.split_once('=').ok_or_else(invalid)?;
        let (function, args) = match call.trim().split_once('(') {
            Some((function, rest)) => {
                let args = rest.strip_suffix(')').ok_or_else(invalid)?;
                (function, args)
            }
            None => (call.trim(), ""),
        };
        if function.is_empty() {
            return Err(invalid());
        }
        let args = args
            .split(',')
            .map(str::trim)
            .filter(|arg| !arg.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self {
            function: function.trim().to_string(),
            args,
            expected: expected.trim().to_string(),
        })
    }
}

/// Checks the recorded deployment in `ledger` against `assertions`, using the ABI of the
/// `contract` artifact. The proxy is called when the record has one.
pub async fn validate<P: Provider, S: LedgerStore>(
    ctx: &DeployContext<P, S>,
    ledger: &str,
    contract: &str,
    assertions: &[Assertion],
) -> Result<Vec<ValidationOutcome>> {
    let address = ctx
        .deployments
        .get(ledger)?
        .and_then(|record| record.entrypoint())
        .ok_or_else(|| LedgerError::MissingDependency {
            ledger: ledger.to_string(),
            field: "address",
            chain_id: ctx.chain_id(),
        })?;
    let abi = ctx.artifacts.load(contract)?.abi;
    let validator = ctx.validator(contract, address)?;
    let outcomes = check(&validator, &abi, assertions).await?;

    let passed = outcomes.iter().filter(|outcome| outcome.passed()).count();
    if passed == outcomes.len() {
        mintln!("{passed}/{} checks passed", outcomes.len());
    } else {
        greyln!("{passed}/{} checks passed", outcomes.len());
    }
    Ok(outcomes)
}

async fn check<C: ViewCaller>(
    validator: &Validator<C>,
    abi: &JsonAbi,
    assertions: &[Assertion],
) -> Result<Vec<ValidationOutcome>> {
    let mut outcomes = Vec::with_capacity(assertions.len());
    for assertion in assertions {
        let args = parse_args(abi, &assertion.function, &assertion.args)?;
        outcomes.push(
            validator
                .validate(&assertion.function, &args, &assertion.expected)
                .await?,
        );
    }
    Ok(outcomes)
}
