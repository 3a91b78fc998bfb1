// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Post-deploy checks: read a view function and compare it with the value we expect.
//!
//! Values are compared as lower-cased strings, so checksummed and lower-case addresses match.

use std::{fmt, str::FromStr};

use alloy::{
    contract::{ContractInstance, Interface},
    dyn_abi::{DynSolValue, Specifier},
    json_abi::JsonAbi,
    primitives::Address,
    providers::Provider,
};

use crate::utils::color::Color;

/// What a failed check does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Log the failure and carry on.
    #[default]
    Advisory,
    /// Fail the running operation.
    Strict,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "advisory" => Ok(Self::Advisory),
            "strict" => Ok(Self::Strict),
            _ => Err(format!("unknown validation mode {s:?} (expected advisory or strict)")),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Advisory => "advisory",
            Self::Strict => "strict",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationOutcome {
    Passed,
    Mismatch { expected: String, actual: String },
    CallFailed(String),
}

impl ValidationOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Mismatch { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            }
            Self::CallFailed(err) => write!(f, "call failed: {err}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{0}")]
    Call(String),
    #[error("abi error: {0}")]
    Abi(#[from] alloy::dyn_abi::Error),
    #[error("no function {0} with matching arguments in abi")]
    UnknownFunction(String),
    #[error("validation of {contract}.{function} failed: {outcome}")]
    Failed {
        contract: String,
        function: String,
        outcome: ValidationOutcome,
    },
}

/// Read access to a deployed contract's view functions.
#[allow(async_fn_in_trait)]
pub trait ViewCaller {
    async fn call_view(
        &self,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, ValidationError>;
}

/// A deployed contract called through its JSON ABI.
pub struct AbiContract<P> {
    instance: ContractInstance<P>,
}

impl<P: Provider> AbiContract<P> {
    pub fn new(address: Address, provider: P, abi: JsonAbi) -> Self {
        Self {
            instance: ContractInstance::new(address, provider, Interface::new(abi)),
        }
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

impl<P: Provider> ViewCaller for AbiContract<P> {
    async fn call_view(
        &self,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, ValidationError> {
        let call = self
            .instance
            .function(function, args)
            .map_err(|err| ValidationError::Call(err.to_string()))?;
        call.call()
            .await
            .map_err(|err| ValidationError::Call(err.to_string()))
    }
}

/// Parses textual arguments against the inputs of `function` in `abi`.
pub fn parse_args<V: AsRef<str>>(
    abi: &JsonAbi,
    function: &str,
    values: &[V],
) -> Result<Vec<DynSolValue>, ValidationError> {
    let inputs = abi
        .function(function)
        .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == values.len()))
        .map(|f| &f.inputs)
        .ok_or_else(|| ValidationError::UnknownFunction(function.to_string()))?;
    let mut args = Vec::with_capacity(values.len());
    for (param, value) in inputs.iter().zip(values) {
        args.push(param.resolve()?.coerce_str(value.as_ref())?);
    }
    Ok(args)
}

/// Renders a returned value the way it is written in configuration.
pub fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Address(address) => address.to_string(),
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
        DynSolValue::Array(values)
        | DynSolValue::FixedArray(values)
        | DynSolValue::Tuple(values) => format_values(values),
        #[allow(unreachable_patterns)]
        other => format!("{other:?}"),
    }
}

fn format_values(values: &[DynSolValue]) -> String {
    values.iter().map(format_value).collect::<Vec<_>>().join(",")
}

/// Runs view-function assertions against one contract.
pub struct Validator<C> {
    contract: String,
    caller: C,
    mode: ValidationMode,
}

impl<C: ViewCaller> Validator<C> {
    pub fn new(contract: impl Into<String>, caller: C, mode: ValidationMode) -> Self {
        Self {
            contract: contract.into(),
            caller,
            mode,
        }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Calls `function(args)` and compares its result with `expected`.
    ///
    /// Call errors are reported as [`ValidationOutcome::CallFailed`]. Only strict mode turns an
    /// outcome other than [`ValidationOutcome::Passed`] into an error.
    pub async fn validate(
        &self,
        function: &str,
        args: &[DynSolValue],
        expected: &str,
    ) -> Result<ValidationOutcome, ValidationError> {
        let outcome = match self.caller.call_view(function, args).await {
            Ok(values) => {
                let actual = format_values(&values);
                if actual.to_lowercase() == expected.to_lowercase() {
                    ValidationOutcome::Passed
                } else {
                    ValidationOutcome::Mismatch {
                        expected: expected.to_string(),
                        actual,
                    }
                }
            }
            Err(err) => ValidationOutcome::CallFailed(err.to_string()),
        };

        if outcome.passed() {
            info!(@grey, "{}.{function}: {}", self.contract, "passed".mint());
        } else {
            warn!(@yellow, "{}.{function}: {}", self.contract, outcome.red());
            if self.mode == ValidationMode::Strict {
                return Err(ValidationError::Failed {
                    contract: self.contract.clone(),
                    function: function.to_string(),
                    outcome,
                });
            }
        }
        Ok(outcome)
    }
}
