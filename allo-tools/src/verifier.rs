// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use std::{process::Stdio, time::Duration};

use alloy::primitives::Address;
use tokio::process::Command;
use typed_builder::TypedBuilder;

use crate::utils::color::DebugColor;

/// Time given to block explorers to index a new contract before verifying it.
pub const DEFAULT_VERIFY_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("verification command exited with {status}: {output}")]
    Failed {
        status: std::process::ExitStatus,
        output: String,
    },
}

/// Configuration for verifying a deployed contract on a block explorer.
///
/// By default this runs `npx hardhat verify --network <network> <address> <args..>` after
/// [`DEFAULT_VERIFY_DELAY`]. Call [`Verifier::verify`] once the parameters are set.
#[derive(Clone, Debug, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct Verifier {
    #[builder(default = "npx".to_string())]
    program: String,
    #[builder(default = vec!["hardhat".to_string(), "verify".to_string()])]
    base_args: Vec<String>,
    network: String,
    address: Address,
    #[builder(default)]
    constructor_args: Vec<String>,
    #[builder(default = DEFAULT_VERIFY_DELAY)]
    delay: Duration,
}

impl Verifier {
    /// The full command line, program first.
    pub fn command_line(&self) -> Vec<String> {
        let mut line = vec![self.program.clone()];
        line.extend(self.base_args.iter().cloned());
        line.push("--network".to_string());
        line.push(self.network.clone());
        line.push(self.address.to_string());
        line.extend(self.constructor_args.iter().cloned());
        line
    }

    /// Waits out the delay and runs the verification command.
    ///
    /// Failures are logged and reported through the return value, never as errors.
    pub async fn verify(&self) -> bool {
        if !self.delay.is_zero() {
            debug!(@grey, "waiting {:?} before verifying", self.delay);
            tokio::time::sleep(self.delay).await;
        }
        match self.run().await {
            Ok(_) => {
                info!(@grey, "verified contract at address: {}", self.address.debug_lavender());
                true
            }
            Err(err) => {
                warn!(@yellow, "verification of {} failed: {err}", self.address);
                false
            }
        }
    }

    async fn run(&self) -> Result<String, VerifyError> {
        debug!(@grey, "running: {}", self.command_line().join(" "));
        let output = Command::new(&self.program)
            .args(&self.base_args)
            .arg("--network")
            .arg(&self.network)
            .arg(self.address.to_string())
            .args(&self.constructor_args)
            .stdin(Stdio::null())
            .output()
            .await?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VerifyError::Failed {
                status: output.status,
                output: format!("{stdout}{stderr}").trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn builds_hardhat_command_line() {
        let verifier = Verifier::builder()
            .network("sepolia")
            .address(address!("1133eA7Af70876e64665ecD07C0A0476d09465a1"))
            .constructor_args(vec!["QVSimpleStrategy".to_string()])
            .build();
        assert_eq!(
            verifier.command_line(),
            [
                "npx",
                "hardhat",
                "verify",
                "--network",
                "sepolia",
                "0x1133eA7Af70876e64665ecD07C0A0476d09465a1",
                "QVSimpleStrategy",
            ]
        );
    }

    #[tokio::test]
    async fn missing_program_is_only_logged() {
        let verifier = Verifier::builder()
            .program("allo-verify-command-that-does-not-exist")
            .base_args(Vec::<String>::new())
            .network("localhost")
            .address(Address::ZERO)
            .delay(Duration::ZERO)
            .build();
        assert!(!verifier.verify().await);
    }
}
