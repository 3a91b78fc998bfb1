// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use std::fmt;
use std::process::ExitCode;

pub type AlloDeployResult = Result<(), AlloDeployError>;

#[derive(Debug)]
pub struct AlloDeployError {
    error: eyre::Error,
    exit_code: ExitCode,
}

impl AlloDeployError {
    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }
}

impl fmt::Display for AlloDeployError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl From<std::io::Error> for AlloDeployError {
    fn from(err: std::io::Error) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<eyre::Error> for AlloDeployError {
    fn from(error: eyre::Error) -> Self {
        Self {
            error,
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<allo_tools::Error> for AlloDeployError {
    fn from(err: allo_tools::Error) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<allo_tools::core::config::ConfigError> for AlloDeployError {
    fn from(err: allo_tools::core::config::ConfigError) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}
