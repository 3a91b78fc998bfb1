// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use alloy::primitives::Address;

use crate::core::{
    artifact::ArtifactError,
    config::ConfigError,
    deployment::DeploymentError,
    ledger::LedgerError,
    proxy::{ManifestError, ProxyError},
    validation::ValidationError,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors ending an operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Artifact(#[from] ArtifactError),
    #[error("{0}")]
    Deployment(#[from] DeploymentError),
    #[error("{0}")]
    Proxy(#[from] ProxyError),
    #[error("{0}")]
    Manifest(#[from] ManifestError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("new proxy admin {admin} is owned by {owner}, expected {expected}")]
    AdminOwnerMismatch {
        admin: Address,
        expected: Address,
        owner: Address,
    },
    #[error("no proxy admin known for chain {0}, deploy a proxy first")]
    NoProxyAdmin(u64),
    #[error("no {0} given and none configured")]
    MissingSetting(&'static str),
    #[error("invalid assertion {0:?}, expected function(args..)=expected")]
    InvalidAssertion(String),
    #[error("change not applied on chain: {0}")]
    NotApplied(String),
    #[error("unknown upgrade target {0:?} (expected registry or allo)")]
    UnknownTarget(String),
    #[error("{target} {version} is already deployed, pass a new version such as {suggestion}")]
    VersionInUse {
        target: String,
        version: String,
        suggestion: String,
    },
}
