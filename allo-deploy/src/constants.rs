// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

/// The default endpoint, a local development node.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8545";

pub const DEFAULT_CONFIG: &str = "deploy.toml";
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "deployments";
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
