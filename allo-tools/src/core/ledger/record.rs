// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use std::collections::BTreeMap;

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::parse_address;

/// Records of one ledger file, keyed by chain id.
pub type LedgerEntries = BTreeMap<u64, DeploymentRecord>;

/// What one ledger file knows about a contract on one chain.
///
/// Fields written by other tools (or by hand) that this type does not model are kept in
/// [`DeploymentRecord::extra`] and written back untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployer_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeploymentRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
            ..Default::default()
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address.to_string());
        self
    }

    pub fn with_proxy(mut self, proxy: Address, implementation: Address) -> Self {
        self.proxy = Some(proxy.to_string());
        self.implementation = Some(implementation.to_string());
        self
    }

    pub fn with_deployer(mut self, deployer: Address) -> Self {
        self.deployer_address = Some(deployer.to_string());
        self
    }

    pub fn with_id(mut self, id: B256) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Appends a contract-specific field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Looks up a field by its JSON name, modeled or not.
    ///
    /// Returns the empty string when the field is absent or not a string.
    pub fn field(&self, key: &str) -> &str {
        let modeled = match key {
            "name" => &self.name,
            "version" => &self.version,
            "address" => &self.address,
            "proxy" => &self.proxy,
            "implementation" => &self.implementation,
            "deployerAddress" => &self.deployer_address,
            "id" => &self.id,
            _ => return self.extra.get(key).and_then(Value::as_str).unwrap_or(""),
        };
        modeled.as_deref().unwrap_or("")
    }

    /// The address callers should talk to: the proxy if there is one, the contract otherwise.
    pub fn entrypoint(&self) -> Option<Address> {
        parse_address(self.field("proxy")).or_else(|| parse_address(self.field("address")))
    }
}
