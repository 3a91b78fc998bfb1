// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! OpenZeppelin-compatible upgrade manifests (`.openzeppelin/<network>.json`).
//!
//! Only the parts needed to track transparent proxies are modeled; everything else in the file
//! is carried through untouched.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{core::chain::manifest_network_name, utils::create_dir_if_dne};

/// Directory upgrade manifests are kept in, relative to the project root.
pub const MANIFEST_DIR: &str = ".openzeppelin";

const MANIFEST_VERSION: &str = "3.2";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid upgrade manifest {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRef {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    Transparent,
    Uups,
    Beacon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRecord {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    pub kind: ProxyKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestData {
    manifest_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    admin: Option<DeploymentRef>,
    #[serde(default)]
    proxies: Vec<ProxyRecord>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl Default for ManifestData {
    fn default() -> Self {
        let mut other = Map::new();
        other.insert("impls".to_string(), Value::Object(Map::new()));
        Self {
            manifest_version: MANIFEST_VERSION.to_string(),
            admin: None,
            proxies: Vec::new(),
            other,
        }
    }
}

/// Upgrade manifest of one network.
#[derive(Clone, Debug)]
pub struct UpgradeManifest {
    path: PathBuf,
    data: ManifestData,
}

impl UpgradeManifest {
    pub fn path_for(dir: impl AsRef<Path>, chain_id: u64) -> PathBuf {
        dir.as_ref()
            .join(format!("{}.json", manifest_network_name(chain_id)))
    }

    /// Opens the manifest for `chain_id` in `dir`, starting a new one if none exists.
    pub fn open(dir: impl AsRef<Path>, chain_id: u64) -> Result<Self, ManifestError> {
        let path = Self::path_for(dir, chain_id);
        let data = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str(&json).map_err(|source| ManifestError::Json {
                path: path.clone(),
                source,
            })?
        } else {
            ManifestData::default()
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The proxy admin shared by this network's transparent proxies.
    pub fn admin(&self) -> Option<Address> {
        self.data.admin.map(|admin| admin.address)
    }

    pub fn set_admin(&mut self, address: Address, tx_hash: Option<TxHash>) {
        self.data.admin = Some(DeploymentRef { address, tx_hash });
    }

    pub fn proxies(&self) -> &[ProxyRecord] {
        &self.data.proxies
    }

    pub fn is_tracked(&self, proxy: Address) -> bool {
        self.data.proxies.iter().any(|p| p.address == proxy)
    }

    /// Starts tracking a proxy. Tracking an already-known proxy updates its entry.
    pub fn add_proxy(&mut self, address: Address, tx_hash: Option<TxHash>, kind: ProxyKind) {
        let record = ProxyRecord {
            address,
            tx_hash,
            kind,
        };
        match self.data.proxies.iter_mut().find(|p| p.address == address) {
            Some(existing) => *existing = record,
            None => self.data.proxies.push(record),
        }
    }

    pub fn save(&self) -> Result<(), ManifestError> {
        if let Some(parent) = self.path.parent() {
            create_dir_if_dne(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.data).map_err(|source| {
            ManifestError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json + "\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn new_manifest_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let admin = address!("00000000000000000000000000000000000000aa");
        let proxy = address!("00000000000000000000000000000000000000bb");

        let mut manifest = UpgradeManifest::open(dir.path(), 31337).unwrap();
        assert_eq!(manifest.admin(), None);
        manifest.set_admin(admin, None);
        manifest.add_proxy(proxy, None, ProxyKind::Transparent);
        manifest.add_proxy(proxy, None, ProxyKind::Transparent);
        manifest.save().unwrap();

        let reopened = UpgradeManifest::open(dir.path(), 31337).unwrap();
        assert_eq!(reopened.admin(), Some(admin));
        assert_eq!(reopened.proxies().len(), 1);
        assert!(reopened.is_tracked(proxy));
        assert!(dir.path().join("unknown-31337.json").exists());
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{
          "manifestVersion": "3.2",
          "admin": { "address": "0x00000000000000000000000000000000000000aa" },
          "proxies": [],
          "impls": { "abc": { "address": "0x00000000000000000000000000000000000000cc" } }
        }"#;
        fs::write(dir.path().join("sepolia.json"), json).unwrap();

        let manifest = UpgradeManifest::open(dir.path(), 11155111).unwrap();
        manifest.save().unwrap();
        let saved: Value =
            serde_json::from_str(&fs::read_to_string(manifest.path()).unwrap()).unwrap();
        assert_eq!(
            saved["impls"]["abc"]["address"],
            "0x00000000000000000000000000000000000000cc"
        );
    }
}
