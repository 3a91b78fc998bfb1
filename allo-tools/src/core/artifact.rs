// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Compiled contract artifacts.
//!
//! Both Hardhat (`"bytecode": "0x.."`) and Foundry (`"bytecode": { "object": "0x.." }`) artifact
//! layouts are understood.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{json_abi::JsonAbi, primitives::Bytes};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid artifact {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("invalid bytecode hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("no artifact named {name}.json under {}", .dir.display())]
    NotFound { name: String, dir: PathBuf },
    #[error("several artifacts named {name}.json: {paths:?}")]
    Ambiguous { name: String, paths: Vec<PathBuf> },
    #[error("artifact {0} has no creation bytecode (abstract contract or interface?)")]
    NoBytecode(String),
}

#[derive(Clone, Debug)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: JsonAbi,
    /// Creation (init) code, without constructor arguments.
    pub bytecode: Bytes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    #[serde(default)]
    contract_name: Option<String>,
    abi: JsonAbi,
    bytecode: RawBytecode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hardhat(String),
    Foundry { object: String },
}

impl ContractArtifact {
    /// Parses artifact JSON, naming the contract `fallback_name` if the artifact does not.
    pub fn from_json(json: &str, fallback_name: &str) -> Result<Self, ArtifactError> {
        let raw: RawArtifact = serde_json::from_str(json).map_err(|source| ArtifactError::Json {
            path: PathBuf::from(fallback_name),
            source,
        })?;
        let contract_name = raw
            .contract_name
            .unwrap_or_else(|| fallback_name.to_string());
        let code = match raw.bytecode {
            RawBytecode::Hardhat(code) => code,
            RawBytecode::Foundry { object } => object,
        };
        let code = code.trim();
        let bytecode = Bytes::from(hex::decode(code.strip_prefix("0x").unwrap_or(code))?);
        if bytecode.is_empty() {
            return Err(ArtifactError::NoBytecode(contract_name));
        }
        Ok(Self {
            contract_name,
            abi: raw.abi,
            bytecode,
        })
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_json(&json, &fallback).map_err(|err| match err {
            ArtifactError::Json { source, .. } => ArtifactError::Json {
                path: path.to_path_buf(),
                source,
            },
            err => err,
        })
    }
}

/// Looks up artifacts by contract name below a build output directory.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> Result<PathBuf, ArtifactError> {
        let dir = glob::Pattern::escape(&self.dir.to_string_lossy());
        let pattern = format!("{dir}/**/{}.json", glob::Pattern::escape(name));
        let mut paths: Vec<PathBuf> = glob::glob(&pattern)?.filter_map(Result::ok).collect();
        match paths.len() {
            0 => Err(ArtifactError::NotFound {
                name: name.to_string(),
                dir: self.dir.clone(),
            }),
            1 => Ok(paths.remove(0)),
            _ => Err(ArtifactError::Ambiguous {
                name: name.to_string(),
                paths,
            }),
        }
    }

    pub fn load(&self, name: &str) -> Result<ContractArtifact, ArtifactError> {
        let path = self.path_of(name)?;
        debug!(@grey, "loading artifact {}", path.display());
        ContractArtifact::read(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HARDHAT: &str = r#"{
      "_format": "hh-sol-artifact-1",
      "contractName": "Registry",
      "abi": [
        { "type": "function", "name": "initialize", "stateMutability": "nonpayable",
          "inputs": [{ "name": "_owner", "type": "address", "internalType": "address" }],
          "outputs": [] }
      ],
      "bytecode": "0x6080604052"
    }"#;

    const FOUNDRY: &str = r#"{
      "abi": [],
      "bytecode": { "object": "0x60806040", "linkReferences": {} }
    }"#;

    #[test]
    fn parses_hardhat_layout() {
        let artifact = ContractArtifact::from_json(HARDHAT, "ignored").unwrap();
        assert_eq!(artifact.contract_name, "Registry");
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert!(artifact.abi.function("initialize").is_some());
    }

    #[test]
    fn parses_foundry_layout() {
        let artifact = ContractArtifact::from_json(FOUNDRY, "ProxyAdmin").unwrap();
        assert_eq!(artifact.contract_name, "ProxyAdmin");
        assert_eq!(artifact.bytecode.len(), 4);
        assert!(artifact.abi.function("initialize").is_none());
    }

    #[test]
    fn interfaces_have_no_bytecode() {
        let json = r#"{ "contractName": "IAllo", "abi": [], "bytecode": "0x" }"#;
        let err = ContractArtifact::from_json(json, "IAllo").unwrap_err();
        assert!(matches!(err, ArtifactError::NoBytecode(name) if name == "IAllo"));
    }

    #[test]
    fn finds_artifacts_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("contracts/core/Registry.sol");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Registry.json"), HARDHAT).unwrap();
        fs::write(nested.join("Registry.dbg.json"), "{}").unwrap();

        let store = ArtifactStore::new(dir.path());
        let artifact = store.load("Registry").unwrap();
        assert_eq!(artifact.contract_name, "Registry");
        assert!(matches!(
            store.load("Allo").unwrap_err(),
            ArtifactError::NotFound { .. }
        ));
    }
}
