// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Fakes shared by unit tests.

use std::{cell::RefCell, fs, path::Path};

use alloy::primitives::{address, Address, TxHash};

use crate::core::{
    artifact::ArtifactStore,
    deployment::{ContractDeployer, DeployRequest, DeployedContract, DeploymentError},
    proxy::{PROXY_ADMIN_ARTIFACT, TRANSPARENT_PROXY_ARTIFACT},
};

pub const SENDER: Address = address!("00000000000000000000000000000000000000ff");

/// Records every request and hands out addresses `0x..01`, `0x..02`, ... in order.
pub struct RecordingDeployer {
    pub requests: RefCell<Vec<DeployRequest>>,
    /// Names of the contracts deployed from the sender rather than the factory.
    pub from_sender: RefCell<Vec<String>>,
}

impl RecordingDeployer {
    pub fn new() -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            from_sender: RefCell::new(Vec::new()),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|r| r.contract_name.clone())
            .collect()
    }
}

impl ContractDeployer for RecordingDeployer {
    fn sender(&self) -> Address {
        SENDER
    }

    async fn deploy(&self, request: &DeployRequest) -> Result<DeployedContract, DeploymentError> {
        let mut requests = self.requests.borrow_mut();
        requests.push(request.clone());
        let n = requests.len() as u8;
        Ok(DeployedContract {
            address: Address::with_last_byte(n),
            tx_hash: TxHash::with_last_byte(n),
        })
    }

    async fn deploy_from_sender(
        &self,
        request: &DeployRequest,
    ) -> Result<DeployedContract, DeploymentError> {
        self.from_sender
            .borrow_mut()
            .push(request.contract_name.clone());
        self.deploy(request).await
    }
}

pub fn write_artifact(dir: &Path, name: &str, abi: &str, bytecode: &str) {
    let json = format!(r#"{{"contractName":"{name}","abi":{abi},"bytecode":"{bytecode}"}}"#);
    fs::write(dir.join(format!("{name}.json")), json).unwrap();
}

/// An artifact directory holding the OpenZeppelin v4 proxy contracts.
pub fn proxy_artifacts(dir: &Path) -> ArtifactStore {
    write_artifact(dir, PROXY_ADMIN_ARTIFACT, "[]", "0xaa");
    write_artifact(
        dir,
        TRANSPARENT_PROXY_ARTIFACT,
        r#"[{"type":"constructor","stateMutability":"payable","inputs":[
            {"name":"_logic","type":"address","internalType":"address"},
            {"name":"admin_","type":"address","internalType":"address"},
            {"name":"_data","type":"bytes","internalType":"bytes"}]}]"#,
        "0xbb",
    );
    ArtifactStore::new(dir)
}
