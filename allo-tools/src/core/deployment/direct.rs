// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use alloy::{primitives::Address, providers::Provider};

use super::{
    ContractDeployer, DeployRequest, DeployedContract, DeploymentError, DeploymentRequest,
    TxSettings,
};
use crate::utils::color::DebugColor;

/// Deploys with plain contract-creation transactions from the sender.
///
/// Name and version are only used for logging; nothing on chain records them.
#[derive(Debug)]
pub struct DirectDeployer<P> {
    provider: P,
    sender: Address,
    settings: TxSettings,
}

impl<P: Provider> DirectDeployer<P> {
    pub fn new(provider: P, sender: Address, settings: TxSettings) -> Self {
        Self {
            provider,
            sender,
            settings,
        }
    }
}

impl<P: Provider> ContractDeployer for DirectDeployer<P> {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn deploy(&self, request: &DeployRequest) -> Result<DeployedContract, DeploymentError> {
        info!(@grey, "deploying {} {} directly", request.contract_name, request.version);
        let receipt = DeploymentRequest::new(self.sender, request.creation_code.clone())
            .exec(&self.settings, &self.provider)
            .await?;
        let address = receipt
            .contract_address
            .ok_or(DeploymentError::NoContractAddress("in receipt".to_string()))?;
        info!(@grey, "deployed {} at address: {}", request.contract_name, address.debug_lavender());
        Ok(DeployedContract {
            address,
            tx_hash: receipt.transaction_hash,
        })
    }
}
