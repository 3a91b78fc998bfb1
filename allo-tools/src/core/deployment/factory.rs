// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Deployments through the on-chain ContractFactory.
//!
//! The factory derives the new contract's address from `name ++ version`, so the address can be
//! read with a static call before any gas is spent, and the same name and version can only be
//! deployed once per factory. Contracts that take their owner from `msg.sender` are deployed
//! from the sender instead, or the factory would own them.

use alloy::{
    primitives::Address,
    providers::Provider,
    rpc::types::TransactionReceipt,
    sol,
};

use super::{
    send_call, ContractDeployer, DeployRequest, DeployedContract, DeploymentError, DirectDeployer,
    TxSettings,
};
use crate::{core::identity::factory_salt, utils::color::DebugColor};

sol! {
    #[sol(rpc)]
    interface ContractFactory {
        function deploy(
            string memory _contractName,
            string memory _version,
            bytes memory creationCode
        ) external payable returns (address deployedContract);

        function isDeployer(address) external view returns (bool);
        function usedSalts(bytes32) external view returns (bool);
        function setDeployer(address _deployer, bool _allowedToDeploy) external;
    }
}

/// Client for a deployed ContractFactory.
#[derive(Debug)]
pub struct FactoryClient<P> {
    address: Address,
    provider: P,
    sender: Address,
    settings: TxSettings,
}

impl<P: Provider> FactoryClient<P> {
    pub fn new(address: Address, provider: P, sender: Address, settings: TxSettings) -> Self {
        Self {
            address,
            provider,
            sender,
            settings,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn instance(&self) -> ContractFactory::ContractFactoryInstance<&P> {
        ContractFactory::new(self.address, &self.provider)
    }

    /// Address the factory would assign to `request`, without sending a transaction.
    pub async fn predict_address(
        &self,
        request: &DeployRequest,
    ) -> Result<Address, DeploymentError> {
        let predicted = self
            .instance()
            .deploy(
                request.contract_name.clone(),
                request.version.clone(),
                request.creation_code.clone(),
            )
            .from(self.sender)
            .call()
            .await?;
        Ok(predicted)
    }

    /// Checks the sender may deploy `request` and returns the address the factory will assign.
    pub async fn preflight(&self, request: &DeployRequest) -> Result<Address, DeploymentError> {
        if !self.is_deployer(self.sender).await? {
            return Err(DeploymentError::NotADeployer {
                factory: self.address,
                sender: self.sender,
            });
        }
        let salt = factory_salt(&request.contract_name, &request.version);
        if self.instance().usedSalts(salt).call().await? {
            return Err(DeploymentError::AlreadyDeployed {
                factory: self.address,
                tag: request.tag(),
            });
        }

        let predicted = self.predict_address(request).await?;
        info!(@grey,
            "{} {} will be deployed at address: {}",
            request.contract_name,
            request.version,
            predicted.debug_lavender()
        );
        Ok(predicted)
    }

    /// Fails unless the factory actually left code at `predicted`.
    async fn ensure_code(&self, predicted: Address) -> Result<(), DeploymentError> {
        let code = self.provider.get_code_at(predicted).await?;
        if code.is_empty() {
            return Err(DeploymentError::NoCodeAtAddress { predicted });
        }
        Ok(())
    }

    pub async fn is_deployer(&self, account: Address) -> Result<bool, DeploymentError> {
        Ok(self.instance().isDeployer(account).call().await?)
    }

    /// Allows or disallows `account` to deploy through the factory. Only the factory owner may.
    pub async fn set_deployer(
        &self,
        account: Address,
        allowed: bool,
    ) -> Result<TransactionReceipt, DeploymentError> {
        let fees = self.settings.gas.resolve(&self.provider).await?;
        let call = self.instance().setDeployer(account, allowed).from(self.sender);
        send_call(call, &self.settings, fees).await
    }
}

impl<P: Provider> ContractDeployer for FactoryClient<P> {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn deploy(&self, request: &DeployRequest) -> Result<DeployedContract, DeploymentError> {
        debug!(@grey, "deploying contract using factory at address: {}", self.address);
        let predicted = self.preflight(request).await?;

        let fees = self.settings.gas.resolve(&self.provider).await?;
        let call = self
            .instance()
            .deploy(
                request.contract_name.clone(),
                request.version.clone(),
                request.creation_code.clone(),
            )
            .from(self.sender);
        let receipt = send_call(call, &self.settings, fees).await?;
        let tx_hash = receipt.transaction_hash;

        self.ensure_code(predicted).await?;
        info!(@grey, "deployed code at address: {}", predicted.debug_lavender());
        info!(@grey, "deployment tx hash: {}", tx_hash.debug_lavender());
        Ok(DeployedContract {
            address: predicted,
            tx_hash,
        })
    }

    async fn deploy_from_sender(
        &self,
        request: &DeployRequest,
    ) -> Result<DeployedContract, DeploymentError> {
        DirectDeployer::new(&self.provider, self.sender, self.settings.clone())
            .deploy(request)
            .await
    }
}
