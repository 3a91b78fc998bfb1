// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use alloy::{
    primitives::{Address, Bytes},
    providers::Provider,
    rpc::types::TransactionReceipt,
    sol,
};

use crate::{
    core::deployment::{send_call, DeploymentError, TxSettings},
    utils::color::DebugColor,
};

sol! {
    #[sol(rpc)]
    interface ProxyAdmin {
        function owner() external view returns (address);
        function getProxyImplementation(address proxy) external view returns (address);
        function upgrade(address proxy, address implementation) external;
        function upgradeAndCall(address proxy, address implementation, bytes memory data) external payable;
        function transferOwnership(address newOwner) external;
    }
}

/// Client for the ProxyAdmin administering a network's transparent proxies.
#[derive(Debug)]
pub struct ProxyAdminClient<P> {
    address: Address,
    provider: P,
    sender: Address,
    settings: TxSettings,
}

impl<P: Provider> ProxyAdminClient<P> {
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

    fn instance(&self) -> ProxyAdmin::ProxyAdminInstance<&P> {
        ProxyAdmin::new(self.address, &self.provider)
    }

    pub async fn owner(&self) -> Result<Address, DeploymentError> {
        Ok(self.instance().owner().call().await?)
    }

    pub async fn implementation_of(&self, proxy: Address) -> Result<Address, DeploymentError> {
        Ok(self.instance().getProxyImplementation(proxy).call().await?)
    }

    /// Points `proxy` at `implementation`, calling it with `data` when non-empty.
    pub async fn upgrade(
        &self,
        proxy: Address,
        implementation: Address,
        data: Bytes,
    ) -> Result<TransactionReceipt, DeploymentError> {
        info!(@grey,
            "upgrading proxy {} to implementation {}",
            proxy.debug_lavender(),
            implementation.debug_lavender()
        );
        let fees = self.settings.gas.resolve(&self.provider).await?;
        if data.is_empty() {
            let call = self
                .instance()
                .upgrade(proxy, implementation)
                .from(self.sender);
            send_call(call, &self.settings, fees).await
        } else {
            let call = self
                .instance()
                .upgradeAndCall(proxy, implementation, data)
                .from(self.sender);
            send_call(call, &self.settings, fees).await
        }
    }

    pub async fn transfer_ownership(
        &self,
        new_owner: Address,
    ) -> Result<TransactionReceipt, DeploymentError> {
        info!(@grey,
            "transferring ownership of proxy admin {} to {}",
            self.address.debug_lavender(),
            new_owner.debug_lavender()
        );
        let fees = self.settings.gas.resolve(&self.provider).await?;
        let call = self
            .instance()
            .transferOwnership(new_owner)
            .from(self.sender);
        send_call(call, &self.settings, fees).await
    }
}
