// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Transactions sent on behalf of a deployment.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    providers::Provider,
    rpc::types::{TransactionReceipt, TransactionRequest},
};

use super::{check_receipt, DeploymentError, TxSettings};
use crate::utils::{color::DebugColor, format_gas, format_gwei};

/// A contract-creation transaction, estimated and priced before it is sent.
#[derive(Debug)]
pub struct DeploymentRequest {
    tx: TransactionRequest,
}

impl DeploymentRequest {
    pub fn new(sender: Address, code: Bytes) -> Self {
        Self {
            tx: TransactionRequest::default()
                .with_from(sender)
                .with_deploy_code(code),
        }
    }

    pub async fn estimate_gas(&self, provider: &impl Provider) -> Result<u64, DeploymentError> {
        Ok(provider.estimate_gas(self.tx.clone()).await?)
    }

    pub async fn exec(
        self,
        settings: &TxSettings,
        provider: &impl Provider,
    ) -> Result<TransactionReceipt, DeploymentError> {
        let gas = self.estimate_gas(provider).await?;
        let fees = settings.gas.resolve(provider).await?;

        let mut tx = self.tx;
        tx.gas = Some(gas);
        if let Some(max_fee) = fees.max_fee_per_gas {
            debug!(@grey, "max fee per gas: {}", format_gwei(max_fee));
            tx.max_fee_per_gas = Some(max_fee);
        }
        if let Some(priority_fee) = fees.max_priority_fee_per_gas {
            debug!(@grey, "max priority fee per gas: {}", format_gwei(priority_fee));
            tx.max_priority_fee_per_gas = Some(priority_fee);
        }

        let tx = provider.send_transaction(tx).await?;
        let tx_hash = *tx.tx_hash();
        debug!(@grey, "sent deploy tx: {}", tx_hash.debug_lavender());

        let receipt = tx
            .with_required_confirmations(settings.chain.required_confirmations())
            .with_timeout(settings.chain.receipt_timeout)
            .get_receipt()
            .await?;
        check_receipt(&receipt)?;
        debug!(@grey, "gas used: {}", format_gas(receipt.gas_used.into()));
        Ok(receipt)
    }
}
