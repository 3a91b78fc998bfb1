// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Contract deployment, either through the on-chain ContractFactory or directly from the signer.

use std::{fmt, str::FromStr};

use alloy::{
    contract::{CallBuilder, CallDecoder},
    dyn_abi::{DynSolValue, Specifier},
    json_abi::Constructor,
    primitives::{Address, Bytes, TxHash},
    providers::Provider,
    rpc::types::TransactionReceipt,
};

use crate::{core::chain::ChainConfig, utils::color::DebugColor};

pub use direct::DirectDeployer;
pub use factory::{ContractFactory, FactoryClient};
pub use request::DeploymentRequest;

mod direct;
mod factory;
mod request;

/// How contracts other than the factory itself get deployed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeployMode {
    /// Through the ContractFactory, keyed by name and version.
    #[default]
    Factory,
    /// Plain contract-creation transactions from the signer.
    Direct,
}

impl FromStr for DeployMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "factory" => Ok(Self::Factory),
            "direct" => Ok(Self::Direct),
            _ => Err(format!("unknown deploy mode {s:?} (expected factory or direct)")),
        }
    }
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Factory => "factory",
            Self::Direct => "direct",
        })
    }
}

/// Something that can put creation code on chain.
#[allow(async_fn_in_trait)]
pub trait ContractDeployer {
    /// Account paying for and owning the deployments.
    fn sender(&self) -> Address;

    async fn deploy(&self, request: &DeployRequest) -> Result<DeployedContract, DeploymentError>;

    /// Deploys with the sender as the creating account, bypassing any factory.
    ///
    /// Contracts that take their owner from `msg.sender` must be deployed this way.
    async fn deploy_from_sender(
        &self,
        request: &DeployRequest,
    ) -> Result<DeployedContract, DeploymentError> {
        self.deploy(request).await
    }
}

impl<D: ContractDeployer + ?Sized> ContractDeployer for &D {
    fn sender(&self) -> Address {
        (**self).sender()
    }

    async fn deploy(&self, request: &DeployRequest) -> Result<DeployedContract, DeploymentError> {
        (**self).deploy(request).await
    }

    async fn deploy_from_sender(
        &self,
        request: &DeployRequest,
    ) -> Result<DeployedContract, DeploymentError> {
        (**self).deploy_from_sender(request).await
    }
}

/// ABI-encoded constructor arguments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstructorArgs(Vec<DynSolValue>);

impl ConstructorArgs {
    pub fn new(values: Vec<DynSolValue>) -> Self {
        Self(values)
    }

    /// Parses textual arguments against a constructor from an ABI.
    pub fn for_constructor<V: AsRef<str>>(
        constructor: &Constructor,
        values: &[V],
    ) -> Result<Self, DeploymentError> {
        if constructor.inputs.len() != values.len() {
            return Err(DeploymentError::InvalidConstructor(format!(
                "mismatch number of constructor arguments (want {:?} ({}); got {})",
                constructor.inputs,
                constructor.inputs.len(),
                values.len(),
            )));
        }
        let mut parsed = Vec::with_capacity(values.len());
        for (param, value) in constructor.inputs.iter().zip(values) {
            let ty = param.resolve()?;
            parsed.push(ty.coerce_str(value.as_ref())?);
        }
        Ok(Self(parsed))
    }

    pub fn values(&self) -> &[DynSolValue] {
        &self.0
    }

    pub fn encode(&self) -> Vec<u8> {
        if self.0.is_empty() {
            return Vec::new();
        }
        DynSolValue::Tuple(self.0.clone()).abi_encode_params()
    }
}

/// A contract to deploy: its logical identity and full creation code.
#[derive(Clone, Debug, PartialEq)]
pub struct DeployRequest {
    pub contract_name: String,
    pub version: String,
    /// Init code with the encoded constructor arguments appended.
    pub creation_code: Bytes,
}

impl DeployRequest {
    pub fn new(
        contract_name: impl Into<String>,
        version: impl Into<String>,
        bytecode: &[u8],
        args: &ConstructorArgs,
    ) -> Self {
        let mut code = bytecode.to_vec();
        code.extend(args.encode());
        Self {
            contract_name: contract_name.into(),
            version: version.into(),
            creation_code: code.into(),
        }
    }

    /// `name+version`, the tag the factory keys deployments by.
    pub fn tag(&self) -> String {
        format!("{}{}", self.contract_name, self.version)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeployedContract {
    pub address: Address,
    pub tx_hash: TxHash,
}

/// Optional fee settings for outgoing transactions.
#[derive(Clone, Copy, Debug, Default)]
pub struct GasOverrides {
    pub max_fee_per_gas_wei: Option<u128>,
    pub max_priority_fee_per_gas_wei: Option<u128>,
    /// Start from the node's EIP-1559 fee estimate.
    pub estimate_fees: bool,
}

/// Fee parameters to put on a transaction. `None` leaves the field to the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fees {
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
}

impl GasOverrides {
    pub async fn resolve(&self, provider: &impl Provider) -> Result<Fees, DeploymentError> {
        let mut fees = Fees::default();
        if self.estimate_fees {
            let estimate = provider.estimate_eip1559_fees().await?;
            fees.max_fee_per_gas = Some(estimate.max_fee_per_gas);
            fees.max_priority_fee_per_gas = Some(estimate.max_priority_fee_per_gas);
        }
        if let Some(wei) = self.max_fee_per_gas_wei {
            fees.max_fee_per_gas = Some(wei);
        }
        if let Some(wei) = self.max_priority_fee_per_gas_wei {
            fees.max_priority_fee_per_gas = Some(wei);
        }
        Ok(fees)
    }
}

/// Settings shared by every transaction sent during a deployment.
#[derive(Clone, Debug)]
pub struct TxSettings {
    pub chain: ChainConfig,
    pub gas: GasOverrides,
}

impl TxSettings {
    pub fn new(chain: ChainConfig) -> Self {
        Self {
            chain,
            gas: GasOverrides::default(),
        }
    }
}

/// Sends a contract call as a transaction and waits for it to be confirmed.
pub(crate) async fn send_call<P: Provider, D: CallDecoder>(
    mut call: CallBuilder<P, D>,
    settings: &TxSettings,
    fees: Fees,
) -> Result<TransactionReceipt, DeploymentError> {
    if let Some(max_fee) = fees.max_fee_per_gas {
        call = call.max_fee_per_gas(max_fee);
    }
    if let Some(priority_fee) = fees.max_priority_fee_per_gas {
        call = call.max_priority_fee_per_gas(priority_fee);
    }
    let pending = call.send().await?;
    debug!(@grey, "sent tx: {}", pending.tx_hash().debug_lavender());
    let receipt = pending
        .with_required_confirmations(settings.chain.required_confirmations())
        .with_timeout(settings.chain.receipt_timeout)
        .get_receipt()
        .await?;
    check_receipt(&receipt)?;
    Ok(receipt)
}

/// Fails with [`DeploymentError::Reverted`] unless the receipt reports success.
pub(crate) fn check_receipt(receipt: &TransactionReceipt) -> Result<(), DeploymentError> {
    if !receipt.status() {
        return Err(DeploymentError::Reverted {
            tx_hash: receipt.transaction_hash,
        });
    }
    debug!(@grey,
        "tx {} mined in block {:?}",
        receipt.transaction_hash.debug_lavender(),
        receipt.block_number
    );
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("rpc error: {0}")]
    Rpc(#[from] alloy::transports::RpcError<alloy::transports::TransportErrorKind>),
    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),
    #[error("{0}")]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),
    #[error("abi error: {0}")]
    Abi(#[from] alloy::dyn_abi::Error),

    #[error("invalid constructor: {0}")]
    InvalidConstructor(String),
    #[error("deploy tx reverted {}", .tx_hash.debug_red())]
    Reverted { tx_hash: TxHash },
    #[error("missing address: {0}")]
    NoContractAddress(String),
    #[error("{tag} was already deployed through the factory at {factory}, pick a new version")]
    AlreadyDeployed { factory: Address, tag: String },
    #[error("{sender} is not allowed to deploy through the factory at {factory}")]
    NotADeployer { factory: Address, sender: Address },
    #[error("factory reported {predicted} but no code was deployed there")]
    NoCodeAtAddress { predicted: Address },
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, U256};

    use super::*;

    #[test]
    fn constructor_args_append_to_bytecode() {
        let allo = address!("1133eA7Af70876e64665ecD07C0A0476d09465a1");
        let constructor = Constructor::parse("constructor(address _allo, string _name)").unwrap();
        let args = ConstructorArgs::for_constructor(
            &constructor,
            &[allo.to_string().as_str(), "DonationVotingMerkleDistributionDirectTransferStrategy"],
        )
        .unwrap();
        let request = DeployRequest::new("DonationVoting", "v2.1", &[0x60, 0x80], &args);

        let code = request.creation_code.as_ref();
        assert_eq!(&code[..2], &[0x60, 0x80]);
        let encoded = &code[2..];
        // head: address, offset of string; tail: length, padded bytes
        assert_eq!(encoded.len(), 32 * 4 + 32);
        assert_eq!(&encoded[12..32], allo.as_slice());
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(64));
        assert_eq!(U256::from_be_slice(&encoded[64..96]), U256::from(54));
        assert_eq!(request.tag(), "DonationVotingv2.1");
    }

    #[test]
    fn no_args_leaves_bytecode_alone() {
        let request = DeployRequest::new("ProxyAdmin", "v1.0", &[1, 2, 3], &Default::default());
        assert_eq!(request.creation_code.as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn argument_count_must_match() {
        let constructor = Constructor::parse("constructor(address _allo)").unwrap();
        let err = ConstructorArgs::for_constructor(&constructor, &[] as &[&str]).unwrap_err();
        assert!(matches!(err, DeploymentError::InvalidConstructor(_)));
    }

    #[tokio::test]
    async fn explicit_fees_need_no_node() {
        let asserter = alloy::providers::mock::Asserter::new();
        let provider = alloy::providers::ProviderBuilder::new().connect_mocked_client(asserter);
        let gas = GasOverrides {
            max_fee_per_gas_wei: Some(3_000_000_000),
            max_priority_fee_per_gas_wei: Some(1),
            estimate_fees: false,
        };

        let fees = gas.resolve(&provider).await.unwrap();

        assert_eq!(
            fees,
            Fees {
                max_fee_per_gas: Some(3_000_000_000),
                max_priority_fee_per_gas: Some(1),
            }
        );
    }

    #[test]
    fn constructor_signature_drives_parsing() {
        let constructor = Constructor::parse("constructor(address _allo, string _name)").unwrap();
        let args = ConstructorArgs::for_constructor(
            &constructor,
            &["0x1133eA7Af70876e64665ecD07C0A0476d09465a1", "QVSimpleStrategy"],
        )
        .unwrap();
        assert_eq!(
            args.values(),
            &[
                DynSolValue::Address(address!("1133eA7Af70876e64665ecD07C0A0476d09465a1")),
                DynSolValue::String("QVSimpleStrategy".to_string()),
            ]
        );
    }

    #[test]
    fn deploy_modes_parse() {
        assert_eq!("factory".parse::<DeployMode>(), Ok(DeployMode::Factory));
        assert_eq!("direct".parse::<DeployMode>(), Ok(DeployMode::Direct));
        assert!("create2".parse::<DeployMode>().is_err());
    }
}
