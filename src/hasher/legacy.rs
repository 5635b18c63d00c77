//! v1.2 / v1.5 EVM → EVM leaf

use alloy_primitives::{keccak256, B256};
use alloy_sol_types::SolValue;

use super::{LeafHasher, LEAF_DOMAIN_SEPARATOR};
use crate::address::evm_address;
use crate::chain::Lane;
use crate::error::Result;
use crate::message::legacy::to_evm2evm;
use crate::message::CcipMessage;

/// Domain string of the legacy metadata hash
pub const EVM_2_EVM_MESSAGE_HASH: &str = "EVM2EVMMessageHashV2";

/// Leaf hasher of the v1.2 / v1.5 `EVM2EVMOffRamp`.
#[derive(Debug, Clone)]
pub struct Evm2EvmHasher {
    metadata_hash: B256,
}

impl Evm2EvmHasher {
    /// # Errors
    ///
    /// [`CcipError::AddressInvalid`](crate::CcipError::AddressInvalid) when the
    /// lane's on-ramp is not an EVM address.
    pub fn new(lane: &Lane) -> Result<Self> {
        let on_ramp = evm_address(lane.on_ramp())?;
        let metadata_hash = keccak256(
            (
                keccak256(EVM_2_EVM_MESSAGE_HASH),
                lane.source_chain_selector(),
                lane.dest_chain_selector(),
                on_ramp,
            )
                .abi_encode_params(),
        );
        Ok(Self { metadata_hash })
    }

    pub fn metadata_hash(&self) -> B256 {
        self.metadata_hash
    }
}

impl LeafHasher for Evm2EvmHasher {
    fn hash(&self, message: &CcipMessage) -> Result<B256> {
        let original = to_evm2evm(message)?;

        let fixed_fields = keccak256(
            (
                original.sender,
                original.receiver,
                original.sequenceNumber,
                original.gasLimit,
                original.strict,
                original.nonce,
                original.feeToken,
                original.feeTokenAmount,
            )
                .abi_encode_params(),
        );

        Ok(keccak256(
            (
                LEAF_DOMAIN_SEPARATOR,
                self.metadata_hash,
                fixed_fields,
                keccak256(&original.data),
                keccak256(original.tokenAmounts.abi_encode()),
                keccak256(original.sourceTokenData.abi_encode()),
            )
                .abi_encode_params(),
        ))
    }
}
