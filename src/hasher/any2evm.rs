//! v1.6 any → EVM leaf

use alloy_primitives::{keccak256, B256};
use alloy_sol_types::SolValue;

use super::{LeafHasher, LEAF_DOMAIN_SEPARATOR};
use crate::abi::ramp::{Any2EVMRampMessage, Any2EVMTokenTransfer, RampMessageHeader};
use crate::address::{address_preimage, evm_address};
use crate::chain::{ChainFamily, Lane};
use crate::error::Result;
use crate::message::CcipMessage;

/// Domain string of the v1.6 EVM-destination metadata hash
pub const ANY_2_EVM_MESSAGE_HASH: &str = "Any2EVMMessageHashV1";

/// Leaf hasher of the v1.6 EVM `OffRamp`.
#[derive(Debug, Clone)]
pub struct Any2EvmHasher {
    metadata_hash: B256,
    source_family: ChainFamily,
}

impl Any2EvmHasher {
    pub fn new(lane: &Lane, source_family: ChainFamily) -> Result<Self> {
        let on_ramp = address_preimage(lane.on_ramp(), source_family)?;
        let metadata_hash = keccak256(
            (
                keccak256(ANY_2_EVM_MESSAGE_HASH),
                lane.source_chain_selector(),
                lane.dest_chain_selector(),
                keccak256(&on_ramp),
            )
                .abi_encode_params(),
        );
        Ok(Self {
            metadata_hash,
            source_family,
        })
    }

    pub fn metadata_hash(&self) -> B256 {
        self.metadata_hash
    }
}

impl LeafHasher for Any2EvmHasher {
    fn hash(&self, message: &CcipMessage) -> Result<B256> {
        let ramp = to_any2evm(message, self.source_family)?;

        let fixed_fields = keccak256(
            (
                ramp.header.messageId,
                ramp.receiver,
                ramp.header.sequenceNumber,
                ramp.gasLimit,
                ramp.header.nonce,
            )
                .abi_encode_params(),
        );

        Ok(keccak256(
            (
                LEAF_DOMAIN_SEPARATOR,
                self.metadata_hash,
                fixed_fields,
                keccak256(&ramp.sender),
                keccak256(&ramp.data),
                keccak256(ramp.tokenAmounts.abi_encode()),
            )
                .abi_encode_params(),
        ))
    }
}

/// Builds the struct the EVM off-ramp receives, shared by hashing and
/// execution reports. Remote addresses use their pre-image form.
pub(crate) fn to_any2evm(
    message: &CcipMessage,
    source_family: ChainFamily,
) -> Result<Any2EVMRampMessage> {
    let token_amounts = message
        .token_amounts
        .iter()
        .map(|token| {
            Ok(Any2EVMTokenTransfer {
                sourcePoolAddress: address_preimage(&token.source_pool_address, source_family)?,
                destTokenAddress: evm_address(&token.dest_token_address)?,
                destGasAmount: token.dest_gas_amount,
                extraData: token.extra_data.clone(),
                amount: token.amount,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Any2EVMRampMessage {
        header: RampMessageHeader {
            messageId: message.header.message_id,
            sourceChainSelector: message.header.source_chain_selector,
            destChainSelector: message.header.dest_chain_selector,
            sequenceNumber: message.header.sequence_number,
            nonce: message.header.nonce,
        },
        sender: address_preimage(&message.sender, source_family)?,
        data: message.data.clone(),
        receiver: evm_address(&message.receiver)?,
        gasLimit: message.gas_limit(),
        tokenAmounts: token_amounts,
    })
}
