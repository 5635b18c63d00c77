//! v1.6 any → Solana leaf
//!
//! The SVM off-ramp hashes a flat concatenation rather than an ABI pre-image:
//! big-endian integers, one-byte length prefixes for addresses, a two-byte
//! prefix for data and Borsh for the nested structs.

use alloy_primitives::{keccak256, B256};
use borsh::BorshSerialize;

use super::LeafHasher;
use crate::address::{address_preimage, encode_address_bytes};
use crate::chain::{ChainFamily, Lane};
use crate::error::{CcipError, MessageField, Result};
use crate::extra_args::ExtraArgs;
use crate::message::CcipMessage;

pub const ANY_2_SVM_MESSAGE_HASH: &str = "Any2SVMMessageHashV1";

#[derive(BorshSerialize)]
struct SvmExtraArgs {
    compute_units: u32,
    is_writable_bitmap: u64,
}

#[derive(BorshSerialize)]
struct SvmTokenAmount {
    source_pool_address: Vec<u8>,
    dest_token_address: [u8; 32],
    dest_gas_amount: u32,
    extra_data: Vec<u8>,
    /// little-endian u256
    amount: [u8; 32],
}

/// Leaf hasher of the Solana off-ramp program.
#[derive(Debug, Clone)]
pub struct SvmHasher {
    source_chain_selector: u64,
    dest_chain_selector: u64,
    on_ramp: Vec<u8>,
    source_family: ChainFamily,
}

impl SvmHasher {
    pub fn new(lane: &Lane, source_family: ChainFamily) -> Result<Self> {
        let on_ramp = address_preimage(lane.on_ramp(), source_family)?.to_vec();
        short_len(&on_ramp, MessageField::OnRampAddress)?;
        Ok(Self {
            source_chain_selector: lane.source_chain_selector(),
            dest_chain_selector: lane.dest_chain_selector(),
            on_ramp,
            source_family,
        })
    }

    fn token_amounts(&self, message: &CcipMessage) -> Result<Vec<SvmTokenAmount>> {
        message
            .token_amounts
            .iter()
            .map(|token| {
                Ok(SvmTokenAmount {
                    source_pool_address: address_preimage(
                        &token.source_pool_address,
                        self.source_family,
                    )?
                    .to_vec(),
                    dest_token_address: pubkey(&token.dest_token_address)?,
                    dest_gas_amount: token.dest_gas_amount,
                    extra_data: token.extra_data.to_vec(),
                    amount: token.amount.to_le_bytes::<32>(),
                })
            })
            .collect()
    }
}

impl LeafHasher for SvmHasher {
    fn hash(&self, message: &CcipMessage) -> Result<B256> {
        let (compute_units, is_writable_bitmap, token_receiver) = match &message.extra_args {
            ExtraArgs::SvmV1(args) => (
                args.compute_units,
                args.account_is_writable_bitmap,
                pubkey(&args.token_receiver)?,
            ),
            other => {
                return Err(CcipError::extra_args_mismatch(
                    ChainFamily::Solana,
                    "SVMv1",
                    other,
                ))
            }
        };
        let extra_args = borsh::to_vec(&SvmExtraArgs {
            compute_units,
            is_writable_bitmap,
        })?;
        let token_amounts = borsh::to_vec(&self.token_amounts(message)?)?;

        let sender = address_preimage(&message.sender, self.source_family)?;
        let sender_len = short_len(&sender, MessageField::Sender)?;
        let data_len = u16::try_from(message.data.len()).map_err(|_| CcipError::MessageEncode {
            field: MessageField::Data,
            len: message.data.len(),
            max: u16::MAX as usize,
        })?;

        let mut pre_image = Vec::with_capacity(256 + message.data.len() + token_amounts.len());
        pre_image.extend_from_slice(ANY_2_SVM_MESSAGE_HASH.as_bytes());
        pre_image.extend_from_slice(&self.source_chain_selector.to_be_bytes());
        pre_image.extend_from_slice(&self.dest_chain_selector.to_be_bytes());
        // length checked in `new`
        pre_image.push(self.on_ramp.len() as u8);
        pre_image.extend_from_slice(&self.on_ramp);
        pre_image.extend_from_slice(message.header.message_id.as_slice());
        pre_image.extend_from_slice(&token_receiver);
        pre_image.extend_from_slice(&message.header.sequence_number.to_be_bytes());
        pre_image.extend_from_slice(&extra_args);
        pre_image.extend_from_slice(&message.header.nonce.to_be_bytes());
        pre_image.push(sender_len);
        pre_image.extend_from_slice(&sender);
        pre_image.extend_from_slice(&data_len.to_be_bytes());
        pre_image.extend_from_slice(&message.data);
        pre_image.extend_from_slice(&token_amounts);

        Ok(keccak256(&pre_image))
    }
}

fn short_len(bytes: &[u8], field: MessageField) -> Result<u8> {
    u8::try_from(bytes.len()).map_err(|_| CcipError::MessageEncode {
        field,
        len: bytes.len(),
        max: u8::MAX as usize,
    })
}

fn pubkey(address: &str) -> Result<[u8; 32]> {
    let bytes = encode_address_bytes(address, ChainFamily::Solana)?;
    <[u8; 32]>::try_from(&bytes[..]).map_err(|_| CcipError::address(ChainFamily::Solana, address))
}
