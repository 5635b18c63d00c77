//! v1.6 any → Move (Aptos, Sui) leaves
//!
//! Move off-ramps rebuild an `abi.encode`-style pre-image by hand: every scalar
//! is a 32-byte big-endian word and every byte string is a length word followed
//! by the data right-padded to a word boundary. Token transfers are packed
//! inline (no offsets) behind a length word.

use alloy_primitives::{keccak256, B256, U256};

use super::{LeafHasher, LEAF_DOMAIN_SEPARATOR};
use crate::address::{address_preimage, encode_address_word};
use crate::chain::{ChainFamily, Lane};
use crate::error::{CcipError, Result};
use crate::extra_args::ExtraArgs;
use crate::message::CcipMessage;

pub const ANY_2_APTOS_MESSAGE_HASH: &str = "Any2AptosMessageHashV1";
pub const ANY_2_SUI_MESSAGE_HASH: &str = "Any2SuiMessageHashV1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveChain {
    Aptos,
    Sui,
}

impl MoveChain {
    fn family(self) -> ChainFamily {
        match self {
            Self::Aptos => ChainFamily::Aptos,
            Self::Sui => ChainFamily::Sui,
        }
    }
}

/// Leaf hasher of the Aptos and Sui off-ramps.
#[derive(Debug, Clone)]
pub struct MoveHasher {
    chain: MoveChain,
    metadata_hash: B256,
    source_family: ChainFamily,
}

impl MoveHasher {
    pub fn aptos(lane: &Lane, source_family: ChainFamily) -> Result<Self> {
        Self::new(MoveChain::Aptos, ANY_2_APTOS_MESSAGE_HASH, lane, source_family)
    }

    pub fn sui(lane: &Lane, source_family: ChainFamily) -> Result<Self> {
        Self::new(MoveChain::Sui, ANY_2_SUI_MESSAGE_HASH, lane, source_family)
    }

    fn new(
        chain: MoveChain,
        domain: &str,
        lane: &Lane,
        source_family: ChainFamily,
    ) -> Result<Self> {
        let on_ramp = address_preimage(lane.on_ramp(), source_family)?;
        let mut packed = WordPacker::default();
        packed
            .word(keccak256(domain))
            .u64(lane.source_chain_selector())
            .u64(lane.dest_chain_selector())
            .word(keccak256(&on_ramp));
        Ok(Self {
            chain,
            metadata_hash: packed.hash(),
            source_family,
        })
    }

    pub fn metadata_hash(&self) -> B256 {
        self.metadata_hash
    }

    fn token_amounts_hash(&self, message: &CcipMessage) -> Result<B256> {
        let mut packed = WordPacker::default();
        packed.length(message.token_amounts.len());
        for token in &message.token_amounts {
            packed
                .bytes(&address_preimage(&token.source_pool_address, self.source_family)?)
                .word(encode_address_word(
                    &token.dest_token_address,
                    self.chain.family(),
                )?)
                .u64(u64::from(token.dest_gas_amount))
                .bytes(&token.extra_data)
                .u256(token.amount);
        }
        Ok(packed.hash())
    }
}

impl LeafHasher for MoveHasher {
    fn hash(&self, message: &CcipMessage) -> Result<B256> {
        let dest = self.chain.family();
        let receiver = encode_address_word(&message.receiver, dest)?;

        let mut inner = WordPacker::default();
        inner
            .word(message.header.message_id)
            .word(receiver)
            .u64(message.header.sequence_number)
            .u256(message.gas_limit());

        let mut object_ids = None;
        if self.chain == MoveChain::Sui {
            let (token_receiver, ids) = match &message.extra_args {
                ExtraArgs::SuiV1(args) => (
                    encode_address_word(&args.token_receiver, dest)?,
                    args.receiver_object_ids.as_slice(),
                ),
                other => return Err(CcipError::extra_args_mismatch(dest, "SUIv1", other)),
            };
            inner.word(token_receiver);

            let mut packed = WordPacker::default();
            packed.length(ids.len());
            for id in ids {
                packed.word(encode_address_word(id, dest)?);
            }
            object_ids = Some(packed.hash());
        }
        inner.u64(message.header.nonce);

        let sender = address_preimage(&message.sender, self.source_family)?;

        let mut outer = WordPacker::default();
        outer
            .word(LEAF_DOMAIN_SEPARATOR)
            .word(self.metadata_hash)
            .word(inner.hash())
            .word(keccak256(&sender))
            .word(keccak256(&message.data))
            .word(self.token_amounts_hash(message)?);
        if let Some(object_ids) = object_ids {
            outer.word(object_ids);
        }
        Ok(outer.hash())
    }
}

/// Builds a pre-image out of 32-byte words.
#[derive(Debug, Default)]
struct WordPacker {
    buf: Vec<u8>,
}

impl WordPacker {
    fn word(&mut self, word: B256) -> &mut Self {
        self.buf.extend_from_slice(word.as_slice());
        self
    }

    fn u256(&mut self, value: U256) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes::<32>());
        self
    }

    fn u64(&mut self, value: u64) -> &mut Self {
        self.u256(U256::from(value))
    }

    fn length(&mut self, len: usize) -> &mut Self {
        self.u256(U256::from(len))
    }

    fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.length(bytes.len());
        self.buf.extend_from_slice(bytes);
        let padding = (32 - bytes.len() % 32) % 32;
        self.buf.resize(self.buf.len() + padding, 0);
        self
    }

    fn hash(&self) -> B256 {
        keccak256(&self.buf)
    }
}
