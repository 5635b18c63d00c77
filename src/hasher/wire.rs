//! v2.0 leaf: keccak of the `MessageV1` encoding

use alloy_primitives::{keccak256, B256};

use super::LeafHasher;
use crate::chain::ChainFamily;
use crate::error::{CcipError, Result};
use crate::message::{CcipMessage, MessageEnvelope};

/// Leaf hasher of v2.0 lanes, family independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct WireHasher;

impl LeafHasher for WireHasher {
    fn hash(&self, message: &CcipMessage) -> Result<B256> {
        match &message.envelope {
            MessageEnvelope::Wire(wire) => Ok(keccak256(wire.encode()?)),
            _ => Err(CcipError::HasherVersionUnsupported {
                version: message.generation(),
                source_family: ChainFamily::Evm,
                dest_family: ChainFamily::Evm,
            }),
        }
    }
}
