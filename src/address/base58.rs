use alloy_primitives::{hex, Bytes};

use super::{parse_hex, AddressCodec};
use crate::chain::ChainFamily;
use crate::error::{CcipError, Result};

/// 32-byte addresses rendered as base58 (Solana public keys, Sui).
///
/// Sui tooling also prints `0x`-prefixed hex; that form is accepted on encode.
#[derive(Debug, Clone, Copy)]
pub struct Base58AddressCodec {
    family: ChainFamily,
}

impl Base58AddressCodec {
    pub const SOLANA: Self = Self {
        family: ChainFamily::Solana,
    };
    pub const SUI: Self = Self {
        family: ChainFamily::Sui,
    };
}

impl AddressCodec for Base58AddressCodec {
    fn family(&self) -> ChainFamily {
        self.family
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        if bytes.len() != 32 {
            return Err(CcipError::address(self.family, hex::encode_prefixed(bytes)));
        }
        Ok(bs58::encode(bytes).into_string())
    }

    fn encode(&self, address: &str) -> Result<Bytes> {
        let decoded = if self.family == ChainFamily::Sui && address.starts_with("0x") {
            parse_hex(address)
        } else {
            bs58::decode(address).into_vec().ok()
        };
        match decoded {
            Some(bytes) if bytes.len() == 32 => Ok(bytes.into()),
            _ => Err(CcipError::address(self.family, address)),
        }
    }
}
