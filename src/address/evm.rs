use alloy_primitives::{hex, Address, Bytes};

use super::{parse_hex, AddressCodec};
use crate::chain::ChainFamily;
use crate::error::{CcipError, Result};

/// EVM addresses: 20 bytes, EIP-55 checksummed hex.
///
/// Addresses delivered as 32-byte ABI words are accepted when the leading 12
/// bytes are zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvmAddressCodec;

impl AddressCodec for EvmAddressCodec {
    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        let raw = match bytes.len() {
            20 => bytes,
            32 if bytes[..12].iter().all(|b| *b == 0) => &bytes[12..],
            _ => {
                return Err(CcipError::address(
                    ChainFamily::Evm,
                    hex::encode_prefixed(bytes),
                ))
            }
        };
        Ok(Address::from_slice(raw).to_checksum(None))
    }

    fn encode(&self, address: &str) -> Result<Bytes> {
        let digits = address.strip_prefix("0x").unwrap_or(address);
        if digits.len() != 40 {
            return Err(CcipError::address(ChainFamily::Evm, address));
        }
        parse_hex(digits)
            .map(Bytes::from)
            .ok_or_else(|| CcipError::address(ChainFamily::Evm, address))
    }
}
