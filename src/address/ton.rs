use alloy_primitives::{hex, Bytes};

use super::{parse_hex, AddressCodec};
use crate::chain::ChainFamily;
use crate::error::{CcipError, Result};

/// TON addresses: variable width, rendered as raw hex without padding.
///
/// The `workchain:hash` raw form is accepted on encode and packed as a
/// big-endian `i32` workchain followed by the 32-byte account hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct TonAddressCodec;

impl AddressCodec for TonAddressCodec {
    fn family(&self) -> ChainFamily {
        ChainFamily::Ton
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(CcipError::address(ChainFamily::Ton, "0x"));
        }
        Ok(hex::encode_prefixed(bytes))
    }

    fn encode(&self, address: &str) -> Result<Bytes> {
        let invalid = || CcipError::address(ChainFamily::Ton, address);

        if let Some((workchain, hash)) = address.split_once(':') {
            let workchain: i32 = workchain.parse().map_err(|_| invalid())?;
            let hash = hex::decode(hash).map_err(|_| invalid())?;
            if hash.len() != 32 {
                return Err(invalid());
            }
            let mut bytes = Vec::with_capacity(36);
            bytes.extend_from_slice(&workchain.to_be_bytes());
            bytes.extend_from_slice(&hash);
            return Ok(bytes.into());
        }

        match parse_hex(address) {
            Some(bytes) if !bytes.is_empty() => Ok(bytes.into()),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_form_packs_36_bytes() {
        let raw = format!("-1:{}", "cd".repeat(32));
        let bytes = TonAddressCodec.encode(&raw).unwrap();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[..4], &(-1i32).to_be_bytes());
        assert_eq!(
            TonAddressCodec.decode(&bytes).unwrap(),
            format!("0xffffffff{}", "cd".repeat(32))
        );
    }

    #[test]
    fn test_hex_roundtrip_any_width() {
        let bytes = TonAddressCodec.encode("0x0102030405").unwrap();
        assert_eq!(&bytes[..], &[1, 2, 3, 4, 5]);
        assert_eq!(TonAddressCodec.decode(&bytes).unwrap(), "0x0102030405");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(TonAddressCodec.encode("0:xyz").is_err());
        assert!(TonAddressCodec.encode("zz:00").is_err());
        assert!(TonAddressCodec.encode("").is_err());
        assert!(TonAddressCodec.decode(&[]).is_err());
    }
}
