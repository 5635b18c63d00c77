use alloy_primitives::{hex, Bytes};

use super::{left_pad_word, parse_hex, AddressCodec};
use crate::chain::ChainFamily;
use crate::error::{CcipError, Result};

/// Aptos addresses: 32 bytes, zero-padded lowercase hex.
///
/// Short forms such as `0x1` and `::module` suffixes are accepted on encode; the
/// suffix names a module under the account and is not part of the address bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AptosAddressCodec;

impl AptosAddressCodec {
    /// Splits `0xabc::module` into the account and the optional module path.
    pub fn split_module(address: &str) -> (&str, Option<&str>) {
        match address.split_once("::") {
            Some((account, module)) => (account, Some(module)),
            None => (address, None),
        }
    }
}

impl AddressCodec for AptosAddressCodec {
    fn family(&self) -> ChainFamily {
        ChainFamily::Aptos
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        if bytes.len() != 32 {
            return Err(CcipError::address(
                ChainFamily::Aptos,
                hex::encode_prefixed(bytes),
            ));
        }
        Ok(hex::encode_prefixed(bytes))
    }

    fn encode(&self, address: &str) -> Result<Bytes> {
        let (account, _) = Self::split_module(address);
        parse_hex(account)
            .filter(|bytes| !bytes.is_empty())
            .and_then(|bytes| left_pad_word(&bytes))
            .map(|word| Bytes::copy_from_slice(word.as_slice()))
            .ok_or_else(|| CcipError::address(ChainFamily::Aptos, address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pads_hex() {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        assert_eq!(
            AptosAddressCodec.decode(&bytes).unwrap(),
            format!("0x{}01", "00".repeat(31))
        );
    }

    #[test]
    fn test_decode_rejects_short() {
        assert!(AptosAddressCodec.decode(&[1u8; 20]).is_err());
    }

    #[test]
    fn test_encode_short_form_and_module() {
        let bytes = AptosAddressCodec.encode("0x1::ccip_offramp").unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[31], 1);
        assert!(bytes[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_rejects_too_wide() {
        let wide = format!("0x{}", "ab".repeat(33));
        assert!(AptosAddressCodec.encode(&wide).is_err());
        assert!(AptosAddressCodec.encode("0x").is_err());
    }

    #[test]
    fn test_split_module() {
        assert_eq!(
            AptosAddressCodec::split_module("0x1::onramp"),
            ("0x1", Some("onramp"))
        );
        assert_eq!(AptosAddressCodec::split_module("0x1"), ("0x1", None));
    }
}
