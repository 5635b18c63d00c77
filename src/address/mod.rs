//! Family-aware address codec
//!
//! Every chain family has its own canonical string form for addresses: EIP-55
//! checksummed hex on EVM, zero-padded hex on Aptos, base58 on Solana and Sui,
//! raw hex on TON. Raw address bytes arrive from event logs in whatever width
//! the emitting contract used, so decoding is strict about widths and padding.
//!
//! Each family implements [`AddressCodec`]; [`codec_for`] is the registry keyed
//! by the closed [`ChainFamily`] enum.
//!
//! # Example
//!
//! ```rust
//! use ccip_rs::{decode_address, encode_address_bytes, ChainFamily};
//!
//! let raw = [0x11u8; 20];
//! let canonical = decode_address(&raw, ChainFamily::Evm).unwrap();
//! assert_eq!(canonical, "0x1111111111111111111111111111111111111111");
//! assert_eq!(encode_address_bytes(&canonical, ChainFamily::Evm).unwrap()[..], raw[..]);
//! ```

mod aptos;
mod base58;
mod evm;
mod ton;

use alloy_primitives::{hex, Address, Bytes, B256};

use crate::chain::ChainFamily;
use crate::error::{CcipError, Result};

pub use aptos::AptosAddressCodec;
pub use base58::Base58AddressCodec;
pub use evm::EvmAddressCodec;
pub use ton::TonAddressCodec;

/// Converts between raw address bytes and a family's canonical string form.
pub trait AddressCodec: Send + Sync {
    /// The family this codec serves
    fn family(&self) -> ChainFamily;

    /// Renders raw address bytes in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`CcipError::AddressInvalid`] when the width or padding does not
    /// match the family.
    fn decode(&self, bytes: &[u8]) -> Result<String>;

    /// Parses a canonical (or accepted alternative) string back into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CcipError::AddressInvalid`] when the string does not parse or
    /// its decoded width does not match the family.
    fn encode(&self, address: &str) -> Result<Bytes>;
}

/// Returns the codec registered for `family`.
pub fn codec_for(family: ChainFamily) -> &'static dyn AddressCodec {
    match family {
        ChainFamily::Evm => &EvmAddressCodec,
        ChainFamily::Aptos => &AptosAddressCodec,
        ChainFamily::Solana => &Base58AddressCodec::SOLANA,
        ChainFamily::Sui => &Base58AddressCodec::SUI,
        ChainFamily::Ton => &TonAddressCodec,
    }
}

/// Renders raw address bytes in the canonical form of `family`.
pub fn decode_address(bytes: &[u8], family: ChainFamily) -> Result<String> {
    codec_for(family).decode(bytes)
}

/// Parses an address string of `family` into its raw bytes.
pub fn encode_address_bytes(address: &str, family: ChainFamily) -> Result<Bytes> {
    codec_for(family).encode(address)
}

/// Parses an address and left-pads it to a 32-byte word, the form used in
/// hash pre-images and ABI `bytes32` slots.
pub fn encode_address_word(address: &str, family: ChainFamily) -> Result<B256> {
    let bytes = encode_address_bytes(address, family)?;
    left_pad_word(&bytes).ok_or_else(|| CcipError::address(family, address))
}

/// Parses an EVM address string into the typed [`Address`].
pub(crate) fn evm_address(address: &str) -> Result<Address> {
    let bytes = EvmAddressCodec.encode(address)?;
    Ok(Address::from_slice(&bytes))
}

/// Raw bytes of an address as they appear in hash pre-images: left-padded to a
/// word when they fit, verbatim otherwise.
pub(crate) fn address_preimage(address: &str, family: ChainFamily) -> Result<Bytes> {
    let bytes = encode_address_bytes(address, family)?;
    Ok(match left_pad_word(&bytes) {
        Some(word) => Bytes::copy_from_slice(word.as_slice()),
        None => bytes,
    })
}

/// Left-pads up to 32 bytes into a word. Longer inputs yield `None`.
pub(crate) fn left_pad_word(bytes: &[u8]) -> Option<B256> {
    if bytes.len() > 32 {
        return None;
    }
    let mut word = B256::ZERO;
    word[32 - bytes.len()..].copy_from_slice(bytes);
    Some(word)
}

/// Hex-decodes with an optional `0x` prefix, tolerating odd nibble counts.
fn parse_hex(input: &str) -> Option<Vec<u8>> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}")).ok()
    } else {
        hex::decode(digits).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_families() {
        for family in ChainFamily::ALL {
            assert_eq!(codec_for(family).family(), family);
        }
    }

    #[test]
    fn test_address_word_pads_evm() {
        let word =
            encode_address_word("0x1111111111111111111111111111111111111111", ChainFamily::Evm)
                .unwrap();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &[0x11u8; 20]);
    }

    #[test]
    fn test_address_word_rejects_wide_ton() {
        let ton = format!("0:{}", "ab".repeat(32));
        assert!(matches!(
            encode_address_word(&ton, ChainFamily::Ton),
            Err(CcipError::AddressInvalid {
                family: ChainFamily::Ton,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_hex_odd_length() {
        assert_eq!(parse_hex("0x1"), Some(vec![0x01]));
        assert_eq!(parse_hex("abcd"), Some(vec![0xab, 0xcd]));
        assert_eq!(parse_hex("0xzz"), None);
    }
}
