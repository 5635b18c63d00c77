//! Per-message execution hints ("extra args")
//!
//! Extra args travel as a 4-byte tag followed by a fixed-layout payload. The
//! tag space is shared by every chain family, but the payload layout depends
//! on the family that *produced* the bytes: EVM and Solana on-ramps ABI-encode
//! the payload, Move on-ramps (Aptos, Sui) BCS-encode the same logical
//! structure.
//!
//! An unknown tag is not an error: lanes are upgraded independently of this
//! SDK, so [`ExtraArgs::decode`] returns `Ok(None)` and leaves the decision to
//! the caller. Inputs shorter than a tag always fail with
//! [`CcipError::ExtraArgsTruncated`].
//!
//! # Example
//!
//! ```rust
//! use alloy_primitives::U256;
//! use ccip_rs::{EvmExtraArgsV2, ExtraArgs};
//!
//! let args = ExtraArgs::EvmV2(EvmExtraArgsV2 {
//!     gas_limit: U256::from(250_000u64),
//!     allow_out_of_order_execution: true,
//! });
//! let encoded = args.encode().unwrap();
//! let decoded = ExtraArgs::decode(&encoded).unwrap().unwrap();
//! assert_eq!(decoded, args);
//! assert_eq!(decoded.tag_name(), "EVMv2");
//! ```

use alloy_primitives::{fixed_bytes, hex, Bytes, FixedBytes, B256, U256};
use alloy_sol_types::SolValue;
use bon::Builder;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::address::{decode_address, encode_address_word};
use crate::chain::ChainFamily;
use crate::codec::{BcsWriter, Cursor};
use crate::error::{CcipError, DecodeFault, Result};

/// `bytes4(keccak256("CCIP EVMExtraArgsV1"))`
pub const EVM_EXTRA_ARGS_V1_TAG: FixedBytes<4> = fixed_bytes!("97a657c9");
/// `bytes4(keccak256("CCIP EVMExtraArgsV2"))`, shared with `GenericExtraArgsV2`
pub const EVM_EXTRA_ARGS_V2_TAG: FixedBytes<4> = fixed_bytes!("181dcf10");
/// `bytes4(keccak256("CCIP SVMExtraArgsV1"))`
pub const SVM_EXTRA_ARGS_V1_TAG: FixedBytes<4> = fixed_bytes!("1f3b3aba");
/// `bytes4(keccak256("CCIP SuiExtraArgsV1"))`
pub const SUI_EXTRA_ARGS_V1_TAG: FixedBytes<4> = fixed_bytes!("21ea4ca9");

mod abi {
    alloy_sol_types::sol! {
        struct EVMExtraArgsV1 {
            uint256 gasLimit;
        }

        struct GenericExtraArgsV2 {
            uint256 gasLimit;
            bool allowOutOfOrderExecution;
        }

        struct SVMExtraArgsV1 {
            uint32 computeUnits;
            uint64 accountIsWritableBitmap;
            bool allowOutOfOrderExecution;
            bytes32 tokenReceiver;
            bytes32[] accounts;
        }

        struct SuiExtraArgsV1 {
            uint256 gasLimit;
            bool allowOutOfOrderExecution;
            bytes32 tokenReceiver;
            bytes32[] receiverObjectIds;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmExtraArgsV1 {
    pub gas_limit: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmExtraArgsV2 {
    pub gas_limit: U256,
    pub allow_out_of_order_execution: bool,
}

/// Solana destination hints. Addresses are base58 public keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SvmExtraArgsV1 {
    pub compute_units: u32,
    pub account_is_writable_bitmap: u64,
    pub allow_out_of_order_execution: bool,
    pub token_receiver: String,
    pub accounts: Vec<String>,
}

/// Sui destination hints. Addresses are in the Sui canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiExtraArgsV1 {
    pub gas_limit: U256,
    pub allow_out_of_order_execution: bool,
    pub token_receiver: String,
    pub receiver_object_ids: Vec<String>,
}

/// Extra args attached to a message; exactly one variant per message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_tag")]
pub enum ExtraArgs {
    #[serde(rename = "EVMv1")]
    EvmV1(EvmExtraArgsV1),
    #[serde(rename = "EVMv2")]
    EvmV2(EvmExtraArgsV2),
    #[serde(rename = "SVMv1")]
    SvmV1(SvmExtraArgsV1),
    #[serde(rename = "SUIv1")]
    SuiV1(SuiExtraArgsV1),
}

impl ExtraArgs {
    /// Wire tag of this variant
    pub const fn tag(&self) -> FixedBytes<4> {
        match self {
            Self::EvmV1(_) => EVM_EXTRA_ARGS_V1_TAG,
            Self::EvmV2(_) => EVM_EXTRA_ARGS_V2_TAG,
            Self::SvmV1(_) => SVM_EXTRA_ARGS_V1_TAG,
            Self::SuiV1(_) => SUI_EXTRA_ARGS_V1_TAG,
        }
    }

    /// Discriminator name, matching the serialized `_tag` field
    pub const fn tag_name(&self) -> &'static str {
        match self {
            Self::EvmV1(_) => "EVMv1",
            Self::EvmV2(_) => "EVMv2",
            Self::SvmV1(_) => "SVMv1",
            Self::SuiV1(_) => "SUIv1",
        }
    }

    /// Destination gas limit, for the variants that carry one
    pub fn gas_limit(&self) -> Option<U256> {
        match self {
            Self::EvmV1(args) => Some(args.gas_limit),
            Self::EvmV2(args) => Some(args.gas_limit),
            Self::SuiV1(args) => Some(args.gas_limit),
            Self::SvmV1(_) => None,
        }
    }

    /// Explicit out-of-order flag; `None` for `EVMv1`, whose semantics depend on
    /// the message nonce.
    pub fn allow_out_of_order_execution(&self) -> Option<bool> {
        match self {
            Self::EvmV1(_) => None,
            Self::EvmV2(args) => Some(args.allow_out_of_order_execution),
            Self::SvmV1(args) => Some(args.allow_out_of_order_execution),
            Self::SuiV1(args) => Some(args.allow_out_of_order_execution),
        }
    }

    /// Encodes with the ABI payload layout used by EVM and Solana on-ramps.
    ///
    /// # Errors
    ///
    /// Fails when an embedded address does not parse for its family.
    pub fn encode(&self) -> Result<Bytes> {
        let payload = match self {
            Self::EvmV1(args) => abi::EVMExtraArgsV1 {
                gasLimit: args.gas_limit,
            }
            .abi_encode(),
            Self::EvmV2(args) => abi::GenericExtraArgsV2 {
                gasLimit: args.gas_limit,
                allowOutOfOrderExecution: args.allow_out_of_order_execution,
            }
            .abi_encode(),
            Self::SvmV1(args) => abi::SVMExtraArgsV1 {
                computeUnits: args.compute_units,
                accountIsWritableBitmap: args.account_is_writable_bitmap,
                allowOutOfOrderExecution: args.allow_out_of_order_execution,
                tokenReceiver: encode_address_word(&args.token_receiver, ChainFamily::Solana)?,
                accounts: words(&args.accounts, ChainFamily::Solana)?,
            }
            .abi_encode(),
            Self::SuiV1(args) => abi::SuiExtraArgsV1 {
                gasLimit: args.gas_limit,
                allowOutOfOrderExecution: args.allow_out_of_order_execution,
                tokenReceiver: encode_address_word(&args.token_receiver, ChainFamily::Sui)?,
                receiverObjectIds: words(&args.receiver_object_ids, ChainFamily::Sui)?,
            }
            .abi_encode(),
        };
        Ok(self.with_tag(&payload))
    }

    /// Encodes with the payload layout of the `origin` family.
    pub fn encode_for(&self, origin: ChainFamily) -> Result<Bytes> {
        if !origin.is_move() {
            return self.encode();
        }

        let mut writer = BcsWriter::new();
        match self {
            Self::EvmV1(args) => {
                writer.u256(args.gas_limit);
            }
            Self::EvmV2(args) => {
                writer
                    .u256(args.gas_limit)
                    .bool(args.allow_out_of_order_execution);
            }
            Self::SvmV1(args) => {
                let receiver = encode_address_word(&args.token_receiver, ChainFamily::Solana)?;
                let accounts = words(&args.accounts, ChainFamily::Solana)?;
                writer
                    .u32(args.compute_units)
                    .u64(args.account_is_writable_bitmap)
                    .bool(args.allow_out_of_order_execution)
                    .fixed(receiver.as_slice())
                    .seq_len(accounts.len());
                for account in &accounts {
                    writer.fixed(account.as_slice());
                }
            }
            Self::SuiV1(args) => {
                let receiver = encode_address_word(&args.token_receiver, ChainFamily::Sui)?;
                let objects = words(&args.receiver_object_ids, ChainFamily::Sui)?;
                writer
                    .u256(args.gas_limit)
                    .bool(args.allow_out_of_order_execution)
                    .fixed(receiver.as_slice())
                    .seq_len(objects.len());
                for object in &objects {
                    writer.fixed(object.as_slice());
                }
            }
        }
        Ok(self.with_tag(&writer.into_bytes()))
    }

    /// Decodes ABI-layout extra args (EVM and Solana origins).
    ///
    /// Returns `Ok(None)` for an unrecognized tag.
    ///
    /// # Errors
    ///
    /// - [`CcipError::ExtraArgsTruncated`] when fewer than 4 bytes are given
    /// - [`CcipError::ExtraArgsDecode`] when a known tag carries a malformed payload
    pub fn decode(data: &[u8]) -> Result<Option<Self>> {
        let (tag, payload) = split_tag(data)?;
        trace!(tag = %tag, payload_len = payload.len(), event = "extra_args_decode");

        let decoded = match tag {
            EVM_EXTRA_ARGS_V1_TAG => {
                let args = abi::EVMExtraArgsV1::abi_decode(payload).map_err(malformed("EVMv1"))?;
                Self::EvmV1(EvmExtraArgsV1 {
                    gas_limit: args.gasLimit,
                })
            }
            EVM_EXTRA_ARGS_V2_TAG => {
                let args =
                    abi::GenericExtraArgsV2::abi_decode(payload).map_err(malformed("EVMv2"))?;
                Self::EvmV2(EvmExtraArgsV2 {
                    gas_limit: args.gasLimit,
                    allow_out_of_order_execution: args.allowOutOfOrderExecution,
                })
            }
            SVM_EXTRA_ARGS_V1_TAG => {
                let args = abi::SVMExtraArgsV1::abi_decode(payload).map_err(malformed("SVMv1"))?;
                Self::SvmV1(SvmExtraArgsV1 {
                    compute_units: args.computeUnits,
                    account_is_writable_bitmap: args.accountIsWritableBitmap,
                    allow_out_of_order_execution: args.allowOutOfOrderExecution,
                    token_receiver: decode_address(
                        args.tokenReceiver.as_slice(),
                        ChainFamily::Solana,
                    )?,
                    accounts: render(&args.accounts, ChainFamily::Solana)?,
                })
            }
            SUI_EXTRA_ARGS_V1_TAG => {
                let args = abi::SuiExtraArgsV1::abi_decode(payload).map_err(malformed("SUIv1"))?;
                Self::SuiV1(SuiExtraArgsV1 {
                    gas_limit: args.gasLimit,
                    allow_out_of_order_execution: args.allowOutOfOrderExecution,
                    token_receiver: decode_address(
                        args.tokenReceiver.as_slice(),
                        ChainFamily::Sui,
                    )?,
                    receiver_object_ids: render(&args.receiverObjectIds, ChainFamily::Sui)?,
                })
            }
            _ => return Ok(None),
        };
        Ok(Some(decoded))
    }

    /// Decodes extra args produced by an on-ramp of the `origin` family.
    pub fn decode_from(data: &[u8], origin: ChainFamily) -> Result<Option<Self>> {
        if !origin.is_move() {
            return Self::decode(data);
        }

        let (tag, payload) = split_tag(data)?;
        let mut cursor = Cursor::new(payload);
        let decoded = match tag {
            EVM_EXTRA_ARGS_V1_TAG => {
                let fault = faulted("EVMv1");
                let gas_limit = cursor.read_u256_le().map_err(fault)?;
                cursor.finish().map_err(fault)?;
                Self::EvmV1(EvmExtraArgsV1 { gas_limit })
            }
            EVM_EXTRA_ARGS_V2_TAG => {
                let fault = faulted("EVMv2");
                let gas_limit = cursor.read_u256_le().map_err(fault)?;
                let allow_out_of_order_execution = cursor.read_bool().map_err(fault)?;
                cursor.finish().map_err(fault)?;
                Self::EvmV2(EvmExtraArgsV2 {
                    gas_limit,
                    allow_out_of_order_execution,
                })
            }
            SVM_EXTRA_ARGS_V1_TAG => {
                let fault = faulted("SVMv1");
                let compute_units = cursor.read_u32_le().map_err(fault)?;
                let account_is_writable_bitmap = cursor.read_u64_le().map_err(fault)?;
                let allow_out_of_order_execution = cursor.read_bool().map_err(fault)?;
                let receiver = cursor.read_b256().map_err(fault)?;
                let accounts = read_words(&mut cursor).map_err(fault)?;
                cursor.finish().map_err(fault)?;
                Self::SvmV1(SvmExtraArgsV1 {
                    compute_units,
                    account_is_writable_bitmap,
                    allow_out_of_order_execution,
                    token_receiver: decode_address(receiver.as_slice(), ChainFamily::Solana)?,
                    accounts: render(&accounts, ChainFamily::Solana)?,
                })
            }
            SUI_EXTRA_ARGS_V1_TAG => {
                let fault = faulted("SUIv1");
                let gas_limit = cursor.read_u256_le().map_err(fault)?;
                let allow_out_of_order_execution = cursor.read_bool().map_err(fault)?;
                let receiver = cursor.read_b256().map_err(fault)?;
                let objects = read_words(&mut cursor).map_err(fault)?;
                cursor.finish().map_err(fault)?;
                Self::SuiV1(SuiExtraArgsV1 {
                    gas_limit,
                    allow_out_of_order_execution,
                    token_receiver: decode_address(receiver.as_slice(), ChainFamily::Sui)?,
                    receiver_object_ids: render(&objects, ChainFamily::Sui)?,
                })
            }
            _ => return Ok(None),
        };
        Ok(Some(decoded))
    }

    fn with_tag(&self, payload: &[u8]) -> Bytes {
        let mut bytes = Vec::with_capacity(4 + payload.len());
        bytes.extend_from_slice(self.tag().as_slice());
        bytes.extend_from_slice(payload);
        bytes.into()
    }
}

/// Loose set of extra-args fields, as a caller would supply them when sending.
///
/// The variant is chosen by field presence, in order: any compute/account
/// field selects `SVMv1`, receiver object ids select `SUIv1`, an explicit
/// out-of-order flag selects `EVMv2`, otherwise `EVMv1`.
///
/// # Example
///
/// ```rust
/// use alloy_primitives::U256;
/// use ccip_rs::ExtraArgsRequest;
///
/// let args = ExtraArgsRequest::builder()
///     .gas_limit(U256::from(200_000u64))
///     .allow_out_of_order_execution(true)
///     .build()
///     .into_extra_args()
///     .unwrap();
/// assert_eq!(args.tag_name(), "EVMv2");
/// ```
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraArgsRequest {
    pub gas_limit: Option<U256>,
    pub allow_out_of_order_execution: Option<bool>,
    pub compute_units: Option<u32>,
    pub account_is_writable_bitmap: Option<u64>,
    pub token_receiver: Option<String>,
    pub accounts: Option<Vec<String>>,
    pub receiver_object_ids: Option<Vec<String>>,
}

impl ExtraArgsRequest {
    /// Resolves the field set into exactly one variant.
    ///
    /// # Errors
    ///
    /// [`CcipError::ExtraArgsEncode`] when the selected variant misses a
    /// required field that has no default.
    pub fn into_extra_args(self) -> Result<ExtraArgs> {
        let missing = |variant: &str, field: &str| CcipError::ExtraArgsEncode {
            reason: format!("{variant} requires `{field}`"),
        };

        if self.compute_units.is_some()
            || self.account_is_writable_bitmap.is_some()
            || self.accounts.is_some()
        {
            return Ok(ExtraArgs::SvmV1(SvmExtraArgsV1 {
                compute_units: self
                    .compute_units
                    .ok_or_else(|| missing("SVMv1", "computeUnits"))?,
                account_is_writable_bitmap: self.account_is_writable_bitmap.unwrap_or_default(),
                allow_out_of_order_execution: self.allow_out_of_order_execution.unwrap_or(true),
                token_receiver: self
                    .token_receiver
                    .unwrap_or_else(|| bs58::encode([0u8; 32]).into_string()),
                accounts: self.accounts.unwrap_or_default(),
            }));
        }

        if let Some(receiver_object_ids) = self.receiver_object_ids {
            return Ok(ExtraArgs::SuiV1(SuiExtraArgsV1 {
                gas_limit: self.gas_limit.ok_or_else(|| missing("SUIv1", "gasLimit"))?,
                allow_out_of_order_execution: self.allow_out_of_order_execution.unwrap_or(true),
                token_receiver: self
                    .token_receiver
                    .unwrap_or_else(|| bs58::encode([0u8; 32]).into_string()),
                receiver_object_ids,
            }));
        }

        if let Some(allow_out_of_order_execution) = self.allow_out_of_order_execution {
            return Ok(ExtraArgs::EvmV2(EvmExtraArgsV2 {
                gas_limit: self.gas_limit.ok_or_else(|| missing("EVMv2", "gasLimit"))?,
                allow_out_of_order_execution,
            }));
        }

        Ok(ExtraArgs::EvmV1(EvmExtraArgsV1 {
            gas_limit: self.gas_limit.ok_or_else(|| missing("EVMv1", "gasLimit"))?,
        }))
    }

    /// Resolves the variant and ABI-encodes it.
    pub fn encode(self) -> Result<Bytes> {
        self.into_extra_args()?.encode()
    }
}

fn split_tag(data: &[u8]) -> Result<(FixedBytes<4>, &[u8])> {
    if data.len() < 4 {
        return Err(CcipError::ExtraArgsTruncated { len: data.len() });
    }
    let (tag, payload) = data.split_at(4);
    Ok((FixedBytes::from_slice(tag), payload))
}

fn words(addresses: &[String], family: ChainFamily) -> Result<Vec<B256>> {
    addresses
        .iter()
        .map(|address| encode_address_word(address, family))
        .collect()
}

fn render(words: &[B256], family: ChainFamily) -> Result<Vec<String>> {
    words
        .iter()
        .map(|word| decode_address(word.as_slice(), family))
        .collect()
}

fn read_words(cursor: &mut Cursor<'_>) -> std::result::Result<Vec<B256>, DecodeFault> {
    let len = cursor.read_uleb128()?;
    (0..len).map(|_| cursor.read_b256()).collect()
}

fn malformed(variant: &'static str) -> impl Fn(alloy_sol_types::Error) -> CcipError {
    move |_| CcipError::ExtraArgsDecode {
        variant,
        fault: DecodeFault::InvalidValue("malformed ABI payload"),
    }
}

fn faulted(variant: &'static str) -> impl Fn(DecodeFault) -> CcipError + Copy {
    move |fault| CcipError::ExtraArgsDecode { variant, fault }
}

/// Hex form of an unrecognized tag, for [`CcipError::UnknownExtraArgs`].
pub(crate) fn tag_hex(data: &[u8]) -> String {
    hex::encode(&data[..data.len().min(4)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use rstest::rstest;

    fn solana_key(byte: u8) -> String {
        bs58::encode([byte; 32]).into_string()
    }

    fn svm_args() -> ExtraArgs {
        ExtraArgs::SvmV1(SvmExtraArgsV1 {
            compute_units: 400_000,
            account_is_writable_bitmap: 0b101,
            allow_out_of_order_execution: true,
            token_receiver: solana_key(9),
            accounts: vec![solana_key(1), solana_key(2), solana_key(3)],
        })
    }

    fn sui_args() -> ExtraArgs {
        ExtraArgs::SuiV1(SuiExtraArgsV1 {
            gas_limit: U256::from(1_000_000u64),
            allow_out_of_order_execution: true,
            token_receiver: solana_key(4),
            receiver_object_ids: vec![solana_key(5), solana_key(6)],
        })
    }

    fn evm_v1() -> ExtraArgs {
        ExtraArgs::EvmV1(EvmExtraArgsV1 {
            gas_limit: U256::from(200_000u64),
        })
    }

    fn evm_v2() -> ExtraArgs {
        ExtraArgs::EvmV2(EvmExtraArgsV2 {
            gas_limit: U256::from(250_000u64),
            allow_out_of_order_execution: true,
        })
    }

    #[test]
    fn test_evm_v2_wire_bytes() {
        let encoded = evm_v2().encode().unwrap();
        assert_snapshot!(
            hex::encode_prefixed(&encoded),
            @"0x181dcf10000000000000000000000000000000000000000000000000000000000003d0900000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_evm_v1_wire_bytes() {
        let encoded = evm_v1().encode().unwrap();
        assert_snapshot!(
            hex::encode_prefixed(&encoded),
            @"0x97a657c90000000000000000000000000000000000000000000000000000000000030d40"
        );
    }

    #[test]
    fn test_evm_v2_bcs_wire_bytes() {
        let encoded = evm_v2().encode_for(ChainFamily::Aptos).unwrap();
        assert_snapshot!(
            hex::encode_prefixed(&encoded),
            @"0x181dcf1090d003000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_evm_v2_roundtrip_keeps_tag() {
        let decoded = ExtraArgs::decode(&evm_v2().encode().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(decoded, evm_v2());
        assert_eq!(decoded.tag_name(), "EVMv2");
        let json = serde_json::to_value(&decoded).unwrap();
        assert_eq!(json["_tag"], "EVMv2");
        assert_eq!(json["allowOutOfOrderExecution"], true);
    }

    #[rstest]
    #[case::evm_v1(evm_v1())]
    #[case::evm_v2(evm_v2())]
    #[case::svm(svm_args())]
    #[case::sui(sui_args())]
    fn test_abi_roundtrip(#[case] args: ExtraArgs) {
        let encoded = args.encode().unwrap();
        assert_eq!(&encoded[..4], args.tag().as_slice());
        assert_eq!(ExtraArgs::decode(&encoded).unwrap(), Some(args));
    }

    #[rstest]
    #[case::evm_v1(evm_v1())]
    #[case::evm_v2(evm_v2())]
    #[case::svm(svm_args())]
    #[case::sui(sui_args())]
    fn test_bcs_roundtrip(#[case] args: ExtraArgs) {
        let encoded = args.encode_for(ChainFamily::Aptos).unwrap();
        assert_eq!(
            ExtraArgs::decode_from(&encoded, ChainFamily::Aptos).unwrap(),
            Some(args)
        );
    }

    #[test]
    fn test_layout_depends_on_origin() {
        let abi = evm_v2().encode_for(ChainFamily::Evm).unwrap();
        let bcs = evm_v2().encode_for(ChainFamily::Aptos).unwrap();
        assert_eq!(&abi[..4], &bcs[..4]);
        assert_ne!(abi, bcs);
        assert_eq!(abi.len(), 68);
        assert_eq!(bcs.len(), 37);
    }

    #[test]
    fn test_svm_abi_payload_is_offset_prefixed() {
        let encoded = svm_args().encode().unwrap();
        // dynamic tuple: first word is the offset to the tuple body
        assert_eq!(U256::from_be_slice(&encoded[4..36]), U256::from(32u64));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0x18])]
    #[case(&[0x18, 0x1d, 0xcf])]
    fn test_short_input_is_truncated(#[case] data: &[u8]) {
        assert!(matches!(
            ExtraArgs::decode(data),
            Err(CcipError::ExtraArgsTruncated { len }) if len == data.len()
        ));
        assert!(matches!(
            ExtraArgs::decode_from(data, ChainFamily::Aptos),
            Err(CcipError::ExtraArgsTruncated { .. })
        ));
    }

    #[test]
    fn test_unknown_tag_is_not_an_error() {
        let data = hex::decode("deadbeef0000").unwrap();
        assert_eq!(ExtraArgs::decode(&data).unwrap(), None);
        assert_eq!(
            ExtraArgs::decode_from(&data, ChainFamily::Aptos).unwrap(),
            None
        );
        assert_eq!(tag_hex(&data), "deadbeef");
    }

    #[test]
    fn test_known_tag_bad_payload_fails() {
        let mut data = EVM_EXTRA_ARGS_V2_TAG.to_vec();
        data.extend_from_slice(&[0u8; 10]);
        assert!(matches!(
            ExtraArgs::decode(&data),
            Err(CcipError::ExtraArgsDecode {
                variant: "EVMv2",
                ..
            })
        ));
    }

    #[test]
    fn test_bcs_trailing_bytes_fail() {
        let mut data = evm_v1().encode_for(ChainFamily::Aptos).unwrap().to_vec();
        data.push(0);
        assert!(matches!(
            ExtraArgs::decode_from(&data, ChainFamily::Aptos),
            Err(CcipError::ExtraArgsDecode {
                variant: "EVMv1",
                fault: DecodeFault::TrailingBytes { remaining: 1 }
            })
        ));
    }

    #[test]
    fn test_request_dispatch_order() {
        let svm = ExtraArgsRequest::builder()
            .compute_units(1)
            .receiver_object_ids(vec![])
            .allow_out_of_order_execution(false)
            .build()
            .into_extra_args()
            .unwrap();
        assert_eq!(svm.tag_name(), "SVMv1");

        let sui = ExtraArgsRequest::builder()
            .gas_limit(U256::from(1u64))
            .receiver_object_ids(vec![])
            .allow_out_of_order_execution(false)
            .build()
            .into_extra_args()
            .unwrap();
        assert_eq!(sui.tag_name(), "SUIv1");

        let v2 = ExtraArgsRequest::builder()
            .gas_limit(U256::from(1u64))
            .allow_out_of_order_execution(false)
            .build()
            .into_extra_args()
            .unwrap();
        assert_eq!(v2.tag_name(), "EVMv2");

        let v1 = ExtraArgsRequest::builder()
            .gas_limit(U256::from(1u64))
            .build()
            .into_extra_args()
            .unwrap();
        assert_eq!(v1.tag_name(), "EVMv1");
    }

    #[test]
    fn test_request_missing_required_field() {
        let err = ExtraArgsRequest::default().encode().unwrap_err();
        assert!(matches!(err, CcipError::ExtraArgsEncode { .. }));

        let err = ExtraArgsRequest::builder()
            .accounts(vec![])
            .build()
            .into_extra_args()
            .unwrap_err();
        assert!(err.to_string().contains("computeUnits"));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(evm_v1().allow_out_of_order_execution(), None);
        assert_eq!(evm_v2().allow_out_of_order_execution(), Some(true));
        assert_eq!(svm_args().gas_limit(), None);
        assert_eq!(sui_args().gas_limit(), Some(U256::from(1_000_000u64)));
    }
}
