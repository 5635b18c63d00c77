//! v2.0 `MessageV1` wire format
//!
//! ```text
//! version:u8(=1) | sourceChainSelector:u64 | destChainSelector:u64 | messageNumber:u64
//! | executionGasLimit:u32 | ccipReceiveGasLimit:u32 | finality:u16 | ccvAndExecutorHash:32
//! | onRampAddrLen:u8 + onRampAddr | offRampAddrLen:u8 + offRampAddr
//! | senderLen:u8 + sender | receiverLen:u8 + receiver
//! | destBlobLen:u16 + destBlob | tokenTransferLen:u16 + tokenTransfer? | dataLen:u16 + data
//! ```
//!
//! Integers are big-endian. A token transfer is either absent (length zero) or
//! exactly one `TokenTransferV1`:
//!
//! ```text
//! version:u8(=1) | amount:u256 | sourcePoolAddrLen:u8 + addr | sourceTokenAddrLen:u8 + addr
//! | destTokenAddrLen:u8 + addr | tokenReceiverLen:u8 + addr | extraDataLen:u16 + bytes
//! ```

use alloy_primitives::{Bytes, B256, U256};
use alloy_sol_types::SolEvent;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{CcipMessage, MessageEnvelope, MessageHeader, RawLog, TokenAmount};
use crate::abi::v2::CCIPMessageSent;
use crate::address::decode_address;
use crate::chain::FamilyResolver;
use crate::codec::{AtField, Cursor};
use crate::error::{CcipError, DecodeFault, MessageField, Result};
use crate::extra_args::{EvmExtraArgsV2, ExtraArgs};

pub const MESSAGE_V1_VERSION: u8 = 1;
pub const TOKEN_TRANSFER_V1_VERSION: u8 = 1;

pub(super) const TOPIC: B256 = CCIPMessageSent::SIGNATURE_HASH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransferV1 {
    pub amount: U256,
    pub source_pool_address: Bytes,
    pub source_token_address: Bytes,
    pub dest_token_address: Bytes,
    pub token_receiver: Bytes,
    pub extra_data: Bytes,
}

/// A decoded `MessageV1` buffer. Addresses are raw bytes in their own family's
/// encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageV1 {
    pub source_chain_selector: u64,
    pub dest_chain_selector: u64,
    pub message_number: u64,
    pub execution_gas_limit: u32,
    pub ccip_receive_gas_limit: u32,
    pub finality: u16,
    pub ccv_and_executor_hash: B256,
    pub on_ramp_address: Bytes,
    pub off_ramp_address: Bytes,
    pub sender: Bytes,
    pub receiver: Bytes,
    pub dest_blob: Bytes,
    pub token_transfer: Option<TokenTransferV1>,
    pub data: Bytes,
}

impl MessageV1 {
    /// Decodes a buffer, which must be consumed exactly.
    ///
    /// # Errors
    ///
    /// [`CcipError::MessageDecode`] naming the field whose bytes were wrong.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);

        let version = cursor.read_u8().at(MessageField::Version)?;
        if version != MESSAGE_V1_VERSION {
            return Err(CcipError::MessageDecode {
                field: MessageField::Version,
                fault: DecodeFault::UnsupportedVersion(version),
            });
        }

        let source_chain_selector = cursor.read_u64_be().at(MessageField::SourceChainSelector)?;
        let dest_chain_selector = cursor.read_u64_be().at(MessageField::DestChainSelector)?;
        let message_number = cursor.read_u64_be().at(MessageField::MessageNumber)?;
        let execution_gas_limit = cursor.read_u32_be().at(MessageField::ExecutionGasLimit)?;
        let ccip_receive_gas_limit = cursor.read_u32_be().at(MessageField::CcipReceiveGasLimit)?;
        let finality = cursor.read_u16_be().at(MessageField::Finality)?;
        let ccv_and_executor_hash = cursor.read_b256().at(MessageField::CcvAndExecutorHash)?;
        let on_ramp_address = owned(cursor.read_u8_prefixed().at(MessageField::OnRampAddress)?);
        let off_ramp_address = owned(cursor.read_u8_prefixed().at(MessageField::OffRampAddress)?);
        let sender = owned(cursor.read_u8_prefixed().at(MessageField::Sender)?);
        let receiver = owned(cursor.read_u8_prefixed().at(MessageField::Receiver)?);
        let dest_blob = owned(cursor.read_u16_prefixed().at(MessageField::DestBlob)?);

        let token_transfer = match cursor.read_u16_prefixed().at(MessageField::TokenTransfer)? {
            [] => None,
            encoded => Some(TokenTransferV1::decode(encoded)?),
        };

        let data = owned(cursor.read_u16_prefixed().at(MessageField::Data)?);
        cursor.finish().at(MessageField::Message)?;

        trace!(
            message_number,
            len = bytes.len(),
            event = "message_v1_decoded"
        );

        Ok(Self {
            source_chain_selector,
            dest_chain_selector,
            message_number,
            execution_gas_limit,
            ccip_receive_gas_limit,
            finality,
            ccv_and_executor_hash,
            on_ramp_address,
            off_ramp_address,
            sender,
            receiver,
            dest_blob,
            token_transfer,
            data,
        })
    }

    /// Encodes into the wire layout; the inverse of [`decode`](Self::decode).
    ///
    /// # Errors
    ///
    /// [`CcipError::MessageEncode`] when a variable field exceeds its length prefix.
    pub fn encode(&self) -> Result<Bytes> {
        let mut out = Vec::with_capacity(
            100 + self.sender.len() + self.receiver.len() + self.data.len() + self.dest_blob.len(),
        );
        out.push(MESSAGE_V1_VERSION);
        out.extend_from_slice(&self.source_chain_selector.to_be_bytes());
        out.extend_from_slice(&self.dest_chain_selector.to_be_bytes());
        out.extend_from_slice(&self.message_number.to_be_bytes());
        out.extend_from_slice(&self.execution_gas_limit.to_be_bytes());
        out.extend_from_slice(&self.ccip_receive_gas_limit.to_be_bytes());
        out.extend_from_slice(&self.finality.to_be_bytes());
        out.extend_from_slice(self.ccv_and_executor_hash.as_slice());
        put_u8_prefixed(&mut out, &self.on_ramp_address, MessageField::OnRampAddress)?;
        put_u8_prefixed(&mut out, &self.off_ramp_address, MessageField::OffRampAddress)?;
        put_u8_prefixed(&mut out, &self.sender, MessageField::Sender)?;
        put_u8_prefixed(&mut out, &self.receiver, MessageField::Receiver)?;
        put_u16_prefixed(&mut out, &self.dest_blob, MessageField::DestBlob)?;
        let token_transfer = match &self.token_transfer {
            Some(transfer) => transfer.encode()?,
            None => Vec::new(),
        };
        put_u16_prefixed(&mut out, &token_transfer, MessageField::TokenTransfer)?;
        put_u16_prefixed(&mut out, &self.data, MessageField::Data)?;
        Ok(out.into())
    }
}

impl TokenTransferV1 {
    fn decode(encoded: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(encoded);

        let version = cursor.read_u8().at(MessageField::TokenTransferVersion)?;
        if version != TOKEN_TRANSFER_V1_VERSION {
            return Err(CcipError::MessageDecode {
                field: MessageField::TokenTransferVersion,
                fault: DecodeFault::UnsupportedVersion(version),
            });
        }
        let amount = cursor.read_u256_be().at(MessageField::TokenAmount)?;
        let source_pool_address =
            owned(cursor.read_u8_prefixed().at(MessageField::SourcePoolAddress)?);
        let source_token_address =
            owned(cursor.read_u8_prefixed().at(MessageField::SourceTokenAddress)?);
        let dest_token_address =
            owned(cursor.read_u8_prefixed().at(MessageField::DestTokenAddress)?);
        let token_receiver = owned(cursor.read_u8_prefixed().at(MessageField::TokenReceiver)?);
        let extra_data = owned(cursor.read_u16_prefixed().at(MessageField::ExtraData)?);
        cursor.expect_position(encoded.len()).at(MessageField::TokenTransfer)?;

        Ok(Self {
            amount,
            source_pool_address,
            source_token_address,
            dest_token_address,
            token_receiver,
            extra_data,
        })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(40 + self.extra_data.len());
        out.push(TOKEN_TRANSFER_V1_VERSION);
        out.extend_from_slice(&self.amount.to_be_bytes::<32>());
        put_u8_prefixed(&mut out, &self.source_pool_address, MessageField::SourcePoolAddress)?;
        put_u8_prefixed(&mut out, &self.source_token_address, MessageField::SourceTokenAddress)?;
        put_u8_prefixed(&mut out, &self.dest_token_address, MessageField::DestTokenAddress)?;
        put_u8_prefixed(&mut out, &self.token_receiver, MessageField::TokenReceiver)?;
        put_u16_prefixed(&mut out, &self.extra_data, MessageField::ExtraData)?;
        Ok(out)
    }
}

fn owned(slice: &[u8]) -> Bytes {
    Bytes::copy_from_slice(slice)
}

fn put_u8_prefixed(out: &mut Vec<u8>, value: &[u8], field: MessageField) -> Result<()> {
    let len = u8::try_from(value.len()).map_err(|_| CcipError::MessageEncode {
        field,
        len: value.len(),
        max: u8::MAX as usize,
    })?;
    out.push(len);
    out.extend_from_slice(value);
    Ok(())
}

fn put_u16_prefixed(out: &mut Vec<u8>, value: &[u8], field: MessageField) -> Result<()> {
    let len = u16::try_from(value.len()).map_err(|_| CcipError::MessageEncode {
        field,
        len: value.len(),
        max: u16::MAX as usize,
    })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(value);
    Ok(())
}

pub(super) fn decode_event<R: FamilyResolver>(log: &RawLog, resolver: &R) -> Result<CcipMessage> {
    let event = CCIPMessageSent::decode_raw_log(log.topics.iter().copied(), &log.data)?;
    let wire = MessageV1::decode(&event.encodedMessage)?;
    from_wire(
        wire,
        event.messageId,
        event.feeToken.to_checksum(None),
        event.feeTokenAmount,
        resolver,
    )
}

/// Normalizes a `MessageV1` into a canonical message.
///
/// v2.0 executes every message out of order with no nonce; the receive gas
/// limit becomes the `EVMv2` gas limit.
pub(crate) fn from_wire<R: FamilyResolver>(
    wire: MessageV1,
    message_id: B256,
    fee_token: String,
    fee_token_amount: U256,
    resolver: &R,
) -> Result<CcipMessage> {
    let source = resolver.require_family(wire.source_chain_selector)?;
    let dest = resolver.require_family(wire.dest_chain_selector)?;

    let token_amounts = match &wire.token_transfer {
        Some(transfer) => vec![TokenAmount {
            source_pool_address: decode_address(&transfer.source_pool_address, source)?,
            source_token_address: Some(decode_address(&transfer.source_token_address, source)?),
            dest_token_address: decode_address(&transfer.dest_token_address, dest)?,
            dest_gas_amount: 0,
            extra_data: transfer.extra_data.clone(),
            amount: transfer.amount,
        }],
        None => Vec::new(),
    };

    Ok(CcipMessage {
        header: MessageHeader {
            message_id,
            source_chain_selector: wire.source_chain_selector,
            dest_chain_selector: wire.dest_chain_selector,
            sequence_number: wire.message_number,
            nonce: 0,
        },
        sender: decode_address(&wire.sender, source)?,
        receiver: decode_address(&wire.receiver, dest)?,
        data: wire.data.clone(),
        fee_token,
        fee_token_amount,
        token_amounts,
        extra_args: ExtraArgs::EvmV2(EvmExtraArgsV2 {
            gas_limit: U256::from(wire.ccip_receive_gas_limit),
            allow_out_of_order_execution: true,
        }),
        envelope: MessageEnvelope::Wire(wire),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::decode_message;
    use crate::testing::fixtures;
    use rstest::rstest;

    fn sample(with_token: bool) -> MessageV1 {
        fixtures::wire_message(17, with_token)
    }

    #[test]
    fn test_roundtrip_with_token() {
        let message = sample(true);
        let encoded = message.encode().unwrap();
        assert_eq!(MessageV1::decode(&encoded).unwrap(), message);
    }

    #[test]
    fn test_roundtrip_empty_variable_fields() {
        let mut message = sample(false);
        message.data = Bytes::new();
        message.dest_blob = Bytes::new();
        let encoded = message.encode().unwrap();
        // fixed header 67 bytes, four u8 prefixes, three u16 prefixes
        let fixed = 67 + 4 + 6;
        let addresses = message.on_ramp_address.len()
            + message.off_ramp_address.len()
            + message.sender.len()
            + message.receiver.len();
        assert_eq!(encoded.len(), fixed + addresses);
        assert_eq!(MessageV1::decode(&encoded).unwrap(), message);
    }

    /// Byte offsets at which each field of `sample(true)` starts.
    fn boundaries(message: &MessageV1) -> Vec<(usize, MessageField)> {
        let mut at = 0;
        let mut out = Vec::new();
        let mut step = |field, len: usize| {
            out.push((at, field));
            at += len;
        };
        step(MessageField::Version, 1);
        step(MessageField::SourceChainSelector, 8);
        step(MessageField::DestChainSelector, 8);
        step(MessageField::MessageNumber, 8);
        step(MessageField::ExecutionGasLimit, 4);
        step(MessageField::CcipReceiveGasLimit, 4);
        step(MessageField::Finality, 2);
        step(MessageField::CcvAndExecutorHash, 32);
        step(MessageField::OnRampAddress, 1 + message.on_ramp_address.len());
        step(MessageField::OffRampAddress, 1 + message.off_ramp_address.len());
        step(MessageField::Sender, 1 + message.sender.len());
        step(MessageField::Receiver, 1 + message.receiver.len());
        step(MessageField::DestBlob, 2 + message.dest_blob.len());
        let transfer_len = message
            .token_transfer
            .as_ref()
            .map(|t| t.encode().unwrap().len())
            .unwrap_or(0);
        step(MessageField::TokenTransfer, 2 + transfer_len);
        step(MessageField::Data, 2 + message.data.len());
        out
    }

    #[test]
    fn test_truncation_names_the_field() {
        let message = sample(true);
        let encoded = message.encode().unwrap();
        for (start, field) in boundaries(&message) {
            let err = MessageV1::decode(&encoded[..start]).unwrap_err();
            assert!(
                matches!(
                    err,
                    CcipError::MessageDecode {
                        field: f,
                        fault: DecodeFault::Truncated { .. },
                    } if f == field
                ),
                "cut at {start}: expected {field}, got {err}"
            );
        }
    }

    #[test]
    fn test_truncation_inside_sender() {
        let message = sample(false);
        let encoded = message.encode().unwrap();
        let (start, _) = boundaries(&message)[10];
        let err = MessageV1::decode(&encoded[..start + 3]).unwrap_err();
        assert!(matches!(
            err,
            CcipError::MessageDecode {
                field: MessageField::Sender,
                fault: DecodeFault::Truncated { needed: 20, remaining: 2 }
            }
        ));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut encoded = sample(false).encode().unwrap().to_vec();
        encoded.push(0);
        assert!(matches!(
            MessageV1::decode(&encoded),
            Err(CcipError::MessageDecode {
                field: MessageField::Message,
                fault: DecodeFault::TrailingBytes { remaining: 1 }
            })
        ));
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    fn test_unsupported_version(#[case] version: u8) {
        let mut encoded = sample(false).encode().unwrap().to_vec();
        encoded[0] = version;
        assert!(matches!(
            MessageV1::decode(&encoded),
            Err(CcipError::MessageDecode {
                field: MessageField::Version,
                fault: DecodeFault::UnsupportedVersion(v)
            }) if v == version
        ));
    }

    #[test]
    fn test_token_transfer_length_mismatch() {
        let message = sample(true);
        let transfer = message.token_transfer.as_ref().unwrap().encode().unwrap();
        // declare one spare byte inside the token transfer
        let mut padded = transfer.clone();
        padded.push(0xff);
        let mut tampered = message.clone();
        tampered.token_transfer = None;
        let plain = tampered.encode().unwrap();
        let at = plain.len() - (2 + tampered.data.len()) - 2;
        let mut encoded = plain[..at].to_vec();
        encoded.extend_from_slice(&(padded.len() as u16).to_be_bytes());
        encoded.extend_from_slice(&padded);
        encoded.extend_from_slice(&plain[at + 2..]);
        assert!(matches!(
            MessageV1::decode(&encoded),
            Err(CcipError::MessageDecode {
                field: MessageField::TokenTransfer,
                fault: DecodeFault::LengthMismatch { .. }
            })
        ));
    }

    #[test]
    fn test_oversized_field_fails_to_encode() {
        let mut message = sample(false);
        message.sender = Bytes::from(vec![1u8; 256]);
        assert!(matches!(
            message.encode(),
            Err(CcipError::MessageEncode {
                field: MessageField::Sender,
                len: 256,
                max: 255
            })
        ));
    }

    #[test]
    fn test_event_normalizes() {
        let wire = sample(true);
        let log = fixtures::wire_send_log(&wire);
        let message = decode_message(&log, &fixtures::resolver()).unwrap().unwrap();
        assert_eq!(message.sequence_number(), 17);
        assert!(message.allow_out_of_order_execution());
        assert_eq!(message.gas_limit(), U256::from(wire.ccip_receive_gas_limit));
        assert_eq!(message.token_amounts.len(), 1);
        assert_eq!(message.receiver, fixtures::RECEIVER);
        assert!(matches!(message.envelope, MessageEnvelope::Wire(ref w) if *w == wire));
    }
}
