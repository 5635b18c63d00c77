//! Canonical CCIP message and its per-version decoders
//!
//! Every protocol generation emits a different on-ramp event:
//!
//! | Version     | Event                                   | Payload                 |
//! |-------------|-----------------------------------------|-------------------------|
//! | v1.2 / v1.5 | `CCIPSendRequested(EVM2EVMMessage)`     | ABI struct              |
//! | v1.6        | `CCIPMessageSent(.., EVM2AnyRampMessage)` | ABI struct + extra args |
//! | v2.0        | `CCIPMessageSent(.., bytes)`            | [`MessageV1`] buffer    |
//!
//! All of them converge on [`CcipMessage`]. Fields that only one generation
//! carries (and that leaf hashing or execution still needs) are kept in the
//! [`MessageEnvelope`].
//!
//! A log whose first topic matches none of the known signatures is not an
//! error: [`decode_message`] returns `Ok(None)` so callers can try other
//! shapes.

pub(crate) mod legacy;
pub(crate) mod ramp;
mod wire;

use alloy_primitives::{hex, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::{FamilyResolver, ProtocolVersion};
use crate::error::{CcipError, Result};
use crate::extra_args::ExtraArgs;

pub use wire::{MessageV1, TokenTransferV1, MESSAGE_V1_VERSION, TOKEN_TRANSFER_V1_VERSION};

/// Fields shared by every message generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    pub message_id: B256,
    pub source_chain_selector: u64,
    pub dest_chain_selector: u64,
    pub sequence_number: u64,
    pub nonce: u64,
}

/// One token transfer, with addresses in canonical form.
///
/// `source_pool_address` and `source_token_address` are in the source family,
/// `dest_token_address` in the destination family. Legacy v1.2 messages do not
/// expose pool or destination token, which are then empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub source_pool_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_token_address: Option<String>,
    pub dest_token_address: String,
    pub dest_gas_amount: u32,
    pub extra_data: Bytes,
    pub amount: U256,
}

/// Generation-specific leftovers of the on-ramp event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MessageEnvelope {
    /// v1.2 / v1.5 `EVM2EVMMessage`
    #[serde(rename_all = "camelCase")]
    Legacy {
        strict: bool,
        source_token_data: Vec<Bytes>,
    },
    /// v1.6 `EVM2AnyRampMessage`
    #[serde(rename_all = "camelCase")]
    Ramp {
        extra_args: Bytes,
        fee_value_juels: U256,
    },
    /// v2.0 `MessageV1`, kept verbatim since its encoding is the leaf pre-image
    Wire(MessageV1),
}

/// A cross-chain message in canonical form.
///
/// Built once by a decoder and not mutated afterwards. Extra args are always
/// present: generations that do not carry an explicit blob get the semantics
/// their contracts apply (`EVMv2` with `allowOutOfOrderExecution = nonce == 0`
/// on v1.2 / v1.5, out-of-order on v2.0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CcipMessage {
    pub header: MessageHeader,
    pub sender: String,
    pub receiver: String,
    pub data: Bytes,
    pub fee_token: String,
    pub fee_token_amount: U256,
    pub token_amounts: Vec<TokenAmount>,
    #[serde(flatten)]
    pub extra_args: ExtraArgs,
    pub envelope: MessageEnvelope,
}

impl CcipMessage {
    pub fn message_id(&self) -> B256 {
        self.header.message_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.header.sequence_number
    }

    /// Destination gas limit for `ccipReceive`, zero when the variant has none
    pub fn gas_limit(&self) -> U256 {
        self.extra_args.gas_limit().unwrap_or_default()
    }

    pub fn allow_out_of_order_execution(&self) -> bool {
        self.extra_args
            .allow_out_of_order_execution()
            .unwrap_or(self.header.nonce == 0)
    }

    /// The protocol generation that produced this message. v1.2 and v1.5 share
    /// one layout and report [`ProtocolVersion::V1_5`].
    pub fn generation(&self) -> ProtocolVersion {
        match self.envelope {
            MessageEnvelope::Legacy { .. } => ProtocolVersion::V1_5,
            MessageEnvelope::Ramp { .. } => ProtocolVersion::V1_6,
            MessageEnvelope::Wire(_) => ProtocolVersion::V2_0,
        }
    }
}

/// An event log as delivered by a chain client.
///
/// Only `topics` and `data` take part in decoding; the position fields are
/// carried through for callers that need to refetch or paginate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    pub address: String,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_index: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonLog {
    #[serde(default)]
    address: String,
    topics: Vec<B256>,
    data: serde_json::Value,
    #[serde(default)]
    block_number: Option<u64>,
    #[serde(default)]
    transaction_hash: Option<B256>,
    #[serde(default)]
    log_index: Option<u64>,
}

impl RawLog {
    pub fn new(address: impl Into<String>, topics: Vec<B256>, data: impl Into<Bytes>) -> Self {
        Self {
            address: address.into(),
            topics,
            data: data.into(),
            ..Default::default()
        }
    }

    /// Builds a log from hex-encoded data.
    ///
    /// # Errors
    ///
    /// [`CcipError::LogDataInvalid`] when `data` is not hex.
    pub fn from_hex(address: impl Into<String>, topics: Vec<B256>, data: &str) -> Result<Self> {
        Ok(Self::new(address, topics, log_bytes(data)?))
    }

    /// Parses a JSON log object whose `data` is a hex string.
    pub fn from_json(json: &str) -> Result<Self> {
        let log: JsonLog = serde_json::from_str(json)?;
        let data = match &log.data {
            serde_json::Value::String(data) => log_bytes(data)?,
            other => {
                return Err(CcipError::LogDataInvalid {
                    reason: format!("expected a hex string, found {other}"),
                })
            }
        };
        Ok(Self {
            address: log.address,
            topics: log.topics,
            data,
            block_number: log.block_number,
            transaction_hash: log.transaction_hash,
            log_index: log.log_index,
        })
    }

    pub fn topic0(&self) -> Option<B256> {
        self.topics.first().copied()
    }
}

fn log_bytes(data: &str) -> Result<Bytes> {
    hex::decode(data)
        .map(Bytes::from)
        .map_err(|e| CcipError::LogDataInvalid {
            reason: e.to_string(),
        })
}

/// Decodes an on-ramp log of any known generation.
///
/// Returns `Ok(None)` when the log's first topic matches no known on-ramp
/// event. The resolver maps chain selectors to families for address rendering.
///
/// # Example
///
/// ```rust
/// use ccip_rs::{decode_message, KnownChains, RawLog};
///
/// let unrelated = RawLog::new("0x00", vec![Default::default()], vec![]);
/// assert!(decode_message(&unrelated, &KnownChains).unwrap().is_none());
/// ```
pub fn decode_message<R: FamilyResolver>(
    log: &RawLog,
    resolver: &R,
) -> Result<Option<CcipMessage>> {
    let Some(topic) = log.topic0() else {
        return Ok(None);
    };

    let message = if topic == legacy::TOPIC {
        legacy::decode(log)?
    } else if topic == ramp::TOPIC {
        ramp::decode(log, resolver)?
    } else if topic == wire::TOPIC {
        wire::decode_event(log, resolver)?
    } else {
        return Ok(None);
    };

    debug!(
        message_id = %message.header.message_id,
        sequence_number = message.header.sequence_number,
        generation = %message.generation(),
        event = "message_decoded"
    );
    Ok(Some(message))
}

/// First topic of the send event emitted by a `version` on-ramp.
pub fn message_topic(version: ProtocolVersion) -> B256 {
    match version {
        ProtocolVersion::V1_2 | ProtocolVersion::V1_5 => legacy::TOPIC,
        ProtocolVersion::V1_6 => ramp::TOPIC,
        ProtocolVersion::V2_0 => wire::TOPIC,
    }
}

/// Decodes an on-ramp log known to come from a `version` on-ramp.
///
/// Returns `Ok(None)` when the log is not that version's send event.
pub fn decode_message_for_version<R: FamilyResolver>(
    log: &RawLog,
    version: ProtocolVersion,
    resolver: &R,
) -> Result<Option<CcipMessage>> {
    if log.topic0() != Some(message_topic(version)) {
        return Ok(None);
    }
    decode_message(log, resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use crate::KnownChains;

    #[test]
    fn test_unknown_topic_is_none() {
        let log = RawLog::new("0x01", vec![B256::repeat_byte(0xee)], vec![1, 2, 3]);
        assert!(decode_message(&log, &KnownChains).unwrap().is_none());
        let empty = RawLog::default();
        assert!(decode_message(&empty, &KnownChains).unwrap().is_none());
    }

    #[test]
    fn test_version_pin_rejects_other_generation() {
        let log = fixtures::legacy_send_log(7, 0);
        let resolver = fixtures::resolver();
        assert!(
            decode_message_for_version(&log, ProtocolVersion::V1_6, &resolver)
                .unwrap()
                .is_none()
        );
        let message = decode_message_for_version(&log, ProtocolVersion::V1_2, &resolver)
            .unwrap()
            .unwrap();
        assert_eq!(message.sequence_number(), 7);
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let err = RawLog::from_hex("0x01", vec![], "0xnothex").unwrap_err();
        assert!(matches!(err, CcipError::LogDataInvalid { .. }));
    }

    #[test]
    fn test_from_json() {
        let topic = format!("0x{}", "ab".repeat(32));
        let json = format!(
            r#"{{"address":"0x01","topics":["{topic}"],"data":"0x0102","blockNumber":12,"logIndex":3}}"#
        );
        let log = RawLog::from_json(&json).unwrap();
        assert_eq!(&log.data[..], &[1, 2]);
        assert_eq!(log.topic0(), Some(B256::repeat_byte(0xab)));
        assert_eq!(log.block_number, Some(12));
        assert_eq!(log.log_index, Some(3));

        let numeric = r#"{"topics":[],"data":42}"#;
        assert!(matches!(
            RawLog::from_json(numeric),
            Err(CcipError::LogDataInvalid { .. })
        ));
    }

    #[test]
    fn test_serialized_message_flattens_extra_args() {
        let log = fixtures::ramp_send_log(fixtures::ramp_message(3, 1));
        let message = decode_message(&log, &fixtures::resolver()).unwrap().unwrap();
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["_tag"], "EVMv2");
        assert_eq!(json["header"]["sequenceNumber"], 3);
        assert_eq!(json["envelope"]["kind"], "ramp");
        let back: CcipMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }
}
