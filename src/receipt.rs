//! Execution receipts emitted by off-ramps

use alloy_primitives::{Bytes, B256, U256};
use alloy_sol_types::SolEvent;
use serde::{Deserialize, Serialize};

use crate::abi::{evm2evm, ramp};
use crate::error::{CcipError, DecodeFault, Result};
use crate::message::RawLog;

/// Off-ramp execution state of a message, as stored on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionState {
    Untouched,
    InProgress,
    Success,
    Failed,
}

impl TryFrom<u8> for ExecutionState {
    type Error = CcipError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Untouched),
            1 => Ok(Self::InProgress),
            2 => Ok(Self::Success),
            3 => Ok(Self::Failed),
            _ => Err(CcipError::LogDataInvalid {
                reason: DecodeFault::InvalidValue("execution state out of range").to_string(),
            }),
        }
    }
}

/// Outcome of one execution attempt.
///
/// v1.6 off-ramps additionally report the source chain, the message hash and
/// the gas spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReceipt {
    pub message_id: B256,
    pub sequence_number: u64,
    pub state: ExecutionState,
    pub return_data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_chain_selector: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_hash: Option<B256>,
}

/// Decodes an `ExecutionStateChanged` log of any known off-ramp generation.
///
/// Returns `Ok(None)` for other topics.
pub fn decode_execution_receipt(log: &RawLog) -> Result<Option<ExecutionReceipt>> {
    let Some(topic) = log.topic0() else {
        return Ok(None);
    };

    if topic == evm2evm::ExecutionStateChanged::SIGNATURE_HASH {
        let event =
            evm2evm::ExecutionStateChanged::decode_raw_log(log.topics.iter().copied(), &log.data)?;
        return Ok(Some(ExecutionReceipt {
            message_id: event.messageId,
            sequence_number: event.sequenceNumber,
            state: event.state.try_into()?,
            return_data: event.returnData,
            gas_used: None,
            source_chain_selector: None,
            message_hash: None,
        }));
    }

    if topic == ramp::ExecutionStateChanged::SIGNATURE_HASH {
        let event =
            ramp::ExecutionStateChanged::decode_raw_log(log.topics.iter().copied(), &log.data)?;
        return Ok(Some(ExecutionReceipt {
            message_id: event.messageId,
            sequence_number: event.sequenceNumber,
            state: event.state.try_into()?,
            return_data: event.returnData,
            gas_used: Some(event.gasUsed),
            source_chain_selector: Some(event.sourceChainSelector),
            message_hash: Some(event.messageHash),
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolEvent;

    fn log_of<E: SolEvent>(event: &E) -> RawLog {
        let data = event.encode_log_data();
        RawLog::new("0x00", data.topics().to_vec(), data.data)
    }

    #[test]
    fn test_legacy_receipt() {
        let event = evm2evm::ExecutionStateChanged {
            sequenceNumber: 8,
            messageId: B256::repeat_byte(1),
            state: 3,
            returnData: Bytes::from(vec![0x08, 0xc3, 0x79, 0xa0]),
        };
        let receipt = decode_execution_receipt(&log_of(&event)).unwrap().unwrap();
        assert_eq!(receipt.state, ExecutionState::Failed);
        assert_eq!(receipt.sequence_number, 8);
        assert_eq!(receipt.gas_used, None);
    }

    #[test]
    fn test_ramp_receipt() {
        let event = ramp::ExecutionStateChanged {
            sourceChainSelector: 77,
            sequenceNumber: 9,
            messageId: B256::repeat_byte(2),
            messageHash: B256::repeat_byte(3),
            state: 2,
            returnData: Bytes::new(),
            gasUsed: U256::from(41_000u64),
        };
        let receipt = decode_execution_receipt(&log_of(&event)).unwrap().unwrap();
        assert_eq!(receipt.state, ExecutionState::Success);
        assert_eq!(receipt.source_chain_selector, Some(77));
        assert_eq!(receipt.gas_used, Some(U256::from(41_000u64)));
        assert_eq!(receipt.message_hash, Some(B256::repeat_byte(3)));
    }

    #[test]
    fn test_bad_state_fails() {
        let event = evm2evm::ExecutionStateChanged {
            sequenceNumber: 1,
            messageId: B256::ZERO,
            state: 4,
            returnData: Bytes::new(),
        };
        assert!(decode_execution_receipt(&log_of(&event)).is_err());
    }

    #[test]
    fn test_other_topic() {
        let log = RawLog::new("0x00", vec![B256::ZERO], vec![]);
        assert!(decode_execution_receipt(&log).unwrap().is_none());
    }
}
