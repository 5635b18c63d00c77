//! v1.6 `CCIPMessageSent`

use alloy_primitives::{B256, U256};
use alloy_sol_types::SolEvent;

use super::{CcipMessage, MessageEnvelope, MessageHeader, RawLog, TokenAmount};
use crate::abi::ramp::{CCIPMessageSent, EVM2AnyRampMessage, EVM2AnyTokenTransfer};
use crate::address::decode_address;
use crate::chain::{ChainFamily, FamilyResolver};
use crate::error::{CcipError, DecodeFault, MessageField, Result};
use crate::extra_args::{tag_hex, ExtraArgs};

pub(super) const TOPIC: B256 = CCIPMessageSent::SIGNATURE_HASH;

pub(super) fn decode<R: FamilyResolver>(log: &RawLog, resolver: &R) -> Result<CcipMessage> {
    let event = CCIPMessageSent::decode_raw_log(log.topics.iter().copied(), &log.data)?;
    from_ramp_message(event.message, resolver)
}

pub(crate) fn from_ramp_message<R: FamilyResolver>(
    message: EVM2AnyRampMessage,
    resolver: &R,
) -> Result<CcipMessage> {
    // the on-ramp of this generation only exists on EVM chains
    let source = ChainFamily::Evm;
    let dest = resolver.require_family(message.header.destChainSelector)?;

    let extra_args = ExtraArgs::decode(&message.extraArgs)?.ok_or_else(|| {
        CcipError::UnknownExtraArgs {
            tag: tag_hex(&message.extraArgs),
        }
    })?;

    let token_amounts = message
        .tokenAmounts
        .iter()
        .map(|token| token_amount(token, source, dest))
        .collect::<Result<Vec<_>>>()?;

    Ok(CcipMessage {
        header: MessageHeader {
            message_id: message.header.messageId,
            source_chain_selector: message.header.sourceChainSelector,
            dest_chain_selector: message.header.destChainSelector,
            sequence_number: message.header.sequenceNumber,
            nonce: message.header.nonce,
        },
        sender: message.sender.to_checksum(None),
        receiver: decode_address(&message.receiver, dest)?,
        data: message.data,
        fee_token: message.feeToken.to_checksum(None),
        fee_token_amount: message.feeTokenAmount,
        token_amounts,
        extra_args,
        envelope: MessageEnvelope::Ramp {
            extra_args: message.extraArgs,
            fee_value_juels: message.feeValueJuels,
        },
    })
}

fn token_amount(
    token: &EVM2AnyTokenTransfer,
    source: ChainFamily,
    dest: ChainFamily,
) -> Result<TokenAmount> {
    Ok(TokenAmount {
        source_pool_address: decode_address(token.sourcePoolAddress.as_slice(), source)?,
        source_token_address: None,
        dest_token_address: decode_address(&token.destTokenAddress, dest)?,
        dest_gas_amount: dest_gas_amount(&token.destExecData, dest)?,
        extra_data: token.extraData.clone(),
        amount: token.amount,
    })
}

/// EVM destinations get an ABI `uint32` word; other families a bare big-endian `u32`.
fn dest_gas_amount(dest_exec_data: &[u8], dest: ChainFamily) -> Result<u32> {
    let fault = |fault| CcipError::MessageDecode {
        field: MessageField::DestExecData,
        fault,
    };
    match dest_exec_data.len() {
        0 => Ok(0),
        32 => {
            let word = U256::from_be_slice(dest_exec_data);
            if word > U256::from(u32::MAX) {
                return Err(fault(DecodeFault::InvalidValue(
                    "destGasAmount exceeds uint32",
                )));
            }
            Ok(word.to::<u32>())
        }
        4 if dest != ChainFamily::Evm => {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(dest_exec_data);
            Ok(u32::from_be_bytes(raw))
        }
        _ => Err(fault(DecodeFault::InvalidValue(
            "destExecData is neither a uint32 word nor 4 bytes",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::decode_message;
    use crate::testing::fixtures;
    use alloy_primitives::Bytes;

    #[test]
    fn test_header_merges_into_root() {
        let raw = fixtures::ramp_message(42, 7);
        let message = decode_message(&fixtures::ramp_send_log(raw.clone()), &fixtures::resolver())
            .unwrap()
            .unwrap();
        assert_eq!(message.header.sequence_number, 42);
        assert_eq!(message.header.nonce, 7);
        assert_eq!(
            message.header.dest_chain_selector,
            fixtures::DEST_SELECTOR
        );
        assert_eq!(message.receiver, fixtures::RECEIVER);
        assert_eq!(message.gas_limit(), U256::from(300_000u64));
        assert!(!message.allow_out_of_order_execution());
        assert_eq!(message.token_amounts[0].dest_gas_amount, 50_000);
        assert_eq!(message.token_amounts[0].source_token_address, None);
    }

    #[test]
    fn test_unknown_extra_args_fail() {
        let mut raw = fixtures::ramp_message(1, 1);
        raw.extraArgs = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef, 0x00]);
        let err = from_ramp_message(raw, &fixtures::resolver()).unwrap_err();
        assert!(matches!(err, CcipError::UnknownExtraArgs { tag } if tag == "deadbeef"));
    }

    #[test]
    fn test_unknown_dest_selector_fails() {
        let mut raw = fixtures::ramp_message(1, 1);
        raw.header.destChainSelector = 99;
        assert!(matches!(
            from_ramp_message(raw, &fixtures::resolver()),
            Err(CcipError::UnknownChainSelector { selector: 99 })
        ));
    }

    #[test]
    fn test_dest_gas_amount_forms() {
        let mut word = [0u8; 32];
        word[28..].copy_from_slice(&70_000u32.to_be_bytes());
        assert_eq!(dest_gas_amount(&word, ChainFamily::Evm).unwrap(), 70_000);
        assert_eq!(
            dest_gas_amount(&70_000u32.to_be_bytes(), ChainFamily::Solana).unwrap(),
            70_000
        );
        assert!(dest_gas_amount(&70_000u32.to_be_bytes(), ChainFamily::Evm).is_err());
        word[0] = 1;
        assert!(dest_gas_amount(&word, ChainFamily::Evm).is_err());
        assert_eq!(dest_gas_amount(&[], ChainFamily::Evm).unwrap(), 0);
    }
}
