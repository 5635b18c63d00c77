//! v1.2 / v1.5 `CCIPSendRequested`

use alloy_primitives::{B256, U256};
use alloy_sol_types::{SolEvent, SolValue};

use super::{CcipMessage, MessageEnvelope, MessageHeader, RawLog, TokenAmount};
use crate::abi::evm2evm::{CCIPSendRequested, EVM2EVMMessage, EVMTokenAmount, SourceTokenData};
use crate::address::{decode_address, evm_address};
use crate::chain::ChainFamily;
use crate::error::Result;
use crate::extra_args::{EvmExtraArgsV2, ExtraArgs};

pub(super) const TOPIC: B256 = CCIPSendRequested::SIGNATURE_HASH;

pub(super) fn decode(log: &RawLog) -> Result<CcipMessage> {
    let event = CCIPSendRequested::decode_raw_log(log.topics.iter().copied(), &log.data)?;
    from_evm2evm(event.message)
}

pub(crate) fn from_evm2evm(message: EVM2EVMMessage) -> Result<CcipMessage> {
    let token_amounts = message
        .tokenAmounts
        .iter()
        .enumerate()
        .map(|(i, token)| {
            let source_token_address = token.token.to_checksum(None);
            let mut amount = TokenAmount {
                source_pool_address: String::new(),
                source_token_address: Some(source_token_address),
                dest_token_address: String::new(),
                dest_gas_amount: 0,
                extra_data: Default::default(),
                amount: token.amount,
            };
            // v1.5 pools return a structured blob; v1.2 pools return free-form bytes
            if let Some(data) = message
                .sourceTokenData
                .get(i)
                .and_then(|raw| SourceTokenData::abi_decode(raw).ok())
            {
                amount.source_pool_address =
                    decode_address(&data.sourcePoolAddress, ChainFamily::Evm)?;
                amount.dest_token_address =
                    decode_address(&data.destTokenAddress, ChainFamily::Evm)?;
                amount.dest_gas_amount = data.destGasAmount;
                amount.extra_data = data.extraData;
            }
            Ok(amount)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CcipMessage {
        header: MessageHeader {
            message_id: message.messageId,
            source_chain_selector: message.sourceChainSelector,
            // not part of the legacy struct; lanes carry it
            dest_chain_selector: 0,
            sequence_number: message.sequenceNumber,
            nonce: message.nonce,
        },
        sender: message.sender.to_checksum(None),
        receiver: message.receiver.to_checksum(None),
        data: message.data,
        fee_token: message.feeToken.to_checksum(None),
        fee_token_amount: message.feeTokenAmount,
        token_amounts,
        extra_args: ExtraArgs::EvmV2(EvmExtraArgsV2 {
            gas_limit: message.gasLimit,
            allow_out_of_order_execution: message.nonce == 0,
        }),
        envelope: MessageEnvelope::Legacy {
            strict: message.strict,
            source_token_data: message.sourceTokenData,
        },
    })
}

/// Rebuilds the ABI struct from a canonical message.
pub(crate) fn to_evm2evm(message: &CcipMessage) -> Result<EVM2EVMMessage> {
    let (strict, source_token_data) = match &message.envelope {
        MessageEnvelope::Legacy {
            strict,
            source_token_data,
        } => (*strict, source_token_data.clone()),
        _ => (false, Vec::new()),
    };
    let token_amounts = message
        .token_amounts
        .iter()
        .map(|token| {
            Ok(EVMTokenAmount {
                token: evm_address(token.source_token_address.as_deref().unwrap_or_default())?,
                amount: token.amount,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(EVM2EVMMessage {
        sourceChainSelector: message.header.source_chain_selector,
        sender: evm_address(&message.sender)?,
        receiver: evm_address(&message.receiver)?,
        sequenceNumber: message.header.sequence_number,
        gasLimit: message.extra_args.gas_limit().unwrap_or(U256::ZERO),
        strict,
        nonce: message.header.nonce,
        feeToken: evm_address(&message.fee_token)?,
        feeTokenAmount: message.fee_token_amount,
        data: message.data.clone(),
        tokenAmounts: token_amounts,
        sourceTokenData: source_token_data,
        messageId: message.header.message_id,
    })
}
