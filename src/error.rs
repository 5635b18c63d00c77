use alloy_primitives::B256;
use thiserror::Error;

use crate::chain::{ChainFamily, ProtocolVersion};
use crate::extra_args::ExtraArgs;

/// Field boundaries of the `MessageV1` and `TokenTransferV1` wire layouts,
/// plus the few ABI fields whose content is a nested encoding.
///
/// Every length-prefixed or fixed-width field gets its own variant so a decode
/// failure points at the exact byte range that was wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageField {
    Version,
    SourceChainSelector,
    DestChainSelector,
    MessageNumber,
    ExecutionGasLimit,
    CcipReceiveGasLimit,
    Finality,
    CcvAndExecutorHash,
    OnRampAddress,
    OffRampAddress,
    Sender,
    Receiver,
    DestBlob,
    TokenTransfer,
    Data,
    Message,
    TokenTransferVersion,
    TokenAmount,
    SourcePoolAddress,
    SourceTokenAddress,
    DestTokenAddress,
    TokenReceiver,
    ExtraData,
    /// v1.6 `EVM2AnyTokenTransfer.destExecData`
    DestExecData,
}

impl MessageField {
    /// Wire name of the field, as it appears in the layout description.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::SourceChainSelector => "sourceChainSelector",
            Self::DestChainSelector => "destChainSelector",
            Self::MessageNumber => "messageNumber",
            Self::ExecutionGasLimit => "executionGasLimit",
            Self::CcipReceiveGasLimit => "ccipReceiveGasLimit",
            Self::Finality => "finality",
            Self::CcvAndExecutorHash => "ccvAndExecutorHash",
            Self::OnRampAddress => "onRampAddress",
            Self::OffRampAddress => "offRampAddress",
            Self::Sender => "sender",
            Self::Receiver => "receiver",
            Self::DestBlob => "destBlob",
            Self::TokenTransfer => "tokenTransfer",
            Self::Data => "data",
            Self::Message => "message",
            Self::TokenTransferVersion => "tokenTransfer.version",
            Self::TokenAmount => "tokenTransfer.amount",
            Self::SourcePoolAddress => "tokenTransfer.sourcePoolAddress",
            Self::SourceTokenAddress => "tokenTransfer.sourceTokenAddress",
            Self::DestTokenAddress => "tokenTransfer.destTokenAddress",
            Self::TokenReceiver => "tokenTransfer.tokenReceiver",
            Self::ExtraData => "tokenTransfer.extraData",
            Self::DestExecData => "tokenAmounts.destExecData",
        }
    }
}

impl std::fmt::Display for MessageField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What went wrong while reading a field from a binary buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeFault {
    #[error("truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("cursor at {position} but sub-structure ends at {expected_end}")]
    LengthMismatch { expected_end: usize, position: usize },

    #[error("{remaining} trailing bytes after the last field")]
    TrailingBytes { remaining: usize },

    #[error("unsupported encoding version {0}")]
    UnsupportedVersion(u8),

    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
}

#[derive(Error, Debug)]
pub enum CcipError {
    #[error("Invalid {family} address: {input}")]
    AddressInvalid { family: ChainFamily, input: String },

    #[error("Unknown chain selector: {selector}")]
    UnknownChainSelector { selector: u64 },

    #[error("Extra args truncated: {len} bytes, need at least a 4-byte tag")]
    ExtraArgsTruncated { len: usize },

    #[error("Cannot encode extra args: {reason}")]
    ExtraArgsEncode { reason: String },

    #[error("Malformed {variant} extra args: {fault}")]
    ExtraArgsDecode {
        variant: &'static str,
        fault: DecodeFault,
    },

    #[error("Unrecognized extra args tag 0x{tag}")]
    UnknownExtraArgs { tag: String },

    #[error("{dest_family} leaves need {expected} extra args, message carries {found}")]
    ExtraArgsMismatch {
        dest_family: ChainFamily,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Log data is not byte-like: {reason}")]
    LogDataInvalid { reason: String },

    #[error("Failed to decode message field `{field}`: {fault}")]
    MessageDecode {
        field: MessageField,
        fault: DecodeFault,
    },

    #[error("Cannot encode message field `{field}`: length {len} exceeds {max}")]
    MessageEncode {
        field: MessageField,
        len: usize,
        max: usize,
    },

    #[error("Commit reports of version {version} carry no lane; a lane must be supplied")]
    VersionRequiresLane { version: ProtocolVersion },

    #[error("No leaf hasher for version {version} from {source_family} to {dest_family}")]
    HasherVersionUnsupported {
        version: ProtocolVersion,
        source_family: ChainFamily,
        dest_family: ChainFamily,
    },

    #[error("Message {message_id} is not part of the batch")]
    MessageNotInBatch { message_id: B256 },

    #[error("Sequence number {sequence_number} outside committed range [{min}, {max}]")]
    SequenceOutOfRange {
        sequence_number: u64,
        min: u64,
        max: u64,
    },

    #[error("Merkle root mismatch: commit has {expected}, proof yields {computed}")]
    ProofRootMismatch { expected: B256, computed: B256 },

    #[error("Invalid proof: {reason}")]
    InvalidProof { reason: &'static str },

    #[error("Execution reports for {family} destinations are not supported")]
    ExecutionReportUnsupported { family: ChainFamily },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Transaction not found: {tx_hash}")]
    TransactionNotFound { tx_hash: String },

    #[error("No CCIP message found: {reason}")]
    MessageNotFound { reason: String },

    #[error("No commit report found for sequence number {sequence_number}")]
    CommitNotFound { sequence_number: u64 },

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Borsh serialization error: {0}")]
    Borsh(#[from] std::io::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),
}

impl CcipError {
    pub(crate) fn address(family: ChainFamily, input: impl Into<String>) -> Self {
        Self::AddressInvalid {
            family,
            input: input.into(),
        }
    }

    pub(crate) fn extra_args_mismatch(
        dest_family: ChainFamily,
        expected: &'static str,
        found: &ExtraArgs,
    ) -> Self {
        Self::ExtraArgsMismatch {
            dest_family,
            expected,
            found: found.tag_name(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CcipError>;
