//! v1.6 `OnRamp` / `OffRamp`
//!
//! From v1.6 on, ramps are chain-family agnostic: remote addresses travel as
//! `bytes` and per-family hints as an extra-args blob.

use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct RampMessageHeader {
        bytes32 messageId;
        uint64 sourceChainSelector;
        uint64 destChainSelector;
        uint64 sequenceNumber;
        uint64 nonce;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct EVM2AnyTokenTransfer {
        address sourcePoolAddress;
        bytes destTokenAddress;
        bytes extraData;
        uint256 amount;
        bytes destExecData;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct EVM2AnyRampMessage {
        RampMessageHeader header;
        address sender;
        bytes data;
        bytes receiver;
        bytes extraArgs;
        address feeToken;
        uint256 feeTokenAmount;
        uint256 feeValueJuels;
        EVM2AnyTokenTransfer[] tokenAmounts;
    }

    #[derive(Debug, PartialEq, Eq)]
    event CCIPMessageSent(
        uint64 indexed destChainSelector,
        uint64 indexed sequenceNumber,
        EVM2AnyRampMessage message
    );

    #[derive(Debug, PartialEq, Eq)]
    struct Any2EVMTokenTransfer {
        bytes sourcePoolAddress;
        address destTokenAddress;
        uint32 destGasAmount;
        bytes extraData;
        uint256 amount;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Any2EVMRampMessage {
        RampMessageHeader header;
        bytes sender;
        bytes data;
        address receiver;
        uint256 gasLimit;
        Any2EVMTokenTransfer[] tokenAmounts;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct ExecutionReport {
        uint64 sourceChainSelector;
        Any2EVMRampMessage[] messages;
        bytes[][] offchainTokenData;
        bytes32[] proofs;
        uint256 proofFlagBits;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct GasLimitOverride {
        uint256 receiverExecutionGasLimit;
        uint32[] tokenGasOverrides;
    }

    function manuallyExecute(ExecutionReport[] reports, GasLimitOverride[][] gasLimitOverrides);

    #[derive(Debug, PartialEq, Eq)]
    struct MerkleRoot {
        uint64 sourceChainSelector;
        bytes onRampAddress;
        uint64 minSeqNr;
        uint64 maxSeqNr;
        bytes32 merkleRoot;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct TokenPriceUpdate {
        address sourceToken;
        uint224 usdPerToken;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct GasPriceUpdate {
        uint64 destChainSelector;
        uint224 usdPerUnitGas;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct PriceUpdates {
        TokenPriceUpdate[] tokenPriceUpdates;
        GasPriceUpdate[] gasPriceUpdates;
    }

    #[derive(Debug, PartialEq, Eq)]
    event CommitReportAccepted(
        MerkleRoot[] blessedMerkleRoots,
        MerkleRoot[] unblessedMerkleRoots,
        PriceUpdates priceUpdates
    );

    #[derive(Debug, PartialEq, Eq)]
    event ExecutionStateChanged(
        uint64 indexed sourceChainSelector,
        uint64 indexed sequenceNumber,
        bytes32 indexed messageId,
        bytes32 messageHash,
        uint8 state,
        bytes returnData,
        uint256 gasUsed
    );
}
