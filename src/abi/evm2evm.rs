//! v1.2 / v1.5 lane contracts
//!
//! The on-ramp, off-ramp and commit store events are identical across the two
//! versions. The commit store binding sits in [`commit_store`] because its
//! `PriceUpdates` and `Interval` names would clash with the v1.6 ones.

use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct EVMTokenAmount {
        address token;
        uint256 amount;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct EVM2EVMMessage {
        uint64 sourceChainSelector;
        address sender;
        address receiver;
        uint64 sequenceNumber;
        uint256 gasLimit;
        bool strict;
        uint64 nonce;
        address feeToken;
        uint256 feeTokenAmount;
        bytes data;
        EVMTokenAmount[] tokenAmounts;
        bytes[] sourceTokenData;
        bytes32 messageId;
    }

    /// v1.5 pools return this, ABI-encoded, as their `sourceTokenData` entry
    #[derive(Debug, PartialEq, Eq)]
    struct SourceTokenData {
        bytes sourcePoolAddress;
        bytes destTokenAddress;
        bytes extraData;
        uint32 destGasAmount;
    }

    #[derive(Debug, PartialEq, Eq)]
    event CCIPSendRequested(EVM2EVMMessage message);

    #[derive(Debug, PartialEq, Eq)]
    event ExecutionStateChanged(
        uint64 indexed sequenceNumber,
        bytes32 indexed messageId,
        uint8 state,
        bytes returnData
    );

    #[derive(Debug, PartialEq, Eq)]
    struct ExecutionReport {
        EVM2EVMMessage[] messages;
        bytes[][] offchainTokenData;
        bytes32[] proofs;
        uint256 proofFlagBits;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct GasLimitOverride {
        uint256 receiverExecutionGasLimit;
        uint32[] tokenGasOverrides;
    }

    /// v1.5 off-ramp entry point; v1.2 takes plain `uint256` overrides
    function manuallyExecute(ExecutionReport report, GasLimitOverride[] gasLimitOverrides);
}

pub mod commit_store {
    use alloy_sol_types::sol;

    sol! {
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
        struct Interval {
            uint64 min;
            uint64 max;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct CommitReport {
            PriceUpdates priceUpdates;
            Interval interval;
            bytes32 merkleRoot;
        }

        #[derive(Debug, PartialEq, Eq)]
        event ReportAccepted(CommitReport report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;
    use alloy_sol_types::SolEvent;

    #[test]
    fn test_report_accepted_topic() {
        assert_eq!(
            commit_store::ReportAccepted::SIGNATURE,
            "ReportAccepted((((address,uint224)[],(uint64,uint224)[]),(uint64,uint64),bytes32))"
        );
        assert_eq!(
            commit_store::ReportAccepted::SIGNATURE_HASH,
            b256!("291698c01aa71f912280535d88a00d2c59fb63530a3f5d0098560468acb9ebf5")
        );
    }

    #[test]
    fn test_send_requested_signature() {
        assert_eq!(
            CCIPSendRequested::SIGNATURE,
            "CCIPSendRequested((uint64,address,address,uint64,uint256,bool,uint64,address,uint256,bytes,(address,uint256)[],bytes[],bytes32))"
        );
    }
}
