//! v2.0 `OnRamp`
//!
//! The message itself is an opaque `MessageV1` buffer rather than an ABI
//! struct; see [`MessageV1`](crate::MessageV1).

use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    event CCIPMessageSent(
        uint64 indexed destChainSelector,
        uint64 indexed messageNumber,
        bytes32 indexed messageId,
        address feeToken,
        uint256 feeTokenAmount,
        bytes encodedMessage
    );
}
