//! # ccip-rs
//!
//! Protocol core of Chainlink's Cross-Chain Interoperability Protocol (CCIP):
//! the codecs, leaf hashers and Merkle proofs needed to read CCIP traffic and
//! to execute a committed message by hand.
//!
//! Everything except [`discovery`] and [`providers`] is synchronous and pure.
//! Discovery reaches chains only through the [`LogSource`] trait.
//!
//! ## Decoding
//!
//! ```rust
//! use ccip_rs::{decode_address, encode_address_bytes, ChainFamily, EvmExtraArgsV2, ExtraArgs};
//! use alloy_primitives::U256;
//!
//! let on_ramp = "0x69eCC4E2D8ea56E2d0a05bF57f4Fd6aEE7f2c284";
//! let raw = encode_address_bytes(on_ramp, ChainFamily::Evm)?;
//! assert_eq!(decode_address(&raw, ChainFamily::Evm)?, on_ramp);
//!
//! let args = ExtraArgs::EvmV2(EvmExtraArgsV2 {
//!     gas_limit: U256::from(250_000u64),
//!     allow_out_of_order_execution: true,
//! });
//! assert_eq!(ExtraArgs::decode(&args.encode()?)?, Some(args));
//! # Ok::<(), ccip_rs::CcipError>(())
//! ```
//!
//! ## Proving a committed message
//!
//! ```rust,no_run
//! use ccip_rs::{build_proof, ExecutionReport, KnownChains, Lane, ProtocolVersion};
//! # use ccip_rs::{CcipMessage, CommitReport};
//!
//! # fn example(batch: Vec<CcipMessage>, commit: CommitReport) -> ccip_rs::Result<()> {
//! let lane = Lane::new(
//!     5009297550715157269,
//!     4949039107694359620,
//!     "0x69eCC4E2D8ea56E2d0a05bF57f4Fd6aEE7f2c284",
//!     ProtocolVersion::V1_6,
//! );
//! let target = batch[0].clone();
//! let proof = build_proof(&lane, &KnownChains, &batch, target.message_id(), &commit)?;
//! let report = ExecutionReport::new(target, proof, Vec::new())?;
//! let calldata = report.encode(&lane, &KnownChains)?;
//! # let _ = calldata;
//! # Ok(())
//! # }
//! ```
//!
//! ## Public API
//!
//! - [`Lane`], [`ChainFamily`], [`ProtocolVersion`], [`KnownChain`] - lane and chain identity
//! - [`decode_address`] / [`encode_address_bytes`] - per-family address codecs
//! - [`ExtraArgs`] - tagged extra-args codec
//! - [`decode_message`], [`MessageV1`] - on-ramp events and the v2.0 wire format
//! - [`decode_commit_report`] - commit events, with lane filtering
//! - [`leaf_hasher`] - per-lane leaf hashing
//! - [`merkle`] - trees, multiproofs and the off-chain verifier
//! - [`ExecutionReport`] - manual execution encodings
//! - [`discovery`] - message, commit and batch lookup over a [`LogSource`]
//! - [`CcipError`] and [`Result`] - error types

mod address;
mod chain;
mod codec;
mod commit;
mod error;
mod execution;
mod extra_args;
mod hasher;
mod message;
mod receipt;
mod traits;

pub use address::{
    codec_for, decode_address, encode_address_bytes, encode_address_word, AddressCodec,
    AptosAddressCodec, Base58AddressCodec, EvmAddressCodec, TonAddressCodec,
};
pub use chain::{
    ChainFamily, FamilyResolver, InvalidChainFamily, InvalidProtocolVersion, KnownChain,
    KnownChains, Lane, ProtocolVersion,
};
pub use commit::{commit_topics, decode_commit_report, decode_commit_reports, CommitReport};
pub use error::{CcipError, DecodeFault, MessageField, Result};
pub use execution::{ExecutionReport, MANUALLY_EXECUTE_V1_2};
pub use extra_args::{
    EvmExtraArgsV1, EvmExtraArgsV2, ExtraArgs, ExtraArgsRequest, SuiExtraArgsV1, SvmExtraArgsV1,
    EVM_EXTRA_ARGS_V1_TAG, EVM_EXTRA_ARGS_V2_TAG, SUI_EXTRA_ARGS_V1_TAG, SVM_EXTRA_ARGS_V1_TAG,
};
pub use hasher::{
    leaf_hasher, Any2EvmHasher, Evm2EvmHasher, LeafHasher, MoveHasher, SvmHasher, WireHasher,
    LEAF_DOMAIN_SEPARATOR,
};
pub use merkle::{build_proof, BatchProver, MerkleProof, MerkleTree, MultiProof};
pub use message::{
    decode_message, decode_message_for_version, message_topic, CcipMessage, MessageEnvelope,
    MessageHeader, MessageV1, RawLog, TokenAmount, TokenTransferV1, MESSAGE_V1_VERSION,
    TOKEN_TRANSFER_V1_VERSION,
};
pub use receipt::{decode_execution_receipt, ExecutionReceipt, ExecutionState};
pub use traits::{LogQuery, LogSource};

pub mod abi;
pub mod discovery;
pub mod merkle;
pub mod providers;

// Public module for advanced users who need custom instrumentation
pub mod spans;

pub mod testing;
