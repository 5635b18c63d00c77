//! Manual execution reports
//!
//! A report bundles one committed message with its inclusion proof and the
//! off-chain token data its pools need (attestations, usually empty). EVM
//! destinations take it as `manuallyExecute` calldata; Aptos takes a BCS
//! buffer whose field order is the Move module's `ExecutionReport` struct.

use alloy_primitives::{keccak256, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::abi::{evm2evm, ramp};
use crate::address::{address_preimage, encode_address_word};
use crate::chain::{ChainFamily, FamilyResolver, Lane, ProtocolVersion};
use crate::codec::BcsWriter;
use crate::error::{CcipError, MessageField, Result};
use crate::hasher::to_any2evm;
use crate::merkle::MerkleProof;
use crate::message::legacy::to_evm2evm;
use crate::message::CcipMessage;

/// v1.2 `EVM2EVMOffRamp.manuallyExecute`, which takes one gas limit per
/// message instead of the v1.5 override structs.
pub const MANUALLY_EXECUTE_V1_2: &str = concat!(
    "manuallyExecute(((uint64,address,address,uint64,uint256,bool,uint64,address,uint256,",
    "bytes,(address,uint256)[],bytes[],bytes32)[],bytes[][],bytes32[],uint256),uint256[])"
);

/// Everything an off-ramp needs to execute one message by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub message: CcipMessage,
    pub proofs: Vec<B256>,
    pub proof_flag_bits: U256,
    /// One entry per token transfer
    pub offchain_token_data: Vec<Bytes>,
    pub merkle_root: B256,
}

impl ExecutionReport {
    /// Combines a message with its proof.
    ///
    /// `offchain_token_data` may be shorter than the message's token list; the
    /// missing entries are empty.
    ///
    /// # Errors
    ///
    /// - [`CcipError::InvalidProof`] when `proof` was built for another message
    /// - [`CcipError::MessageEncode`] when there are more data entries than
    ///   token transfers
    pub fn new(
        message: CcipMessage,
        proof: MerkleProof,
        mut offchain_token_data: Vec<Bytes>,
    ) -> Result<Self> {
        if proof.message_id != message.message_id() {
            return Err(CcipError::InvalidProof {
                reason: "proof was built for a different message",
            });
        }
        let tokens = message.token_amounts.len();
        if offchain_token_data.len() > tokens {
            return Err(CcipError::MessageEncode {
                field: MessageField::TokenTransfer,
                len: offchain_token_data.len(),
                max: tokens,
            });
        }
        offchain_token_data.resize(tokens, Bytes::new());

        Ok(Self {
            message,
            proofs: proof.proofs,
            proof_flag_bits: proof.proof_flag_bits,
            offchain_token_data,
            merkle_root: proof.merkle_root,
        })
    }

    /// Encodes the report for the destination of `lane`.
    ///
    /// # Errors
    ///
    /// [`CcipError::ExecutionReportUnsupported`] for destinations without a
    /// manual execution layout here (Solana, Sui, TON, and v2.0 lanes).
    pub fn encode<R: FamilyResolver>(&self, lane: &Lane, resolver: &R) -> Result<Bytes> {
        let source = resolver.require_family(lane.source_chain_selector())?;
        let dest = resolver.require_family(lane.dest_chain_selector())?;

        let encoded = match (lane.version(), dest) {
            (ProtocolVersion::V2_0, _) => {
                return Err(CcipError::ExecutionReportUnsupported { family: dest })
            }
            (_, ChainFamily::Evm) => self.encode_evm(lane.version(), source)?,
            (ProtocolVersion::V1_6, ChainFamily::Aptos) => self.encode_aptos(source)?,
            _ => return Err(CcipError::ExecutionReportUnsupported { family: dest }),
        };

        debug!(
            message_id = %self.message.message_id(),
            dest_family = %dest,
            bytes = encoded.len(),
            event = "execution_report_encoded"
        );
        Ok(encoded)
    }

    /// `manuallyExecute` calldata for an EVM off-ramp of `version`, with no
    /// gas limit overrides.
    pub fn encode_evm(
        &self,
        version: ProtocolVersion,
        source_family: ChainFamily,
    ) -> Result<Bytes> {
        let offchain_token_data = vec![self.offchain_token_data.clone()];
        let token_count = self.message.token_amounts.len();

        let calldata = match version {
            ProtocolVersion::V1_2 => {
                let report = self.evm2evm_report(offchain_token_data)?;
                let mut calldata = keccak256(MANUALLY_EXECUTE_V1_2)[..4].to_vec();
                calldata.extend((report, vec![U256::ZERO]).abi_encode_params());
                calldata
            }
            ProtocolVersion::V1_5 => evm2evm::manuallyExecuteCall {
                report: self.evm2evm_report(offchain_token_data)?,
                gasLimitOverrides: vec![evm2evm::GasLimitOverride {
                    receiverExecutionGasLimit: U256::ZERO,
                    tokenGasOverrides: vec![0; token_count],
                }],
            }
            .abi_encode(),
            ProtocolVersion::V1_6 => ramp::manuallyExecuteCall {
                reports: vec![ramp::ExecutionReport {
                    sourceChainSelector: self.message.header.source_chain_selector,
                    messages: vec![to_any2evm(&self.message, source_family)?],
                    offchainTokenData: offchain_token_data,
                    proofs: self.proofs.clone(),
                    proofFlagBits: self.proof_flag_bits,
                }],
                gasLimitOverrides: vec![vec![ramp::GasLimitOverride {
                    receiverExecutionGasLimit: U256::ZERO,
                    tokenGasOverrides: vec![0; token_count],
                }]],
            }
            .abi_encode(),
            ProtocolVersion::V2_0 => {
                return Err(CcipError::ExecutionReportUnsupported {
                    family: ChainFamily::Evm,
                })
            }
        };
        Ok(calldata.into())
    }

    fn evm2evm_report(
        &self,
        offchain_token_data: Vec<Vec<Bytes>>,
    ) -> Result<evm2evm::ExecutionReport> {
        Ok(evm2evm::ExecutionReport {
            messages: vec![to_evm2evm(&self.message)?],
            offchainTokenData: offchain_token_data,
            proofs: self.proofs.clone(),
            proofFlagBits: self.proof_flag_bits,
        })
    }

    /// BCS `ExecutionReport` of the Aptos off-ramp.
    ///
    /// The Move verifier walks a single-leaf proof, so flag bits are not
    /// serialized.
    pub fn encode_aptos(&self, source_family: ChainFamily) -> Result<Bytes> {
        let message = &self.message;
        let header = &message.header;
        let mut writer = BcsWriter::new();

        writer
            .u64(header.source_chain_selector)
            .fixed(header.message_id.as_slice())
            .u64(header.source_chain_selector)
            .u64(header.dest_chain_selector)
            .u64(header.sequence_number)
            .u64(header.nonce)
            .bytes(&address_preimage(&message.sender, source_family)?)
            .bytes(&message.data)
            .fixed(encode_address_word(&message.receiver, ChainFamily::Aptos)?.as_slice())
            .u256(message.gas_limit())
            .seq_len(message.token_amounts.len());

        for token in &message.token_amounts {
            writer
                .bytes(&address_preimage(&token.source_pool_address, source_family)?)
                .fixed(
                    encode_address_word(&token.dest_token_address, ChainFamily::Aptos)?
                        .as_slice(),
                )
                .u32(token.dest_gas_amount)
                .bytes(&token.extra_data)
                .u256(token.amount);
        }

        writer.seq_len(self.offchain_token_data.len());
        for data in &self.offchain_token_data {
            writer.bytes(data);
        }

        writer.seq_len(self.proofs.len());
        for proof in &self.proofs {
            writer.fixed(proof.as_slice());
        }

        Ok(writer.into_bytes().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::BatchProver;
    use crate::message::legacy::from_evm2evm;
    use crate::message::ramp::from_ramp_message;
    use crate::testing::fixtures;

    fn report_for(lane: &Lane, messages: Vec<CcipMessage>, target: usize) -> ExecutionReport {
        let prover = BatchProver::for_lane(lane, &fixtures::resolver(), &messages).unwrap();
        let message = messages[target].clone();
        let proof = prover.prove(message.message_id(), prover.root()).unwrap();
        ExecutionReport::new(message, proof, Vec::new()).unwrap()
    }

    fn aptos_lane() -> Lane {
        Lane::new(
            fixtures::SOURCE_SELECTOR,
            fixtures::APTOS_SELECTOR,
            fixtures::ON_RAMP,
            ProtocolVersion::V1_6,
        )
    }

    #[test]
    fn test_offchain_data_is_padded_per_token() {
        let lane = fixtures::lane(ProtocolVersion::V1_6);
        let message =
            from_ramp_message(fixtures::ramp_message(1, 0), &fixtures::resolver()).unwrap();
        let report = report_for(&lane, vec![message], 0);
        assert_eq!(report.offchain_token_data, vec![Bytes::new()]);
    }

    #[test]
    fn test_rejects_foreign_proof_and_extra_data() {
        let lane = fixtures::lane(ProtocolVersion::V1_6);
        let messages: Vec<CcipMessage> = (1..=2)
            .map(|seq| {
                from_ramp_message(fixtures::ramp_message(seq, 0), &fixtures::resolver()).unwrap()
            })
            .collect();
        let prover = BatchProver::for_lane(&lane, &fixtures::resolver(), &messages).unwrap();
        let proof = prover.prove(messages[1].message_id(), prover.root()).unwrap();

        assert!(matches!(
            ExecutionReport::new(messages[0].clone(), proof.clone(), Vec::new()),
            Err(CcipError::InvalidProof { .. })
        ));
        assert!(matches!(
            ExecutionReport::new(
                messages[1].clone(),
                proof,
                vec![Bytes::new(), Bytes::from_static(b"extra")]
            ),
            Err(CcipError::MessageEncode { len: 2, max: 1, .. })
        ));
    }

    #[test]
    fn test_v1_6_calldata_round_trips() {
        let lane = fixtures::lane(ProtocolVersion::V1_6);
        let messages: Vec<CcipMessage> = (1..=3)
            .map(|seq| {
                from_ramp_message(fixtures::ramp_message(seq, 0), &fixtures::resolver()).unwrap()
            })
            .collect();
        let report = report_for(&lane, messages, 1);
        let calldata = report.encode(&lane, &fixtures::resolver()).unwrap();

        assert_eq!(&calldata[..4], ramp::manuallyExecuteCall::SELECTOR.as_slice());
        let call = ramp::manuallyExecuteCall::abi_decode(&calldata).unwrap();
        let decoded = &call.reports[0];
        assert_eq!(decoded.sourceChainSelector, fixtures::SOURCE_SELECTOR);
        assert_eq!(decoded.messages[0].header.sequenceNumber, 2);
        assert_eq!(decoded.proofs, report.proofs);
        assert_eq!(decoded.proofFlagBits, report.proof_flag_bits);
        assert_eq!(call.gasLimitOverrides[0][0].tokenGasOverrides, vec![0]);
    }

    #[test]
    fn test_v1_5_calldata_round_trips() {
        let lane = fixtures::lane(ProtocolVersion::V1_5);
        let messages: Vec<CcipMessage> = (1..=2)
            .map(|seq| from_evm2evm(fixtures::legacy_message(seq, seq)).unwrap())
            .collect();
        let report = report_for(&lane, messages, 0);
        let calldata = report.encode(&lane, &fixtures::resolver()).unwrap();

        let call = evm2evm::manuallyExecuteCall::abi_decode(&calldata).unwrap();
        assert_eq!(call.report.messages[0], fixtures::legacy_message(1, 1));
        assert_eq!(call.report.offchainTokenData, vec![vec![Bytes::new()]]);
        assert_eq!(call.report.proofs, report.proofs);
    }

    #[test]
    fn test_v1_2_signature_differs_only_in_overrides() {
        assert_eq!(
            evm2evm::manuallyExecuteCall::SIGNATURE
                .replace(",(uint256,uint32[])[])", ",uint256[])"),
            MANUALLY_EXECUTE_V1_2
        );

        let lane = fixtures::lane(ProtocolVersion::V1_2);
        let message = from_evm2evm(fixtures::legacy_message(4, 1)).unwrap();
        let calldata = report_for(&lane, vec![message], 0)
            .encode(&lane, &fixtures::resolver())
            .unwrap();
        assert_eq!(&calldata[..4], &keccak256(MANUALLY_EXECUTE_V1_2)[..4]);
        assert_ne!(&calldata[..4], evm2evm::manuallyExecuteCall::SELECTOR.as_slice());
    }

    #[test]
    fn test_aptos_layout() {
        let lane = aptos_lane();
        let messages = vec![fixtures::aptos_message(3), fixtures::aptos_message(4)];
        let report = report_for(&lane, messages, 0);
        assert_eq!(report.proofs.len(), 1);

        let bytes = report.encode(&lane, &fixtures::resolver()).unwrap();
        // selector, header, sender, data, receiver, gas, one token, one blob, one proof
        assert_eq!(bytes.len(), 8 + 64 + 33 + 6 + 32 + 32 + 103 + 2 + 33);
        assert_eq!(&bytes[..8], &fixtures::SOURCE_SELECTOR.to_le_bytes());
        assert_eq!(&bytes[8..40], fixtures::message_id(3).as_slice());
        assert_eq!(&bytes[48..56], &fixtures::APTOS_SELECTOR.to_le_bytes());
        assert_eq!(&bytes[56..64], &3u64.to_le_bytes());
        // sender: ULEB length 32, then the left-padded EVM address
        assert_eq!(bytes[72], 32);
        assert_eq!(&bytes[bytes.len() - 32..], report.proofs[0].as_slice());
    }

    #[test]
    fn test_unsupported_destinations() {
        let solana = Lane::new(
            fixtures::SOURCE_SELECTOR,
            fixtures::SOLANA_SELECTOR,
            fixtures::ON_RAMP,
            ProtocolVersion::V1_6,
        );
        let report = report_for(&solana, vec![fixtures::solana_message(1)], 0);
        assert!(matches!(
            report.encode(&solana, &fixtures::resolver()),
            Err(CcipError::ExecutionReportUnsupported {
                family: ChainFamily::Solana
            })
        ));
    }
}
