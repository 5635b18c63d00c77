use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{verify_multiproof, MerkleTree, MultiProof};
use crate::chain::{FamilyResolver, Lane};
use crate::commit::CommitReport;
use crate::error::{CcipError, Result};
use crate::hasher::{leaf_hasher, LeafHasher};
use crate::message::CcipMessage;
use crate::spans;

/// Inclusion proof of one message against a committed root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleProof {
    pub message_id: B256,
    pub leaf: B256,
    pub proofs: Vec<B256>,
    pub proof_flag_bits: U256,
    pub merkle_root: B256,
}

/// Leaves and tree of one committed batch, hashed and built once.
#[derive(Debug, Clone)]
pub struct BatchProver {
    /// message ids in leaf order
    message_ids: Vec<B256>,
    tree: MerkleTree,
}

impl BatchProver {
    /// Hashes `messages` in sequence-number order and builds the tree.
    ///
    /// # Errors
    ///
    /// Propagates leaf hashing failures, and [`CcipError::InvalidProof`] for an
    /// empty or oversized batch.
    pub fn new(messages: &[CcipMessage], hasher: &dyn LeafHasher) -> Result<Self> {
        let mut ordered: Vec<&CcipMessage> = messages.iter().collect();
        ordered.sort_by_key(|message| message.sequence_number());

        let leaves = ordered
            .iter()
            .map(|message| hasher.hash(message))
            .collect::<Result<Vec<_>>>()?;
        let tree = MerkleTree::new(leaves)?;

        debug!(
            messages = ordered.len(),
            root = %tree.root(),
            event = "batch_tree_built"
        );

        Ok(Self {
            message_ids: ordered.iter().map(|message| message.message_id()).collect(),
            tree,
        })
    }

    /// Like [`BatchProver::new`] with the hasher selected for `lane`.
    pub fn for_lane<R: FamilyResolver>(
        lane: &Lane,
        resolver: &R,
        messages: &[CcipMessage],
    ) -> Result<Self> {
        let hasher = leaf_hasher(lane, resolver)?;
        Self::new(messages, hasher.as_ref())
    }

    pub fn root(&self) -> B256 {
        self.tree.root()
    }

    pub fn len(&self) -> usize {
        self.message_ids.len()
    }

    /// Always false; an empty batch is rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.message_ids.is_empty()
    }

    /// Leaf hash of `message_id`, if it is in the batch.
    pub fn leaf(&self, message_id: B256) -> Option<B256> {
        self.index_of(message_id).ok().map(|i| self.tree.leaves()[i])
    }

    fn index_of(&self, message_id: B256) -> Result<usize> {
        self.message_ids
            .iter()
            .position(|id| *id == message_id)
            .ok_or(CcipError::MessageNotInBatch { message_id })
    }

    /// Proves one message and checks the proof against `expected_root`.
    ///
    /// # Errors
    ///
    /// - [`CcipError::MessageNotInBatch`] when `message_id` was not hashed
    /// - [`CcipError::ProofRootMismatch`] when the batch root differs from
    ///   `expected_root`, usually a sign of an incomplete batch
    pub fn prove(&self, message_id: B256, expected_root: B256) -> Result<MerkleProof> {
        let index = self.index_of(message_id)?;
        let leaf = self.tree.leaves()[index];
        let MultiProof {
            proofs,
            proof_flag_bits,
        } = self.tree.prove(&[index])?;

        let computed = verify_multiproof(&[leaf], &proofs, proof_flag_bits)?;
        check_root(expected_root, computed)?;

        debug!(
            message_id = %message_id,
            index,
            proofs = proofs.len(),
            event = "merkle_proof_built"
        );

        Ok(MerkleProof {
            message_id,
            leaf,
            proofs,
            proof_flag_bits,
            merkle_root: computed,
        })
    }

    /// Proves several messages at once. The returned proof verifies against
    /// their leaves taken in batch order, which is sequence-number order.
    ///
    /// # Errors
    ///
    /// As [`BatchProver::prove`], plus [`CcipError::InvalidProof`] when the
    /// same message is named twice.
    pub fn prove_many(&self, message_ids: &[B256], expected_root: B256) -> Result<MultiProof> {
        let mut indices = message_ids
            .iter()
            .map(|id| self.index_of(*id))
            .collect::<Result<Vec<_>>>()?;
        indices.sort_unstable();

        let proof = self.tree.prove(&indices)?;
        let leaves: Vec<B256> = indices.iter().map(|i| self.tree.leaves()[*i]).collect();
        let computed = verify_multiproof(&leaves, &proof.proofs, proof.proof_flag_bits)?;
        check_root(expected_root, computed)?;
        Ok(proof)
    }
}

fn check_root(expected: B256, computed: B256) -> Result<()> {
    if expected == computed {
        return Ok(());
    }
    warn!(
        expected = %expected,
        computed = %computed,
        event = "merkle_root_mismatch"
    );
    Err(CcipError::ProofRootMismatch { expected, computed })
}

/// Builds the proof of `message_id` from the full batch of its commit.
///
/// Messages of `batch` outside the committed range are ignored.
///
/// # Errors
///
/// - [`CcipError::MessageNotInBatch`] when the target is missing from `batch`
/// - [`CcipError::SequenceOutOfRange`] when the target lies outside the commit
/// - [`CcipError::ProofRootMismatch`] when `batch` does not reproduce the
///   committed root
/// - hasher selection and hashing errors for the lane
pub fn build_proof<R: FamilyResolver>(
    lane: &Lane,
    resolver: &R,
    batch: &[CcipMessage],
    message_id: B256,
    report: &CommitReport,
) -> Result<MerkleProof> {
    let span = spans::build_proof(&message_id, lane, batch.len(), report);
    let _guard = span.enter();

    let result = (|| -> Result<MerkleProof> {
        let target = batch
            .iter()
            .find(|message| message.message_id() == message_id)
            .ok_or(CcipError::MessageNotInBatch { message_id })?;
        report.require_contains(target.sequence_number())?;

        let committed: Vec<CcipMessage> = batch
            .iter()
            .filter(|message| report.contains(message.sequence_number()))
            .cloned()
            .collect();
        if committed.len() as u64 != report.len() {
            warn!(
                have = committed.len(),
                committed = report.len(),
                event = "incomplete_batch"
            );
        }

        BatchProver::for_lane(lane, resolver, &committed)?.prove(message_id, report.merkle_root)
    })();

    if let Err(ref e) = result {
        spans::record_error(e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainFamily, ProtocolVersion};
    use crate::hasher::Any2EvmHasher;
    use crate::message::ramp::from_ramp_message;
    use crate::testing::fixtures;

    fn lane() -> Lane {
        fixtures::lane(ProtocolVersion::V1_6)
    }

    fn batch(range: std::ops::RangeInclusive<u64>) -> Vec<CcipMessage> {
        range
            .map(|seq| {
                from_ramp_message(fixtures::ramp_message(seq, 0), &fixtures::resolver()).unwrap()
            })
            .collect()
    }

    fn report(root: B256, min: u64, max: u64) -> CommitReport {
        CommitReport {
            merkle_root: root,
            min_seq_nr: min,
            max_seq_nr: max,
            source_chain_selector: fixtures::SOURCE_SELECTOR,
            on_ramp_address: fixtures::ON_RAMP.to_string(),
        }
    }

    #[test]
    fn test_every_message_proves_against_root() {
        let messages = batch(1..=6);
        let prover = BatchProver::for_lane(&lane(), &fixtures::resolver(), &messages).unwrap();
        for message in &messages {
            let proof = prover.prove(message.message_id(), prover.root()).unwrap();
            assert_eq!(proof.merkle_root, prover.root());
            assert_eq!(Some(proof.leaf), prover.leaf(message.message_id()));
        }
    }

    #[test]
    fn test_order_of_input_does_not_matter() {
        let mut messages = batch(1..=5);
        let sorted = BatchProver::for_lane(&lane(), &fixtures::resolver(), &messages).unwrap();
        messages.reverse();
        let reversed = BatchProver::for_lane(&lane(), &fixtures::resolver(), &messages).unwrap();
        assert_eq!(sorted.root(), reversed.root());
    }

    #[test]
    fn test_single_message_root_is_leaf() {
        let messages = batch(9..=9);
        let hasher = Any2EvmHasher::new(&lane(), ChainFamily::Evm).unwrap();
        let prover = BatchProver::new(&messages, &hasher).unwrap();
        let leaf = hasher.hash(&messages[0]).unwrap();
        assert_eq!(prover.root(), leaf);

        let proof = prover.prove(messages[0].message_id(), leaf).unwrap();
        assert!(proof.proofs.is_empty());
        assert_eq!(proof.proof_flag_bits, U256::ZERO);
    }

    #[test]
    fn test_missing_message() {
        let prover = BatchProver::for_lane(&lane(), &fixtures::resolver(), &batch(1..=3)).unwrap();
        let unknown = fixtures::message_id(99);
        assert!(matches!(
            prover.prove(unknown, prover.root()),
            Err(CcipError::MessageNotInBatch { message_id }) if message_id == unknown
        ));
        assert_eq!(prover.leaf(unknown), None);
    }

    #[test]
    fn test_root_mismatch_is_reported() {
        let messages = batch(1..=3);
        let prover = BatchProver::for_lane(&lane(), &fixtures::resolver(), &messages).unwrap();
        let wrong = B256::repeat_byte(0x42);
        assert!(matches!(
            prover.prove(messages[1].message_id(), wrong),
            Err(CcipError::ProofRootMismatch { expected, .. }) if expected == wrong
        ));
    }

    #[test]
    fn test_prove_many() {
        let messages = batch(1..=7);
        let prover = BatchProver::for_lane(&lane(), &fixtures::resolver(), &messages).unwrap();
        let ids = [messages[5].message_id(), messages[0].message_id()];
        let proof = prover.prove_many(&ids, prover.root()).unwrap();

        let leaves = [
            prover.leaf(ids[1]).unwrap(),
            prover.leaf(ids[0]).unwrap(),
        ];
        let root = verify_multiproof(&leaves, &proof.proofs, proof.proof_flag_bits).unwrap();
        assert_eq!(root, prover.root());
    }

    #[test]
    fn test_build_proof_ignores_messages_outside_commit() {
        let committed = batch(3..=6);
        let root = BatchProver::for_lane(&lane(), &fixtures::resolver(), &committed)
            .unwrap()
            .root();
        let fetched = batch(1..=8);
        let target = fetched[3].message_id();

        let report = report(root, 3, 6);
        let proof = build_proof(&lane(), &fixtures::resolver(), &fetched, target, &report).unwrap();
        assert_eq!(proof.merkle_root, root);
        assert_eq!(proof.message_id, target);
    }

    #[test]
    fn test_build_proof_preconditions() {
        let messages = batch(1..=4);
        let root = BatchProver::for_lane(&lane(), &fixtures::resolver(), &messages)
            .unwrap()
            .root();

        let outside = build_proof(
            &lane(),
            &fixtures::resolver(),
            &messages,
            messages[0].message_id(),
            &report(root, 2, 4),
        );
        assert!(matches!(
            outside,
            Err(CcipError::SequenceOutOfRange {
                sequence_number: 1,
                min: 2,
                max: 4
            })
        ));

        // one message short of the committed range
        let short = build_proof(
            &lane(),
            &fixtures::resolver(),
            &messages[..3],
            messages[0].message_id(),
            &report(root, 1, 4),
        );
        assert!(matches!(short, Err(CcipError::ProofRootMismatch { .. })));
    }
}
