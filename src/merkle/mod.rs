//! Merkle multiproofs over committed batches
//!
//! Off-ramps verify inclusion with a multiproof: the leaves being proven, a
//! list of supplied sibling hashes and a `proofFlagBits` bitmap. Verification
//! performs `leaves + proofs - 1` combine steps. At step `i`, bit `i` (counting
//! from the least significant bit) selects the first operand: `1` takes the
//! next unconsumed leaf, or once leaves run out the next hash computed earlier
//! in the pass; `0` takes the next supplied proof. The second operand always
//! comes from leaves or computed hashes.
//!
//! Pairs are hashed sorted, under an internal-node domain separator, so
//! sibling order never needs encoding. A trailing odd node of a tree layer is
//! paired with the zero hash.
//!
//! - [`MerkleTree`] builds the layers once and answers any number of proofs.
//! - [`verify_multiproof`] is the verifier loop, used as a self-check before
//!   a proof is handed out.
//! - [`BatchProver`] ties both to leaf hashing for one committed batch.

mod batch;
mod tree;

use alloy_primitives::{keccak256, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::{CcipError, Result};

pub use batch::{build_proof, BatchProver, MerkleProof};
pub use tree::MerkleTree;

/// Upper bound on combine steps (and leaves) accepted by the on-chain verifier
pub const MAX_NUM_HASHES: usize = 256;

/// Prefix distinguishing internal nodes from leaves
pub const INTERNAL_DOMAIN_SEPARATOR: B256 = B256::with_last_byte(1);

/// Hash of two sibling nodes, independent of their order.
pub fn hash_pair(a: B256, b: B256) -> B256 {
    let (left, right) = if a < b { (a, b) } else { (b, a) };
    let mut pre_image = [0u8; 96];
    pre_image[..32].copy_from_slice(INTERNAL_DOMAIN_SEPARATOR.as_slice());
    pre_image[32..64].copy_from_slice(left.as_slice());
    pre_image[64..].copy_from_slice(right.as_slice());
    keccak256(pre_image)
}

/// Sibling hashes and flag bits proving a set of leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiProof {
    pub proofs: Vec<B256>,
    pub proof_flag_bits: U256,
}

/// Recomputes the root from `leaves` (in tree order) and a multiproof.
///
/// # Errors
///
/// [`CcipError::InvalidProof`] when the leaves, proofs and flag bits are not
/// mutually consistent, under the same checks the on-chain verifier applies.
///
/// # Example
///
/// ```rust
/// use alloy_primitives::{B256, U256};
/// use ccip_rs::merkle::{hash_pair, verify_multiproof};
///
/// let (a, b) = (B256::repeat_byte(1), B256::repeat_byte(2));
/// let root = verify_multiproof(&[a], &[b], U256::ZERO).unwrap();
/// assert_eq!(root, hash_pair(a, b));
/// ```
pub fn verify_multiproof(leaves: &[B256], proofs: &[B256], proof_flag_bits: U256) -> Result<B256> {
    let invalid = |reason| CcipError::InvalidProof { reason };

    if leaves.is_empty() {
        return Err(invalid("leaves cannot be empty"));
    }
    if leaves.len() > MAX_NUM_HASHES + 1 || proofs.len() > MAX_NUM_HASHES + 1 {
        return Err(invalid("too many leaves or proofs"));
    }
    let total_hashes = leaves.len() + proofs.len() - 1;
    if total_hashes > MAX_NUM_HASHES {
        return Err(invalid("too many hashes"));
    }
    if total_hashes == 0 {
        return Ok(leaves[0]);
    }

    let mut hashes = Vec::with_capacity(total_hashes);
    let (mut leaf_pos, mut hash_pos, mut proof_pos) = (0, 0, 0);

    for i in 0..total_hashes {
        let a = if proof_flag_bits.bit(i) {
            if leaf_pos < leaves.len() {
                leaf_pos += 1;
                leaves[leaf_pos - 1]
            } else {
                hash_pos += 1;
                *hashes.get(hash_pos - 1).ok_or_else(|| invalid("hash consumed before computed"))?
            }
        } else {
            proof_pos += 1;
            *proofs.get(proof_pos - 1).ok_or_else(|| invalid("proofs exhausted"))?
        };

        let b = if leaf_pos < leaves.len() {
            leaf_pos += 1;
            leaves[leaf_pos - 1]
        } else {
            hash_pos += 1;
            *hashes.get(hash_pos - 1).ok_or_else(|| invalid("hash consumed before computed"))?
        };

        if hash_pos > i {
            return Err(invalid("hash consumed before computed"));
        }
        hashes.push(hash_pair(a, b));
    }

    if hash_pos != total_hashes - 1 || leaf_pos != leaves.len() || proof_pos != proofs.len() {
        return Err(invalid("not every input was consumed"));
    }
    Ok(hashes[total_hashes - 1])
}
