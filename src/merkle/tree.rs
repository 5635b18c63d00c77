use alloy_primitives::{B256, U256};
use tracing::trace;

use super::{hash_pair, MultiProof, MAX_NUM_HASHES};
use crate::error::{CcipError, Result};

/// Binary Merkle tree with every layer kept for proof extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `layers[0]` are the leaves, the last layer is the single root
    layers: Vec<Vec<B256>>,
}

impl MerkleTree {
    /// Builds the tree bottom-up.
    ///
    /// # Errors
    ///
    /// [`CcipError::InvalidProof`] for an empty leaf set or more than
    /// [`MAX_NUM_HASHES`] leaves.
    pub fn new(leaves: Vec<B256>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(CcipError::InvalidProof {
                reason: "leaves cannot be empty",
            });
        }
        if leaves.len() > MAX_NUM_HASHES {
            return Err(CcipError::InvalidProof {
                reason: "too many leaves",
            });
        }

        let mut layers = vec![leaves];
        while let Some(layer) = layers.last().filter(|layer| layer.len() > 1) {
            let next = layer
                .chunks(2)
                .map(|pair| hash_pair(pair[0], pair.get(1).copied().unwrap_or(B256::ZERO)))
                .collect();
            layers.push(next);
        }

        trace!(
            leaves = layers[0].len(),
            depth = layers.len() - 1,
            event = "merkle_tree_built"
        );
        Ok(Self { layers })
    }

    pub fn root(&self) -> B256 {
        // `new` guarantees a non-empty top layer
        self.layers[self.layers.len() - 1][0]
    }

    pub fn leaves(&self) -> &[B256] {
        &self.layers[0]
    }

    /// Proves the leaves at `indices`, which must be strictly increasing.
    ///
    /// # Errors
    ///
    /// [`CcipError::InvalidProof`] for an empty, unsorted or out-of-range
    /// index list.
    pub fn prove(&self, indices: &[usize]) -> Result<MultiProof> {
        if indices.is_empty() {
            return Err(CcipError::InvalidProof {
                reason: "no leaves to prove",
            });
        }
        if indices.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(CcipError::InvalidProof {
                reason: "leaf indices must be strictly increasing",
            });
        }
        if indices[indices.len() - 1] >= self.leaves().len() {
            return Err(CcipError::InvalidProof {
                reason: "leaf index out of range",
            });
        }

        let mut proofs = Vec::new();
        let mut flags = Vec::new();
        let mut current = indices.to_vec();

        for layer in &self.layers[..self.layers.len() - 1] {
            let mut next = Vec::with_capacity(current.len());
            let mut j = 0;
            while j < current.len() {
                let index = current[j];
                let sibling = index ^ 1;
                if current.get(j + 1) == Some(&sibling) {
                    // sibling is being proven too; it comes from the leaves
                    flags.push(true);
                    j += 2;
                } else {
                    proofs.push(layer.get(sibling).copied().unwrap_or(B256::ZERO));
                    flags.push(false);
                    j += 1;
                }
                next.push(index / 2);
            }
            current = next;
        }

        if flags.len() > MAX_NUM_HASHES {
            return Err(CcipError::InvalidProof {
                reason: "too many hashes",
            });
        }
        let proof_flag_bits = flags
            .iter()
            .enumerate()
            .filter(|(_, from_hashes)| **from_hashes)
            .fold(U256::ZERO, |bits, (i, _)| bits | (U256::from(1) << i));

        Ok(MultiProof {
            proofs,
            proof_flag_bits,
        })
    }
}
