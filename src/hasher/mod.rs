//! Merkle leaf hashing
//!
//! The leaf hash of a message is what the committing DON puts into the Merkle
//! tree, and what the destination off-ramp recomputes during execution. Each
//! (protocol version, destination family) pair has its own pre-image layout;
//! all of them must match the on-chain implementation bit for bit.
//!
//! Hashers are built per [`Lane`]: lane-derived constants (the metadata hash)
//! are computed once and reused for every message in a batch.
//!
//! | Version     | Destination | Hasher                 |
//! |-------------|-------------|------------------------|
//! | v1.2 / v1.5 | EVM         | [`Evm2EvmHasher`]      |
//! | v1.6        | EVM         | [`Any2EvmHasher`]      |
//! | v1.6        | Aptos / Sui | [`MoveHasher`]         |
//! | v1.6        | Solana      | [`SvmHasher`]          |
//! | v2.0        | any         | [`WireHasher`]         |

mod any2evm;
mod legacy;
mod move_vm;
mod svm;
mod wire;

use alloy_primitives::B256;
use tracing::debug;

use crate::chain::{ChainFamily, FamilyResolver, Lane, ProtocolVersion};
use crate::error::{CcipError, Result};
use crate::message::CcipMessage;

pub use any2evm::Any2EvmHasher;
pub use legacy::Evm2EvmHasher;
pub use move_vm::MoveHasher;
pub use svm::SvmHasher;
pub use wire::WireHasher;

pub(crate) use any2evm::to_any2evm;

/// Prefix distinguishing leaves from internal nodes
pub const LEAF_DOMAIN_SEPARATOR: B256 = B256::ZERO;

/// Computes the Merkle leaf of a message on one lane.
pub trait LeafHasher: Send + Sync {
    /// # Errors
    ///
    /// Fails when the message cannot be laid out for this lane, for example
    /// when an address does not parse for its family.
    fn hash(&self, message: &CcipMessage) -> Result<B256>;
}

/// Selects and builds the hasher for `lane`.
///
/// # Errors
///
/// - [`CcipError::UnknownChainSelector`] when a lane selector does not resolve
/// - [`CcipError::HasherVersionUnsupported`] for combinations with no on-chain
///   counterpart (legacy lanes touching non-EVM chains, TON destinations)
///
/// # Example
///
/// ```rust
/// use ccip_rs::{leaf_hasher, KnownChains, Lane, ProtocolVersion};
///
/// let lane = Lane::new(
///     5009297550715157269,
///     4949039107694359620,
///     "0x69eCC4E2D8ea56E2d0a05bF57f4Fd6aEE7f2c284",
///     ProtocolVersion::V1_5,
/// );
/// let hasher = leaf_hasher(&lane, &KnownChains).unwrap();
/// # let _ = hasher;
/// ```
pub fn leaf_hasher<R: FamilyResolver>(lane: &Lane, resolver: &R) -> Result<Box<dyn LeafHasher>> {
    let source = resolver.require_family(lane.source_chain_selector())?;
    let dest = resolver.require_family(lane.dest_chain_selector())?;
    let unsupported = || CcipError::HasherVersionUnsupported {
        version: lane.version(),
        source_family: source,
        dest_family: dest,
    };

    debug!(
        version = %lane.version(),
        source_family = %source,
        dest_family = %dest,
        event = "leaf_hasher_selected"
    );

    let hasher: Box<dyn LeafHasher> = match (lane.version(), dest) {
        (ProtocolVersion::V1_2 | ProtocolVersion::V1_5, ChainFamily::Evm)
            if source == ChainFamily::Evm =>
        {
            Box::new(Evm2EvmHasher::new(lane)?)
        }
        (ProtocolVersion::V1_2 | ProtocolVersion::V1_5, _) => return Err(unsupported()),
        (ProtocolVersion::V1_6, ChainFamily::Evm) => Box::new(Any2EvmHasher::new(lane, source)?),
        (ProtocolVersion::V1_6, ChainFamily::Aptos) => Box::new(MoveHasher::aptos(lane, source)?),
        (ProtocolVersion::V1_6, ChainFamily::Sui) => Box::new(MoveHasher::sui(lane, source)?),
        (ProtocolVersion::V1_6, ChainFamily::Solana) => Box::new(SvmHasher::new(lane, source)?),
        (ProtocolVersion::V1_6, ChainFamily::Ton) => return Err(unsupported()),
        (ProtocolVersion::V2_0, _) => Box::new(WireHasher),
    };
    Ok(hasher)
}
