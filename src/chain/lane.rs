use bon::Builder;
use serde::{Deserialize, Serialize};

use super::ProtocolVersion;

/// A directed message channel between two chains on one on-ramp contract.
///
/// Selectors are CCIP chain selectors, not EVM chain ids. The on-ramp is kept
/// in its canonical string form for the source family. Lanes are immutable
/// once built.
///
/// # Example
///
/// ```rust
/// use ccip_rs::{Lane, ProtocolVersion};
///
/// let lane = Lane::builder()
///     .source_chain_selector(5009297550715157269)
///     .dest_chain_selector(4949039107694359620)
///     .on_ramp("0x69eCC4E2D8ea56E2d0a05bF57f4Fd6aEE7f2c284".to_string())
///     .version(ProtocolVersion::V1_5)
///     .build();
///
/// assert_eq!(lane.version(), ProtocolVersion::V1_5);
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lane {
    source_chain_selector: u64,
    dest_chain_selector: u64,
    on_ramp: String,
    version: ProtocolVersion,
}

impl Lane {
    /// Creates a lane
    pub fn new(
        source_chain_selector: u64,
        dest_chain_selector: u64,
        on_ramp: impl Into<String>,
        version: ProtocolVersion,
    ) -> Self {
        Self {
            source_chain_selector,
            dest_chain_selector,
            on_ramp: on_ramp.into(),
            version,
        }
    }

    pub fn source_chain_selector(&self) -> u64 {
        self.source_chain_selector
    }

    pub fn dest_chain_selector(&self) -> u64 {
        self.dest_chain_selector
    }

    /// On-ramp address in the source family's canonical form
    pub fn on_ramp(&self) -> &str {
        &self.on_ramp
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }
}
