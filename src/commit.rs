//! Commit report decoding
//!
//! A commit attests a contiguous sequence-number range of one lane with a
//! Merkle root. Up to v1.5 every lane has its own commit store, whose
//! `ReportAccepted` event carries no lane context at all, so the caller must
//! supply the [`Lane`]. From v1.6 the off-ramp commits roots for many lanes in
//! one `CommitReportAccepted` event and each root names its source chain and
//! on-ramp.

use alloy_primitives::B256;
use alloy_sol_types::SolEvent;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::abi::evm2evm::commit_store;
use crate::abi::ramp::{CommitReportAccepted, MerkleRoot};
use crate::address::{decode_address, encode_address_bytes};
use crate::chain::{ChainFamily, FamilyResolver, Lane, ProtocolVersion};
use crate::error::{CcipError, Result};
use crate::message::RawLog;

/// One committed sequence range of one lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub merkle_root: B256,
    pub min_seq_nr: u64,
    pub max_seq_nr: u64,
    pub source_chain_selector: u64,
    /// On-ramp in the source family's canonical form
    pub on_ramp_address: String,
}

impl CommitReport {
    pub fn contains(&self, sequence_number: u64) -> bool {
        (self.min_seq_nr..=self.max_seq_nr).contains(&sequence_number)
    }

    /// Number of messages in the committed range
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        self.max_seq_nr - self.min_seq_nr + 1
    }

    pub fn is_empty(&self) -> bool {
        self.max_seq_nr < self.min_seq_nr
    }

    /// Fails with [`CcipError::SequenceOutOfRange`] unless the range covers
    /// `sequence_number`.
    pub fn require_contains(&self, sequence_number: u64) -> Result<()> {
        if self.contains(sequence_number) {
            return Ok(());
        }
        Err(CcipError::SequenceOutOfRange {
            sequence_number,
            min: self.min_seq_nr,
            max: self.max_seq_nr,
        })
    }
}

/// Every commit topic this crate understands, for building log filters.
pub fn commit_topics() -> [B256; 2] {
    [
        commit_store::ReportAccepted::SIGNATURE_HASH,
        CommitReportAccepted::SIGNATURE_HASH,
    ]
}

/// Decodes a commit log into all reports it carries for `lane` (or for every
/// lane when `lane` is `None` on v1.6+).
///
/// Returns `Ok(None)` when the topic is not a known commit event or no entry
/// matches the lane.
///
/// # Errors
///
/// - [`CcipError::VersionRequiresLane`] for a v1.2 / v1.5 log without a lane
/// - [`CcipError::UnknownChainSelector`] when `lane` is given and its source
///   cannot be resolved; without a lane such roots are skipped
/// - [`CcipError::Abi`] when the log data does not match the event layout
pub fn decode_commit_reports<R: FamilyResolver>(
    log: &RawLog,
    lane: Option<&Lane>,
    resolver: &R,
) -> Result<Option<Vec<CommitReport>>> {
    let Some(topic) = log.topic0() else {
        return Ok(None);
    };

    // v1.2 and v1.5 commit stores emit the same event
    let reports = if topic == commit_store::ReportAccepted::SIGNATURE_HASH {
        let lane = lane.ok_or(CcipError::VersionRequiresLane {
            version: ProtocolVersion::V1_5,
        })?;
        let event =
            commit_store::ReportAccepted::decode_raw_log(log.topics.iter().copied(), &log.data)?;
        let report = event.report;
        vec![lane_report(
            lane,
            report.merkleRoot,
            report.interval.min,
            report.interval.max,
        )]
    } else if topic == CommitReportAccepted::SIGNATURE_HASH {
        let event = CommitReportAccepted::decode_raw_log(log.topics.iter().copied(), &log.data)?;
        let roots = event
            .blessedMerkleRoots
            .iter()
            .chain(event.unblessedMerkleRoots.iter());
        let mut reports = Vec::new();
        for root in roots {
            if let Some(report) = ramp_report(root, lane, resolver)? {
                reports.push(report);
            }
        }
        reports
    } else {
        return Ok(None);
    };

    debug!(
        reports = reports.len(),
        lane_filtered = lane.is_some(),
        event = "commit_reports_decoded"
    );
    Ok((!reports.is_empty()).then_some(reports))
}

/// Decodes the single report a commit log carries for `lane`.
///
/// # Example
///
/// ```rust,no_run
/// use ccip_rs::{decode_commit_report, KnownChains, Lane, ProtocolVersion, RawLog};
///
/// # fn example(log: RawLog) -> ccip_rs::Result<()> {
/// let lane = Lane::new(
///     5009297550715157269,
///     4949039107694359620,
///     "0x69eCC4E2D8ea56E2d0a05bF57f4Fd6aEE7f2c284",
///     ProtocolVersion::V1_5,
/// );
/// if let Some(report) = decode_commit_report(&log, &lane, &KnownChains)? {
///     let range = report.min_seq_nr..=report.max_seq_nr;
///     println!("root {} covers {range:?}", report.merkle_root);
/// }
/// # Ok(())
/// # }
/// ```
pub fn decode_commit_report<R: FamilyResolver>(
    log: &RawLog,
    lane: &Lane,
    resolver: &R,
) -> Result<Option<CommitReport>> {
    Ok(decode_commit_reports(log, Some(lane), resolver)?
        .and_then(|reports| reports.into_iter().next()))
}

fn lane_report(lane: &Lane, merkle_root: B256, min: u64, max: u64) -> CommitReport {
    CommitReport {
        merkle_root,
        min_seq_nr: min,
        max_seq_nr: max,
        source_chain_selector: lane.source_chain_selector(),
        on_ramp_address: lane.on_ramp().to_string(),
    }
}

fn ramp_report<R: FamilyResolver>(
    root: &MerkleRoot,
    lane: Option<&Lane>,
    resolver: &R,
) -> Result<Option<CommitReport>> {
    let family = match lane {
        Some(lane) if lane.source_chain_selector() != root.sourceChainSelector => return Ok(None),
        Some(_) => resolver.require_family(root.sourceChainSelector)?,
        None => match resolver.family_of(root.sourceChainSelector) {
            Some(family) => family,
            None => {
                trace!(
                    source_chain_selector = root.sourceChainSelector,
                    event = "commit_root_skipped_unknown_source"
                );
                return Ok(None);
            }
        },
    };
    let on_ramp_address = decode_address(&root.onRampAddress, family)?;
    if let Some(lane) = lane {
        if canonical(lane.on_ramp(), family)? != on_ramp_address {
            return Ok(None);
        }
    }

    Ok(Some(CommitReport {
        merkle_root: root.merkleRoot,
        min_seq_nr: root.minSeqNr,
        max_seq_nr: root.maxSeqNr,
        source_chain_selector: root.sourceChainSelector,
        on_ramp_address,
    }))
}

/// Round-trips an address through its codec so differently cased or padded
/// spellings compare equal.
fn canonical(address: &str, family: ChainFamily) -> Result<String> {
    decode_address(&encode_address_bytes(address, family)?, family)
}
