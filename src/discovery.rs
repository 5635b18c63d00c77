//! Finding messages, commits and batches through a [`LogSource`]
//!
//! Manual execution needs three lookups before any proof can be built:
//!
//! 1. the message itself, from the source transaction's logs
//! 2. the commit covering its sequence number, scanning the destination's
//!    commit contract forward from a starting block
//! 3. every other message of that commit, scanning the source on-ramp around
//!    the message's block
//!
//! Scans walk fixed-size block windows ([`DiscoveryConfig`]) and stop at the
//! chain head or after `max_pages` windows, whichever comes first.
//!
//! # Example
//!
//! ```rust,no_run
//! use alloy_primitives::B256;
//! use ccip_rs::discovery::{build_manual_execution, DiscoveryConfig, ManualExecutionRequest};
//! use ccip_rs::testing::FakeLogSource;
//! use ccip_rs::{KnownChains, Lane, ProtocolVersion};
//!
//! # async fn example() -> ccip_rs::Result<()> {
//! let (source, dest) = (FakeLogSource::new(), FakeLogSource::new());
//! let request = ManualExecutionRequest::builder()
//!     .tx_hash(B256::repeat_byte(0x01))
//!     .lane(Lane::new(
//!         5009297550715157269,
//!         4949039107694359620,
//!         "0x69eCC4E2D8ea56E2d0a05bF57f4Fd6aEE7f2c284",
//!         ProtocolVersion::V1_6,
//!     ))
//!     .commit_address("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE")
//!     .build();
//!
//! let report = build_manual_execution(
//!     &request,
//!     &source,
//!     &dest,
//!     &KnownChains,
//!     &DiscoveryConfig::default(),
//! )
//! .await?;
//! println!("{} proof hashes", report.proofs.len());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use alloy_primitives::{Bytes, B256};
use bon::Builder;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn, Instrument, Span};

use crate::chain::{FamilyResolver, Lane};
use crate::commit::{commit_topics, decode_commit_reports, CommitReport};
use crate::error::{CcipError, Result};
use crate::execution::ExecutionReport;
use crate::merkle::build_proof;
use crate::message::{decode_message, message_topic, CcipMessage, RawLog};
use crate::spans;
use crate::traits::{LogQuery, LogSource};

/// Default block window per `get_logs` call
pub const DEFAULT_PAGE_SIZE: u64 = 10_000;

/// Default number of windows scanned before giving up
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Pagination of log scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryConfig {
    /// Blocks per `get_logs` call
    pub page_size: u64,
    /// Windows scanned per direction before a lookup fails
    pub max_pages: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl DiscoveryConfig {
    /// Sets the block window; zero is raised to one block.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Windows `[from, to]` walking up from `start` to `head`.
    fn forward(&self, start: u64, head: u64) -> impl Iterator<Item = (u64, u64)> {
        let page_size = self.page_size.max(1);
        (0..u64::from(self.max_pages)).map_while(move |i| {
            let from = start.checked_add(i.checked_mul(page_size)?)?;
            (from <= head).then(|| (from, from.saturating_add(page_size - 1).min(head)))
        })
    }

    /// Windows `[from, to]` walking down from `end` to block zero.
    fn backward(&self, end: u64) -> impl Iterator<Item = (u64, u64)> {
        let page_size = self.page_size.max(1);
        (0..u64::from(self.max_pages)).map_while(move |i| {
            let to = end.checked_sub(i.checked_mul(page_size)?)?;
            Some((to.saturating_sub(page_size - 1), to))
        })
    }
}

/// A decoded message together with the log that carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub message: CcipMessage,
    pub log: RawLog,
}

impl SentMessage {
    /// Whether the message was sent on `lane`.
    ///
    /// Legacy on-ramps serve a single destination, so their messages carry no
    /// destination selector and the on-ramp address alone decides.
    pub fn belongs_to(&self, lane: &Lane) -> bool {
        let header = &self.message.header;
        self.log.address.eq_ignore_ascii_case(lane.on_ramp())
            && header.source_chain_selector == lane.source_chain_selector()
            && (lane.version().is_legacy()
                || header.dest_chain_selector == lane.dest_chain_selector())
    }
}

/// Decodes every CCIP message emitted by one source transaction.
///
/// # Errors
///
/// - [`CcipError::TransactionNotFound`] when the source does not know `tx_hash`
/// - [`CcipError::MessageNotFound`] when none of its logs is an on-ramp event
pub async fn find_messages_in_tx<S, R>(
    source: &S,
    tx_hash: B256,
    resolver: &R,
) -> Result<Vec<SentMessage>>
where
    S: LogSource + ?Sized,
    R: FamilyResolver,
{
    let logs = source.get_transaction_logs(tx_hash).await?.ok_or_else(|| {
        error!(tx_hash = %tx_hash, event = "transaction_not_found");
        CcipError::TransactionNotFound {
            tx_hash: tx_hash.to_string(),
        }
    })?;

    let total = logs.len();
    let mut found = Vec::new();
    for log in logs {
        if let Some(message) = decode_message(&log, resolver)? {
            found.push(SentMessage { message, log });
        }
    }

    if found.is_empty() {
        warn!(
            tx_hash = %tx_hash,
            available_logs = total,
            event = "ccip_message_not_found"
        );
        return Err(CcipError::MessageNotFound {
            reason: format!("transaction {tx_hash} emitted {total} logs, none from an on-ramp"),
        });
    }

    debug!(
        tx_hash = %tx_hash,
        messages = found.len(),
        event = "messages_found_in_tx"
    );
    Ok(found)
}

/// Scans `commit_address` on the destination for the commit covering
/// `sequence_number` of `lane`, starting at `from_block`.
///
/// # Errors
///
/// [`CcipError::CommitNotFound`] when no window up to the head (or the page
/// limit) holds a matching report; collaborator and decoding errors otherwise.
pub async fn fetch_commit_report<D, R>(
    dest: &D,
    commit_address: &str,
    lane: &Lane,
    sequence_number: u64,
    from_block: u64,
    resolver: &R,
    config: &DiscoveryConfig,
) -> Result<CommitReport>
where
    D: LogSource + ?Sized,
    R: FamilyResolver,
{
    let span = spans::fetch_commit_report(commit_address, lane, sequence_number, from_block);
    async {
        let result = scan_commits(
            dest,
            commit_address,
            lane,
            sequence_number,
            from_block,
            resolver,
            config,
        )
        .await;
        if let Err(ref e) = result {
            spans::record_error(e);
        }
        result
    }
    .instrument(span)
    .await
}

async fn scan_commits<D, R>(
    dest: &D,
    commit_address: &str,
    lane: &Lane,
    sequence_number: u64,
    from_block: u64,
    resolver: &R,
    config: &DiscoveryConfig,
) -> Result<CommitReport>
where
    D: LogSource + ?Sized,
    R: FamilyResolver,
{
    let head = dest.get_block_number().await?;

    for (page, (from, to)) in config.forward(from_block, head).enumerate() {
        let query = LogQuery::new(commit_address)
            .with_topics(commit_topics())
            .with_block_range(from, to);
        let logs = dest
            .get_logs(&query)
            .instrument(spans::get_logs(&query, page as u32))
            .await?;

        for log in &logs {
            let Some(reports) = decode_commit_reports(log, Some(lane), resolver)? else {
                continue;
            };
            if let Some(report) = reports.into_iter().find(|r| r.contains(sequence_number)) {
                info!(
                    sequence_number,
                    min_seq_nr = report.min_seq_nr,
                    max_seq_nr = report.max_seq_nr,
                    merkle_root = %report.merkle_root,
                    block = log.block_number,
                    event = "commit_report_found"
                );
                return Ok(report);
            }
        }
    }

    warn!(sequence_number, head, event = "commit_report_not_found");
    Err(CcipError::CommitNotFound { sequence_number })
}

/// Collects every message of `report` from the lane's on-ramp, searching
/// backwards then forwards from `anchor_block` (the block of any message in
/// the batch). Returned messages are in sequence-number order.
///
/// # Errors
///
/// [`CcipError::MessageNotFound`] when the scan ends with part of the range
/// missing.
pub async fn fetch_messages_in_batch<S, R>(
    source: &S,
    lane: &Lane,
    report: &CommitReport,
    anchor_block: u64,
    resolver: &R,
    config: &DiscoveryConfig,
) -> Result<Vec<CcipMessage>>
where
    S: LogSource + ?Sized,
    R: FamilyResolver,
{
    let span = spans::fetch_batch(lane, report, anchor_block);
    async {
        let result = scan_batch(source, lane, report, anchor_block, resolver, config).await;
        match &result {
            Ok(messages) => {
                Span::current().record("messages_found", messages.len());
            }
            Err(e) => spans::record_error(e),
        }
        result
    }
    .instrument(span)
    .await
}

async fn scan_batch<S, R>(
    source: &S,
    lane: &Lane,
    report: &CommitReport,
    anchor_block: u64,
    resolver: &R,
    config: &DiscoveryConfig,
) -> Result<Vec<CcipMessage>>
where
    S: LogSource + ?Sized,
    R: FamilyResolver,
{
    let head = source.get_block_number().await?;
    let anchor = anchor_block.min(head);
    let wanted = report.len();
    let mut batch = BatchCollector::new(lane, report);
    let mut page = 0u32;

    for (from, to) in config.backward(anchor) {
        batch.collect(source, from, to, page, resolver).await?;
        page += 1;
        if batch.len() == wanted || batch.lowest.is_some_and(|seq| seq <= report.min_seq_nr) {
            break;
        }
    }

    if batch.len() != wanted {
        for (from, to) in config.forward(anchor.saturating_add(1), head) {
            batch.collect(source, from, to, page, resolver).await?;
            page += 1;
            if batch.len() == wanted || batch.highest.is_some_and(|seq| seq >= report.max_seq_nr) {
                break;
            }
        }
    }

    if batch.len() != wanted {
        warn!(
            found = batch.len(),
            wanted,
            min_seq_nr = report.min_seq_nr,
            max_seq_nr = report.max_seq_nr,
            event = "batch_incomplete"
        );
        return Err(CcipError::MessageNotFound {
            reason: format!(
                "found {} of {wanted} messages in [{}, {}]",
                batch.len(),
                report.min_seq_nr,
                report.max_seq_nr
            ),
        });
    }

    debug!(messages = wanted, pages = page, event = "batch_collected");
    Ok(batch.messages.into_values().collect())
}

/// Messages of one committed range, keyed by sequence number.
struct BatchCollector<'a> {
    lane: &'a Lane,
    report: &'a CommitReport,
    messages: BTreeMap<u64, CcipMessage>,
    /// lowest and highest lane sequence numbers seen, in range or not
    lowest: Option<u64>,
    highest: Option<u64>,
}

impl<'a> BatchCollector<'a> {
    fn new(lane: &'a Lane, report: &'a CommitReport) -> Self {
        Self {
            lane,
            report,
            messages: BTreeMap::new(),
            lowest: None,
            highest: None,
        }
    }

    fn len(&self) -> u64 {
        self.messages.len() as u64
    }

    async fn collect<S, R>(
        &mut self,
        source: &S,
        from: u64,
        to: u64,
        page: u32,
        resolver: &R,
    ) -> Result<()>
    where
        S: LogSource + ?Sized,
        R: FamilyResolver,
    {
        let query = LogQuery::new(self.lane.on_ramp())
            .with_topics([message_topic(self.lane.version())])
            .with_block_range(from, to);
        let logs = source
            .get_logs(&query)
            .instrument(spans::get_logs(&query, page))
            .await?;

        for log in logs {
            let Some(message) = decode_message(&log, resolver)? else {
                continue;
            };
            let sent = SentMessage { message, log };
            if !sent.belongs_to(self.lane) {
                continue;
            }
            let seq = sent.message.sequence_number();
            self.lowest = Some(self.lowest.map_or(seq, |lowest| lowest.min(seq)));
            self.highest = Some(self.highest.map_or(seq, |highest| highest.max(seq)));
            if self.report.contains(seq) {
                self.messages.insert(seq, sent.message);
            }
        }
        Ok(())
    }
}

/// Inputs of [`build_manual_execution`].
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct ManualExecutionRequest {
    /// Source transaction that sent the message
    pub tx_hash: B256,
    pub lane: Lane,
    /// Commit store (v1.2 / v1.5) or off-ramp (v1.6+) on the destination
    #[builder(into)]
    pub commit_address: String,
    /// Destination block to start the commit scan from
    #[builder(default)]
    pub dest_from_block: u64,
    /// Picks one message when the transaction sent several on the lane
    pub message_id: Option<B256>,
    #[builder(default)]
    pub offchain_token_data: Vec<Bytes>,
}

/// Runs the full lookup and returns a verified execution report.
///
/// # Errors
///
/// Any error of [`find_messages_in_tx`], [`fetch_commit_report`],
/// [`fetch_messages_in_batch`] and [`build_proof`];
/// [`CcipError::MessageNotFound`] when the transaction sent nothing on the
/// request's lane.
pub async fn build_manual_execution<S, D, R>(
    request: &ManualExecutionRequest,
    source: &S,
    dest: &D,
    resolver: &R,
    config: &DiscoveryConfig,
) -> Result<ExecutionReport>
where
    S: LogSource + ?Sized,
    D: LogSource + ?Sized,
    R: FamilyResolver,
{
    let span = spans::manual_execution(&request.tx_hash, &request.lane);
    async {
        let result = manual_execution(request, source, dest, resolver, config).await;
        if let Err(ref e) = result {
            spans::record_error(e);
        }
        result
    }
    .instrument(span)
    .await
}

async fn manual_execution<S, D, R>(
    request: &ManualExecutionRequest,
    source: &S,
    dest: &D,
    resolver: &R,
    config: &DiscoveryConfig,
) -> Result<ExecutionReport>
where
    S: LogSource + ?Sized,
    D: LogSource + ?Sized,
    R: FamilyResolver,
{
    let lane = &request.lane;
    let sent = find_messages_in_tx(source, request.tx_hash, resolver)
        .await?
        .into_iter()
        .find(|sent| {
            sent.belongs_to(lane)
                && request
                    .message_id
                    .map_or(true, |id| id == sent.message.message_id())
        })
        .ok_or_else(|| {
            spans::record_error_with_context(
                "MessageNotFound",
                "no message on the requested lane",
                Some(lane.on_ramp()),
            );
            CcipError::MessageNotFound {
                reason: format!("transaction {} sent nothing on this lane", request.tx_hash),
            }
        })?;

    let message_id = sent.message.message_id();
    Span::current().record("message_id", tracing::field::display(message_id));

    let report = fetch_commit_report(
        dest,
        &request.commit_address,
        lane,
        sent.message.sequence_number(),
        request.dest_from_block,
        resolver,
        config,
    )
    .await?;

    let anchor = match sent.log.block_number {
        Some(block) => block,
        None => source.get_block_number().await?,
    };
    let batch = fetch_messages_in_batch(source, lane, &report, anchor, resolver, config).await?;

    let proof = build_proof(lane, resolver, &batch, message_id, &report)?;
    let execution = ExecutionReport::new(sent.message, proof, request.offchain_token_data.clone())?;

    info!(
        message_id = %message_id,
        batch_size = batch.len(),
        proofs = execution.proofs.len(),
        event = "manual_execution_ready"
    );
    Ok(execution)
}
