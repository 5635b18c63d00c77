//! OpenTelemetry span helpers for proof building and discovery
//!
//! Span names are static (`ccip_rs.<operation>`) and carry structured
//! attributes; error fields start empty and are filled by [`record_error`] or
//! [`record_error_with_context`] when the operation fails.
//!
//! The crate's own operations open these spans internally. They are public so
//! callers running their own discovery loops can emit the same shape.
//!
//! # Example
//!
//! ```rust
//! use ccip_rs::{spans, Lane, ProtocolVersion};
//!
//! let lane = Lane::new(
//!     5009297550715157269,
//!     4949039107694359620,
//!     "0x69eCC4E2D8ea56E2d0a05bF57f4Fd6aEE7f2c284",
//!     ProtocolVersion::V1_6,
//! );
//! let commit_store = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";
//! let span = spans::fetch_commit_report(commit_store, &lane, 42, 0);
//! let _guard = span.enter();
//! ```

use alloy_primitives::B256;
use tracing::Span;

use crate::chain::Lane;
use crate::commit::CommitReport;
use crate::traits::LogQuery;

/// Span for proving one message against its commit.
///
/// Parent: [`manual_execution`] or the caller's span
/// Children: None
#[inline]
pub fn build_proof(
    message_id: &B256,
    lane: &Lane,
    batch_size: usize,
    report: &CommitReport,
) -> Span {
    tracing::info_span!(
        "ccip_rs.build_proof",
        message_id = %message_id,
        source_chain_selector = lane.source_chain_selector(),
        dest_chain_selector = lane.dest_chain_selector(),
        version = %lane.version(),
        batch_size = batch_size,
        min_seq_nr = report.min_seq_nr,
        max_seq_nr = report.max_seq_nr,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Span for scanning a commit contract for the report covering a sequence
/// number.
///
/// Parent: [`manual_execution`] or the caller's span
/// Children: [`get_logs`] (one per page)
#[inline]
pub fn fetch_commit_report(
    commit_address: &str,
    lane: &Lane,
    sequence_number: u64,
    from_block: u64,
) -> Span {
    tracing::info_span!(
        "ccip_rs.fetch_commit_report",
        commit_address = commit_address,
        source_chain_selector = lane.source_chain_selector(),
        on_ramp = lane.on_ramp(),
        sequence_number = sequence_number,
        from_block = from_block,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Span for collecting every message of a committed range from the on-ramp.
///
/// Parent: [`manual_execution`] or the caller's span
/// Children: [`get_logs`] (one per page)
#[inline]
pub fn fetch_batch(lane: &Lane, report: &CommitReport, from_block: u64) -> Span {
    tracing::info_span!(
        "ccip_rs.fetch_batch",
        on_ramp = lane.on_ramp(),
        min_seq_nr = report.min_seq_nr,
        max_seq_nr = report.max_seq_nr,
        from_block = from_block,
        messages_found = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Span for assembling a manual execution report from a source transaction.
///
/// Parent: Caller's span
/// Children: [`fetch_commit_report`], [`fetch_batch`], [`build_proof`]
#[inline]
pub fn manual_execution(tx_hash: &B256, lane: &Lane) -> Span {
    tracing::info_span!(
        "ccip_rs.manual_execution",
        tx_hash = %tx_hash,
        source_chain_selector = lane.source_chain_selector(),
        dest_chain_selector = lane.dest_chain_selector(),
        version = %lane.version(),
        message_id = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Span for one `get_logs` page.
///
/// Parent: [`fetch_commit_report`] or [`fetch_batch`]
/// Children: Provider RPC calls
#[inline]
pub fn get_logs(query: &LogQuery, page: u32) -> Span {
    tracing::debug_span!(
        "ccip_rs.get_logs",
        address = query.address.as_deref(),
        from_block = query.from_block,
        to_block = query.to_block,
        topics = query.topics.len(),
        page = page,
    )
}

/// Records error attributes on the current span.
///
/// Sets `error.type` to the variant's message prefix, `error.message` to the
/// full display string and `otel.status_code` to `ERROR`.
///
/// # Example
///
/// ```rust
/// use ccip_rs::{spans, CcipError};
///
/// # fn example() -> Result<(), CcipError> {
/// let span = tracing::info_span!("ccip_rs.operation");
/// let _guard = span.enter();
///
/// let result = some_operation();
/// if let Err(ref e) = result {
///     spans::record_error(e);
/// }
/// result
/// # }
/// # fn some_operation() -> Result<(), CcipError> { Ok(()) }
/// ```
pub fn record_error<E: std::error::Error>(error: &E) {
    let current_span = Span::current();
    let message = error.to_string();
    current_span.record("error.type", message.split(':').next().unwrap_or("Unknown"));
    current_span.record("error.message", message.as_str());
    current_span.record("otel.status_code", "ERROR");

    if let Some(source) = error.source() {
        current_span.record("error.source", source.to_string());
    }
}

/// Records error attributes with an explicit type and extra context on the
/// current span.
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
