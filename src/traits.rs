//! Collaborator contract for log access
//!
//! The codecs in this crate never touch the network. Discovery helpers in
//! [`crate::discovery`] only need to fetch event logs by filter and the logs of
//! one transaction, which is what [`LogSource`] captures. Production code wraps
//! an RPC client ([`AlloyLogSource`](crate::providers::AlloyLogSource) for EVM
//! chains); tests use [`FakeLogSource`](crate::testing::FakeLogSource).
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use ccip_rs::{LogQuery, LogSource, RawLog, Result};
//! use alloy_primitives::B256;
//!
//! struct StaticLogs(Vec<RawLog>);
//!
//! #[async_trait::async_trait]
//! impl LogSource for StaticLogs {
//!     async fn get_logs(&self, query: &LogQuery) -> Result<Vec<RawLog>> {
//!         Ok(self.0.iter().filter(|log| query.matches(log)).cloned().collect())
//!     }
//!
//!     async fn get_transaction_logs(&self, _tx_hash: B256) -> Result<Option<Vec<RawLog>>> {
//!         Ok(None)
//!     }
//!
//!     async fn get_block_number(&self) -> Result<u64> {
//!         Ok(0)
//!     }
//! }
//! ```

use alloy_primitives::B256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::RawLog;

/// Event log filter.
///
/// `topics` lists alternatives for the first topic; an empty list matches any
/// event. Block bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    pub address: Option<String>,
    pub topics: Vec<B256>,
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
}

impl LogQuery {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Default::default()
        }
    }

    pub fn with_topics(mut self, topics: impl IntoIterator<Item = B256>) -> Self {
        self.topics = topics.into_iter().collect();
        self
    }

    pub fn with_block_range(mut self, from_block: u64, to_block: u64) -> Self {
        self.from_block = Some(from_block);
        self.to_block = Some(to_block);
        self
    }

    /// Whether `log` passes this filter. Addresses compare case-insensitively;
    /// logs without a block number only pass unbounded queries.
    pub fn matches(&self, log: &RawLog) -> bool {
        if let Some(address) = &self.address {
            if !address.eq_ignore_ascii_case(&log.address) {
                return false;
            }
        }
        if !self.topics.is_empty()
            && !log
                .topic0()
                .is_some_and(|topic| self.topics.contains(&topic))
        {
            return false;
        }
        match (self.from_block, self.to_block, log.block_number) {
            (None, None, _) => true,
            (_, _, None) => false,
            (from, to, Some(block)) => {
                from.map_or(true, |from| block >= from) && to.map_or(true, |to| block <= to)
            }
        }
    }
}

/// Read access to one chain's event logs.
///
/// Implementations return logs in chain order (block number, then log index).
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetches every log matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client fails.
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<RawLog>>;

    /// Fetches the logs emitted by one transaction.
    ///
    /// Returns `None` if the transaction is unknown or not yet mined.
    async fn get_transaction_logs(&self, tx_hash: B256) -> Result<Option<Vec<RawLog>>>;

    /// Current head block number.
    async fn get_block_number(&self) -> Result<u64>;
}
