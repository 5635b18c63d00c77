//! Alloy-based log source for EVM chains.

use alloy_network::{Network, ReceiptResponse};
use alloy_primitives::B256;
use alloy_provider::Provider;
use alloy_rpc_types::{Filter, Log};
use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use crate::address::evm_address;
use crate::error::{CcipError, Result};
use crate::message::RawLog;
use crate::traits::{LogQuery, LogSource};

/// [`LogSource`] backed by Alloy's [`Provider`] trait.
///
/// # Type Parameters
///
/// - `N`: The network type (e.g., `Ethereum`, `Optimism`)
/// - `P`: The underlying Alloy provider implementation
///
/// # Examples
///
/// ```rust,no_run
/// use ccip_rs::providers::AlloyLogSource;
/// use ccip_rs::LogSource;
/// use alloy_network::Ethereum;
/// use alloy_provider::Provider;
///
/// # async fn example<P: Provider<Ethereum> + Clone>(provider: P) -> ccip_rs::Result<()> {
/// let logs = AlloyLogSource::<Ethereum, _>::new(provider);
/// let head = logs.get_block_number().await?;
/// # let _ = head;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AlloyLogSource<N, P>
where
    N: Network,
    P: Provider<N> + Clone,
{
    provider: P,
    _network: std::marker::PhantomData<N>,
}

impl<N, P> AlloyLogSource<N, P>
where
    N: Network,
    P: Provider<N> + Clone,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _network: std::marker::PhantomData,
        }
    }

    /// Returns a reference to the underlying Alloy provider.
    pub fn inner(&self) -> &P {
        &self.provider
    }
}

/// Translates a [`LogQuery`] into an RPC filter. Only EVM addresses parse.
fn to_filter(query: &LogQuery) -> Result<Filter> {
    let mut filter = Filter::new();
    if let Some(address) = &query.address {
        filter = filter.address(evm_address(address)?);
    }
    if !query.topics.is_empty() {
        filter = filter.event_signature(query.topics.clone());
    }
    if let Some(from) = query.from_block {
        filter = filter.from_block(from);
    }
    if let Some(to) = query.to_block {
        filter = filter.to_block(to);
    }
    Ok(filter)
}

fn to_raw_log(log: &Log) -> RawLog {
    let mut raw = RawLog::new(
        log.address().to_checksum(None),
        log.topics().to_vec(),
        log.data().data.clone(),
    );
    raw.block_number = log.block_number;
    raw.transaction_hash = log.transaction_hash;
    raw.log_index = log.log_index;
    raw
}

fn provider_error(e: impl std::fmt::Display) -> CcipError {
    CcipError::Provider(e.to_string())
}

#[async_trait]
impl<N, P> LogSource for AlloyLogSource<N, P>
where
    N: Network,
    P: Provider<N> + Clone + Send + Sync,
{
    #[instrument(skip(self))]
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<RawLog>> {
        let filter = to_filter(query)?;
        trace!("Fetching logs");
        let logs = self.provider.get_logs(&filter).await.map_err(provider_error)?;

        debug!(logs = logs.len(), event = "logs_fetched");
        Ok(logs.iter().map(to_raw_log).collect())
    }

    /// Resolves the receipt, then reads its block's logs and keeps the
    /// transaction's own. Receipt types differ per network; block and
    /// transaction hashes are common to all of them.
    #[instrument(skip(self), fields(tx_hash = %tx_hash))]
    async fn get_transaction_logs(&self, tx_hash: B256) -> Result<Option<Vec<RawLog>>> {
        trace!("Fetching transaction receipt");
        let Some(receipt) = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(provider_error)?
        else {
            debug!(event = "transaction_receipt_not_found");
            return Ok(None);
        };
        let Some(block_hash) = receipt.block_hash() else {
            debug!(event = "transaction_pending");
            return Ok(None);
        };

        let logs = self
            .provider
            .get_logs(&Filter::new().at_block_hash(block_hash))
            .await
            .map_err(provider_error)?;
        let logs: Vec<RawLog> = logs
            .iter()
            .filter(|log| log.transaction_hash == Some(tx_hash))
            .map(to_raw_log)
            .collect();

        debug!(logs = logs.len(), event = "transaction_logs_fetched");
        Ok(Some(logs))
    }

    #[instrument(skip(self))]
    async fn get_block_number(&self) -> Result<u64> {
        trace!("Fetching current block number");
        let block_number = self
            .provider
            .get_block_number()
            .await
            .map_err(provider_error)?;

        debug!(block_number, event = "block_number_fetched");
        Ok(block_number)
    }
}
