//! Test utilities: an in-memory [`LogSource`] and on-chain-shaped fixtures
//!
//! [`FakeLogSource`] lets discovery code run against a scripted chain,
//! including RPC failures and unknown transactions. The [`fixtures`] module
//! builds event logs through the same `sol!` bindings the decoders use, so a
//! fixture log is byte-for-byte what an on-ramp or commit store would emit.

use alloy_primitives::B256;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::traits::{LogQuery, LogSource};
use crate::{CcipError, RawLog, Result};

// ============================================================================
// Fake Log Source
// ============================================================================

/// A fake log source that serves pre-configured logs.
///
/// This allows testing scenarios like:
/// - Transaction not found
/// - Transaction found but no CCIP event
/// - Messages spread over many blocks (pagination)
/// - RPC failures
#[derive(Clone, Debug, Default)]
pub struct FakeLogSource {
    logs: Arc<Mutex<Vec<RawLog>>>,
    failing_transactions: Arc<Mutex<HashSet<B256>>>,
    fail_get_logs: Arc<Mutex<bool>>,
    queries: Arc<Mutex<Vec<LogQuery>>>,
    head: Arc<Mutex<u64>>,
}

impl FakeLogSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a log. Its block number (if any) extends the chain head.
    pub fn add_log(&self, log: RawLog) {
        if let Some(block) = log.block_number {
            let mut head = self.head.lock().unwrap();
            *head = (*head).max(block);
        }
        let mut logs = self.logs.lock().unwrap();
        logs.push(log);
        logs.sort_by_key(|log| (log.block_number, log.log_index));
    }

    pub fn add_logs(&self, logs: impl IntoIterator<Item = RawLog>) {
        for log in logs {
            self.add_log(log);
        }
    }

    /// Configure a transaction hash to return an error
    pub fn add_failure(&self, tx_hash: B256) {
        self.failing_transactions.lock().unwrap().insert(tx_hash);
    }

    /// Make every `get_logs` call fail
    pub fn fail_log_queries(&self) {
        *self.fail_get_logs.lock().unwrap() = true;
    }

    pub fn set_head(&self, block: u64) {
        *self.head.lock().unwrap() = block;
    }

    /// Every query received so far, in order
    pub fn queries(&self) -> Vec<LogQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSource for FakeLogSource {
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<RawLog>> {
        self.queries.lock().unwrap().push(query.clone());
        if *self.fail_get_logs.lock().unwrap() {
            return Err(CcipError::Provider("Simulated RPC error".to_string()));
        }

        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| query.matches(log))
            .cloned()
            .collect())
    }

    async fn get_transaction_logs(&self, tx_hash: B256) -> Result<Option<Vec<RawLog>>> {
        if self.failing_transactions.lock().unwrap().contains(&tx_hash) {
            return Err(CcipError::Provider("Simulated RPC error".to_string()));
        }

        let logs: Vec<RawLog> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.transaction_hash == Some(tx_hash))
            .cloned()
            .collect();
        Ok((!logs.is_empty()).then_some(logs))
    }

    async fn get_block_number(&self) -> Result<u64> {
        Ok(*self.head.lock().unwrap())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Messages, lanes and event logs shaped like mainnet traffic.
///
/// Selectors are real mainnet selectors except for Sui and TON, which only
/// need to be distinct.
pub mod fixtures {
    use alloy_primitives::{keccak256, Bytes, B256, U256};
    use alloy_sol_types::{SolEvent, SolValue};
    use std::collections::HashMap;

    use crate::abi::evm2evm::{
        commit_store, CCIPSendRequested, EVM2EVMMessage, EVMTokenAmount, SourceTokenData,
    };
    use crate::abi::ramp::{
        CCIPMessageSent, CommitReportAccepted, EVM2AnyRampMessage, EVM2AnyTokenTransfer,
        MerkleRoot, PriceUpdates, RampMessageHeader,
    };
    use crate::abi::v2;
    use crate::address::{address_preimage, evm_address};
    use crate::chain::{ChainFamily, FamilyResolver, KnownChain, Lane, ProtocolVersion};
    use crate::extra_args::{EvmExtraArgsV2, ExtraArgs, SvmExtraArgsV1};
    use crate::message::{
        CcipMessage, MessageEnvelope, MessageHeader, MessageV1, RawLog, TokenAmount,
        TokenTransferV1,
    };

    pub const SOURCE_SELECTOR: u64 = KnownChain::EthereumMainnet.selector();
    pub const DEST_SELECTOR: u64 = KnownChain::ArbitrumOne.selector();
    pub const OTHER_SOURCE_SELECTOR: u64 = KnownChain::Base.selector();
    pub const APTOS_SELECTOR: u64 = KnownChain::AptosMainnet.selector();
    pub const SOLANA_SELECTOR: u64 = KnownChain::SolanaMainnet.selector();
    pub const SUI_SELECTOR: u64 = 17529533435026248318;
    pub const TON_SELECTOR: u64 = 16448340667252469081;

    pub const ON_RAMP: &str = "0x69eCC4E2D8ea56E2d0a05bF57f4Fd6aEE7f2c284";
    /// Commit store on legacy lanes, off-ramp from v1.6
    pub const OFF_RAMP: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";
    pub const SENDER: &str = "0x1111111111111111111111111111111111111111";
    pub const RECEIVER: &str = "0x2222222222222222222222222222222222222222";
    pub const FEE_TOKEN: &str = "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC";
    pub const TOKEN: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
    pub const POOL: &str = "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB";
    pub const DEST_TOKEN: &str = "0xDDdDddDdDdddDDddDDddDDDDdDdDDdDDdDDDDDDd";
    pub const MOVE_RECEIVER: &str =
        "0x000000000000000000000000000000000000000000000000000000000000cafe";
    pub const MOVE_TOKEN: &str =
        "0x000000000000000000000000000000000000000000000000000000000000000a";
    /// `[0x11; 32]`
    pub const SOLANA_RECEIVER: &str = "29d2S7vB453rNYFdR5Ycwt7y9haRT5fwVwL9zTmBhfV2";
    /// `[0x22; 32]`
    pub const SOLANA_TOKEN: &str = "3JF3sEqM796hk5WFqA6EtmEwJQ9quALszsfJyvXNQKy3";

    const FEE_TOKEN_AMOUNT: u64 = 1_000_000_000_000_000;

    pub fn resolver() -> HashMap<u64, ChainFamily> {
        HashMap::from([
            (SOURCE_SELECTOR, ChainFamily::Evm),
            (DEST_SELECTOR, ChainFamily::Evm),
            (OTHER_SOURCE_SELECTOR, ChainFamily::Evm),
            (APTOS_SELECTOR, ChainFamily::Aptos),
            (SOLANA_SELECTOR, ChainFamily::Solana),
            (SUI_SELECTOR, ChainFamily::Sui),
            (TON_SELECTOR, ChainFamily::Ton),
        ])
    }

    /// Ethereum → Arbitrum on [`ON_RAMP`]
    pub fn lane(version: ProtocolVersion) -> Lane {
        Lane::new(SOURCE_SELECTOR, DEST_SELECTOR, ON_RAMP, version)
    }

    pub fn message_id(sequence_number: u64) -> B256 {
        keccak256(sequence_number.to_be_bytes())
    }

    fn word(address: &str) -> Bytes {
        address_preimage(address, ChainFamily::Evm).unwrap()
    }

    /// One-token `EVM2EVMMessage` with a v1.5 `SourceTokenData` entry.
    pub fn legacy_message(sequence_number: u64, nonce: u64) -> EVM2EVMMessage {
        let source_token_data = SourceTokenData {
            sourcePoolAddress: word(POOL),
            destTokenAddress: word(DEST_TOKEN),
            extraData: Bytes::new(),
            destGasAmount: 90_000,
        };
        EVM2EVMMessage {
            sourceChainSelector: SOURCE_SELECTOR,
            sender: evm_address(SENDER).unwrap(),
            receiver: evm_address(RECEIVER).unwrap(),
            sequenceNumber: sequence_number,
            gasLimit: U256::from(200_000u64),
            strict: false,
            nonce,
            feeToken: evm_address(FEE_TOKEN).unwrap(),
            feeTokenAmount: U256::from(FEE_TOKEN_AMOUNT),
            data: Bytes::from_static(b"hello"),
            tokenAmounts: vec![EVMTokenAmount {
                token: evm_address(TOKEN).unwrap(),
                amount: U256::from(1_000u64),
            }],
            sourceTokenData: vec![source_token_data.abi_encode().into()],
            messageId: message_id(sequence_number),
        }
    }

    pub fn legacy_send_log(sequence_number: u64, nonce: u64) -> RawLog {
        log_of(
            ON_RAMP,
            &CCIPSendRequested {
                message: legacy_message(sequence_number, nonce),
            },
        )
    }

    /// One-token `EVM2AnyRampMessage` to [`DEST_SELECTOR`] with `EVMv2`
    /// extra args (300k gas, ordered).
    pub fn ramp_message(sequence_number: u64, nonce: u64) -> EVM2AnyRampMessage {
        let extra_args = ExtraArgs::EvmV2(EvmExtraArgsV2 {
            gas_limit: U256::from(300_000u64),
            allow_out_of_order_execution: false,
        });
        EVM2AnyRampMessage {
            header: RampMessageHeader {
                messageId: message_id(sequence_number),
                sourceChainSelector: SOURCE_SELECTOR,
                destChainSelector: DEST_SELECTOR,
                sequenceNumber: sequence_number,
                nonce,
            },
            sender: evm_address(SENDER).unwrap(),
            data: Bytes::from_static(b"hello"),
            receiver: word(RECEIVER),
            extraArgs: extra_args.encode().unwrap(),
            feeToken: evm_address(FEE_TOKEN).unwrap(),
            feeTokenAmount: U256::from(FEE_TOKEN_AMOUNT),
            feeValueJuels: U256::from(FEE_TOKEN_AMOUNT),
            tokenAmounts: vec![EVM2AnyTokenTransfer {
                sourcePoolAddress: evm_address(POOL).unwrap(),
                destTokenAddress: word(DEST_TOKEN),
                extraData: Bytes::new(),
                amount: U256::from(1_000u64),
                destExecData: U256::from(50_000u64).abi_encode().into(),
            }],
        }
    }

    pub fn ramp_send_log(message: EVM2AnyRampMessage) -> RawLog {
        log_of(
            ON_RAMP,
            &CCIPMessageSent {
                destChainSelector: message.header.destChainSelector,
                sequenceNumber: message.header.sequenceNumber,
                message,
            },
        )
    }

    /// Canonical EVM → Aptos message carrying one token.
    pub fn aptos_message(sequence_number: u64) -> CcipMessage {
        let extra_args = ExtraArgs::EvmV2(EvmExtraArgsV2 {
            gas_limit: U256::from(100_000u64),
            allow_out_of_order_execution: true,
        });
        remote_message(
            sequence_number,
            APTOS_SELECTOR,
            MOVE_RECEIVER,
            MOVE_TOKEN,
            extra_args,
        )
    }

    /// Canonical EVM → Solana message carrying one token.
    pub fn solana_message(sequence_number: u64) -> CcipMessage {
        let extra_args = ExtraArgs::SvmV1(SvmExtraArgsV1 {
            compute_units: 200_000,
            account_is_writable_bitmap: 0b10,
            allow_out_of_order_execution: true,
            token_receiver: SOLANA_RECEIVER.to_string(),
            accounts: vec![SOLANA_TOKEN.to_string()],
        });
        remote_message(
            sequence_number,
            SOLANA_SELECTOR,
            SOLANA_RECEIVER,
            SOLANA_TOKEN,
            extra_args,
        )
    }

    fn remote_message(
        sequence_number: u64,
        dest_chain_selector: u64,
        receiver: &str,
        dest_token: &str,
        extra_args: ExtraArgs,
    ) -> CcipMessage {
        CcipMessage {
            header: MessageHeader {
                message_id: message_id(sequence_number),
                source_chain_selector: SOURCE_SELECTOR,
                dest_chain_selector,
                sequence_number,
                nonce: 0,
            },
            sender: SENDER.to_string(),
            receiver: receiver.to_string(),
            data: Bytes::from_static(b"hello"),
            fee_token: FEE_TOKEN.to_string(),
            fee_token_amount: U256::from(FEE_TOKEN_AMOUNT),
            token_amounts: vec![TokenAmount {
                source_pool_address: POOL.to_string(),
                source_token_address: None,
                dest_token_address: dest_token.to_string(),
                dest_gas_amount: 10_000,
                extra_data: Bytes::new(),
                amount: U256::from(1_000u64),
            }],
            envelope: MessageEnvelope::Ramp {
                extra_args: extra_args.encode().unwrap(),
                fee_value_juels: U256::ZERO,
            },
            extra_args,
        }
    }

    /// `MessageV1` from [`SOURCE_SELECTOR`] to [`DEST_SELECTOR`], EVM addresses
    /// throughout.
    pub fn wire_message(message_number: u64, with_token: bool) -> MessageV1 {
        let raw = |address: &str| Bytes::copy_from_slice(evm_address(address).unwrap().as_slice());
        MessageV1 {
            source_chain_selector: SOURCE_SELECTOR,
            dest_chain_selector: DEST_SELECTOR,
            message_number,
            execution_gas_limit: 400_000,
            ccip_receive_gas_limit: 200_000,
            finality: 12,
            ccv_and_executor_hash: B256::repeat_byte(0x5c),
            on_ramp_address: raw(ON_RAMP),
            off_ramp_address: raw(OFF_RAMP),
            sender: raw(SENDER),
            receiver: raw(RECEIVER),
            dest_blob: Bytes::from_static(&[0xb1, 0xb2]),
            token_transfer: with_token.then(|| TokenTransferV1 {
                amount: U256::from(1_000u64),
                source_pool_address: raw(POOL),
                source_token_address: raw(TOKEN),
                dest_token_address: raw(DEST_TOKEN),
                token_receiver: raw(RECEIVER),
                extra_data: Bytes::from_static(&[0xe1]),
            }),
            data: Bytes::from_static(b"hello"),
        }
    }

    pub fn wire_send_log(message: &MessageV1) -> RawLog {
        let encoded = message.encode().unwrap();
        log_of(
            ON_RAMP,
            &v2::CCIPMessageSent {
                destChainSelector: message.dest_chain_selector,
                messageNumber: message.message_number,
                messageId: keccak256(&encoded),
                feeToken: evm_address(FEE_TOKEN).unwrap(),
                feeTokenAmount: U256::from(FEE_TOKEN_AMOUNT),
                encodedMessage: encoded,
            },
        )
    }

    /// `ReportAccepted` of a v1.2 / v1.5 commit store.
    pub fn commit_store_log(merkle_root: B256, min: u64, max: u64) -> RawLog {
        use commit_store::{CommitReport, Interval, PriceUpdates, ReportAccepted};
        log_of(
            OFF_RAMP,
            &ReportAccepted {
                report: CommitReport {
                    priceUpdates: PriceUpdates {
                        tokenPriceUpdates: Vec::new(),
                        gasPriceUpdates: Vec::new(),
                    },
                    interval: Interval { min, max },
                    merkleRoot: merkle_root,
                },
            },
        )
    }

    pub fn commit_v1_6_log(blessed: Vec<MerkleRoot>, unblessed: Vec<MerkleRoot>) -> RawLog {
        log_of(
            OFF_RAMP,
            &CommitReportAccepted {
                blessedMerkleRoots: blessed,
                unblessedMerkleRoots: unblessed,
                priceUpdates: PriceUpdates {
                    tokenPriceUpdates: Vec::new(),
                    gasPriceUpdates: Vec::new(),
                },
            },
        )
    }

    /// A v1.6 commit entry; the on-ramp is encoded for the selector's family.
    pub fn merkle_root(
        source_chain_selector: u64,
        on_ramp: &str,
        merkle_root: B256,
        min: u64,
        max: u64,
    ) -> MerkleRoot {
        let family = resolver().require_family(source_chain_selector).unwrap();
        MerkleRoot {
            sourceChainSelector: source_chain_selector,
            onRampAddress: address_preimage(on_ramp, family).unwrap(),
            minSeqNr: min,
            maxSeqNr: max,
            merkleRoot: merkle_root,
        }
    }

    /// Positions `log` in block `block`, transaction `tx_hash`.
    pub fn placed(mut log: RawLog, block: u64, tx_hash: B256, log_index: u64) -> RawLog {
        log.block_number = Some(block);
        log.transaction_hash = Some(tx_hash);
        log.log_index = Some(log_index);
        log
    }

    fn log_of<E: SolEvent>(address: &str, event: &E) -> RawLog {
        let data = event.encode_log_data();
        RawLog::new(address, data.topics().to_vec(), data.data)
    }
}
