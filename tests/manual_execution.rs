//! End-to-end manual execution against scripted source and destination chains

use alloy_primitives::{Bytes, B256, U256};
use alloy_sol_types::SolCall;
use ccip_rs::abi::{evm2evm, ramp};
use ccip_rs::discovery::{
    build_manual_execution, fetch_commit_report, fetch_messages_in_batch, find_messages_in_tx,
    DiscoveryConfig, ManualExecutionRequest,
};
use ccip_rs::merkle::verify_multiproof;
use ccip_rs::testing::{fixtures, FakeLogSource};
use ccip_rs::{
    decode_message, BatchProver, CcipError, CcipMessage, Lane, MessageEnvelope, ProtocolVersion,
    RawLog,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn tx(n: u64) -> B256 {
    B256::left_padding_from(&n.to_be_bytes())
}

fn decoded(logs: &[RawLog]) -> Vec<CcipMessage> {
    logs.iter()
        .map(|log| {
            decode_message(log, &fixtures::resolver())
                .unwrap()
                .unwrap()
        })
        .collect()
}

fn root_of(lane: &Lane, logs: &[RawLog]) -> B256 {
    BatchProver::for_lane(lane, &fixtures::resolver(), &decoded(logs))
        .unwrap()
        .root()
}

/// Source chain with one v1.5 send per transaction, two blocks apart.
fn legacy_source(count: u64) -> (FakeLogSource, Vec<RawLog>) {
    let source = FakeLogSource::new();
    let logs: Vec<RawLog> = (1..=count)
        .map(|seq| {
            let log = fixtures::legacy_send_log(seq, seq);
            fixtures::placed(log, 40 + 2 * seq, tx(seq), 0)
        })
        .collect();
    source.add_logs(logs.clone());
    (source, logs)
}

#[tokio::test]
async fn test_v1_5_manual_execution_end_to_end() {
    init_tracing();
    let lane = fixtures::lane(ProtocolVersion::V1_5);
    let (source, logs) = legacy_source(5);

    let dest = FakeLogSource::new();
    let root = root_of(&lane, &logs);
    dest.add_log(fixtures::placed(
        fixtures::commit_store_log(root, 1, 5),
        800,
        tx(1_000),
        3,
    ));

    let request = ManualExecutionRequest::builder()
        .tx_hash(tx(4))
        .lane(lane.clone())
        .commit_address(fixtures::OFF_RAMP)
        .dest_from_block(700)
        .build();
    let report = build_manual_execution(
        &request,
        &source,
        &dest,
        &fixtures::resolver(),
        &DiscoveryConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.message.sequence_number(), 4);
    assert_eq!(report.merkle_root, root);
    assert_eq!(report.offchain_token_data, vec![Bytes::new()]);
    let leaf = BatchProver::for_lane(&lane, &fixtures::resolver(), &decoded(&logs))
        .unwrap()
        .leaf(fixtures::message_id(4))
        .unwrap();
    assert_eq!(
        verify_multiproof(&[leaf], &report.proofs, report.proof_flag_bits).unwrap(),
        root
    );

    let calldata = report.encode(&lane, &fixtures::resolver()).unwrap();
    assert_eq!(&calldata[..4], evm2evm::manuallyExecuteCall::SELECTOR.as_slice());
    let call = evm2evm::manuallyExecuteCall::abi_decode(&calldata).unwrap();
    assert_eq!(call.report.messages, vec![fixtures::legacy_message(4, 4)]);
    assert_eq!(call.report.proofs, report.proofs);
    assert_eq!(call.report.proofFlagBits, report.proof_flag_bits);
}

#[tokio::test]
async fn test_v1_6_manual_execution_step_by_step() {
    init_tracing();
    let lane = fixtures::lane(ProtocolVersion::V1_6);
    let resolver = fixtures::resolver();
    let config = DiscoveryConfig::default().with_page_size(50);

    let source = FakeLogSource::new();
    let logs: Vec<RawLog> = (10..=13)
        .map(|seq| {
            let log = fixtures::ramp_send_log(fixtures::ramp_message(seq, 0));
            fixtures::placed(log, 300 + seq, tx(seq), 1)
        })
        .collect();
    source.add_logs(logs.clone());
    // a send on another lane in the same range
    let mut foreign = fixtures::ramp_message(11, 0);
    foreign.header.destChainSelector = fixtures::OTHER_SOURCE_SELECTOR;
    let foreign = fixtures::ramp_send_log(foreign);
    source.add_log(fixtures::placed(foreign, 312, tx(99), 0));

    let root = root_of(&lane, &logs);
    let dest = FakeLogSource::new();
    let entry =
        fixtures::merkle_root(fixtures::SOURCE_SELECTOR, fixtures::ON_RAMP, root, 10, 13);
    dest.add_log(fixtures::placed(
        fixtures::commit_v1_6_log(vec![entry], vec![]),
        5_020,
        tx(2_000),
        0,
    ));

    let sent = find_messages_in_tx(&source, tx(12), &resolver).await.unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].belongs_to(&lane));

    let commit =
        fetch_commit_report(&dest, fixtures::OFF_RAMP, &lane, 12, 5_000, &resolver, &config)
            .await
            .unwrap();
    assert_eq!((commit.min_seq_nr, commit.max_seq_nr), (10, 13));
    assert_eq!(commit.merkle_root, root);

    let batch = fetch_messages_in_batch(&source, &lane, &commit, 312, &resolver, &config)
        .await
        .unwrap();
    let seqs: Vec<u64> = batch.iter().map(|m| m.sequence_number()).collect();
    assert_eq!(seqs, vec![10, 11, 12, 13]);
    assert!(batch
        .iter()
        .all(|m| m.header.dest_chain_selector == fixtures::DEST_SELECTOR));

    let request = ManualExecutionRequest::builder()
        .tx_hash(tx(12))
        .lane(lane.clone())
        .commit_address(fixtures::OFF_RAMP)
        .dest_from_block(5_000)
        .offchain_token_data(vec![Bytes::from_static(b"attestation")])
        .build();
    let report = build_manual_execution(&request, &source, &dest, &resolver, &config)
        .await
        .unwrap();
    assert_eq!(report.proofs.len(), 2);
    assert_eq!(report.proof_flag_bits, U256::ZERO);

    let calldata = report.encode(&lane, &resolver).unwrap();
    let call = ramp::manuallyExecuteCall::abi_decode(&calldata).unwrap();
    assert_eq!(call.reports.len(), 1);
    let executed = &call.reports[0];
    assert_eq!(executed.sourceChainSelector, fixtures::SOURCE_SELECTOR);
    assert_eq!(executed.messages[0].header.sequenceNumber, 12);
    assert_eq!(
        executed.offchainTokenData,
        vec![vec![Bytes::from_static(b"attestation")]]
    );
    assert_eq!(executed.proofs, report.proofs);
}

#[tokio::test]
async fn test_missing_commit_surfaces_as_commit_not_found() {
    init_tracing();
    let lane = fixtures::lane(ProtocolVersion::V1_5);
    let (source, _) = legacy_source(2);
    let dest = FakeLogSource::new();
    dest.set_head(100);

    let request = ManualExecutionRequest::builder()
        .tx_hash(tx(2))
        .lane(lane)
        .commit_address(fixtures::OFF_RAMP)
        .build();
    let result = build_manual_execution(
        &request,
        &source,
        &dest,
        &fixtures::resolver(),
        &DiscoveryConfig::default(),
    )
    .await;
    assert!(matches!(
        result,
        Err(CcipError::CommitNotFound { sequence_number: 2 })
    ));
}

#[tokio::test]
async fn test_rpc_failure_propagates() {
    init_tracing();
    let (source, _) = legacy_source(1);
    source.add_failure(tx(1));

    let result = find_messages_in_tx(&source, tx(1), &fixtures::resolver()).await;
    assert!(matches!(result, Err(CcipError::Provider(_))));
}

#[tokio::test]
async fn test_wire_message_is_found_in_transaction() {
    init_tracing();
    let wire = fixtures::wire_message(77, true);
    let source = FakeLogSource::new();
    source.add_log(fixtures::placed(fixtures::wire_send_log(&wire), 10, tx(77), 0));

    let sent = find_messages_in_tx(&source, tx(77), &fixtures::resolver())
        .await
        .unwrap();
    assert_eq!(sent.len(), 1);
    let message = &sent[0].message;
    assert_eq!(message.sequence_number(), 77);
    assert_eq!(message.generation(), ProtocolVersion::V2_0);
    assert!(matches!(message.envelope, MessageEnvelope::Wire(ref w) if *w == wire));
}
