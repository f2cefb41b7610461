use cosign_errors::ErrorKind;
use cosign_store::ProposalStore;
use cosign_types::{ProposalDraft, ProposalState, SequenceNumber};

fn add_signer(seq: u64, signature: &str) -> ProposalDraft {
    serde_json::from_value(serde_json::json!({
        "sequenceNumber": seq,
        "creator": "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        "target": "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
        "humanReadableCall": "addSigner(address)",
        "callDataSelector": "0x7065cb48000000000000000000000000cccccccccccccccccccccccccccccccccccccccc",
        "value": "0",
        "signature": signature,
    }))
    .unwrap()
}

fn signatures(store_proposal: &cosign_types::Proposal) -> Vec<String> {
    store_proposal
        .signatures
        .iter()
        .map(|s| s.as_str().to_string())
        .collect()
}

#[tokio::test]
async fn test_add_signer_round() {
    let _ = cosign_log::init_tracing_test();
    let store = ProposalStore::default();
    let seq = SequenceNumber::new(0);

    let created = store.create(add_signer(0, "sigA")).await.unwrap();
    assert_eq!(created.state, ProposalState::Open);
    assert_eq!(signatures(&created), vec!["sigA"]);

    let signed = store.append_signature(seq, "sigB").await.unwrap();
    assert_eq!(signatures(&signed), vec!["sigA", "sigB"]);

    let err = store.append_signature(seq, "sigA").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let executed = store.mark_executed(seq).await.unwrap();
    assert_eq!(executed.state, ProposalState::Executed);

    let err = store.append_signature(seq, "sigC").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    let fetched = store.get(seq).await.unwrap();
    assert_eq!(fetched.state, ProposalState::Executed);
    assert_eq!(signatures(&fetched), vec!["sigA", "sigB"]);
}

#[tokio::test]
async fn test_consecutive_rounds_use_distinct_sequence_numbers() {
    let store = ProposalStore::default();

    store.create(add_signer(0, "sigA")).await.unwrap();
    store.mark_executed(SequenceNumber::new(0)).await.unwrap();

    // the contract nonce advanced, so the next round uses the next key
    store.create(add_signer(1, "sigA")).await.unwrap();
    store.append_signature(SequenceNumber::new(1), "sigB").await.unwrap();

    let summary = store.summary().await;
    assert_eq!((summary.open, summary.executed), (1, 1));

    let listed = store.list().await;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].state, ProposalState::Executed);
    assert_eq!(listed[1].signature_count(), 2);
}

#[tokio::test]
async fn test_reset_allows_starting_over() {
    let store = ProposalStore::default();
    store.create(add_signer(0, "sigA")).await.unwrap();
    store.mark_executed(SequenceNumber::new(0)).await.unwrap();

    assert_eq!(store.reset().await, 1);
    let recreated = store.create(add_signer(0, "sigZ")).await.unwrap();
    assert_eq!(recreated.state, ProposalState::Open);
    assert_eq!(signatures(&recreated), vec!["sigZ"]);
}
