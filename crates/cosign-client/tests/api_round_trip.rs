use cosign_client::{Client, ClientError};
use cosign_errors::ErrorKind;
use cosign_server::Server;
use cosign_types::{Config, ProposalDraft, ProposalState, SequenceNumber};
use tokio::net::TcpListener;

async fn spawn_service(config: Config) -> Client {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let server = Server::new(config).unwrap();

    tokio::spawn(async move {
        server
            .serve(listener, std::future::pending::<()>())
            .await
            .unwrap();
    });

    Client::connect(&format!("http://{address}")).unwrap()
}

fn add_signer(seq: u64, signature: &str) -> ProposalDraft {
    ProposalDraft {
        sequence_number: SequenceNumber::new(seq),
        creator: "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string(),
        target: "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB".to_string(),
        human_readable_call: "addSigner(address)".to_string(),
        call_data_selector: "0x7065cb48000000000000000000000000cccccccccccccccccccccccccccccccccccccccc"
            .to_string(),
        value: Some("0".to_string()),
        signature: signature.to_string(),
    }
}

fn api_kind(result: Result<impl std::fmt::Debug, ClientError>) -> ErrorKind {
    result.unwrap_err().kind().expect("service error")
}

#[tokio::test]
async fn test_full_signing_round() {
    let client = spawn_service(Config::default()).await;
    let seq = SequenceNumber::new(0);

    assert_eq!(client.health().await.unwrap().status, "ok");

    let created = client.create_proposal(&add_signer(0, "sigA")).await.unwrap();
    assert_eq!(created.state, ProposalState::Open);

    let signed = client.append_signature(seq, "sigB").await.unwrap();
    let collected: Vec<&str> = signed.signatures.iter().map(|s| s.as_str()).collect();
    assert_eq!(collected, vec!["sigA", "sigB"]);

    assert_eq!(
        api_kind(client.append_signature(seq, "sigA").await),
        ErrorKind::Conflict
    );

    let hinted = client.get_proposal(seq, Some(2)).await.unwrap();
    assert!(hinted.quorum.unwrap().reached);

    let executed = client.mark_executed(seq).await.unwrap();
    assert_eq!(executed.state, ProposalState::Executed);

    assert_eq!(
        api_kind(client.append_signature(seq, "sigC").await),
        ErrorKind::State
    );
    assert_eq!(api_kind(client.mark_executed(seq).await), ErrorKind::State);

    let fetched = client.get_proposal(seq, None).await.unwrap();
    assert_eq!(fetched.proposal.state, ProposalState::Executed);
    assert!(fetched.quorum.is_none());
}

#[tokio::test]
async fn test_errors_carry_kind_and_status() {
    let client = spawn_service(Config::default()).await;

    match client.get_proposal(SequenceNumber::new(99), None).await {
        Err(ClientError::Api { status, kind, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(kind, ErrorKind::NotFound);
        }
        other => panic!("expected api error, got {other:?}"),
    }

    let mut bad = add_signer(0, "sigA");
    bad.target = "0x".to_string();
    assert_eq!(
        api_kind(client.create_proposal(&bad).await),
        ErrorKind::Validation
    );

    client.create_proposal(&add_signer(0, "sigA")).await.unwrap();
    assert_eq!(
        api_kind(client.create_proposal(&add_signer(0, "sigB")).await),
        ErrorKind::Conflict
    );
}

#[tokio::test]
async fn test_list_status_and_reset() {
    let client = spawn_service(Config::default()).await;

    for seq in 0..3 {
        client.create_proposal(&add_signer(seq, "sigA")).await.unwrap();
    }
    client.mark_executed(SequenceNumber::new(0)).await.unwrap();

    let listed = client.list_proposals().await.unwrap();
    assert_eq!(listed.proposals.len(), 3);
    assert_eq!((listed.open, listed.executed), (2, 1));

    let status = client.status().await.unwrap();
    assert_eq!((status.open, status.executed), (2, 1));

    let reset = client.reset().await.unwrap();
    assert!(reset.reset);
    assert_eq!(reset.cleared, 3);
    assert!(client.list_proposals().await.unwrap().proposals.is_empty());
}

#[tokio::test]
async fn test_concurrent_signers_over_http() {
    let client = spawn_service(Config::default()).await;
    let seq = SequenceNumber::new(5);
    client.create_proposal(&add_signer(5, "creator")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.append_signature(seq, &format!("signer-{i}")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let fetched = client.get_proposal(seq, None).await.unwrap();
    assert_eq!(fetched.proposal.signature_count(), 21);
}
